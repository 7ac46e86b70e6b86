//! Terminal implementation of the overlay host traits.
//!
//! Elements are demo widget indices, pixels are derived from cells at a
//! fixed 8×16 ratio, and "animation frames" are event loop iterations: a
//! requested frame is fired by the next pass of the loop in `main`.

use help_layer_core::host::{
    ComputedStyle, ElementQuery, FrameHandle, FrameScheduler, KeyChannel, ListenerId,
    ResizeEvents, ScrollIntoView, ScrollOptions, StyleSource, Surface, SurfaceConfig, TextMeasure,
    ViewportSource,
};
use help_layer_protocol::{Color, FontSpec, Rect, RenderCommand, Viewport};

use crate::app::{CELL_HEIGHT, CELL_WIDTH, DemoApp};

pub struct TerminalHost {
    app: DemoApp,
    next_handle: u64,
    pending: Option<FrameHandle>,
    next_listener: u64,
    resize_listener: Option<ListenerId>,
    surface: Option<SurfaceConfig>,
    presented: Vec<RenderCommand>,
}

impl TerminalHost {
    pub fn new(app: DemoApp) -> Self {
        Self {
            app,
            next_handle: 0,
            pending: None,
            next_listener: 0,
            resize_listener: None,
            surface: None,
            presented: Vec::new(),
        }
    }

    pub fn app(&self) -> &DemoApp {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut DemoApp {
        &mut self.app
    }

    /// The frame to fire on this loop pass, if one was requested.
    pub fn take_due_frame(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    /// Resize the demo page. Returns whether the overlay asked to hear
    /// about it.
    pub fn resize(&mut self, cols: u16, rows: u16) -> bool {
        self.app.resize(cols, rows);
        self.resize_listener.is_some()
    }

    /// Keep `commands` on screen until the next frame or teardown.
    pub fn present(&mut self, commands: Vec<RenderCommand>) {
        self.presented = commands;
    }

    pub fn presented(&self) -> &[RenderCommand] {
        &self.presented
    }

    pub fn surface(&self) -> Option<SurfaceConfig> {
        self.surface
    }
}

impl ElementQuery for TerminalHost {
    type Element = usize;

    fn query_all(&self, selector: &str) -> Vec<usize> {
        self.app.query(selector)
    }

    fn bounding_rect(&self, element: &usize) -> Rect {
        self.app.pixel_rect(*element)
    }
}

impl ScrollIntoView for TerminalHost {
    fn scroll_into_view(&mut self, element: &usize, options: ScrollOptions) {
        // No smooth scrolling in a terminal; jump straight there.
        self.app.scroll_to_center(*element);
        tracing::debug!(
            element,
            ?options,
            scroll = self.app.scroll(),
            "scrolled widget into view"
        );
    }
}

impl TextMeasure for TerminalHost {
    fn measure_text(&self, text: &str, _font: &FontSpec) -> f64 {
        text.chars().count() as f64 * CELL_WIDTH
    }
}

impl StyleSource for TerminalHost {
    fn computed_style(&self) -> ComputedStyle {
        ComputedStyle {
            font: FontSpec::new("400", CELL_HEIGHT, "monospace"),
            color: Color::WHITE,
        }
    }
}

impl ViewportSource for TerminalHost {
    fn viewport(&self) -> Viewport {
        Viewport::new(
            f64::from(self.app.cols()) * CELL_WIDTH,
            f64::from(self.app.rows()) * CELL_HEIGHT,
            1.0,
        )
    }
}

impl ResizeEvents for TerminalHost {
    fn subscribe_resize(&mut self) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.resize_listener = Some(id);
        id
    }

    fn unsubscribe_resize(&mut self, id: ListenerId) {
        if self.resize_listener == Some(id) {
            self.resize_listener = None;
        }
    }
}

impl FrameScheduler for TerminalHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_handle += 1;
        let handle = FrameHandle(self.next_handle);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

impl Surface for TerminalHost {
    fn configure(&mut self, config: SurfaceConfig) {
        self.surface = Some(config);
    }

    fn release(&mut self) {
        self.surface = None;
        self.presented.clear();
    }
}

/// Key subscription bookkeeping. Crossterm delivers every key to the loop
/// anyway; this only records whether shortcuts are listening.
#[derive(Debug, Default)]
pub struct TerminalKeys {
    next: u64,
    listener: Option<ListenerId>,
}

impl TerminalKeys {
    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }
}

impl KeyChannel for TerminalKeys {
    fn subscribe_keys(&mut self) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.listener = Some(id);
        id
    }

    fn unsubscribe_keys(&mut self, id: ListenerId) {
        if self.listener == Some(id) {
            self.listener = None;
        }
    }
}
