//! The overlay renderer: owns the mask's lifetime on top of a host.
//!
//! A mounted overlay holds exactly one pending animation frame and one
//! resize subscription. Both are acquired in [`Overlay::sync`] and released
//! together on teardown (hide, completion, prop change, fatal error, drop).

use help_layer_protocol::{Color, FontSpec, Point, RenderCommand, Viewport};

use crate::error::OverlayError;
use crate::host::{ComputedStyle, FrameHandle, ListenerId, OverlayHost, ScrollOptions, SurfaceConfig};
use crate::keyboard::Modifiers;
use crate::mask::{FrameInput, compose_frame};
use crate::step::StepList;
use crate::tour::TourState;

/// Extra space around each hole, in logical pixels.
pub const DEFAULT_PADDING: f64 = 4.0;

/// Dim layer color: black at 80% opacity.
pub const DEFAULT_DIM_COLOR: Color = Color::rgba(0, 0, 0, 0.8);

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayOptions {
    pub padding: f64,
    pub dim_color: Color,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            dim_color: DEFAULT_DIM_COLOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub modifiers: Modifiers,
}

/// Which pointer callback a press on the mask maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Click,
    ShiftClick,
}

pub type PointerHandler = Box<dyn FnMut(&PointerEvent)>;

/// Props the overlay was last synced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Props {
    revision: u64,
    state: TourState,
}

/// State of a mounted overlay.
#[derive(Debug)]
struct Session {
    step: u32,
    frame: Option<FrameHandle>,
    resize: ListenerId,
    surface: SurfaceConfig,
    style: ComputedStyle,
    surface_font: FontSpec,
    fonts_loaded: bool,
}

pub struct Overlay<H: OverlayHost> {
    host: H,
    steps: StepList,
    revision: u64,
    options: OverlayOptions,
    synced: Option<Props>,
    session: Option<Session>,
    on_click: Option<PointerHandler>,
    on_shift_click: Option<PointerHandler>,
}

impl<H: OverlayHost> Overlay<H> {
    pub fn new(host: H, steps: StepList, options: OverlayOptions) -> Self {
        Self {
            host,
            steps,
            revision: 0,
            options,
            synced: None,
            session: None,
            on_click: None,
            on_shift_click: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn steps(&self) -> &StepList {
        &self.steps
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    /// Takes effect from the next frame.
    pub fn set_options(&mut self, options: OverlayOptions) {
        self.options = options;
    }

    /// Replace the step list. A mounted overlay is restarted against the new
    /// list with the last synced tour state.
    pub fn set_steps(&mut self, steps: StepList) {
        self.steps = steps;
        self.revision += 1;
        if let Some(props) = self.synced {
            self.sync(props.state);
        }
    }

    pub fn set_on_click(&mut self, handler: Option<PointerHandler>) {
        self.on_click = handler;
    }

    pub fn set_on_shift_click(&mut self, handler: Option<PointerHandler>) {
        self.on_shift_click = handler;
    }

    pub fn is_mounted(&self) -> bool {
        self.session.is_some()
    }

    /// Current backing store geometry, `None` while unmounted.
    pub fn surface(&self) -> Option<SurfaceConfig> {
        self.session.as_ref().map(|s| s.surface)
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.session.as_ref().and_then(|s| s.frame)
    }

    /// Whether `state` produces a visible mask for the current step list.
    pub fn should_render(&self, state: TourState) -> bool {
        state.visible && !self.steps.is_over(state.current_step)
    }

    /// Bring the overlay in line with `state`.
    ///
    /// Identical props are a no-op. Otherwise any running session is torn
    /// down, and a new one is mounted if the tour is visible and not over.
    pub fn sync(&mut self, state: TourState) {
        let props = Props {
            revision: self.revision,
            state,
        };
        if self.synced == Some(props) {
            return;
        }
        self.synced = Some(props);
        self.teardown("props changed");
        if self.should_render(state) {
            self.mount(state.current_step);
        } else if state.visible {
            tracing::debug!(step = state.current_step, "tour finished");
        }
    }

    /// Tear down and forget the last synced props.
    pub fn unmount(&mut self) {
        self.teardown("unmount");
        self.synced = None;
    }

    fn mount(&mut self, step: u32) {
        let frame = self.host.request_frame();
        let style = self.host.computed_style();

        if let Some(first) = self.steps.first_in_scene(step) {
            match self.host.query_first(&first.selector) {
                Some(element) => {
                    tracing::debug!(step, selector = %first.selector, "scrolling first target into view");
                    self.host.scroll_into_view(&element, ScrollOptions::SMOOTH_CENTER);
                }
                None => {
                    tracing::debug!(step, selector = %first.selector, "scroll target not found");
                }
            }
        }

        let surface = SurfaceConfig::for_viewport(&self.host.viewport());
        self.host.configure(surface);
        let resize = self.host.subscribe_resize();

        tracing::debug!(
            step,
            width = surface.logical_width,
            height = surface.logical_height,
            scale = surface.scale,
            "overlay mounted"
        );
        self.session = Some(Session {
            step,
            frame: Some(frame),
            resize,
            surface,
            style,
            surface_font: FontSpec::default(),
            fonts_loaded: false,
        });
    }

    /// Cancel the pending frame and drop the resize listener together.
    fn teardown(&mut self, reason: &str) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        if let Some(frame) = session.frame {
            self.host.cancel_frame(frame);
        }
        self.host.unsubscribe_resize(session.resize);
        self.host.release();
        tracing::debug!(step = session.step, reason, "overlay torn down");
        true
    }

    /// Handle a fired animation frame and return its render commands.
    ///
    /// The next frame is requested before this one is composed. Stale
    /// handles (from a torn-down session) yield an empty list. On an
    /// unresolved selector the whole session is torn down before the error
    /// is returned.
    pub fn on_frame(&mut self, handle: FrameHandle) -> Result<Vec<RenderCommand>, OverlayError> {
        let Some(session) = self.session.as_mut() else {
            tracing::trace!(handle = handle.0, "frame fired after teardown");
            return Ok(Vec::new());
        };
        if session.frame != Some(handle) {
            tracing::trace!(handle = handle.0, "stale frame handle");
            return Ok(Vec::new());
        }
        session.frame = Some(self.host.request_frame());

        if !session.fonts_loaded && self.host.fonts_ready() {
            session.fonts_loaded = true;
            session.surface_font = session.style.font.clone();
            tracing::debug!(font = %session.surface_font.to_css(), "surface font applied");
        }

        let input = FrameInput {
            steps: &self.steps,
            current_step: session.step,
            viewport: Viewport::new(
                session.surface.logical_width,
                session.surface.logical_height,
                session.surface.scale,
            ),
            options: &self.options,
            style: &session.style,
            surface_font: &session.surface_font,
        };
        match compose_frame(&self.host, input) {
            Ok(frame) => {
                if frame.drew_label {
                    session.surface_font = session.style.font.clone();
                }
                Ok(frame.commands)
            }
            Err(err) => {
                tracing::error!(%err, "tour step cannot be highlighted, stopping overlay");
                self.teardown("unresolved selector");
                Err(err)
            }
        }
    }

    /// Re-derive the surface size after a viewport change.
    pub fn on_resize(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let surface = SurfaceConfig::for_viewport(&self.host.viewport());
        self.host.configure(surface);
        session.surface = surface;
        tracing::debug!(
            width = surface.logical_width,
            height = surface.logical_height,
            scale = surface.scale,
            "overlay surface resized"
        );
    }

    /// Route a pointer press on the mask. Returns `None` when nothing is
    /// mounted (the press belongs to the host UI).
    pub fn on_pointer_down(&mut self, event: &PointerEvent) -> Option<PointerAction> {
        self.session.as_ref()?;
        let (action, handler) = if event.modifiers.shift {
            (PointerAction::ShiftClick, self.on_shift_click.as_mut())
        } else {
            (PointerAction::Click, self.on_click.as_mut())
        };
        if let Some(handler) = handler {
            handler(event);
        }
        Some(action)
    }
}

impl<H: OverlayHost> Drop for Overlay<H> {
    fn drop(&mut self) {
        self.teardown("dropped");
    }
}
