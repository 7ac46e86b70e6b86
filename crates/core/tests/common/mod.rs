//! Recording host used by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use help_layer_core::host::{
    ComputedStyle, ElementQuery, FrameHandle, FrameScheduler, KeyChannel, ListenerId,
    ResizeEvents, ScrollIntoView, ScrollOptions, StyleSource, Surface, SurfaceConfig,
    TextMeasure, ViewportSource,
};
use help_layer_protocol::{FontSpec, Rect, Viewport};

#[derive(Debug, Default)]
pub struct HostLog {
    next_id: u64,
    pub pending_frames: BTreeSet<u64>,
    pub requested_frames: usize,
    pub cancelled_frames: Vec<u64>,
    pub resize_listeners: BTreeSet<u64>,
    pub key_listeners: BTreeSet<u64>,
    pub surfaces: Vec<SurfaceConfig>,
    pub releases: usize,
    pub scrolls: Vec<(String, ScrollOptions)>,
    pub measured_with: Vec<FontSpec>,
}

impl HostLog {
    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// The single frame the overlay is waiting on.
    pub fn only_pending(&self) -> Option<FrameHandle> {
        match self.pending_frames.len() {
            1 => self.pending_frames.iter().next().map(|id| FrameHandle(*id)),
            _ => None,
        }
    }
}

/// A page of named elements. Elements are `(selector, rect)` pairs; a
/// selector matches every element registered under it.
#[derive(Debug, Clone)]
pub struct FakeHost {
    pub log: Rc<RefCell<HostLog>>,
    pub elements: HashMap<String, Vec<Rect>>,
    pub viewport: Viewport,
    pub style: ComputedStyle,
    pub fonts_ready: bool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(HostLog::default())),
            elements: HashMap::new(),
            viewport: Viewport::new(1024.0, 768.0, 1.0),
            style: ComputedStyle::default(),
            fonts_ready: true,
        }
    }

    pub fn with(mut self, selector: &str, rects: &[Rect]) -> Self {
        self.elements.insert(selector.to_string(), rects.to_vec());
        self
    }
}

impl ElementQuery for FakeHost {
    type Element = (String, Rect);

    fn query_all(&self, selector: &str) -> Vec<Self::Element> {
        self.elements
            .get(selector)
            .map(|rects| rects.iter().map(|r| (selector.to_string(), *r)).collect())
            .unwrap_or_default()
    }

    fn bounding_rect(&self, element: &Self::Element) -> Rect {
        element.1
    }
}

impl ScrollIntoView for FakeHost {
    fn scroll_into_view(&mut self, element: &Self::Element, options: ScrollOptions) {
        self.log.borrow_mut().scrolls.push((element.0.clone(), options));
    }
}

impl TextMeasure for FakeHost {
    fn measure_text(&self, text: &str, font: &FontSpec) -> f64 {
        self.log.borrow_mut().measured_with.push(font.clone());
        text.chars().count() as f64 * font.size * 0.5
    }
}

impl StyleSource for FakeHost {
    fn computed_style(&self) -> ComputedStyle {
        self.style.clone()
    }

    fn fonts_ready(&self) -> bool {
        self.fonts_ready
    }
}

impl ViewportSource for FakeHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

impl ResizeEvents for FakeHost {
    fn subscribe_resize(&mut self) -> ListenerId {
        let mut log = self.log.borrow_mut();
        let id = log.next();
        log.resize_listeners.insert(id);
        ListenerId(id)
    }

    fn unsubscribe_resize(&mut self, id: ListenerId) {
        self.log.borrow_mut().resize_listeners.remove(&id.0);
    }
}

impl FrameScheduler for FakeHost {
    fn request_frame(&mut self) -> FrameHandle {
        let mut log = self.log.borrow_mut();
        let id = log.next();
        log.pending_frames.insert(id);
        log.requested_frames += 1;
        FrameHandle(id)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut log = self.log.borrow_mut();
        log.pending_frames.remove(&handle.0);
        log.cancelled_frames.push(handle.0);
    }
}

impl Surface for FakeHost {
    fn configure(&mut self, config: SurfaceConfig) {
        self.log.borrow_mut().surfaces.push(config);
    }

    fn release(&mut self) {
        self.log.borrow_mut().releases += 1;
    }
}

/// Keyboard channel sharing the host's log.
#[derive(Debug, Clone)]
pub struct FakeKeys(pub Rc<RefCell<HostLog>>);

impl KeyChannel for FakeKeys {
    fn subscribe_keys(&mut self) -> ListenerId {
        let mut log = self.0.borrow_mut();
        let id = log.next();
        log.key_listeners.insert(id);
        ListenerId(id)
    }

    fn unsubscribe_keys(&mut self, id: ListenerId) {
        self.0.borrow_mut().key_listeners.remove(&id.0);
    }
}

/// Fire the pending frame the way a host scheduler would.
pub fn fire<H>(
    overlay: &mut help_layer_core::Overlay<H>,
    log: &Rc<RefCell<HostLog>>,
) -> Option<Result<Vec<help_layer_protocol::RenderCommand>, help_layer_core::OverlayError>>
where
    H: help_layer_core::host::OverlayHost,
{
    let handle = log.borrow().only_pending()?;
    log.borrow_mut().pending_frames.remove(&handle.0);
    Some(overlay.on_frame(handle))
}
