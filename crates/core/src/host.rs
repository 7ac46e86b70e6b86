//! Capabilities the overlay consumes from its host environment.
//!
//! The core never owns an event loop. Hosts implement these traits, then
//! feed frame callbacks, resize notifications, key presses and pointer
//! presses back into [`crate::Overlay`] and [`crate::KeyboardShortcuts`].

use help_layer_protocol::{Color, FontSpec, Rect, Viewport};

/// Handle returned by [`FrameScheduler::request_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Handle for an installed event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Resolves selectors against the live element tree.
pub trait ElementQuery {
    type Element;

    /// All matches, in document order. An empty result is meaningful and
    /// must not be treated as an error by the implementation.
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    /// Viewport-relative bounding box of `element`.
    fn bounding_rect(&self, element: &Self::Element) -> Rect;

    fn query_first(&self, selector: &str) -> Option<Self::Element> {
        self.query_all(selector).into_iter().next()
    }
}

pub trait TextMeasure {
    /// Advance width of `text` in logical pixels.
    fn measure_text(&self, text: &str, font: &FontSpec) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Start,
    Center,
    End,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollOptions {
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

impl ScrollOptions {
    pub const SMOOTH_CENTER: ScrollOptions = ScrollOptions {
        behavior: ScrollBehavior::Smooth,
        block: ScrollBlock::Center,
    };
}

/// Fire-and-forget scrolling.
pub trait ScrollIntoView: ElementQuery {
    fn scroll_into_view(&mut self, element: &Self::Element, options: ScrollOptions);
}

/// Inherited text style of the overlay surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub font: FontSpec,
    pub color: Color,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            font: FontSpec::new("400", 16.0, "sans-serif"),
            color: Color::BLACK,
        }
    }
}

pub trait StyleSource {
    fn computed_style(&self) -> ComputedStyle;

    /// Whether web fonts (or their equivalent) have finished loading. Polled
    /// once per frame until it reports `true`.
    fn fonts_ready(&self) -> bool {
        true
    }
}

pub trait ViewportSource {
    fn viewport(&self) -> Viewport;
}

/// Resize notifications. While subscribed, the host calls
/// [`crate::Overlay::on_resize`] for every viewport change.
pub trait ResizeEvents {
    fn subscribe_resize(&mut self) -> ListenerId;
    fn unsubscribe_resize(&mut self, id: ListenerId);
}

/// One-shot animation frame callbacks. When a requested frame fires the
/// host calls [`crate::Overlay::on_frame`] with the handle.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Backing store geometry for the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceConfig {
    pub logical_width: f64,
    pub logical_height: f64,
    pub physical_width: u32,
    pub physical_height: u32,
    /// Transform the host must *set* (not multiply) so that commands in
    /// logical pixels land on the physical buffer.
    pub scale: f64,
}

impl SurfaceConfig {
    pub fn for_viewport(viewport: &Viewport) -> Self {
        let scale = viewport.device_scale();
        Self {
            logical_width: viewport.width,
            logical_height: viewport.height,
            physical_width: (viewport.width * scale).max(0.0).round() as u32,
            physical_height: (viewport.height * scale).max(0.0).round() as u32,
            scale,
        }
    }
}

pub trait Surface {
    /// (Re)allocate the backing store and present it. Hosts must reset the
    /// drawing transform to `config.scale`.
    fn configure(&mut self, config: SurfaceConfig);

    /// The overlay was torn down; stop presenting the surface.
    fn release(&mut self) {}
}

/// Key press notifications for [`crate::KeyboardShortcuts`].
pub trait KeyChannel {
    fn subscribe_keys(&mut self) -> ListenerId;
    fn unsubscribe_keys(&mut self, id: ListenerId);
}

/// Everything the overlay renderer needs from its host.
pub trait OverlayHost:
    ElementQuery
    + ScrollIntoView
    + TextMeasure
    + StyleSource
    + ViewportSource
    + ResizeEvents
    + FrameScheduler
    + Surface
{
}

impl<T> OverlayHost for T where
    T: ElementQuery
        + ScrollIntoView
        + TextMeasure
        + StyleSource
        + ViewportSource
        + ResizeEvents
        + FrameScheduler
        + Surface
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_config_doubles_on_high_dpi() {
        let cfg = SurfaceConfig::for_viewport(&Viewport::new(1280.0, 720.0, 1.5));
        assert_eq!((cfg.physical_width, cfg.physical_height), (2560, 1440));
        assert_eq!(cfg.scale, 2.0);
        assert_eq!((cfg.logical_width, cfg.logical_height), (1280.0, 720.0));
    }

    #[test]
    fn surface_config_is_one_to_one_on_standard_dpi() {
        let cfg = SurfaceConfig::for_viewport(&Viewport::new(1024.0, 768.0, 1.0));
        assert_eq!((cfg.physical_width, cfg.physical_height), (1024, 768));
        assert_eq!(cfg.scale, 1.0);
    }
}
