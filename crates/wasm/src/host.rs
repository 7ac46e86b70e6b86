//! DOM and canvas implementation of the overlay host traits.

use help_layer_core::host::{
    ComputedStyle, ElementQuery, FrameHandle, FrameScheduler, KeyChannel, ListenerId,
    ResizeEvents, ScrollBehavior, ScrollBlock, ScrollIntoView, ScrollOptions, StyleSource,
    Surface, SurfaceConfig, TextMeasure, ViewportSource,
};
use help_layer_protocol::{Color, FontSpec, Rect, RenderCommand, Viewport};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, FontFaceSetLoadStatus, HtmlCanvasElement,
    KeyboardEvent, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

pub struct WebHost {
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    frame_callback: Closure<dyn FnMut(f64)>,
    resize_callback: Closure<dyn FnMut()>,
    next_listener: u64,
    resize_listener: Option<ListenerId>,
}

impl WebHost {
    pub fn new(
        window: Window,
        document: Document,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        frame_callback: Closure<dyn FnMut(f64)>,
        resize_callback: Closure<dyn FnMut()>,
    ) -> Self {
        Self {
            window,
            document,
            canvas,
            ctx,
            frame_callback,
            resize_callback,
            next_listener: 0,
            resize_listener: None,
        }
    }

    pub fn paint(&self, commands: &[RenderCommand]) {
        for cmd in commands {
            if let Err(err) = self.paint_one(cmd) {
                tracing::warn!(?err, "canvas call failed");
            }
        }
        if let Err(err) = self.ctx.set_global_composite_operation("source-over") {
            tracing::warn!(?err, "canvas call failed");
        }
    }

    fn paint_one(&self, cmd: &RenderCommand) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        match cmd {
            RenderCommand::Clear { rect } => ctx.clear_rect(rect.x, rect.y, rect.w, rect.h),
            RenderCommand::FillRect { rect, color, op } => {
                ctx.set_global_composite_operation(op.as_canvas_str())?;
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                font,
                align,
                baseline,
            } => {
                ctx.set_global_composite_operation("source-over")?;
                ctx.set_font(&font.to_css());
                ctx.set_fill_style_str(&color.to_css());
                ctx.set_text_align(align.as_canvas_str());
                ctx.set_text_baseline(baseline.as_canvas_str());
                ctx.fill_text(text, position.x, position.y)?;
            }
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
        Ok(())
    }

    fn set_style(&self, name: &str, value: &str) {
        if let Err(err) = self.canvas.style().set_property(name, value) {
            tracing::warn!(?err, name, "could not style overlay canvas");
        }
    }

    /// Pin the canvas over the page, hidden until the first mount.
    pub fn prepare_canvas(&self) {
        self.set_style("position", "fixed");
        self.set_style("top", "0");
        self.set_style("left", "0");
        self.set_style("z-index", "9999");
        self.set_style("cursor", "pointer");
        self.set_style("display", "none");
    }
}

impl ElementQuery for WebHost {
    type Element = Element;

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let nodes = match self.document.query_selector_all(selector) {
            Ok(nodes) => nodes,
            Err(err) => {
                tracing::warn!(selector, ?err, "invalid selector");
                return Vec::new();
            }
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn bounding_rect(&self, element: &Element) -> Rect {
        let r = element.get_bounding_client_rect();
        Rect::new(r.left(), r.top(), r.width(), r.height())
    }
}

impl ScrollIntoView for WebHost {
    fn scroll_into_view(&mut self, element: &Element, options: ScrollOptions) {
        let opts = ScrollIntoViewOptions::new();
        opts.set_behavior(match options.behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        opts.set_block(match options.block {
            ScrollBlock::Start => ScrollLogicalPosition::Start,
            ScrollBlock::Center => ScrollLogicalPosition::Center,
            ScrollBlock::End => ScrollLogicalPosition::End,
            ScrollBlock::Nearest => ScrollLogicalPosition::Nearest,
        });
        element.scroll_into_view_with_scroll_into_view_options(&opts);
    }
}

impl TextMeasure for WebHost {
    fn measure_text(&self, text: &str, font: &FontSpec) -> f64 {
        self.ctx.set_font(&font.to_css());
        match self.ctx.measure_text(text) {
            Ok(metrics) => metrics.width(),
            Err(err) => {
                tracing::warn!(?err, "measureText failed");
                0.0
            }
        }
    }
}

impl StyleSource for WebHost {
    fn computed_style(&self) -> ComputedStyle {
        let Ok(Some(decl)) = self.window.get_computed_style(&self.canvas) else {
            return ComputedStyle::default();
        };
        let prop = |name: &str| decl.get_property_value(name).unwrap_or_default();
        style_from_css(
            &prop("font-weight"),
            &prop("font-size"),
            &prop("font-family"),
            &prop("color"),
        )
    }

    fn fonts_ready(&self) -> bool {
        self.document.fonts().status() == FontFaceSetLoadStatus::Loaded
    }
}

/// Build a [`ComputedStyle`] from `getComputedStyle` values, falling back
/// to the defaults for anything missing or unparseable.
pub fn style_from_css(weight: &str, size: &str, family: &str, color: &str) -> ComputedStyle {
    let fallback = ComputedStyle::default();
    let size = size
        .trim()
        .strip_suffix("px")
        .and_then(|px| px.trim().parse::<f64>().ok())
        .filter(|px| px.is_finite() && *px > 0.0)
        .unwrap_or(fallback.font.size);
    let weight = if weight.trim().is_empty() {
        fallback.font.weight
    } else {
        weight.trim().to_owned()
    };
    let family = if family.trim().is_empty() {
        fallback.font.family
    } else {
        family.trim().to_owned()
    };
    let color = Color::parse(color).unwrap_or_else(|| {
        if !color.trim().is_empty() {
            tracing::warn!(color, "unsupported computed color, using the default");
        }
        fallback.color
    });
    ComputedStyle {
        font: FontSpec::new(weight, size, family),
        color,
    }
}

impl ViewportSource for WebHost {
    fn viewport(&self) -> Viewport {
        let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Viewport::new(
            dim(self.window.inner_width()),
            dim(self.window.inner_height()),
            self.window.device_pixel_ratio(),
        )
    }
}

impl ResizeEvents for WebHost {
    fn subscribe_resize(&mut self) -> ListenerId {
        let callback = self.resize_callback.as_ref().unchecked_ref();
        if let Err(err) = self.window.add_event_listener_with_callback("resize", callback) {
            tracing::warn!(?err, "could not listen for resize");
        }
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.resize_listener = Some(id);
        id
    }

    fn unsubscribe_resize(&mut self, id: ListenerId) {
        if self.resize_listener != Some(id) {
            return;
        }
        self.resize_listener = None;
        let callback = self.resize_callback.as_ref().unchecked_ref();
        if let Err(err) = self.window.remove_event_listener_with_callback("resize", callback) {
            tracing::warn!(?err, "could not remove resize listener");
        }
    }
}

impl FrameScheduler for WebHost {
    fn request_frame(&mut self) -> FrameHandle {
        match self
            .window
            .request_animation_frame(self.frame_callback.as_ref().unchecked_ref())
        {
            Ok(id) => FrameHandle(u64::from(id as u32)),
            Err(err) => {
                tracing::error!(?err, "requestAnimationFrame failed");
                FrameHandle(0)
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle.0 as i32) {
            tracing::warn!(?err, "cancelAnimationFrame failed");
        }
    }
}

impl Surface for WebHost {
    fn configure(&mut self, config: SurfaceConfig) {
        self.canvas.set_width(config.physical_width);
        self.canvas.set_height(config.physical_height);
        self.set_style("width", &format!("{}px", config.logical_width));
        self.set_style("height", &format!("{}px", config.logical_height));
        self.set_style("display", "block");
        // Resizing the canvas resets its state; set, never multiply.
        if let Err(err) = self
            .ctx
            .set_transform(config.scale, 0.0, 0.0, config.scale, 0.0, 0.0)
        {
            tracing::warn!(?err, "could not scale overlay canvas");
        }
    }

    fn release(&mut self) {
        self.set_style("display", "none");
        let (w, h) = (self.canvas.width(), self.canvas.height());
        if let Err(err) = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0) {
            tracing::warn!(?err, "could not reset overlay canvas");
        }
        self.ctx.clear_rect(0.0, 0.0, f64::from(w), f64::from(h));
    }
}

/// `keydown` listener on the window for keyboard shortcuts.
pub struct WebKeys {
    window: Window,
    callback: Closure<dyn FnMut(KeyboardEvent)>,
    next: u64,
    listener: Option<ListenerId>,
}

impl WebKeys {
    pub fn new(window: Window, callback: Closure<dyn FnMut(KeyboardEvent)>) -> Self {
        Self {
            window,
            callback,
            next: 0,
            listener: None,
        }
    }
}

impl KeyChannel for WebKeys {
    fn subscribe_keys(&mut self) -> ListenerId {
        let callback = self.callback.as_ref().unchecked_ref();
        if let Err(err) = self.window.add_event_listener_with_callback("keydown", callback) {
            tracing::warn!(?err, "could not listen for keydown");
        }
        self.next += 1;
        let id = ListenerId(self.next);
        self.listener = Some(id);
        id
    }

    fn unsubscribe_keys(&mut self, id: ListenerId) {
        if self.listener != Some(id) {
            return;
        }
        self.listener = None;
        let callback = self.callback.as_ref().unchecked_ref();
        if let Err(err) = self.window.remove_event_listener_with_callback("keydown", callback) {
            tracing::warn!(?err, "could not remove keydown listener");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computed_style_values_are_parsed() {
        let style = style_from_css("700", "18px", "\"Inter\", sans-serif", "rgb(34, 34, 34)");
        assert_eq!(style.font, FontSpec::new("700", 18.0, "\"Inter\", sans-serif"));
        assert_eq!(style.color, Color::rgb(34, 34, 34));
    }

    #[test]
    fn computed_style_falls_back_per_field() {
        let style = style_from_css("", "large", "", "currentcolor");
        assert_eq!(style, ComputedStyle::default());

        let style = style_from_css("", "12.5px", "", "white");
        assert_eq!(style.font.size, 12.5);
        assert_eq!(style.color, Color::WHITE);
    }

    #[test]
    fn computed_style_reads_modern_color_syntax() {
        let style = style_from_css("400", "16px", "serif", "hsl(210, 50%, 40%)");
        assert_eq!(style.color, Color::rgb(51, 102, 153));
    }
}
