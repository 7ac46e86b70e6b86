//! Browser bindings: a `HelpLayer` class driving the overlay on a canvas.
//!
//! ```js
//! const layer = new HelpLayer(canvas, JSON.stringify(steps));
//! layer.onClick(() => layer.next());
//! layer.onShiftClick(() => layer.prev());
//! layer.show();
//! ```

mod console;
mod host;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use help_layer_core::{
    KeyEvent, KeyboardShortcuts, Modifiers, Overlay, OverlayError, PointerAction, PointerEvent,
    Tour, TourConfig, TourState,
};
use help_layer_protocol::Point;
use js_sys::Function;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, KeyboardEvent};

use crate::host::{WebHost, WebKeys};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console::init();
}

#[derive(Default)]
struct Callbacks {
    click: Option<Function>,
    shift_click: Option<Function>,
    error: Option<Function>,
}

struct Inner {
    tour: Tour,
    overlay: Overlay<WebHost>,
    shortcuts: KeyboardShortcuts<WebKeys>,
    callbacks: Callbacks,
}

impl Inner {
    fn update(&mut self, change: impl FnOnce(&mut Tour) -> TourState) {
        let state = change(&mut self.tour);
        self.overlay.sync(state);
    }

    /// Compose and paint one animation frame. On failure returns the error
    /// with the callback to report it to.
    fn frame(&mut self) -> Option<(OverlayError, Option<Function>)> {
        let handle = self.overlay.pending_frame()?;
        match self.overlay.on_frame(handle) {
            Ok(commands) => {
                self.overlay.host().paint(&commands);
                None
            }
            Err(err) => Some((err, self.callbacks.error.clone())),
        }
    }
}

fn report(err: &OverlayError, callback: Option<&Function>) {
    let message = JsValue::from_str(&err.to_string());
    web_sys::console::error_1(&JsValue::from_str(&format!("help-layer: {err}")));
    if let Some(callback) = callback {
        if let Err(err) = callback.call1(&JsValue::NULL, &message) {
            web_sys::console::error_1(&err);
        }
    }
}

fn animation_frame(weak: &Weak<RefCell<Inner>>) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let failure = match inner.try_borrow_mut() {
        Ok(mut inner) => inner.frame(),
        Err(_) => {
            tracing::warn!("animation frame fired during another callback");
            None
        }
    };
    if let Some((err, callback)) = failure {
        report(&err, callback.as_ref());
    }
}

fn resized(weak: &Weak<RefCell<Inner>>) {
    if let Some(inner) = weak.upgrade()
        && let Ok(mut inner) = inner.try_borrow_mut()
    {
        inner.overlay.on_resize();
    }
}

fn key_down(weak: &Weak<RefCell<Inner>>, event: &KeyboardEvent) {
    let key = KeyEvent::new(
        event.key(),
        Modifiers {
            shift: event.shift_key(),
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            meta: event.meta_key(),
        },
    );
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let Ok(mut inner) = inner.try_borrow_mut() else {
        return;
    };
    let inner = &mut *inner;
    if inner.shortcuts.handle_key(&mut inner.tour, &key).is_some() {
        inner.overlay.sync(inner.tour.state());
    }
}

fn pointer_down(weak: &Weak<RefCell<Inner>>, event: &web_sys::PointerEvent) {
    let pointer = PointerEvent {
        position: Point::new(f64::from(event.client_x()), f64::from(event.client_y())),
        modifiers: Modifiers {
            shift: event.shift_key(),
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            meta: event.meta_key(),
        },
    };
    let Some(inner) = weak.upgrade() else {
        return;
    };
    // Release the borrow before calling out: the callback usually calls
    // back into `next()` or `prev()`.
    let callback = {
        let Ok(mut inner) = inner.try_borrow_mut() else {
            return;
        };
        match inner.overlay.on_pointer_down(&pointer) {
            Some(PointerAction::Click) => inner.callbacks.click.clone(),
            Some(PointerAction::ShiftClick) => inner.callbacks.shift_click.clone(),
            None => None,
        }
    };
    if let Some(callback) = callback
        && let Err(err) = callback.call1(&JsValue::NULL, event)
    {
        web_sys::console::error_1(&err);
    }
}

/// A guided tour over the current page.
#[wasm_bindgen]
pub struct HelpLayer {
    inner: Rc<RefCell<Inner>>,
    canvas: HtmlCanvasElement,
    pointer_callback: Closure<dyn FnMut(web_sys::PointerEvent)>,
    destroyed: bool,
}

#[wasm_bindgen]
impl HelpLayer {
    /// Attach to `canvas` with a tour given as JSON: either an array of
    /// steps or an object with `steps`, `padding`, `dimColor` and
    /// `keyboardShortcuts`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, steps_json: &str) -> Result<HelpLayer, JsError> {
        let config = TourConfig::from_json(steps_json.as_bytes())?;
        let window = web_sys::window().ok_or_else(|| JsError::new("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsError::new("no document"))?;
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<web_sys::CanvasRenderingContext2d>().ok())
            .ok_or_else(|| JsError::new("canvas has no 2d context"))?;

        let inner = Rc::new_cyclic(|weak: &Weak<RefCell<Inner>>| {
            let w = weak.clone();
            let frame = Closure::<dyn FnMut(f64)>::new(move |_time: f64| animation_frame(&w));
            let w = weak.clone();
            let resize = Closure::<dyn FnMut()>::new(move || resized(&w));
            let w = weak.clone();
            let keys = Closure::<dyn FnMut(KeyboardEvent)>::new(move |e: KeyboardEvent| {
                key_down(&w, &e);
            });

            let host = WebHost::new(window.clone(), document, canvas.clone(), ctx, frame, resize);
            host.prepare_canvas();
            let mut shortcuts = KeyboardShortcuts::new(WebKeys::new(window, keys));
            shortcuts.set_enabled(config.keyboard_shortcuts);
            RefCell::new(Inner {
                tour: Tour::new(),
                overlay: Overlay::new(host, config.steps.clone(), config.overlay_options()),
                shortcuts,
                callbacks: Callbacks::default(),
            })
        });

        let weak = Rc::downgrade(&inner);
        let pointer_callback =
            Closure::<dyn FnMut(web_sys::PointerEvent)>::new(move |e: web_sys::PointerEvent| {
                pointer_down(&weak, &e);
            });
        canvas
            .add_event_listener_with_callback("pointerdown", pointer_callback.as_ref().unchecked_ref())
            .map_err(|_| JsError::new("could not listen for pointerdown"))?;

        tracing::debug!(steps = config.steps.len(), "help layer created");
        Ok(HelpLayer {
            inner,
            canvas,
            pointer_callback,
            destroyed: false,
        })
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> Option<R> {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => Some(f(&mut inner)),
            Err(_) => {
                tracing::warn!("help layer called re-entrantly");
                None
            }
        }
    }

    /// Show the tour from the first step.
    pub fn show(&self) {
        self.with_inner(|inner| inner.update(Tour::show));
    }

    /// Hide the tour, keeping the current step.
    pub fn hide(&self) {
        self.with_inner(|inner| inner.update(Tour::hide));
    }

    pub fn next(&self) {
        self.with_inner(|inner| inner.update(Tour::next));
    }

    pub fn prev(&self) {
        self.with_inner(|inner| inner.update(Tour::prev));
    }

    #[wasm_bindgen(getter, js_name = currentStep)]
    pub fn current_step(&self) -> u32 {
        self.inner
            .try_borrow()
            .map(|inner| inner.tour.current_step())
            .unwrap_or(0)
    }

    #[wasm_bindgen(getter)]
    pub fn visible(&self) -> bool {
        self.inner
            .try_borrow()
            .map(|inner| inner.tour.visible())
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = setKeyboardShortcuts)]
    pub fn set_keyboard_shortcuts(&self, enabled: bool) {
        self.with_inner(|inner| inner.shortcuts.set_enabled(enabled));
    }

    /// Replace the tour. A showing overlay restarts on the new steps at the
    /// current step.
    #[wasm_bindgen(js_name = setSteps)]
    pub fn set_steps(&self, steps_json: &str) -> Result<(), JsError> {
        let config = TourConfig::from_json(steps_json.as_bytes())?;
        self.with_inner(|inner| {
            inner.overlay.set_options(config.overlay_options());
            inner.overlay.set_steps(config.steps.clone());
            inner.shortcuts.set_enabled(config.keyboard_shortcuts);
        });
        Ok(())
    }

    /// Called with the pointer event when the mask is clicked.
    #[wasm_bindgen(js_name = onClick)]
    pub fn on_click(&self, callback: Option<Function>) {
        self.with_inner(|inner| inner.callbacks.click = callback);
    }

    /// Called with the pointer event when the mask is shift-clicked.
    #[wasm_bindgen(js_name = onShiftClick)]
    pub fn on_shift_click(&self, callback: Option<Function>) {
        self.with_inner(|inner| inner.callbacks.shift_click = callback);
    }

    /// Called with the message when a step's selector matches nothing. The
    /// overlay is already torn down at that point.
    #[wasm_bindgen(js_name = onError)]
    pub fn on_error(&self, callback: Option<Function>) {
        self.with_inner(|inner| inner.callbacks.error = callback);
    }

    /// Stop rendering and remove every listener. Also runs on `free()`.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.with_inner(|inner| {
            inner.overlay.unmount();
            inner.shortcuts.disable();
        });
        if let Err(err) = self.canvas.remove_event_listener_with_callback(
            "pointerdown",
            self.pointer_callback.as_ref().unchecked_ref(),
        ) {
            web_sys::console::error_1(&err);
        }
        tracing::debug!("help layer destroyed");
    }
}

impl Drop for HelpLayer {
    fn drop(&mut self) {
        self.destroy();
    }
}
