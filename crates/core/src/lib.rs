//! Guided-tour overlay core.
//!
//! [`Tour`] tracks which step of a walkthrough is showing, [`Overlay`]
//! turns the current step into a dimming mask with spotlight holes and
//! labels, expressed as [`help_layer_protocol::RenderCommand`] lists that a
//! host paints. Hosts plug in through the traits in [`host`].

pub mod config;
pub mod error;
pub mod host;
pub mod keyboard;
pub mod layout;
pub mod mask;
pub mod overlay;
pub mod step;
pub mod svg;
pub mod tour;

pub use config::TourConfig;
pub use error::{ConfigError, OverlayError};
pub use keyboard::{KeyEvent, KeyboardShortcuts, Modifiers};
pub use overlay::{Overlay, OverlayOptions, PointerAction, PointerEvent};
pub use step::{LabelDir, Step, StepList};
pub use tour::{Phase, Tour, TourState, Transition};
