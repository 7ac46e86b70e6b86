use help_layer_protocol::Color;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::overlay::{DEFAULT_DIM_COLOR, DEFAULT_PADDING, OverlayOptions};
use crate::step::{Step, StepList};

/// A tour file: the steps plus overlay options.
#[derive(Debug, Clone, PartialEq)]
pub struct TourConfig {
    pub steps: StepList,
    pub padding: f64,
    pub dim_color: Color,
    pub keyboard_shortcuts: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawTour {
    steps: Vec<Step>,
    #[serde(default = "default_padding")]
    padding: f64,
    #[serde(default = "default_dim_color")]
    dim_color: Color,
    #[serde(default)]
    keyboard_shortcuts: bool,
}

fn default_padding() -> f64 {
    DEFAULT_PADDING
}

fn default_dim_color() -> Color {
    DEFAULT_DIM_COLOR
}

impl TourConfig {
    /// Parse a tour file. Accepts either a bare JSON array of steps or an
    /// object with `steps` and optional `padding`, `dimColor` and
    /// `keyboardShortcuts`.
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let is_array = data.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'[');
        let config = if is_array {
            Self {
                steps: StepList::new(serde_json::from_slice::<Vec<Step>>(data)?),
                padding: DEFAULT_PADDING,
                dim_color: DEFAULT_DIM_COLOR,
                keyboard_shortcuts: false,
            }
        } else {
            let tour: RawTour = serde_json::from_slice(data)?;
            Self {
                steps: StepList::new(tour.steps),
                padding: tour.padding,
                dim_color: tour.dim_color,
                keyboard_shortcuts: tour.keyboard_shortcuts,
            }
        };
        config.validate()?;
        tracing::debug!(
            steps = config.steps.len(),
            max_scene = ?config.steps.max_scene(),
            "tour config loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(ConfigError::InvalidPadding(self.padding));
        }
        if let Some(index) = self
            .steps
            .as_slice()
            .iter()
            .position(|s| s.selector.trim().is_empty())
        {
            return Err(ConfigError::EmptySelector { index });
        }
        Ok(())
    }

    pub fn overlay_options(&self) -> OverlayOptions {
        OverlayOptions {
            padding: self.padding,
            dim_color: self.dim_color,
        }
    }
}
