use serde::{Deserialize, Serialize};

/// How a fill combines with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompositeOp {
    /// Paint over existing content (canvas `source-over`).
    #[default]
    SourceOver,
    /// Erase existing content wherever the fill is opaque (canvas
    /// `destination-out`). The fill color itself is never visible.
    DestinationOut,
}

impl CompositeOp {
    pub fn as_canvas_str(self) -> &'static str {
        match self {
            CompositeOp::SourceOver => "source-over",
            CompositeOp::DestinationOut => "destination-out",
        }
    }
}

/// Font settings used both to measure and to draw label text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub weight: String,
    /// Font size in logical pixels. Doubles as the label's text height.
    pub size: f64,
    pub family: String,
}

impl FontSpec {
    pub fn new(weight: impl Into<String>, size: f64, family: impl Into<String>) -> Self {
        Self {
            weight: weight.into(),
            size,
            family: family.into(),
        }
    }

    /// CSS `font` shorthand, e.g. `400 16px Inter`.
    pub fn to_css(&self) -> String {
        format!("{} {}px {}", self.weight, self.size, self.family)
    }
}

impl Default for FontSpec {
    /// The initial font of a fresh 2D drawing surface.
    fn default() -> Self {
        Self::new("normal", 10.0, "sans-serif")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextBaseline {
    Top,
    Middle,
    Alphabetic,
}

impl TextAlign {
    pub fn as_canvas_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

impl TextBaseline {
    pub fn as_canvas_str(self) -> &'static str {
        match self {
            TextBaseline::Top => "top",
            TextBaseline::Middle => "middle",
            TextBaseline::Alphabetic => "alphabetic",
        }
    }
}
