use help_layer_protocol::{Color, SharedStr};
use serde::{Deserialize, Deserializer, Serialize};

/// Distance in pixels between a target's edge and its label when a step
/// does not set `gap`.
pub const DEFAULT_GAP: f64 = 20.0;

/// Side of the target rectangle a label is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelDir {
    Top,
    Left,
    Right,
    #[default]
    Bottom,
}

/// One authored tour entry.
///
/// Several steps may share a `scene`; they are highlighted together while
/// the tour's current step equals that scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub selector: SharedStr,
    pub scene: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<SharedStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
    #[serde(
        default,
        deserialize_with = "color_override",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_dir: Option<LabelDir>,
}

/// `currentcolor` and `inherit` mean "use the surface text color", which is
/// what an absent override already does.
fn color_override<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Color>, D::Error> {
    let Some(css) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let keyword = css.trim().to_ascii_lowercase();
    if keyword == "currentcolor" || keyword == "inherit" {
        return Ok(None);
    }
    Color::parse(&css)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("unsupported color: {css:?}")))
}

impl Step {
    pub fn new(selector: impl Into<SharedStr>, scene: u32) -> Self {
        Self {
            selector: selector.into(),
            scene,
            label: None,
            gap: None,
            color: None,
            label_dir: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<SharedStr>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = Some(gap);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_label_dir(mut self, dir: LabelDir) -> Self {
        self.label_dir = Some(dir);
        self
    }

    pub fn gap(&self) -> f64 {
        self.gap.unwrap_or(DEFAULT_GAP)
    }

    pub fn label_dir(&self) -> LabelDir {
        self.label_dir.unwrap_or_default()
    }
}

/// The immutable step list of one tour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepList {
    steps: Vec<Step>,
}

impl StepList {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn as_slice(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Highest scene number, or `None` for an empty tour.
    pub fn max_scene(&self) -> Option<u32> {
        self.steps.iter().map(|s| s.scene).max()
    }

    /// Whether `current_step` lies past the last scene. An empty tour is
    /// always over.
    pub fn is_over(&self, current_step: u32) -> bool {
        self.max_scene().is_none_or(|max| current_step > max)
    }

    /// Steps active in `scene`, in declaration order.
    pub fn in_scene(&self, scene: u32) -> impl Iterator<Item = &Step> + '_ {
        self.steps.iter().filter(move |s| s.scene == scene)
    }

    pub fn first_in_scene(&self, scene: u32) -> Option<&Step> {
        self.in_scene(scene).next()
    }
}

impl From<Vec<Step>> for StepList {
    fn from(steps: Vec<Step>) -> Self {
        Self::new(steps)
    }
}
