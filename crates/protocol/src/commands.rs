use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::style::{CompositeOp, FontSpec, TextAlign, TextBaseline};
use crate::types::{Color, Point, Rect};

/// A single, stateless render instruction in logical pixels.
///
/// The core emits a `Vec<RenderCommand>` per animation frame. Renderers
/// consume the list strictly in order: a `DestinationOut` fill erases
/// everything painted before it, so commands cannot be reordered or batched
/// across compositing modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Reset a region to fully transparent.
    Clear { rect: Rect },

    /// Fill a rectangle using the given compositing mode.
    FillRect {
        rect: Rect,
        color: Color,
        op: CompositeOp,
    },

    /// Draw a single line of text anchored at `position`. Always composited
    /// with `SourceOver`.
    DrawText {
        position: Point,
        text: SharedStr,
        color: Color,
        font: FontSpec,
        align: TextAlign,
        baseline: TextBaseline,
    },

    /// Begin a logical group (one tour step). Purely semantic; renderers may
    /// use it for debugging or accessibility.
    BeginGroup {
        id: SharedStr,
        label: Option<SharedStr>,
    },

    /// End the current group.
    EndGroup,
}

impl RenderCommand {
    /// Rectangles erased from the mask, in emission order.
    pub fn holes(commands: &[RenderCommand]) -> impl Iterator<Item = Rect> + '_ {
        commands.iter().filter_map(|cmd| match cmd {
            RenderCommand::FillRect {
                rect,
                op: CompositeOp::DestinationOut,
                ..
            } => Some(*rect),
            _ => None,
        })
    }
}
