//! Label placement and color rules.

use help_layer_protocol::{Color, Point, Rect};

use crate::step::LabelDir;

/// Center point of a label placed beside `target`.
///
/// The label's own half-extent along the placement axis is included so the
/// text never overlaps the (padded) hole, regardless of its length.
pub fn label_anchor(
    target: &Rect,
    dir: LabelDir,
    gap: f64,
    text_width: f64,
    text_height: f64,
    padding: f64,
) -> Point {
    let c = target.center();
    match dir {
        LabelDir::Top => Point::new(c.x, c.y - target.h / 2.0 - gap - text_height / 2.0 - padding),
        LabelDir::Bottom => Point::new(c.x, c.y + target.h / 2.0 + gap + text_height / 2.0 + padding),
        LabelDir::Left => Point::new(c.x - target.w / 2.0 - gap - text_width / 2.0 - padding, c.y),
        LabelDir::Right => Point::new(c.x + target.w / 2.0 + gap + text_width / 2.0 + padding, c.y),
    }
}

/// Label color: an explicit override wins, otherwise the inherited text
/// color, except that black text would vanish on the dark mask and becomes
/// white.
pub fn label_color(explicit: Option<Color>, inherited: Color) -> Color {
    match explicit {
        Some(color) => color,
        None if inherited.is_black() => Color::WHITE,
        None => inherited,
    }
}
