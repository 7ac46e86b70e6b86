//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.
//!
//! `DestinationOut` has no direct SVG equivalent. Each erase wraps
//! everything painted so far in a group masked by "everything except this
//! rectangle", which reproduces canvas semantics exactly: later paint is
//! unaffected, earlier paint is cut.

use help_layer_protocol::{Color, CompositeOp, Rect, RenderCommand, TextAlign, TextBaseline};

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions in logical pixels.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64) -> String {
    let mut defs = String::new();
    let mut body = String::with_capacity(commands.len() * 120);
    let mut masks = 0usize;
    let full = Rect::new(0.0, 0.0, width, height);

    for cmd in commands {
        match cmd {
            RenderCommand::Clear { rect } => {
                if covers(rect, &full) {
                    body.clear();
                } else {
                    body = erase(&mut defs, &mut masks, body, rect, &full);
                }
            }
            RenderCommand::FillRect {
                rect,
                color,
                op: CompositeOp::SourceOver,
            } => {
                body.push_str(&format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}"{}/>"#,
                    rect.x,
                    rect.y,
                    rect.w,
                    rect.h,
                    fill_attrs(color),
                ));
            }
            RenderCommand::FillRect {
                rect,
                op: CompositeOp::DestinationOut,
                ..
            } => {
                body = erase(&mut defs, &mut masks, body, rect, &full);
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                font,
                align,
                baseline,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let baseline = match baseline {
                    TextBaseline::Top => "hanging",
                    TextBaseline::Middle => "middle",
                    TextBaseline::Alphabetic => "alphabetic",
                };
                body.push_str(&format!(
                    r#"<text x="{}" y="{}" text-anchor="{anchor}" dominant-baseline="{baseline}" font-family="{}" font-size="{}" font-weight="{}"{}>{}</text>"#,
                    position.x,
                    position.y,
                    escape_xml(&font.family),
                    font.size,
                    escape_xml(&font.weight),
                    fill_attrs(color),
                    escape_xml(text),
                ));
            }
            // Groups are semantic only; nesting them would fight the mask
            // wrappers.
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }

    let mut svg = String::with_capacity(body.len() + defs.len() + 200);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}">"#,
    ));
    if !defs.is_empty() {
        svg.push_str("<defs>");
        svg.push_str(&defs);
        svg.push_str("</defs>");
    }
    svg.push_str(&body);
    svg.push_str("</svg>");
    svg
}

fn erase(defs: &mut String, masks: &mut usize, body: String, hole: &Rect, full: &Rect) -> String {
    if body.is_empty() {
        return body;
    }
    let id = format!("hole-{masks}");
    *masks += 1;
    defs.push_str(&format!(
        r#"<mask id="{id}" maskUnits="userSpaceOnUse" x="{}" y="{}" width="{}" height="{}"><rect x="{}" y="{}" width="{}" height="{}" fill="white"/><rect x="{}" y="{}" width="{}" height="{}" fill="black"/></mask>"#,
        full.x, full.y, full.w, full.h, full.x, full.y, full.w, full.h, hole.x, hole.y, hole.w, hole.h,
    ));
    format!(r#"<g mask="url(#{id})">{body}</g>"#)
}

fn covers(rect: &Rect, full: &Rect) -> bool {
    rect.x <= full.x && rect.y <= full.y && rect.right() >= full.right() && rect.bottom() >= full.bottom()
}

fn fill_attrs(color: &Color) -> String {
    let rgb = format!("rgb({}, {}, {})", color.r, color.g, color.b);
    if color.a >= 1.0 {
        format!(r#" fill="{rgb}""#)
    } else {
        format!(r#" fill="{rgb}" fill-opacity="{}""#, color.a)
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use help_layer_protocol::{FontSpec, Point};

    fn dim(w: f64, h: f64) -> Vec<RenderCommand> {
        vec![
            RenderCommand::Clear {
                rect: Rect::new(0.0, 0.0, w, h),
            },
            RenderCommand::FillRect {
                rect: Rect::new(0.0, 0.0, w, h),
                color: Color::rgba(0, 0, 0, 0.8),
                op: CompositeOp::SourceOver,
            },
        ]
    }

    #[test]
    fn dim_layer_only() {
        let svg = render_svg(&dim(400.0, 300.0), 400.0, 300.0);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"fill-opacity="0.8""#));
        assert!(!svg.contains("<mask"));
    }

    #[test]
    fn holes_become_masks() {
        let mut cmds = dim(400.0, 300.0);
        cmds.push(RenderCommand::FillRect {
            rect: Rect::new(10.0, 20.0, 30.0, 40.0),
            color: Color::BLACK,
            op: CompositeOp::DestinationOut,
        });
        let svg = render_svg(&cmds, 400.0, 300.0);
        assert!(svg.contains(r#"<mask id="hole-0""#));
        assert!(svg.contains(r#"<rect x="10" y="20" width="30" height="40" fill="black"/>"#));
        assert!(svg.contains(r#"<g mask="url(#hole-0)">"#));
    }

    #[test]
    fn text_after_hole_is_not_masked_and_is_escaped() {
        let mut cmds = dim(400.0, 300.0);
        cmds.push(RenderCommand::BeginGroup {
            id: "scene-1:#a".into(),
            label: None,
        });
        cmds.push(RenderCommand::FillRect {
            rect: Rect::new(10.0, 20.0, 30.0, 40.0),
            color: Color::BLACK,
            op: CompositeOp::DestinationOut,
        });
        cmds.push(RenderCommand::DrawText {
            position: Point::new(25.0, 90.0),
            text: "Save & <exit>".into(),
            color: Color::WHITE,
            font: FontSpec::default(),
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
        });
        cmds.push(RenderCommand::EndGroup);
        let svg = render_svg(&cmds, 400.0, 300.0);
        assert!(svg.contains("Save &amp; &lt;exit&gt;"));
        // The text sits after the masked group closes.
        let group_close = svg.rfind("</g>").unwrap_or(usize::MAX);
        let text = svg.find("<text").unwrap_or(0);
        assert!(text > group_close);
        assert_eq!(svg.matches("<g").count(), svg.matches("</g>").count());
    }
}
