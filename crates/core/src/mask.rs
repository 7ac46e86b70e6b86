use help_layer_protocol::{
    CompositeOp, FontSpec, Rect, RenderCommand, TextAlign, TextBaseline, Viewport,
};

use crate::error::OverlayError;
use crate::host::{ComputedStyle, ElementQuery, TextMeasure};
use crate::layout::{label_anchor, label_color};
use crate::overlay::OverlayOptions;
use crate::step::StepList;

/// Everything one frame depends on besides the live element tree.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub steps: &'a StepList,
    pub current_step: u32,
    pub viewport: Viewport,
    pub options: &'a OverlayOptions,
    pub style: &'a ComputedStyle,
    /// Font currently set on the surface; used for measuring.
    pub surface_font: &'a FontSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposedFrame {
    pub commands: Vec<RenderCommand>,
    /// Whether any label was drawn (which leaves the surface font set to the
    /// computed style's font).
    pub drew_label: bool,
}

/// Build the render commands for one frame of the mask.
///
/// Target rectangles are resolved from `host` on every call. The command
/// order is fixed: clear, dim fill, then per active step its holes with the
/// label drawn right after the first hole.
pub fn compose_frame<H>(host: &H, input: FrameInput<'_>) -> Result<ComposedFrame, OverlayError>
where
    H: ElementQuery + TextMeasure + ?Sized,
{
    let bounds = input.viewport.bounds();
    let padding = input.options.padding;
    let mut commands = vec![
        RenderCommand::Clear { rect: bounds },
        RenderCommand::FillRect {
            rect: bounds,
            color: input.options.dim_color,
            op: CompositeOp::SourceOver,
        },
    ];
    let mut drew_label = false;

    for step in input.steps.in_scene(input.current_step) {
        let rects: Vec<Rect> = host
            .query_all(&step.selector)
            .iter()
            .map(|el| host.bounding_rect(el))
            .collect();
        if rects.is_empty() {
            return Err(OverlayError::UnresolvedSelector {
                selector: step.selector.clone(),
                scene: step.scene,
            });
        }

        commands.push(RenderCommand::BeginGroup {
            id: format!("scene-{}:{}", step.scene, step.selector).into(),
            label: step.label.clone(),
        });
        for (index, rect) in rects.iter().enumerate() {
            commands.push(RenderCommand::FillRect {
                rect: rect.inflate(padding),
                color: help_layer_protocol::Color::BLACK,
                op: CompositeOp::DestinationOut,
            });

            let Some(label) = step.label.as_ref().filter(|_| index == 0) else {
                continue;
            };
            let font = if drew_label {
                &input.style.font
            } else {
                input.surface_font
            };
            let text_width = host.measure_text(label, font);
            let text_height = input.style.font.size.trunc();
            let position = label_anchor(
                rect,
                step.label_dir(),
                step.gap(),
                text_width,
                text_height,
                padding,
            );
            commands.push(RenderCommand::DrawText {
                position,
                text: label.clone(),
                color: label_color(step.color, input.style.color),
                font: input.style.font.clone(),
                align: TextAlign::Center,
                baseline: TextBaseline::Middle,
            });
            drew_label = true;
        }
        commands.push(RenderCommand::EndGroup);
    }

    tracing::trace!(
        step = input.current_step,
        commands = commands.len(),
        "composed mask frame"
    );
    Ok(ComposedFrame {
        commands,
        drew_label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{LabelDir, Step};
    use help_layer_protocol::{Color, Point};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// Fixed layout; text is 7px per character.
    #[derive(Default)]
    struct Page {
        elements: HashMap<&'static str, Vec<Rect>>,
    }

    impl Page {
        fn with(mut self, selector: &'static str, rects: &[Rect]) -> Self {
            self.elements.insert(selector, rects.to_vec());
            self
        }
    }

    impl ElementQuery for Page {
        type Element = Rect;

        fn query_all(&self, selector: &str) -> Vec<Rect> {
            self.elements.get(selector).cloned().unwrap_or_default()
        }

        fn bounding_rect(&self, element: &Rect) -> Rect {
            *element
        }
    }

    impl TextMeasure for Page {
        fn measure_text(&self, text: &str, font: &FontSpec) -> f64 {
            text.chars().count() as f64 * font.size * 0.5
        }
    }

    fn compose(page: &Page, steps: &StepList, current: u32) -> Result<ComposedFrame, OverlayError> {
        let options = OverlayOptions::default();
        let style = ComputedStyle::default();
        let font = FontSpec::default();
        compose_frame(
            page,
            FrameInput {
                steps,
                current_step: current,
                viewport: Viewport::new(800.0, 600.0, 1.0),
                options: &options,
                style: &style,
                surface_font: &font,
            },
        )
    }

    #[test]
    fn single_labelled_step() {
        let target = Rect::new(100.0, 100.0, 50.0, 30.0);
        let page = Page::default().with("#a", &[target]);
        let steps = StepList::new(vec![
            Step::new("#a", 1)
                .with_label("Click here")
                .with_label_dir(LabelDir::Bottom),
        ]);

        let frame = match compose(&page, &steps, 1) {
            Ok(frame) => frame,
            Err(e) => unreachable!("{e}"),
        };
        let bounds = Rect::new(0.0, 0.0, 800.0, 600.0);
        assert_eq!(
            frame.commands,
            vec![
                RenderCommand::Clear { rect: bounds },
                RenderCommand::FillRect {
                    rect: bounds,
                    color: Color::rgba(0, 0, 0, 0.8),
                    op: CompositeOp::SourceOver,
                },
                RenderCommand::BeginGroup {
                    id: "scene-1:#a".into(),
                    label: Some("Click here".into()),
                },
                RenderCommand::FillRect {
                    rect: Rect::new(96.0, 96.0, 58.0, 38.0),
                    color: Color::BLACK,
                    op: CompositeOp::DestinationOut,
                },
                RenderCommand::DrawText {
                    position: Point::new(125.0, 115.0 + 15.0 + 20.0 + 8.0 + 4.0),
                    text: "Click here".into(),
                    color: Color::WHITE,
                    font: ComputedStyle::default().font,
                    align: TextAlign::Center,
                    baseline: TextBaseline::Middle,
                },
                RenderCommand::EndGroup,
            ]
        );
        assert!(frame.drew_label);
    }

    #[test]
    fn shared_scene_punches_all_but_labels_first_match_only() {
        let page = Page::default()
            .with("#a", &[Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(50.0, 0.0, 10.0, 10.0)])
            .with("#b", &[Rect::new(0.0, 50.0, 10.0, 10.0)])
            .with("#c", &[Rect::new(300.0, 300.0, 10.0, 10.0)]);
        let steps = StepList::new(vec![
            Step::new("#a", 2).with_label("first"),
            Step::new("#b", 2),
            Step::new("#c", 3).with_label("later"),
        ]);
        let frame = match compose(&page, &steps, 2) {
            Ok(frame) => frame,
            Err(e) => unreachable!("{e}"),
        };
        let holes: Vec<Rect> = RenderCommand::holes(&frame.commands).collect();
        assert_eq!(
            holes,
            vec![
                Rect::new(-4.0, -4.0, 18.0, 18.0),
                Rect::new(46.0, -4.0, 18.0, 18.0),
                Rect::new(-4.0, 46.0, 18.0, 18.0),
            ]
        );
        let texts: Vec<&str> = frame
            .commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, ["first"]);
    }

    #[test]
    fn label_follows_first_hole_before_later_holes() {
        let page = Page::default().with("#a", &[Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(0.0, 20.0, 10.0, 10.0)]);
        let steps = StepList::new(vec![Step::new("#a", 1).with_label("x")]);
        let frame = match compose(&page, &steps, 1) {
            Ok(frame) => frame,
            Err(e) => unreachable!("{e}"),
        };
        let kinds: Vec<&str> = frame
            .commands
            .iter()
            .map(|c| match c {
                RenderCommand::Clear { .. } => "clear",
                RenderCommand::FillRect { op: CompositeOp::SourceOver, .. } => "dim",
                RenderCommand::FillRect { .. } => "hole",
                RenderCommand::DrawText { .. } => "text",
                RenderCommand::BeginGroup { .. } => "begin",
                RenderCommand::EndGroup => "end",
            })
            .collect();
        assert_eq!(kinds, ["clear", "dim", "begin", "hole", "text", "hole", "end"]);
    }

    #[test]
    fn unresolved_selector_names_the_selector() {
        let page = Page::default().with("#a", &[Rect::new(0.0, 0.0, 10.0, 10.0)]);
        let steps = StepList::new(vec![Step::new("#a", 1), Step::new("#missing", 1)]);
        let err = compose(&page, &steps, 1);
        assert_eq!(
            err,
            Err(OverlayError::UnresolvedSelector {
                selector: "#missing".into(),
                scene: 1,
            })
        );
        if let Err(e) = err {
            assert_eq!(e.to_string(), "selector not found: #missing");
        }
    }

    #[test]
    fn other_scenes_are_not_queried() {
        let page = Page::default().with("#a", &[Rect::new(0.0, 0.0, 10.0, 10.0)]);
        // "#missing" belongs to scene 2 so scene 1 renders fine.
        let steps = StepList::new(vec![Step::new("#a", 1), Step::new("#missing", 2)]);
        assert!(compose(&page, &steps, 1).is_ok());
    }

    #[test]
    fn first_label_is_measured_with_surface_font_then_computed_font() {
        let page = Page::default()
            .with("#a", &[Rect::new(0.0, 0.0, 10.0, 10.0)])
            .with("#b", &[Rect::new(0.0, 100.0, 10.0, 10.0)]);
        let steps = StepList::new(vec![
            Step::new("#a", 1).with_label("abcd").with_label_dir(LabelDir::Right).with_gap(0.0),
            Step::new("#b", 1).with_label("abcd").with_label_dir(LabelDir::Right).with_gap(0.0),
        ]);
        let frame = match compose(&page, &steps, 1) {
            Ok(frame) => frame,
            Err(e) => unreachable!("{e}"),
        };
        let xs: Vec<f64> = frame
            .commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawText { position, .. } => Some(position.x),
                _ => None,
            })
            .collect();
        // surface default 10px -> width 20; computed 16px -> width 32.
        assert_eq!(xs, [5.0 + 5.0 + 10.0 + 4.0, 5.0 + 5.0 + 16.0 + 4.0]);
    }

    #[test]
    fn step_color_override_wins() {
        let page = Page::default().with("#a", &[Rect::new(0.0, 0.0, 10.0, 10.0)]);
        let gold = Color::rgb(255, 215, 0);
        let steps = StepList::new(vec![Step::new("#a", 1).with_label("x").with_color(gold)]);
        let frame = match compose(&page, &steps, 1) {
            Ok(frame) => frame,
            Err(e) => unreachable!("{e}"),
        };
        assert!(frame.commands.iter().any(|c| matches!(
            c,
            RenderCommand::DrawText { color, .. } if *color == gold
        )));
    }
}
