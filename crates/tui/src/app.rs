//! The demo application the tour runs on top of.
//!
//! Widgets are laid out in terminal cells over a content area taller than
//! the screen, so scrolling a target into view actually moves things. Each
//! widget carries an id and classes for `#id` / `.class` selectors.

use help_layer_protocol::Rect;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect as CellRect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

/// Logical pixels per terminal column.
pub const CELL_WIDTH: f64 = 8.0;
/// Logical pixels per terminal row.
pub const CELL_HEIGHT: f64 = 16.0;

const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 3;
const CARD_HEIGHT: u16 = 5;
const SIDEBAR_MAX_WIDTH: u16 = 26;

struct WidgetSpec {
    id: &'static str,
    classes: &'static [&'static str],
    title: &'static str,
    body: &'static str,
}

static CARDS: &[WidgetSpec] = &[
    WidgetSpec {
        id: "card-inbox",
        classes: &["card"],
        title: "Inbox",
        body: "12 unread messages",
    },
    WidgetSpec {
        id: "card-stats",
        classes: &["card", "featured"],
        title: "Weekly stats",
        body: "Deploys 31  Incidents 0  Reviews 54",
    },
    WidgetSpec {
        id: "card-tasks",
        classes: &["card"],
        title: "Tasks",
        body: "3 due today, 7 this week",
    },
    WidgetSpec {
        id: "card-team",
        classes: &["card"],
        title: "Team",
        body: "5 online",
    },
    WidgetSpec {
        id: "card-billing",
        classes: &["card", "featured"],
        title: "Billing",
        body: "Next invoice on the 1st",
    },
    WidgetSpec {
        id: "card-settings",
        classes: &["card"],
        title: "Settings",
        body: "Notifications, theme, keys",
    },
];

static HEADER: WidgetSpec = WidgetSpec {
    id: "header",
    classes: &["bar"],
    title: "Acme dashboard",
    body: "",
};

static SIDEBAR: WidgetSpec = WidgetSpec {
    id: "sidebar",
    classes: &["panel"],
    title: "Navigation",
    body: "\n\n\n\nOverview\nProjects\nReports\nPeople\nArchive",
};

static SEARCH: WidgetSpec = WidgetSpec {
    id: "search",
    classes: &["input"],
    title: "Search",
    body: "",
};

static FOOTER: WidgetSpec = WidgetSpec {
    id: "footer",
    classes: &["bar"],
    title: "Status",
    body: "All systems normal",
};

/// A laid out widget. `area` is in content coordinates (row 0 is the top
/// of the page, not of the screen).
pub struct DemoWidget {
    spec: &'static WidgetSpec,
    pub area: CellRect,
}

impl DemoWidget {
    #[cfg(test)]
    pub fn id(&self) -> &str {
        self.spec.id
    }

    fn matches(&self, compound: &str) -> bool {
        let mut rest = compound;
        let mut matched_any = false;
        while let Some(first) = rest.chars().next() {
            let body = &rest[first.len_utf8()..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return false;
            }
            let ok = match first {
                '#' => self.spec.id == name,
                '.' => self.spec.classes.contains(&name),
                _ => false,
            };
            if !ok {
                return false;
            }
            matched_any = true;
            rest = &body[end..];
        }
        matched_any
    }
}

pub struct DemoApp {
    widgets: Vec<DemoWidget>,
    cols: u16,
    rows: u16,
    scroll: u16,
    content_height: u16,
}

impl DemoApp {
    pub fn new(cols: u16, rows: u16) -> Self {
        let mut app = Self {
            widgets: Vec::new(),
            cols,
            rows,
            scroll: 0,
            content_height: 0,
        };
        app.relayout();
        app
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// Rows available to page content; the last screen row is the status
    /// bar.
    pub fn view_rows(&self) -> u16 {
        self.rows.saturating_sub(1)
    }

    #[cfg(test)]
    pub fn widgets(&self) -> &[DemoWidget] {
        &self.widgets
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.relayout();
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn relayout(&mut self) {
        let width = self.cols;
        let sidebar_width = (width / 3).min(SIDEBAR_MAX_WIDTH);
        let main_width = width.saturating_sub(sidebar_width);
        let cards_height = CARD_HEIGHT * CARDS.len() as u16;

        let mut widgets = vec![
            DemoWidget {
                spec: &HEADER,
                area: CellRect::new(0, 0, width, HEADER_HEIGHT),
            },
            DemoWidget {
                spec: &SIDEBAR,
                area: CellRect::new(0, HEADER_HEIGHT, sidebar_width, cards_height),
            },
            DemoWidget {
                spec: &SEARCH,
                area: CellRect::new(1, HEADER_HEIGHT + 1, sidebar_width.saturating_sub(2), 3),
            },
        ];
        for (i, spec) in CARDS.iter().enumerate() {
            widgets.push(DemoWidget {
                spec,
                area: CellRect::new(
                    sidebar_width,
                    HEADER_HEIGHT + CARD_HEIGHT * i as u16,
                    main_width,
                    CARD_HEIGHT,
                ),
            });
        }
        widgets.push(DemoWidget {
            spec: &FOOTER,
            area: CellRect::new(0, HEADER_HEIGHT + cards_height, width, FOOTER_HEIGHT),
        });

        self.content_height = HEADER_HEIGHT + cards_height + FOOTER_HEIGHT;
        self.widgets = widgets;
    }

    fn max_scroll(&self) -> u16 {
        self.content_height.saturating_sub(self.view_rows())
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let next = (i32::from(self.scroll) + delta).clamp(0, i32::from(self.max_scroll()));
        self.scroll = next as u16;
    }

    /// Indices of widgets matching `selector`, in document order.
    ///
    /// Supports comma separated lists of compound `#id` / `.class`
    /// selectors. Anything else matches nothing.
    pub fn query(&self, selector: &str) -> Vec<usize> {
        let parts: Vec<&str> = selector.split(',').map(str::trim).collect();
        self.widgets
            .iter()
            .enumerate()
            .filter(|(_, w)| parts.iter().any(|p| w.matches(p)))
            .map(|(i, _)| i)
            .collect()
    }

    /// Bounding box of widget `index` in viewport pixels. Widgets scrolled
    /// off screen get coordinates outside the viewport.
    pub fn pixel_rect(&self, index: usize) -> Rect {
        let Some(widget) = self.widgets.get(index) else {
            return Rect::new(0.0, 0.0, 0.0, 0.0);
        };
        let area = widget.area;
        let top = i32::from(area.y) - i32::from(self.scroll);
        Rect::new(
            f64::from(area.x) * CELL_WIDTH,
            f64::from(top) * CELL_HEIGHT,
            f64::from(area.width) * CELL_WIDTH,
            f64::from(area.height) * CELL_HEIGHT,
        )
    }

    /// Scroll so that widget `index` is vertically centered, as far as the
    /// page allows.
    pub fn scroll_to_center(&mut self, index: usize) {
        let Some(widget) = self.widgets.get(index) else {
            return;
        };
        let center = i32::from(widget.area.y) + i32::from(widget.area.height) / 2;
        let target = center - i32::from(self.view_rows()) / 2;
        self.scroll = target.clamp(0, i32::from(self.max_scroll())) as u16;
    }

    pub fn render(&self, area: CellRect, buf: &mut Buffer) {
        let view = CellRect::new(area.x, area.y, area.width, self.view_rows().min(area.height));
        Block::default()
            .style(Style::default().bg(Color::Black))
            .render(view, buf);

        for widget in &self.widgets {
            let top = i32::from(widget.area.y) - i32::from(self.scroll);
            let bottom = top + i32::from(widget.area.height);
            let visible_top = top.max(0);
            let visible_bottom = bottom.min(i32::from(view.height));
            if visible_bottom <= visible_top {
                continue;
            }
            let screen = CellRect::new(
                view.x + widget.area.x,
                view.y + visible_top as u16,
                widget.area.width,
                (visible_bottom - visible_top) as u16,
            )
            .intersection(view);
            if screen.is_empty() {
                continue;
            }
            let accent = if widget.spec.classes.contains(&"featured") {
                Color::Yellow
            } else {
                Color::Cyan
            };
            let block = Block::bordered()
                .title(format!(" {} (#{}) ", widget.spec.title, widget.spec.id))
                .border_style(Style::default().fg(accent));
            Paragraph::new(widget.spec.body)
                .wrap(Wrap { trim: false })
                .style(Style::default().fg(Color::White))
                .block(block)
                .render(screen, buf);
        }
    }
}
