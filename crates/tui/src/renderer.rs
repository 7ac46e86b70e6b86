//! Rasterise overlay render commands onto terminal cells.
//!
//! Every cell is sampled at its center. Commands are replayed in order with
//! canvas compositing rules: source-over fills accumulate alpha,
//! destination-out fills remove it, text is painted on top.

use help_layer_protocol::{Color as RgbaColor, CompositeOp, Rect, RenderCommand, TextAlign};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect as CellRect;
use ratatui::style::{Color, Modifier, Style};

use crate::app::{CELL_HEIGHT, CELL_WIDTH};

/// Below this coverage a cell keeps its own colors and is only dimmed.
const SOLID_ALPHA: f32 = 0.5;

#[derive(Debug, Clone, Copy, Default)]
struct Cell {
    alpha: f32,
    fill: (u8, u8, u8),
    glyph: Option<(char, RgbaColor)>,
}

pub struct MaskRaster {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl MaskRaster {
    pub fn new(cols: u16, rows: u16, commands: &[RenderCommand]) -> Self {
        let mut raster = Self {
            cols,
            rows,
            cells: vec![Cell::default(); usize::from(cols) * usize::from(rows)],
        };
        for cmd in commands {
            raster.apply(cmd);
        }
        raster
    }

    fn apply(&mut self, cmd: &RenderCommand) {
        match cmd {
            RenderCommand::Clear { rect } => {
                for idx in self.cells_in(rect) {
                    self.cells[idx] = Cell::default();
                }
            }
            RenderCommand::FillRect {
                rect,
                color,
                op: CompositeOp::SourceOver,
            } => {
                let a = color.a;
                for idx in self.cells_in(rect) {
                    let cell = &mut self.cells[idx];
                    cell.alpha = a + cell.alpha * (1.0 - a);
                    cell.fill = (color.r, color.g, color.b);
                }
            }
            RenderCommand::FillRect {
                rect,
                color,
                op: CompositeOp::DestinationOut,
            } => {
                let a = color.a;
                for idx in self.cells_in(rect) {
                    let cell = &mut self.cells[idx];
                    cell.alpha *= 1.0 - a;
                    if a >= 1.0 {
                        cell.glyph = None;
                    }
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                align,
                ..
            } => {
                let width = text.chars().count() as f64;
                let first_col = match align {
                    TextAlign::Left => position.x / CELL_WIDTH,
                    TextAlign::Center => position.x / CELL_WIDTH - width / 2.0,
                    TextAlign::Right => position.x / CELL_WIDTH - width,
                }
                .round();
                let row = (position.y / CELL_HEIGHT).floor();
                if row < 0.0 || row >= f64::from(self.rows) {
                    return;
                }
                for (i, ch) in text.chars().enumerate() {
                    let col = first_col + i as f64;
                    if col < 0.0 || col >= f64::from(self.cols) {
                        continue;
                    }
                    let idx = self.index(col as u16, row as u16);
                    self.cells[idx].glyph = Some((ch, *color));
                }
            }
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }

    fn index(&self, col: u16, row: u16) -> usize {
        usize::from(row) * usize::from(self.cols) + usize::from(col)
    }

    /// Cells whose center lies strictly inside `rect`.
    fn cells_in(&self, rect: &Rect) -> Vec<usize> {
        let span = |start: f64, end: f64, cell: f64, limit: u16| {
            let first = ((start / cell - 0.5).floor() + 1.0).max(0.0);
            let last = (end / cell - 0.5).ceil().min(f64::from(limit));
            (first as u16)..(last.max(first) as u16)
        };
        let cols = span(rect.x, rect.right(), CELL_WIDTH, self.cols);
        let rows = span(rect.y, rect.bottom(), CELL_HEIGHT, self.rows);
        let mut out = Vec::with_capacity(cols.len() * rows.len());
        for row in rows {
            for col in cols.clone() {
                out.push(self.index(col, row));
            }
        }
        out
    }

    /// Coverage of the cell at (`col`, `row`), 0 for out of range cells.
    pub fn alpha(&self, col: u16, row: u16) -> f32 {
        if col >= self.cols || row >= self.rows {
            return 0.0;
        }
        self.cells[self.index(col, row)].alpha
    }

    pub fn glyph(&self, col: u16, row: u16) -> Option<char> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells[self.index(col, row)].glyph.map(|(ch, _)| ch)
    }

    /// Composite the mask over whatever is already in `buf`.
    pub fn paint(&self, area: CellRect, buf: &mut Buffer) {
        for row in 0..self.rows.min(area.height) {
            for col in 0..self.cols.min(area.width) {
                let cell = self.cells[self.index(col, row)];
                let target = &mut buf[(area.x + col, area.y + row)];
                if let Some((ch, color)) = cell.glyph {
                    target
                        .set_char(ch)
                        .set_style(Style::default().fg(to_terminal(color)).bg(Color::Black));
                    continue;
                }
                if cell.alpha >= SOLID_ALPHA {
                    let (r, g, b) = cell.fill;
                    target.set_style(
                        Style::default()
                            .fg(Color::DarkGray)
                            .bg(Color::Rgb(r, g, b))
                            .add_modifier(Modifier::DIM),
                    );
                } else if cell.alpha > 0.0 {
                    target.set_style(Style::default().add_modifier(Modifier::DIM));
                }
            }
        }
    }
}

fn to_terminal(color: RgbaColor) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}
