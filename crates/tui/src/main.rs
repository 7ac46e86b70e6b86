mod app;
mod host;
mod logging;
mod renderer;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Stdout, stdout};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use help_layer_core::host::ViewportSource;
use help_layer_core::{
    KeyEvent, KeyboardShortcuts, Modifiers, Overlay, PointerEvent, Tour, TourConfig, Transition,
};
use help_layer_protocol::Point;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    widgets::{Paragraph, Widget},
};

use crate::app::{CELL_HEIGHT, CELL_WIDTH, DemoApp};
use crate::host::{TerminalHost, TerminalKeys};
use crate::renderer::MaskRaster;

const USAGE: &str = "Usage: help-layer <tour.json> [--svg <out.svg>] [--log <file>] [--debug]";

/// Size of the headless page used for `--svg`.
const SVG_COLS: u16 = 120;
const SVG_ROWS: u16 = 40;

const FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Debug, PartialEq)]
struct Args {
    tour: PathBuf,
    svg: Option<PathBuf>,
    log: PathBuf,
    debug: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut tour = None;
    let mut svg = None;
    let mut log = None;
    let mut debug = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--svg" => svg = Some(PathBuf::from(args.next().context("--svg needs a path")?)),
            "--log" => log = Some(PathBuf::from(args.next().context("--log needs a path")?)),
            "--debug" => debug = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            path if tour.is_none() => tour = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument {extra}"),
        }
    }
    Ok(Args {
        tour: tour.context("missing tour file")?,
        svg,
        log: log.unwrap_or_else(|| std::env::temp_dir().join("help-layer.log")),
        debug,
    })
}

fn main() -> Result<()> {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            std::process::exit(2);
        }
    };
    let _guard = logging::init(args.debug, &args.log);

    let data = std::fs::read(&args.tour)
        .with_context(|| format!("reading {}", args.tour.display()))?;
    let config = TourConfig::from_json(&data)
        .with_context(|| format!("loading {}", args.tour.display()))?;
    tracing::info!(path = %args.tour.display(), steps = config.steps.len(), "tour loaded");

    match args.svg {
        Some(out) => export_svg(&config, &out),
        None => run(config),
    }
}

/// Render the first frame of the tour on a headless page.
fn export_svg(config: &TourConfig, out: &Path) -> Result<()> {
    let host = TerminalHost::new(DemoApp::new(SVG_COLS, SVG_ROWS));
    let mut overlay = Overlay::new(host, config.steps.clone(), config.overlay_options());
    let mut tour = Tour::new();
    overlay.sync(tour.show());

    let commands = match overlay.host_mut().take_due_frame() {
        Some(handle) => overlay.on_frame(handle)?,
        None => Vec::new(),
    };
    let viewport = overlay.host().viewport();
    let svg = help_layer_core::svg::render_svg(&commands, viewport.width, viewport.height);
    std::fs::write(out, svg).with_context(|| format!("writing {}", out.display()))?;
    tracing::info!(path = %out.display(), commands = commands.len(), "svg exported");
    Ok(())
}

fn run(config: TourConfig) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &config);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, config: &TourConfig) -> Result<()> {
    let size = terminal.size()?;
    let host = TerminalHost::new(DemoApp::new(size.width, size.height));
    let mut overlay = Overlay::new(host, config.steps.clone(), config.overlay_options());
    let mut shortcuts = KeyboardShortcuts::new(TerminalKeys::default());
    shortcuts.set_enabled(config.keyboard_shortcuts);

    let clicks: Rc<RefCell<VecDeque<Transition>>> = Rc::default();
    let queue = Rc::clone(&clicks);
    overlay.set_on_click(Some(Box::new(move |_| {
        queue.borrow_mut().push_back(Transition::Next);
    })));
    let queue = Rc::clone(&clicks);
    overlay.set_on_shift_click(Some(Box::new(move |_| {
        queue.borrow_mut().push_back(Transition::Prev);
    })));

    let mut tour = Tour::new();
    overlay.sync(tour.show());
    let mut status: Option<String> = None;
    let total = config.steps.max_scene().unwrap_or(0);

    loop {
        if let Some(handle) = overlay.host_mut().take_due_frame() {
            match overlay.on_frame(handle) {
                Ok(commands) => overlay.host_mut().present(commands),
                Err(err) => status = Some(err.to_string()),
            }
        }
        let hints = if shortcuts.channel().is_listening() {
            " | ? show, Esc hide"
        } else {
            ""
        };
        terminal.draw(|frame| draw(frame, overlay.host(), &tour, total, hints, status.as_deref()))?;

        if !event::poll(FRAME_INTERVAL)? {
            continue;
        }
        let before = tour.state();
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if key.code == KeyCode::Char('q') {
                    break;
                }
                if shortcuts.handle_key(&mut tour, &key_event(&key)).is_none() {
                    match key.code {
                        KeyCode::Right | KeyCode::Char('n') => {
                            tour.next();
                        }
                        KeyCode::Left | KeyCode::Char('p') => {
                            tour.prev();
                        }
                        KeyCode::Enter => {
                            tour.show();
                        }
                        KeyCode::Up => overlay.host_mut().app_mut().scroll_by(-1),
                        KeyCode::Down => overlay.host_mut().app_mut().scroll_by(1),
                        _ => {}
                    }
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    let event = PointerEvent {
                        position: Point::new(
                            (f64::from(mouse.column) + 0.5) * CELL_WIDTH,
                            (f64::from(mouse.row) + 0.5) * CELL_HEIGHT,
                        ),
                        modifiers: modifiers(mouse.modifiers),
                    };
                    if overlay.on_pointer_down(&event).is_none() {
                        tracing::trace!(x = event.position.x, y = event.position.y, "click on page");
                    }
                    let pending: Vec<Transition> = clicks.borrow_mut().drain(..).collect();
                    for transition in pending {
                        tour.dispatch(transition);
                    }
                }
                MouseEventKind::ScrollDown => overlay.host_mut().app_mut().scroll_by(1),
                MouseEventKind::ScrollUp => overlay.host_mut().app_mut().scroll_by(-1),
                _ => {}
            },
            Event::Resize(cols, rows) => {
                if overlay.host_mut().resize(cols, rows) {
                    overlay.on_resize();
                }
                tracing::debug!(cols, rows, surface = ?overlay.host().surface(), "terminal resized");
            }
            _ => {}
        }
        if tour.state() != before {
            status = None;
        }
        overlay.sync(tour.state());
    }

    Ok(())
}

fn draw(
    frame: &mut Frame,
    host: &TerminalHost,
    tour: &Tour,
    total: u32,
    hints: &str,
    status: Option<&str>,
) {
    let area = frame.area();
    let buf = frame.buffer_mut();
    host.app().render(area, buf);

    let bar = Rect::new(
        area.x,
        area.y + area.height.saturating_sub(1),
        area.width,
        area.height.min(1),
    );
    let (text, style) = match status {
        Some(err) => (
            format!(" error: {err} "),
            Style::default().fg(Color::White).bg(Color::Red),
        ),
        None => (
            format!(
                " step {}/{total}{} | n/p or click/shift-click | Enter restart{hints} | q quit ",
                tour.current_step(),
                if tour.visible() { "" } else { " (hidden)" },
            ),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
    };
    Paragraph::new(text).style(style).render(bar, buf);

    if !host.presented().is_empty() {
        MaskRaster::new(area.width, area.height, host.presented()).paint(area, buf);
    }
}

fn modifiers(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        shift: mods.contains(KeyModifiers::SHIFT),
        ctrl: mods.contains(KeyModifiers::CONTROL),
        alt: mods.contains(KeyModifiers::ALT),
        meta: mods.intersects(KeyModifiers::SUPER | KeyModifiers::META),
    }
}

/// Translate a crossterm key press into DOM-style naming.
fn key_event(key: &event::KeyEvent) -> KeyEvent {
    let name = match key.code {
        KeyCode::Esc => "Escape".to_owned(),
        KeyCode::Enter => "Enter".to_owned(),
        KeyCode::Char(c) => c.to_string(),
        other => format!("{other:?}"),
    };
    let mut mods = modifiers(key.modifiers);
    // Most terminals report '?' without the shift bit.
    if key.code == KeyCode::Char('?') {
        mods.shift = true;
    }
    KeyEvent::new(name, mods)
}
