//! End-to-end tour scenarios: state machine, keyboard shortcuts and the
//! overlay wired together the way a host wires them.

mod common;

use common::{FakeHost, FakeKeys, fire};
use help_layer_core::{
    KeyEvent, KeyboardShortcuts, Modifiers, Overlay, Phase, PointerAction, PointerEvent, Step,
    StepList, Tour, TourConfig, Transition,
};
use help_layer_protocol::{Point, Rect, RenderCommand};
use tracing_test::traced_test;

const TOUR: &[u8] = br##"{
    "steps": [
        {"selector": "#search", "scene": 1, "label": "Search everything", "labelDir": "bottom"},
        {"selector": "#sidebar", "scene": 2, "label": "Your projects", "labelDir": "right", "gap": 12},
        {"selector": ".card", "scene": 2},
        {"selector": "#help", "scene": 3, "label": "Ask for help", "labelDir": "left", "color": "#ffd54f"}
    ],
    "keyboardShortcuts": true
}"##;

fn host() -> FakeHost {
    FakeHost::new()
        .with("#search", &[Rect::new(300.0, 10.0, 400.0, 32.0)])
        .with("#sidebar", &[Rect::new(0.0, 60.0, 200.0, 700.0)])
        .with(
            ".card",
            &[
                Rect::new(240.0, 80.0, 180.0, 120.0),
                Rect::new(440.0, 80.0, 180.0, 120.0),
            ],
        )
        .with("#help", &[Rect::new(960.0, 700.0, 40.0, 40.0)])
}

fn shift_question() -> KeyEvent {
    KeyEvent::new(
        "?",
        Modifiers {
            shift: true,
            ..Modifiers::default()
        },
    )
}

fn escape() -> KeyEvent {
    KeyEvent::new("Escape", Modifiers::default())
}

#[test]
fn keyboard_drives_the_overlay() {
    let config = match TourConfig::from_json(TOUR) {
        Ok(config) => config,
        Err(e) => unreachable!("{e}"),
    };
    let host = host();
    let log = host.log.clone();
    let mut shortcuts = KeyboardShortcuts::new(FakeKeys(log.clone()));
    shortcuts.set_enabled(config.keyboard_shortcuts);
    let mut overlay = Overlay::new(host, config.steps.clone(), config.overlay_options());
    let mut tour = Tour::new();

    assert_eq!(log.borrow().key_listeners.len(), 1);

    // Shift+? while hidden: visible at step 1.
    assert_eq!(
        shortcuts.handle_key(&mut tour, &shift_question()),
        Some(Transition::Show)
    );
    overlay.sync(tour.state());
    assert_eq!(tour.phase(), Phase::Active(1));
    assert!(overlay.is_mounted());

    overlay.sync(tour.next());
    overlay.sync(tour.next());
    assert_eq!(tour.phase(), Phase::Active(3));

    // Escape at any step: hidden, step unchanged.
    shortcuts.handle_key(&mut tour, &escape());
    overlay.sync(tour.state());
    assert_eq!(tour.phase(), Phase::Hidden);
    assert_eq!(tour.current_step(), 3);
    assert!(!overlay.is_mounted());

    // Shift+? restarts from the top.
    shortcuts.handle_key(&mut tour, &shift_question());
    overlay.sync(tour.state());
    assert_eq!(tour.phase(), Phase::Active(1));

    drop(shortcuts);
    assert!(log.borrow().key_listeners.is_empty());
}

#[test]
fn click_through_the_whole_tour() {
    let config = match TourConfig::from_json(TOUR) {
        Ok(config) => config,
        Err(e) => unreachable!("{e}"),
    };
    let host = host();
    let log = host.log.clone();
    let options = config.overlay_options();
    let mut overlay = Overlay::new(host, config.steps, options);
    let mut tour = Tour::new();
    overlay.sync(tour.show());

    let click = PointerEvent {
        position: Point::new(500.0, 500.0),
        modifiers: Modifiers::default(),
    };
    let mut frames = Vec::new();
    while overlay.is_mounted() {
        let commands = fire(&mut overlay, &log).and_then(Result::ok).unwrap_or_default();
        frames.push(commands);
        match overlay.on_pointer_down(&click) {
            Some(PointerAction::Click) => overlay.sync(tour.next()),
            Some(PointerAction::ShiftClick) => overlay.sync(tour.prev()),
            None => break,
        }
    }

    assert_eq!(frames.len(), 3);
    let holes: Vec<usize> = frames.iter().map(|f| RenderCommand::holes(f).count()).collect();
    assert_eq!(holes, [1, 3, 1]);
    assert_eq!(tour.current_step(), 4);
    assert!(tour.visible());
    assert!(log.borrow().pending_frames.is_empty());
    assert!(log.borrow().resize_listeners.is_empty());
}

#[test]
fn shift_click_goes_back() {
    let host = host();
    let steps = StepList::new(vec![Step::new("#search", 1), Step::new("#help", 2)]);
    let mut overlay = Overlay::new(host, steps, Default::default());
    let mut tour = Tour::new();
    tour.show();
    overlay.sync(tour.next());

    let shift_click = PointerEvent {
        position: Point::new(1.0, 1.0),
        modifiers: Modifiers {
            shift: true,
            ..Modifiers::default()
        },
    };
    assert_eq!(overlay.on_pointer_down(&shift_click), Some(PointerAction::ShiftClick));
    overlay.sync(tour.prev());
    assert_eq!(tour.phase(), Phase::Active(1));
    assert_eq!(
        overlay.host().log.borrow().scrolls.last().map(|(s, _)| s.clone()),
        Some("#search".to_string())
    );

    // Step 0 is below every scene: mounted, nothing to punch.
    overlay.sync(tour.prev());
    assert_eq!(tour.phase(), Phase::Active(0));
    assert!(overlay.is_mounted());
}

#[test]
#[traced_test]
fn misconfigured_step_is_logged() {
    let host = host();
    let log = host.log.clone();
    let steps = StepList::new(vec![Step::new("#does-not-exist", 1)]);
    let mut overlay = Overlay::new(host, steps, Default::default());
    let mut tour = Tour::new();
    overlay.sync(tour.show());

    assert!(matches!(fire(&mut overlay, &log), Some(Err(_))));
    assert!(logs_contain("selector not found: #does-not-exist"));
    assert!(logs_contain("overlay torn down"));
}
