//! Global keyboard shortcuts for a tour.
//!
//! `Shift+?` shows the tour from the first step, `Escape` hides it. The
//! subscription lives inside a [`KeyboardShortcuts`] value: it is installed
//! on enable, removed on disable and on drop, and never installed twice.

use crate::host::{KeyChannel, ListenerId};
use crate::tour::{Tour, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// A key-down event. `key` follows the DOM `KeyboardEvent.key` naming:
/// printable keys are the produced character, others are names such as
/// `"Escape"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }
}

/// Map a key press to the tour transition it triggers, if any.
pub fn shortcut_for(event: &KeyEvent) -> Option<Transition> {
    match (event.key.as_str(), event.modifiers) {
        ("Escape", _) => Some(Transition::Hide),
        ("?", Modifiers { shift: true, .. }) => Some(Transition::Show),
        _ => None,
    }
}

/// Scoped keyboard subscription for one tour instance.
#[derive(Debug)]
pub struct KeyboardShortcuts<C: KeyChannel> {
    channel: C,
    listener: Option<ListenerId>,
}

impl<C: KeyChannel> KeyboardShortcuts<C> {
    /// Wrap `channel` without subscribing.
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            listener: None,
        }
    }

    pub fn enabled(channel: C) -> Self {
        let mut shortcuts = Self::new(channel);
        shortcuts.enable();
        shortcuts
    }

    pub fn is_enabled(&self) -> bool {
        self.listener.is_some()
    }

    pub fn enable(&mut self) {
        if self.listener.is_some() {
            return;
        }
        let id = self.channel.subscribe_keys();
        tracing::debug!(listener = id.0, "keyboard shortcuts enabled");
        self.listener = Some(id);
    }

    pub fn disable(&mut self) {
        if let Some(id) = self.listener.take() {
            self.channel.unsubscribe_keys(id);
            tracing::debug!(listener = id.0, "keyboard shortcuts disabled");
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            self.enable();
        } else {
            self.disable();
        }
    }

    /// Apply a key press to `tour`. Returns the transition that ran, or
    /// `None` when shortcuts are disabled or the key is not bound.
    pub fn handle_key(&self, tour: &mut Tour, event: &KeyEvent) -> Option<Transition> {
        if !self.is_enabled() {
            return None;
        }
        let transition = shortcut_for(event)?;
        tour.dispatch(transition);
        Some(transition)
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }
}

impl<C: KeyChannel> Drop for KeyboardShortcuts<C> {
    fn drop(&mut self) {
        self.disable();
    }
}
