//! Step progression state machine.
//!
//! The counter is an unsigned integer with a floor of zero and no ceiling:
//! stepping past the last scene is not an error here, it is how the overlay
//! learns the tour has finished.

/// Visibility plus the 1-based step counter of a tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourState {
    pub visible: bool,
    pub current_step: u32,
}

/// The two observable states of a tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hidden,
    Active(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Show,
    Hide,
    Next,
    Prev,
}

impl TourState {
    pub const fn new() -> Self {
        Self {
            visible: false,
            current_step: 1,
        }
    }

    /// Total transition function.
    pub fn apply(self, transition: Transition) -> Self {
        match transition {
            Transition::Show => Self {
                visible: true,
                current_step: 1,
            },
            Transition::Hide => Self {
                visible: false,
                ..self
            },
            Transition::Next => Self {
                current_step: self.current_step.saturating_add(1),
                ..self
            },
            Transition::Prev => Self {
                current_step: self.current_step.saturating_sub(1),
                ..self
            },
        }
    }

    pub fn phase(&self) -> Phase {
        if self.visible {
            Phase::Active(self.current_step)
        } else {
            Phase::Hidden
        }
    }
}

impl Default for TourState {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner of a tour's [`TourState`].
#[derive(Debug, Clone, Default)]
pub struct Tour {
    state: TourState,
}

impl Tour {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TourState {
        self.state
    }

    pub fn visible(&self) -> bool {
        self.state.visible
    }

    pub fn current_step(&self) -> u32 {
        self.state.current_step
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn dispatch(&mut self, transition: Transition) -> TourState {
        let old = self.state;
        self.state = old.apply(transition);
        tracing::debug!(?transition, from = ?old.phase(), to = ?self.state.phase(), "tour transition");
        self.state
    }

    /// Make the tour visible and restart it from step 1.
    pub fn show(&mut self) -> TourState {
        self.dispatch(Transition::Show)
    }

    /// Hide the tour, keeping the current step.
    pub fn hide(&mut self) -> TourState {
        self.dispatch(Transition::Hide)
    }

    pub fn next(&mut self) -> TourState {
        self.dispatch(Transition::Next)
    }

    pub fn prev(&mut self) -> TourState {
        self.dispatch(Transition::Prev)
    }

    /// Raw visibility setter. Unlike [`Tour::show`] this does not rewind the
    /// step counter.
    pub fn set_visible(&mut self, visible: bool) -> TourState {
        self.state.visible = visible;
        tracing::debug!(visible, step = self.state.current_step, "tour visibility set");
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn starts_hidden_at_step_one() {
        let tour = Tour::new();
        assert_eq!(tour.state(), TourState { visible: false, current_step: 1 });
        assert_eq!(tour.phase(), Phase::Hidden);
    }

    #[test]
    fn hide_keeps_step() {
        let mut tour = Tour::new();
        tour.show();
        tour.next();
        tour.next();
        tour.hide();
        assert_eq!(tour.phase(), Phase::Hidden);
        assert_eq!(tour.current_step(), 3);
    }

    #[test]
    fn next_counts_while_hidden() {
        let mut tour = Tour::new();
        tour.next();
        assert_eq!(tour.current_step(), 2);
        assert!(!tour.visible());
    }

    #[test]
    fn prev_floors_at_zero() {
        let mut tour = Tour::new();
        tour.show();
        tour.prev();
        tour.prev();
        tour.prev();
        assert_eq!(tour.phase(), Phase::Active(0));
    }

    #[test]
    fn set_visible_does_not_rewind() {
        let mut tour = Tour::new();
        tour.next();
        tour.set_visible(true);
        assert_eq!(tour.phase(), Phase::Active(2));
    }

    #[test]
    fn next_saturates_at_max() {
        let state = TourState {
            visible: true,
            current_step: u32::MAX,
        };
        assert_eq!(state.apply(Transition::Next).current_step, u32::MAX);
    }

    proptest! {
        #[test]
        fn next_then_prev_is_identity(step in 0u32..u32::MAX, visible in any::<bool>()) {
            let state = TourState { visible, current_step: step };
            prop_assert_eq!(state.apply(Transition::Next).apply(Transition::Prev), state);
        }

        #[test]
        fn show_always_rewinds(step in any::<u32>(), visible in any::<bool>()) {
            let state = TourState { visible, current_step: step };
            prop_assert_eq!(state.apply(Transition::Show).phase(), Phase::Active(1));
        }

        #[test]
        fn hide_and_step_moves_commute_on_counter(step in 1u32..1000) {
            let state = TourState { visible: true, current_step: step };
            let a = state.apply(Transition::Hide).apply(Transition::Prev);
            let b = state.apply(Transition::Prev).apply(Transition::Hide);
            prop_assert_eq!(a, b);
        }
    }
}
