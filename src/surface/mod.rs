//! Presentation collaborators.
//!
//! The engine never talks to a presentation layer directly. It calls these
//! contracts, and any of them may be absent: a missing collaborator turns
//! that one side effect into a no-op while the state change still happens.

pub mod console;

use std::sync::Arc;

use crate::types::Outcome;

/// Balance and price readout.
pub trait DisplaySurface: Send + Sync {
    fn render(&self, tokens: u64, points: u64, price: f64);
}

/// The up/down prediction buttons.
pub trait PredictionControls: Send + Sync {
    fn set_enabled(&self, enabled: bool);
}

pub trait CountdownDisplay: Send + Sync {
    fn set_value(&self, seconds: u32);
}

/// Transient round result banner.
pub trait OutcomeDisplay: Send + Sync {
    fn show(&self, outcome: Outcome);
    fn clear(&self);
}

/// The set of collaborators wired into a game. Every slot is optional.
#[derive(Clone, Default)]
pub struct Surface {
    display: Option<Arc<dyn DisplaySurface>>,
    controls: Option<Arc<dyn PredictionControls>>,
    countdown: Option<Arc<dyn CountdownDisplay>>,
    outcome: Option<Arc<dyn OutcomeDisplay>>,
}

impl Surface {
    /// A surface with no collaborators at all.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Use one object for every collaborator slot.
    pub fn all<T>(target: Arc<T>) -> Self
    where
        T: DisplaySurface + PredictionControls + CountdownDisplay + OutcomeDisplay + 'static,
    {
        Self {
            display: Some(target.clone()),
            controls: Some(target.clone()),
            countdown: Some(target.clone()),
            outcome: Some(target),
        }
    }

    pub fn with_controls(mut self, controls: Arc<dyn PredictionControls>) -> Self {
        self.controls = Some(controls);
        self
    }

    pub fn with_countdown(mut self, countdown: Arc<dyn CountdownDisplay>) -> Self {
        self.countdown = Some(countdown);
        self
    }

    pub fn with_outcome(mut self, outcome: Arc<dyn OutcomeDisplay>) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn render(&self, tokens: u64, points: u64, price: f64) {
        if let Some(display) = &self.display {
            display.render(tokens, points, price);
        }
    }

    pub fn set_controls_enabled(&self, enabled: bool) {
        if let Some(controls) = &self.controls {
            controls.set_enabled(enabled);
        }
    }

    pub fn set_countdown(&self, seconds: u32) {
        if let Some(countdown) = &self.countdown {
            countdown.set_value(seconds);
        }
    }

    pub fn show_outcome(&self, outcome: Outcome) {
        if let Some(display) = &self.outcome {
            display.show(outcome);
        }
    }

    pub fn clear_outcome(&self) {
        if let Some(display) = &self.outcome {
            display.clear();
        }
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------

/// A collaborator that records every call, for asserting on side effects.
#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Render { tokens: u64, points: u64, price: f64 },
        Controls(bool),
        Countdown(u32),
        Show(Outcome),
        Clear,
    }

    #[derive(Default)]
    pub struct Recorder {
        calls: Mutex<Vec<Call>>,
    }

    impl Recorder {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn take(&self) -> Vec<Call> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }

        fn push(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl DisplaySurface for Recorder {
        fn render(&self, tokens: u64, points: u64, price: f64) {
            self.push(Call::Render { tokens, points, price });
        }
    }

    impl PredictionControls for Recorder {
        fn set_enabled(&self, enabled: bool) {
            self.push(Call::Controls(enabled));
        }
    }

    impl CountdownDisplay for Recorder {
        fn set_value(&self, seconds: u32) {
            self.push(Call::Countdown(seconds));
        }
    }

    impl OutcomeDisplay for Recorder {
        fn show(&self, outcome: Outcome) {
            self.push(Call::Show(outcome));
        }

        fn clear(&self) {
            self.push(Call::Clear);
        }
    }
}
