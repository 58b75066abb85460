/// Inputs a stage reacts to besides direct user edits.
///
/// Timer and speech callbacks are delivered as values so stage handlers can
/// be driven deterministically in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageEvent {
    /// One second elapsed.
    TimerTick,
    SpeechFinalResult(String),
    SpeechInterimResult(String),
    SpeechError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Running,
    /// Returned exactly once, on the tick that reaches zero.
    Expired,
    /// Already expired earlier; further ticks are ignored.
    Stopped,
}

/// A whole-second countdown driven by [`StageEvent::TimerTick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining_secs: u32,
    fired: bool,
}

impl Countdown {
    pub fn new(secs: u32) -> Self {
        Self {
            remaining_secs: secs,
            fired: false,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    pub fn tick(&mut self) -> CountdownState {
        if self.fired {
            return CountdownState::Stopped;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.fired = true;
            CountdownState::Expired
        } else {
            CountdownState::Running
        }
    }

    pub fn reset(&mut self, secs: u32) {
        *self = Self::new(secs);
    }

    /// `m:ss`
    pub fn format(&self) -> String {
        format!("{}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_exactly_once() {
        let mut c = Countdown::new(3);
        assert_eq!(c.tick(), CountdownState::Running);
        assert_eq!(c.tick(), CountdownState::Running);
        assert_eq!(c.tick(), CountdownState::Expired);
        assert_eq!(c.tick(), CountdownState::Stopped);
        assert!(c.is_expired());
    }

    #[test]
    fn zero_budget_expires_on_first_tick() {
        let mut c = Countdown::new(0);
        assert_eq!(c.tick(), CountdownState::Expired);
        assert_eq!(c.tick(), CountdownState::Stopped);
        assert_eq!(c.remaining_secs(), 0);
    }

    #[test]
    fn reset_rearms() {
        let mut c = Countdown::new(1);
        assert_eq!(c.tick(), CountdownState::Expired);
        c.reset(2);
        assert_eq!(c.remaining_secs(), 2);
        assert_eq!(c.tick(), CountdownState::Running);
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(Countdown::new(450).format(), "7:30");
        assert_eq!(Countdown::new(120).format(), "2:00");
        assert_eq!(Countdown::new(9).format(), "0:09");
    }
}
