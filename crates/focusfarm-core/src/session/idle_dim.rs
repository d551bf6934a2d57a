//! Idle display dimming countdown.
//!
//! Display-only companion to the session engine: after 30 seconds without a
//! touch the shell is asked to drop brightness to minimum. Touches and the
//! countdown's own firing restart it. Restoring the original brightness on
//! teardown is the shell's job; this type has no effect on elapsed time.

use serde::{Deserialize, Serialize};

use super::now_ms;

/// Seconds of inactivity before the display is dimmed.
pub const IDLE_DIM_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IdleDimmer {
    deadline_ms: u64,
    dimmed: bool,
}

impl IdleDimmer {
    pub fn start() -> Self {
        Self::start_at(now_ms())
    }

    pub fn start_at(at_ms: u64) -> Self {
        Self {
            deadline_ms: at_ms + IDLE_DIM_SECS * 1000,
            dimmed: false,
        }
    }

    /// User touch: restart the countdown. Returns true when the shell should
    /// restore brightness.
    pub fn touch(&mut self) -> bool {
        self.touch_at(now_ms())
    }

    pub fn touch_at(&mut self, at_ms: u64) -> bool {
        let was_dimmed = self.dimmed;
        self.dimmed = false;
        self.deadline_ms = at_ms + IDLE_DIM_SECS * 1000;
        was_dimmed
    }

    /// Poll the countdown. Returns true exactly once per firing, at which
    /// point the shell should request minimum brightness.
    pub fn poll(&mut self) -> bool {
        self.poll_at(now_ms())
    }

    pub fn poll_at(&mut self, at_ms: u64) -> bool {
        if !self.dimmed && at_ms >= self.deadline_ms {
            self.dimmed = true;
            self.deadline_ms = at_ms + IDLE_DIM_SECS * 1000;
            return true;
        }
        false
    }

    pub fn is_dimmed(&self) -> bool {
        self.dimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_000_000;

    #[test]
    fn fires_once_after_thirty_seconds() {
        let mut dimmer = IdleDimmer::start_at(T0);
        assert!(!dimmer.poll_at(T0 + 29_000));
        assert!(dimmer.poll_at(T0 + 30_000));
        // Already dimmed: no repeat firing.
        assert!(!dimmer.poll_at(T0 + 31_000));
    }

    #[test]
    fn touch_restarts_countdown_and_reports_restore() {
        let mut dimmer = IdleDimmer::start_at(T0);
        assert!(!dimmer.touch_at(T0 + 10_000));
        // Deadline moved: the original instant no longer fires.
        assert!(!dimmer.poll_at(T0 + 30_000));
        assert!(dimmer.poll_at(T0 + 40_000));
        // Touch after dimming asks for a brightness restore.
        assert!(dimmer.touch_at(T0 + 45_000));
        assert!(!dimmer.is_dimmed());
    }
}
