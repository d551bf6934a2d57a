//! Focus session engine.
//!
//! The engine is a wall-clock-based state machine. It does not use internal
//! threads - the caller is responsible for calling `tick()` periodically
//! while the app is foregrounded, and for forwarding the host's lifecycle
//! signals via `on_background()` / `on_foreground()`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           v
//!         Ended
//! ```
//!
//! "Backgrounded" is not a separate state: it is a pending timestamp layered
//! on `Running`. While it is set, ticks do not accrue; the away time is
//! credited in one step when the foreground signal arrives. This is the
//! compensation path for hosts that throttle timers while suspended.
//!
//! Every transition method has an `_at(now_ms)` form taking the instant
//! explicitly; the argument-less form reads the system clock. All callbacks
//! are expected to arrive on a single thread - the engine holds no locks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_ms;
use crate::events::Event;

/// Sessions shorter than this are not eligible for persistence.
pub const MIN_PERSIST_SECS: u64 = 60;
/// Absences at or under this many seconds do not surface the leave notice.
pub const LEAVE_NOTICE_SECS: u64 = 5;
/// Leaves at or past this count make the penalty interstitial eligible.
pub const PENALTY_LEAVE_THRESHOLD: u32 = 3;
/// Hens deducted per confirmed penalty.
pub const PENALTY_HENS: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    Ended,
}

/// Finalized session data handed off to the ledger and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub duration_min: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub leave_count: u32,
    pub task_name: Option<String>,
    pub category_id: Option<Uuid>,
}

/// Result of a user-initiated stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StopOutcome {
    /// Under a minute of focus: the session stays active so the caller can
    /// offer a keep-focusing / discard choice.
    TooShort { elapsed_secs: u64 },
    Finished(SessionSummary),
}

/// Count-up focus session state machine.
///
/// Operates on wall-clock deltas -- no internal thread. Serializable so a
/// shell can persist it across process restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusEngine {
    state: SessionState,
    task_name: Option<String>,
    category_id: Option<Uuid>,
    started_at: Option<DateTime<Utc>>,
    /// Accumulated focused time in milliseconds.
    elapsed_ms: u64,
    leave_count: u32,
    /// Timestamp (ms since epoch) of the last tick flush.
    /// None while paused, backgrounded, or not started.
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
    /// Set while a background signal is pending its matching foreground.
    #[serde(default)]
    background_entered_ms: Option<u64>,
    /// Latched when a foreground transition crosses the penalty threshold.
    #[serde(default)]
    penalty_pending: bool,
}

impl FocusEngine {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            task_name: None,
            category_id: None,
            started_at: None,
            elapsed_ms: 0,
            leave_count: 0,
            last_tick_epoch_ms: None,
            background_entered_ms: None,
            penalty_pending: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_ms / 1000
    }

    pub fn leave_count(&self) -> u32 {
        self.leave_count
    }

    pub fn is_backgrounded(&self) -> bool {
        self.background_entered_ms.is_some()
    }

    pub fn penalty_pending(&self) -> bool {
        self.penalty_pending
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn task_name(&self) -> Option<&str> {
        self.task_name.as_deref()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            elapsed_secs: self.elapsed_secs(),
            leave_count: self.leave_count,
            backgrounded: self.is_backgrounded(),
            penalty_pending: self.penalty_pending,
            task_name: self.task_name.clone(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, task_name: Option<String>, category_id: Option<Uuid>) -> Option<Event> {
        self.start_at(now_ms(), task_name, category_id)
    }

    pub fn start_at(
        &mut self,
        at_ms: u64,
        task_name: Option<String>,
        category_id: Option<Uuid>,
    ) -> Option<Event> {
        if self.state != SessionState::Idle {
            return None;
        }
        let started_at = epoch_ms_to_utc(at_ms);
        self.state = SessionState::Running;
        self.task_name = task_name.clone();
        self.category_id = category_id;
        self.started_at = Some(started_at);
        self.elapsed_ms = 0;
        self.leave_count = 0;
        self.last_tick_epoch_ms = Some(at_ms);
        self.background_entered_ms = None;
        self.penalty_pending = false;
        Some(Event::SessionStarted {
            task_name,
            category_id,
            at: started_at,
        })
    }

    /// Call once per second while foregrounded. Returns current elapsed seconds.
    pub fn tick(&mut self) -> u64 {
        self.tick_at(now_ms())
    }

    pub fn tick_at(&mut self, at_ms: u64) -> u64 {
        if self.state == SessionState::Running && self.background_entered_ms.is_none() {
            self.flush_elapsed(at_ms);
        }
        self.elapsed_secs()
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(now_ms())
    }

    pub fn pause_at(&mut self, at_ms: u64) -> Option<Event> {
        if self.state != SessionState::Running || self.background_entered_ms.is_some() {
            return None;
        }
        self.flush_elapsed(at_ms);
        self.state = SessionState::Paused;
        self.last_tick_epoch_ms = None;
        Some(Event::SessionPaused {
            elapsed_secs: self.elapsed_secs(),
            at: epoch_ms_to_utc(at_ms),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        self.resume_at(now_ms())
    }

    pub fn resume_at(&mut self, at_ms: u64) -> Option<Event> {
        if self.state != SessionState::Paused {
            return None;
        }
        self.state = SessionState::Running;
        self.last_tick_epoch_ms = Some(at_ms);
        Some(Event::SessionResumed {
            elapsed_secs: self.elapsed_secs(),
            at: epoch_ms_to_utc(at_ms),
        })
    }

    /// Host signal: the app left the foreground.
    ///
    /// Only meaningful while `Running`; a repeated background signal without
    /// an intervening foreground is ignored, so a leave is never counted
    /// twice.
    pub fn on_background(&mut self) -> Vec<Event> {
        self.on_background_at(now_ms())
    }

    pub fn on_background_at(&mut self, at_ms: u64) -> Vec<Event> {
        if self.state != SessionState::Running || self.background_entered_ms.is_some() {
            return Vec::new();
        }
        self.flush_elapsed(at_ms);
        self.last_tick_epoch_ms = None;
        self.background_entered_ms = Some(at_ms);
        self.leave_count += 1;
        let at = epoch_ms_to_utc(at_ms);
        vec![
            Event::LeaveRecorded {
                leave_count: self.leave_count,
                at,
            },
            Event::HapticRequested { at },
        ]
    }

    /// Host signal: the app returned to the foreground.
    ///
    /// Credits `floor(away_ms / 1000)` seconds of elapsed time
    /// unconditionally: the clock is defined to keep running while away.
    /// `hen_count` is the user's hen total at this instant; the penalty
    /// interstitial is only eligible when it is positive.
    pub fn on_foreground(&mut self, hen_count: u64) -> Vec<Event> {
        self.on_foreground_at(now_ms(), hen_count)
    }

    pub fn on_foreground_at(&mut self, at_ms: u64, hen_count: u64) -> Vec<Event> {
        if self.state != SessionState::Running {
            return Vec::new();
        }
        let Some(entered_ms) = self.background_entered_ms.take() else {
            return Vec::new();
        };
        let away_secs = at_ms.saturating_sub(entered_ms) / 1000;
        self.elapsed_ms += away_secs * 1000;
        self.last_tick_epoch_ms = Some(at_ms);

        let at = epoch_ms_to_utc(at_ms);
        let mut events = vec![Event::LeaveEnded {
            away_secs,
            elapsed_secs: self.elapsed_secs(),
            at,
        }];
        if away_secs > LEAVE_NOTICE_SECS {
            events.push(Event::LeaveNoticed { away_secs, at });
            if self.leave_count >= PENALTY_LEAVE_THRESHOLD && hen_count > 0 {
                self.penalty_pending = true;
                events.push(Event::PenaltyPending {
                    leave_count: self.leave_count,
                    at,
                });
            }
        }
        events
    }

    /// Confirm the pending penalty interstitial.
    ///
    /// Returns the hen deduction for the caller to apply to the ledger.
    /// Only valid while a penalty is pending.
    pub fn confirm_penalty(&mut self) -> Option<Event> {
        self.confirm_penalty_at(now_ms())
    }

    pub fn confirm_penalty_at(&mut self, at_ms: u64) -> Option<Event> {
        if !self.penalty_pending {
            return None;
        }
        self.penalty_pending = false;
        Some(Event::PenaltyConfirmed {
            hens_deducted: PENALTY_HENS,
            at: epoch_ms_to_utc(at_ms),
        })
    }

    /// User abort. Under [`MIN_PERSIST_SECS`] the session stays active and
    /// the caller offers keep-focusing / discard; otherwise finalizes.
    pub fn stop(&mut self) -> Option<StopOutcome> {
        self.stop_at(now_ms())
    }

    pub fn stop_at(&mut self, at_ms: u64) -> Option<StopOutcome> {
        if !self.is_active() {
            return None;
        }
        if self.state == SessionState::Running && self.background_entered_ms.is_none() {
            self.flush_elapsed(at_ms);
        }
        if self.elapsed_secs() < MIN_PERSIST_SECS {
            return Some(StopOutcome::TooShort {
                elapsed_secs: self.elapsed_secs(),
            });
        }
        Some(StopOutcome::Finished(self.finalize(at_ms)))
    }

    /// User completion. Only reachable once a full minute has accrued.
    pub fn finish(&mut self) -> Option<SessionSummary> {
        self.finish_at(now_ms())
    }

    pub fn finish_at(&mut self, at_ms: u64) -> Option<SessionSummary> {
        if !self.is_active() {
            return None;
        }
        if self.state == SessionState::Running && self.background_entered_ms.is_none() {
            self.flush_elapsed(at_ms);
        }
        if self.elapsed_secs() < MIN_PERSIST_SECS {
            return None;
        }
        Some(self.finalize(at_ms))
    }

    /// End the session without persistence (the too-short discard path).
    pub fn discard(&mut self) -> Option<Event> {
        self.discard_at(now_ms())
    }

    pub fn discard_at(&mut self, at_ms: u64) -> Option<Event> {
        if !self.is_active() {
            return None;
        }
        self.state = SessionState::Ended;
        self.last_tick_epoch_ms = None;
        self.background_entered_ms = None;
        self.penalty_pending = false;
        Some(Event::SessionDiscarded {
            elapsed_secs: self.elapsed_secs(),
            at: epoch_ms_to_utc(at_ms),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Running | SessionState::Paused)
    }

    fn flush_elapsed(&mut self, at_ms: u64) {
        if let Some(last) = self.last_tick_epoch_ms {
            self.elapsed_ms += at_ms.saturating_sub(last);
            self.last_tick_epoch_ms = Some(at_ms);
        }
    }

    fn finalize(&mut self, at_ms: u64) -> SessionSummary {
        self.state = SessionState::Ended;
        self.last_tick_epoch_ms = None;
        self.background_entered_ms = None;
        self.penalty_pending = false;
        SessionSummary {
            duration_min: self.elapsed_secs() / 60,
            started_at: self.started_at.unwrap_or_else(|| epoch_ms_to_utc(at_ms)),
            ended_at: epoch_ms_to_utc(at_ms),
            leave_count: self.leave_count,
            task_name: self.task_name.clone(),
            category_id: self.category_id,
        }
    }
}

impl Default for FocusEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn epoch_ms_to_utc(ms: u64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms as i64).unwrap_or_default()
}
