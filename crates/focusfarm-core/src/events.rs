use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{Animal, GoalPeriod};
use crate::session::SessionState;

/// Every state change in the system produces an Event.
/// A GUI shell renders them; the CLI prints them as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        task_name: Option<String>,
        category_id: Option<Uuid>,
        at: DateTime<Utc>,
    },
    SessionPaused {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// The app left the foreground while the clock was running.
    LeaveRecorded {
        leave_count: u32,
        at: DateTime<Utc>,
    },
    /// Best-effort vibration cue for the shell; failure to vibrate is ignored.
    HapticRequested {
        at: DateTime<Utc>,
    },
    /// The app returned to the foreground; away time has been credited.
    LeaveEnded {
        away_secs: u64,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// The absence was long enough to show the "you left" interstitial.
    LeaveNoticed {
        away_secs: u64,
        at: DateTime<Utc>,
    },
    /// Repeated leaves crossed the penalty threshold; awaiting confirmation.
    PenaltyPending {
        leave_count: u32,
        at: DateTime<Utc>,
    },
    PenaltyConfirmed {
        hens_deducted: u64,
        at: DateTime<Utc>,
    },
    SessionEnded {
        duration_min: u64,
        leave_count: u32,
        at: DateTime<Utc>,
    },
    SessionDiscarded {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    RewardClaimed {
        period: GoalPeriod,
        animal: Animal,
        at: DateTime<Utc>,
    },
    AnimalsConverted {
        hens_spent: u64,
        animal: Animal,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        elapsed_secs: u64,
        leave_count: u32,
        backgrounded: bool,
        penalty_pending: bool,
        task_name: Option<String>,
        at: DateTime<Utc>,
    },
}
