//! Reward and conversion ledger.
//!
//! Pure bookkeeping over the per-user counter set: accumulated focus
//! minutes, the hen/goat/cow inventory, and goal-claim flags. Operations are
//! synchronous and atomic over the in-memory counters; durable propagation
//! to the progress store is the caller's concern and never rolls back an
//! in-memory change.

mod period;

pub use period::{monthly_claim_key, weekly_claim_key};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Hens consumed by one goat conversion.
pub const HENS_PER_GOAT: u64 = 6;
/// Hens consumed by one cow conversion.
pub const HENS_PER_COW: u64 = 24;
/// Focus minutes behind one projected hen (six hours).
pub const MINUTES_PER_HEN: u64 = 360;

/// Tiered reward units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Animal {
    Hen,
    Goat,
    Cow,
}

/// Claimable goal periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPeriod {
    Daily,
    Weekly,
    Monthly,
}

/// Result of a goal claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "claim", rename_all = "snake_case")]
pub enum ClaimOutcome {
    Granted { animal: Animal },
    AlreadyClaimed,
    BelowTarget,
}

impl ClaimOutcome {
    pub fn granted(&self) -> bool {
        matches!(self, ClaimOutcome::Granted { .. })
    }
}

/// Per-user progress counters.
///
/// One row per user in the progress store; mutated only through the methods
/// below. Every mutation is persisted by the caller as its own durable
/// write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressCounters {
    pub hens: u64,
    pub goats: u64,
    pub cows: u64,
    pub today_minutes: u64,
    pub last_day_reset: NaiveDate,
    pub daily_goal_claimed: bool,
    #[serde(default)]
    pub weekly_goal_claimed: bool,
    #[serde(default)]
    pub monthly_goal_claimed: bool,
    /// Goal targets in hours.
    #[serde(default = "default_daily_goal_hours")]
    pub daily_goal_hours: f64,
    #[serde(default = "default_weekly_goal_hours")]
    pub weekly_goal_hours: f64,
    #[serde(default = "default_monthly_goal_hours")]
    pub monthly_goal_hours: f64,
}

fn default_daily_goal_hours() -> f64 {
    6.0
}
fn default_weekly_goal_hours() -> f64 {
    30.0
}
fn default_monthly_goal_hours() -> f64 {
    120.0
}

impl ProgressCounters {
    /// First-time counters: the starter gift is one animal of each tier.
    pub fn starter(today: NaiveDate) -> Self {
        Self {
            hens: 1,
            goats: 1,
            cows: 1,
            today_minutes: 0,
            last_day_reset: today,
            daily_goal_claimed: false,
            weekly_goal_claimed: false,
            monthly_goal_claimed: false,
            daily_goal_hours: default_daily_goal_hours(),
            weekly_goal_hours: default_weekly_goal_hours(),
            monthly_goal_hours: default_monthly_goal_hours(),
        }
    }

    /// Calendar-day rollover, evaluated on every load from durable storage.
    ///
    /// Resets `today_minutes` and the daily claim flag at most once per
    /// calendar day; repeated loads the same day are no-ops. Returns whether
    /// a reset happened (the caller then persists the new state).
    pub fn roll_day(&mut self, today: NaiveDate) -> bool {
        if self.last_day_reset == today {
            return false;
        }
        self.today_minutes = 0;
        self.daily_goal_claimed = false;
        self.last_day_reset = today;
        true
    }

    pub fn add_study_time(&mut self, minutes: u64) {
        self.today_minutes += minutes;
    }

    /// Claim the daily reward: one hen once `today_minutes` reaches the
    /// daily target, at most once per day.
    pub fn claim_daily(&mut self) -> ClaimOutcome {
        if self.daily_goal_claimed {
            return ClaimOutcome::AlreadyClaimed;
        }
        if (self.today_minutes as f64) < self.daily_goal_hours * 60.0 {
            return ClaimOutcome::BelowTarget;
        }
        self.hens += 1;
        self.daily_goal_claimed = true;
        ClaimOutcome::Granted { animal: Animal::Hen }
    }

    /// Claim the weekly reward: one goat. `minutes_in_week` comes from the
    /// analytics range sum; `already_claimed` is the locally persisted
    /// per-period marker (see [`weekly_claim_key`]).
    pub fn claim_weekly(&mut self, minutes_in_week: u64, already_claimed: bool) -> ClaimOutcome {
        if already_claimed {
            return ClaimOutcome::AlreadyClaimed;
        }
        if (minutes_in_week as f64) < self.weekly_goal_hours * 60.0 {
            return ClaimOutcome::BelowTarget;
        }
        self.goats += 1;
        self.weekly_goal_claimed = true;
        ClaimOutcome::Granted { animal: Animal::Goat }
    }

    /// Claim the monthly reward: one cow. Same contract as
    /// [`Self::claim_weekly`] with the monthly marker.
    pub fn claim_monthly(&mut self, minutes_in_month: u64, already_claimed: bool) -> ClaimOutcome {
        if already_claimed {
            return ClaimOutcome::AlreadyClaimed;
        }
        if (minutes_in_month as f64) < self.monthly_goal_hours * 60.0 {
            return ClaimOutcome::BelowTarget;
        }
        self.cows += 1;
        self.monthly_goal_claimed = true;
        ClaimOutcome::Granted { animal: Animal::Cow }
    }

    /// Trade six hens for a goat. Returns false and leaves the counters
    /// untouched below the threshold.
    pub fn convert_hens_to_goat(&mut self) -> bool {
        if self.hens < HENS_PER_GOAT {
            return false;
        }
        self.hens -= HENS_PER_GOAT;
        self.goats += 1;
        true
    }

    /// Trade twenty-four hens for a cow.
    pub fn convert_hens_to_cow(&mut self) -> bool {
        if self.hens < HENS_PER_COW {
            return false;
        }
        self.hens -= HENS_PER_COW;
        self.cows += 1;
        true
    }

    /// Saturating hen deduction.
    pub fn apply_penalty(&mut self, hens: u64) {
        self.hens = self.hens.saturating_sub(hens);
    }

    pub fn total_animals(&self) -> u64 {
        self.hens + self.goats + self.cows
    }
}
