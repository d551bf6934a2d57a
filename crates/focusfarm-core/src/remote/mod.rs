//! Remote progress store.
//!
//! The hosted backend exposes per-user tables for progress counters, study
//! sessions, and categories behind a PostgREST-style filter API. The core
//! treats it as an at-least-once, eventually-consistent record store: reads
//! are simple filters, writes are inserts and partial upserts.
//!
//! Writes follow a two-phase contract: callers apply the in-memory mutation
//! synchronously, then hand a [`WriteIntent`] to the [`SyncQueue`]. The
//! eventual outcome arrives on a channel; a failed write is logged and
//! dropped, never retried and never rolled back.

mod client;
mod queue;

pub use client::{AuthContext, RestProgressStore};
pub use queue::{SyncOutcome, SyncQueue, WriteIntent};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::ledger::ProgressCounters;
use crate::session::SessionSummary;

/// A finished focus session. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: Uuid,
    pub duration_min: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub leave_count: u32,
    #[serde(default)]
    pub task_name: Option<String>,
    /// Weak reference: deleting a category leaves historical ids dangling.
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

impl StudySession {
    /// Construct the record for a finalized session, minting its id.
    pub fn from_summary(summary: SessionSummary) -> Self {
        Self {
            id: Uuid::new_v4(),
            duration_min: summary.duration_min,
            started_at: summary.started_at,
            ended_at: summary.ended_at,
            leave_count: summary.leave_count,
            task_name: summary.task_name,
            category_id: summary.category_id,
        }
    }
}

/// User-defined session tag. Color and icon are display hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
}

/// Partial counter update for the progress upsert. Only set fields are
/// serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goats: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cows: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today_minutes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_day_reset: Option<chrono::NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_goal_claimed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_goal_claimed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_goal_claimed: Option<bool>,
}

impl ProgressPatch {
    /// Full mirror of the in-memory counters (goal targets stay local).
    pub fn from_counters(counters: &ProgressCounters) -> Self {
        Self {
            hens: Some(counters.hens),
            goats: Some(counters.goats),
            cows: Some(counters.cows),
            today_minutes: Some(counters.today_minutes),
            last_day_reset: Some(counters.last_day_reset),
            daily_goal_claimed: Some(counters.daily_goal_claimed),
            weekly_goal_claimed: Some(counters.weekly_goal_claimed),
            monthly_goal_claimed: Some(counters.monthly_goal_claimed),
        }
    }

    pub fn animals(counters: &ProgressCounters) -> Self {
        Self {
            hens: Some(counters.hens),
            goats: Some(counters.goats),
            cows: Some(counters.cows),
            ..Self::default()
        }
    }
}

/// Logical operations against the progress store.
///
/// Implementations must degrade every operation to a successful no-op
/// (empty/false results) when no user is authenticated.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Fetch the user's counters, creating them with the starter gift on
    /// first contact. `Ok(None)` means "not signed in".
    async fn get_progress(&self) -> Result<Option<ProgressCounters>, StoreError>;

    /// Fire-and-forget partial upsert. Returns whether a write was issued.
    async fn update_progress(&self, patch: &ProgressPatch) -> Result<bool, StoreError>;

    /// Append-only session insert. Returns whether a write was issued.
    async fn insert_session(&self, session: &StudySession) -> Result<bool, StoreError>;

    /// Sessions from the last `since_days` days, newest first.
    async fn list_sessions(&self, since_days: u32) -> Result<Vec<StudySession>, StoreError>;

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn insert_category(&self, category: &Category) -> Result<bool, StoreError>;

    async fn delete_category(&self, id: Uuid) -> Result<bool, StoreError>;
}
