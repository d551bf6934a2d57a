//! # FocusFarm Core Library
//!
//! Core business logic for FocusFarm, the focus timer that grows a farm.
//! All operations are available through this library and the standalone CLI
//! binary; a GUI shell is a thin layer over the same core.
//!
//! ## Architecture
//!
//! - **Session Engine**: a wall-clock-based count-up state machine. The
//!   caller ticks it while foregrounded and forwards the host's lifecycle
//!   signals; time spent backgrounded is credited from the wall clock on
//!   return, so throttled timers cannot lose focus time.
//! - **Ledger**: the hen/goat/cow counters, goal claims, and conversions.
//!   Pure in-memory arithmetic; every mutation is followed by its own
//!   durable write.
//! - **Analytics**: deterministic bucketing of session history into the
//!   dashboard's hour/weekday/day/month views.
//! - **Remote**: REST client for the hosted progress store plus the
//!   fire-and-forget write queue.
//! - **Storage**: TOML configuration and the SQLite session/kv cache.
//!
//! ## Key Components
//!
//! - [`FocusEngine`]: session state machine
//! - [`ProgressCounters`]: reward ledger
//! - [`RestProgressStore`] / [`SyncQueue`]: remote persistence
//! - [`Database`] / [`Config`]: local storage

pub mod analytics;
pub mod error;
pub mod events;
pub mod ledger;
pub mod remote;
pub mod session;
pub mod storage;

pub use analytics::{build_report, ActivityReport, Bucket, DayCell, TimeFrame};
pub use error::{ConfigError, CoreError, DatabaseError, StoreError, ValidationError};
pub use events::Event;
pub use ledger::{Animal, ClaimOutcome, GoalPeriod, ProgressCounters};
pub use remote::{
    AuthContext, Category, ProgressPatch, ProgressStore, RestProgressStore, StudySession,
    SyncOutcome, SyncQueue, WriteIntent,
};
pub use session::{FocusEngine, IdleDimmer, SessionState, SessionSummary, StopOutcome};
pub use storage::{Config, Database};
