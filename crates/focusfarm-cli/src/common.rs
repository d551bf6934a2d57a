//! Shared helpers for CLI commands.

use chrono::Utc;
use focusfarm_core::remote::{AuthContext, RestProgressStore, SyncOutcome, SyncQueue, WriteIntent};
use focusfarm_core::storage::token_store;
use focusfarm_core::{Config, Database, FocusEngine, ProgressCounters};

pub const ENGINE_KEY: &str = "focus_engine";
pub const COUNTERS_KEY: &str = "progress";

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn load_engine(db: &Database) -> FocusEngine {
    if let Ok(Some(json)) = db.kv_get(ENGINE_KEY) {
        if let Ok(engine) = serde_json::from_str::<FocusEngine>(&json) {
            return engine;
        }
    }
    FocusEngine::new()
}

pub fn save_engine(db: &Database, engine: &FocusEngine) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine)?;
    db.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

/// Load the optimistic local counters, applying the config's goal-target
/// overrides and the calendar-day rollover. A rollover is persisted
/// immediately so it happens at most once per day no matter how many
/// commands run.
pub fn load_counters(db: &Database, config: &Config) -> ProgressCounters {
    let mut counters = db
        .kv_get(COUNTERS_KEY)
        .ok()
        .flatten()
        .and_then(|json| serde_json::from_str::<ProgressCounters>(&json).ok())
        .unwrap_or_else(|| ProgressCounters::starter(Utc::now().date_naive()));

    counters.daily_goal_hours = config.goals.daily_hours;
    counters.weekly_goal_hours = config.goals.weekly_hours;
    counters.monthly_goal_hours = config.goals.monthly_hours;

    if counters.roll_day(Utc::now().date_naive()) {
        if let Err(e) = save_counters(db, &counters) {
            tracing::warn!(error = %e, "failed to persist daily rollover");
        }
    }
    counters
}

pub fn save_counters(
    db: &Database,
    counters: &ProgressCounters,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(counters)?;
    db.kv_set(COUNTERS_KEY, &json)?;
    Ok(())
}

/// Identity for store requests: user id from the config, token from the OS
/// keyring. `None` means signed out.
pub fn auth_context(config: &Config) -> Option<AuthContext> {
    let user_id = config.backend.user_id.clone()?;
    let token = token_store::get().ok().flatten()?;
    Some(AuthContext { user_id, token })
}

pub fn build_store(config: &Config) -> Result<RestProgressStore, Box<dyn std::error::Error>> {
    Ok(RestProgressStore::new(
        &config.backend.base_url,
        auth_context(config),
    )?)
}

/// Run the given write intents through the sync queue and drain the
/// outcomes. With `surface_errors` the first failure is returned to the
/// user; otherwise failures stay as logged diagnostics and the local state
/// is kept as-is.
pub fn push_writes(
    config: &Config,
    intents: Vec<WriteIntent>,
    surface_errors: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if intents.is_empty() {
        return Ok(());
    }
    let store = build_store(config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let (queue, mut outcomes) = SyncQueue::spawn(store);
        let expected = intents.len();
        for intent in intents {
            queue.enqueue(intent);
        }
        drop(queue);

        let mut first_failure = None;
        for _ in 0..expected {
            match outcomes.recv().await {
                Some(SyncOutcome::Failed { intent, error }) => {
                    if first_failure.is_none() {
                        first_failure = Some(format!("{intent}: {error}"));
                    }
                }
                Some(SyncOutcome::Completed { .. }) => {}
                None => break,
            }
        }
        match first_failure {
            Some(message) if surface_errors => Err(message.into()),
            _ => Ok(()),
        }
    })
}
