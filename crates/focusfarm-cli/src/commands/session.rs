use chrono::Utc;
use clap::Subcommand;
use focusfarm_core::remote::{ProgressPatch, WriteIntent};
use focusfarm_core::{
    Config, Database, Event, FocusEngine, SessionState, StopOutcome, StudySession,
};
use uuid::Uuid;

use crate::common;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a focus session
    Start {
        /// What the session is for
        #[arg(long)]
        task: Option<String>,
        /// Category id to tag the session with
        #[arg(long)]
        category: Option<Uuid>,
    },
    /// Pause the running session
    Pause,
    /// Resume a paused session
    Resume,
    /// Record the app leaving the foreground
    Background,
    /// Record the app returning to the foreground
    Foreground,
    /// Confirm the pending leave penalty
    ConfirmPenalty,
    /// Print current session state as JSON
    Status,
    /// Stop the session; persists once a full minute has accrued
    Stop,
    /// Finish the session (requires a full minute)
    Finish,
    /// Discard a session without persisting it
    Discard,
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load()?;
    let mut engine = common::load_engine(&db);

    match action {
        SessionAction::Start { task, category } => {
            if matches!(engine.state(), SessionState::Running | SessionState::Paused) {
                return Err("a focus session is already active".into());
            }
            engine = FocusEngine::new();
            if let Some(event) = engine.start(task, category) {
                common::print_json(&event)?;
            }
        }
        SessionAction::Pause => match engine.pause() {
            Some(event) => common::print_json(&event)?,
            None => common::print_json(&engine.snapshot())?,
        },
        SessionAction::Resume => match engine.resume() {
            Some(event) => common::print_json(&event)?,
            None => common::print_json(&engine.snapshot())?,
        },
        SessionAction::Background => {
            for event in engine.on_background() {
                common::print_json(&event)?;
            }
        }
        SessionAction::Foreground => {
            let counters = common::load_counters(&db, &config);
            for event in engine.on_foreground(counters.hens) {
                common::print_json(&event)?;
            }
        }
        SessionAction::ConfirmPenalty => match engine.confirm_penalty() {
            Some(Event::PenaltyConfirmed { hens_deducted, at }) => {
                let mut counters = common::load_counters(&db, &config);
                counters.apply_penalty(hens_deducted);
                common::save_counters(&db, &counters)?;
                // Background write: a failure is tolerated and logged.
                let _ = common::push_writes(
                    &config,
                    vec![WriteIntent::UpdateProgress(ProgressPatch::animals(&counters))],
                    false,
                );
                common::print_json(&Event::PenaltyConfirmed { hens_deducted, at })?;
            }
            _ => return Err("no penalty is pending".into()),
        },
        SessionAction::Status => {
            engine.tick();
            common::print_json(&engine.snapshot())?;
        }
        SessionAction::Stop => match engine.stop() {
            Some(outcome @ StopOutcome::TooShort { .. }) => {
                common::print_json(&outcome)?;
                eprintln!("session is under a minute: keep focusing, or run `session discard`");
            }
            Some(StopOutcome::Finished(summary)) => {
                finalize(&db, &config, summary)?;
            }
            None => return Err("no active session".into()),
        },
        SessionAction::Finish => match engine.finish() {
            Some(summary) => finalize(&db, &config, summary)?,
            None => return Err("no active session with a full minute of focus".into()),
        },
        SessionAction::Discard => match engine.discard() {
            Some(event) => common::print_json(&event)?,
            None => return Err("no active session".into()),
        },
    }

    common::save_engine(&db, &engine)?;
    Ok(())
}

/// Hand-off for a finalized session: credit the ledger, cache the record,
/// then enqueue the remote writes.
fn finalize(
    db: &Database,
    config: &Config,
    summary: focusfarm_core::SessionSummary,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut counters = common::load_counters(db, config);
    counters.add_study_time(summary.duration_min);
    common::save_counters(db, &counters)?;

    let ended = Event::SessionEnded {
        duration_min: summary.duration_min,
        leave_count: summary.leave_count,
        at: Utc::now(),
    };
    let session = StudySession::from_summary(summary);
    db.record_session(&session)?;

    let _ = common::push_writes(
        config,
        vec![
            WriteIntent::InsertSession(session),
            WriteIntent::UpdateProgress(ProgressPatch::from_counters(&counters)),
        ],
        false,
    );

    common::print_json(&ended)
}
