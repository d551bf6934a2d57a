//! End-to-end lifecycle: a focus session runs through backgrounding, gets
//! finalized, feeds the ledger and the local cache, and the goal claims
//! come out of the cached history.

use chrono::{Datelike, Utc};
use focusfarm_core::analytics::{frame_range, minutes_in_range, TimeFrame};
use focusfarm_core::ledger::{weekly_claim_key, ProgressCounters};
use focusfarm_core::{Database, Event, FocusEngine, SessionState, StopOutcome, StudySession};

const T0: u64 = 1_754_000_000_000;

#[test]
fn session_to_ledger_to_claims() {
    let db = Database::open_memory().unwrap();
    let mut engine = FocusEngine::new();
    let mut counters = ProgressCounters::starter(Utc::now().date_naive());

    engine.start_at(T0, Some("thesis".into()), None);

    // 20 minutes of focus, then the phone is picked up for 40 seconds.
    engine.tick_at(T0 + 20 * 60_000);
    let events = engine.on_background_at(T0 + 20 * 60_000);
    assert!(matches!(events[0], Event::LeaveRecorded { leave_count: 1, .. }));
    let events = engine.on_foreground_at(T0 + 20 * 60_000 + 40_000, counters.hens);
    assert!(events.iter().any(|e| matches!(e, Event::LeaveNoticed { .. })));

    // Another 380 minutes of focus to clear the daily goal.
    let end = T0 + 400 * 60_000 + 40_000;
    engine.tick_at(end);

    let summary = match engine.stop_at(end) {
        Some(StopOutcome::Finished(summary)) => summary,
        other => panic!("expected a finished session, got {other:?}"),
    };
    assert_eq!(engine.state(), SessionState::Ended);
    assert_eq!(summary.duration_min, 400);
    assert_eq!(summary.leave_count, 1);

    // Hand-off: ledger first, then the local cache.
    counters.add_study_time(summary.duration_min);
    let session = StudySession::from_summary(summary);
    db.record_session(&session).unwrap();

    assert_eq!(counters.today_minutes, 400);
    assert!(counters.claim_daily().granted());
    assert_eq!(counters.hens, 2);

    // Weekly claim: range sum from the cache, marker from the kv table.
    let today = Utc::now().date_naive();
    let (week_start, week_end) = frame_range(TimeFrame::Week, today);
    let cached = db.sessions_since(7).unwrap();
    let minutes = minutes_in_range(&cached, week_start, week_end);
    assert_eq!(minutes, 400);

    let marker = weekly_claim_key(today);
    let already = db.kv_get(&marker).unwrap().is_some();
    assert!(!already);
    // 400 minutes is under the default 30-hour weekly target.
    assert!(!counters.claim_weekly(minutes, already).granted());
    assert!(counters
        .claim_weekly(30 * 60, already)
        .granted());
    db.kv_set(&marker, "1").unwrap();
    assert!(db.kv_get(&marker).unwrap().is_some());
    assert_eq!(counters.goats, 2);
}

#[test]
fn too_short_session_is_never_persisted() {
    let db = Database::open_memory().unwrap();
    let mut engine = FocusEngine::new();
    engine.start_at(T0, None, None);

    match engine.stop_at(T0 + 45_000) {
        Some(StopOutcome::TooShort { elapsed_secs: 45 }) => {}
        other => panic!("expected too-short outcome, got {other:?}"),
    }
    // The user gives up: discard, nothing reaches the cache or the ledger.
    engine.discard_at(T0 + 50_000);
    assert!(db.sessions_since(1).unwrap().is_empty());
}

#[test]
fn engine_survives_process_restart_via_kv() {
    let db = Database::open_memory().unwrap();
    let mut engine = FocusEngine::new();
    engine.start_at(T0, Some("drill".into()), None);
    engine.tick_at(T0 + 90_000);

    db.kv_set("focus_engine", &serde_json::to_string(&engine).unwrap())
        .unwrap();

    let raw = db.kv_get("focus_engine").unwrap().unwrap();
    let mut restored: FocusEngine = serde_json::from_str(&raw).unwrap();
    assert_eq!(restored.elapsed_secs(), 90);
    let summary = restored.finish_at(T0 + 120_000).unwrap();
    assert_eq!(summary.duration_min, 2);
    assert_eq!(summary.task_name.as_deref(), Some("drill"));
}

#[test]
fn rollover_applies_once_across_repeated_loads() {
    let db = Database::open_memory().unwrap();
    let yesterday = Utc::now().date_naive().pred_opt().unwrap();
    let mut counters = ProgressCounters::starter(yesterday);
    counters.add_study_time(300);
    counters.daily_goal_claimed = true;
    db.kv_set("progress", &serde_json::to_string(&counters).unwrap())
        .unwrap();

    // Simulate the app opening several times today.
    let today = Utc::now().date_naive();
    let mut resets = 0;
    for _ in 0..3 {
        let raw = db.kv_get("progress").unwrap().unwrap();
        let mut loaded: ProgressCounters = serde_json::from_str(&raw).unwrap();
        if loaded.roll_day(today) {
            resets += 1;
            db.kv_set("progress", &serde_json::to_string(&loaded).unwrap())
                .unwrap();
        }
    }
    assert_eq!(resets, 1);

    let raw = db.kv_get("progress").unwrap().unwrap();
    let final_state: ProgressCounters = serde_json::from_str(&raw).unwrap();
    assert_eq!(final_state.today_minutes, 0);
    assert!(!final_state.daily_goal_claimed);
    assert_eq!(final_state.last_day_reset.day(), today.day());
}
