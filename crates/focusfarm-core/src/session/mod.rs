mod engine;
mod idle_dim;

pub use engine::{
    FocusEngine, SessionState, SessionSummary, StopOutcome, LEAVE_NOTICE_SECS, MIN_PERSIST_SECS,
    PENALTY_HENS, PENALTY_LEAVE_THRESHOLD,
};
pub use idle_dim::{IdleDimmer, IDLE_DIM_SECS};

pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
