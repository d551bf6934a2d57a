//! Fire-and-forget write queue.
//!
//! The second phase of the optimistic-write contract: a caller that has
//! already mutated local state enqueues the durable write here and moves on.
//! A spawned worker performs the writes in order and publishes each outcome
//! on a channel, so the eventual failure of a write stays inspectable
//! without ever blocking the caller.

use tokio::sync::mpsc;
use uuid::Uuid;

use super::{Category, ProgressPatch, ProgressStore, StudySession};

/// One durable write to perform.
#[derive(Debug, Clone)]
pub enum WriteIntent {
    UpdateProgress(ProgressPatch),
    InsertSession(StudySession),
    InsertCategory(Category),
    DeleteCategory(Uuid),
}

impl WriteIntent {
    pub fn kind(&self) -> &'static str {
        match self {
            WriteIntent::UpdateProgress(_) => "update_progress",
            WriteIntent::InsertSession(_) => "insert_session",
            WriteIntent::InsertCategory(_) => "insert_category",
            WriteIntent::DeleteCategory(_) => "delete_category",
        }
    }
}

/// Terminal result of one enqueued write.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "sync", rename_all = "snake_case")]
pub enum SyncOutcome {
    Completed { intent: &'static str },
    Failed { intent: &'static str, error: String },
}

/// Handle for enqueueing writes. Dropping every handle ends the worker once
/// the queue drains.
#[derive(Clone)]
pub struct SyncQueue {
    tx: mpsc::UnboundedSender<WriteIntent>,
}

impl SyncQueue {
    /// Spawn the worker onto the current tokio runtime. Returns the queue
    /// handle and the outcome channel.
    pub fn spawn<S>(store: S) -> (Self, mpsc::UnboundedReceiver<SyncOutcome>)
    where
        S: ProgressStore + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<WriteIntent>();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel::<SyncOutcome>();

        tokio::spawn(async move {
            while let Some(intent) = rx.recv().await {
                let kind = intent.kind();
                let result = match &intent {
                    WriteIntent::UpdateProgress(patch) => {
                        store.update_progress(patch).await.map(|_| ())
                    }
                    WriteIntent::InsertSession(session) => {
                        store.insert_session(session).await.map(|_| ())
                    }
                    WriteIntent::InsertCategory(category) => {
                        store.insert_category(category).await.map(|_| ())
                    }
                    WriteIntent::DeleteCategory(id) => {
                        store.delete_category(*id).await.map(|_| ())
                    }
                };
                let outcome = match result {
                    Ok(()) => SyncOutcome::Completed { intent: kind },
                    Err(e) => {
                        tracing::warn!(intent = kind, error = %e, "remote write failed");
                        SyncOutcome::Failed {
                            intent: kind,
                            error: e.to_string(),
                        }
                    }
                };
                // Nobody listening is fine: outcomes are advisory.
                let _ = outcome_tx.send(outcome);
            }
        });

        (Self { tx }, outcome_rx)
    }

    /// Never blocks. An intent enqueued after the worker is gone is dropped
    /// with a logged diagnostic.
    pub fn enqueue(&self, intent: WriteIntent) {
        let kind = intent.kind();
        if self.tx.send(intent).is_err() {
            tracing::warn!(intent = kind, "sync worker gone; write intent dropped");
        }
    }
}
