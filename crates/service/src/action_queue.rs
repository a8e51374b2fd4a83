//! Queue-backed action dispatch and the local effect worker.
//!
//! Handlers hand committed workflow actions to a flume channel and return
//! right away. A background worker drains the channel, performs each
//! action against the snapshot store the way the server would, and closes
//! the pending confirmations of every page showing that pipeline.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use common::actions::{ActionRequest, SignoffAction};
use common::signoff::{CollectionRef, CollectionsInfo, SignoffStatus, Transition, WorkflowStep};

use crate::snapshots::SnapshotStore;

/// Configuration for the action queue
#[derive(Debug, Clone)]
pub struct ActionQueueConfig {
    /// Maximum number of queued actions. None means unbounded.
    pub max_queue_size: Option<usize>,
}

impl Default for ActionQueueConfig {
    fn default() -> Self {
        Self {
            max_queue_size: Some(64),
        }
    }
}

/// Create the action channel.
///
/// The sender is the dispatcher handed to the HTTP state; the receiver
/// goes to [`run_worker`].
pub fn action_queue(config: ActionQueueConfig) -> (flume::Sender<ActionRequest>, ActionReceiver) {
    let (tx, rx) = match config.max_queue_size {
        Some(size) => {
            tracing::info!("Creating bounded action queue with size {}", size);
            flume::bounded(size)
        }
        None => {
            tracing::info!("Creating unbounded action queue");
            flume::unbounded()
        }
    };
    (tx, ActionReceiver { rx })
}

/// Action receiver for the background worker
#[derive(Debug)]
pub struct ActionReceiver {
    rx: flume::Receiver<ActionRequest>,
}

impl ActionReceiver {
    /// Convert to an async stream for use in tokio::select!
    pub fn into_async(self) -> flume::r#async::RecvStream<'static, ActionRequest> {
        self.rx.into_stream()
    }

    /// Take the next queued action without waiting.
    pub fn try_recv(&self) -> Option<ActionRequest> {
        self.rx.try_recv().ok()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("no page shows the pipeline of {0}")]
    UnknownPipeline(CollectionRef),
    #[error("cannot {transition} while {step}")]
    WrongStep {
        transition: Transition,
        step: WorkflowStep,
    },
}

/// Perform `request` against the store.
///
/// On success returns the number of pages that now show the new state.
/// A rejected action leaves the pipeline untouched but still settles the
/// page that submitted it, so its modal does not stay busy forever.
pub fn execute_action(
    store: &SnapshotStore,
    request: &ActionRequest,
    now: &str,
) -> Result<usize, ActionError> {
    let source = store
        .source(&request.source)
        .ok_or_else(|| ActionError::UnknownPipeline(request.source.clone()))?;

    let transition = request.action.transition();
    let step = source.step();
    if !transition.sources().contains(&step) {
        store.complete_action(&request.source, transition, |_| {});
        return Err(ActionError::WrongStep { transition, step });
    }

    Ok(store.complete_action(&request.source, transition, |info| {
        apply_effects(info, request, now)
    }))
}

/// What the server does to a pipeline when it accepts an action.
fn apply_effects(info: &mut CollectionsInfo, request: &ActionRequest, now: &str) {
    let by = request.requested_by.clone();
    let now = Some(now.to_string());
    let source = &mut info.source;

    match &request.action {
        SignoffAction::RequestReview { comment } => {
            source.status = Some(SignoffStatus::ToReview);
            source.last_review_request_by = by;
            source.last_review_request_date = now;
            source.last_editor_comment = Some(comment.clone());
            // the preview now mirrors the source
            info.changes_on_preview = info.changes_on_source;
        }
        SignoffAction::ApproveChanges => {
            source.status = Some(SignoffStatus::Signed);
            source.last_review_by = by.clone();
            source.last_review_date = now.clone();
            source.last_reviewer_comment = None;
            source.last_signature_by = by;
            source.last_signature_date = now;
            info.changes_on_source = None;
            info.changes_on_preview = None;
        }
        SignoffAction::DeclineChanges { comment } => {
            source.status = Some(SignoffStatus::WorkInProgress);
            source.last_review_by = by;
            source.last_review_date = now;
            source.last_reviewer_comment = Some(comment.clone());
        }
        SignoffAction::RollbackChanges { comment } => {
            source.status = Some(SignoffStatus::WorkInProgress);
            source.last_edit_by = by;
            source.last_edit_date = now;
            source.last_editor_comment = Some(comment.clone());
            info.changes_on_source = None;
            info.changes_on_preview = None;
        }
    }
}

/// Run the background worker for queued actions
///
/// ```ignore
/// let (sender, receiver) = action_queue(ActionQueueConfig::default());
/// tokio::spawn(run_worker(store, receiver.into_async(), Duration::ZERO, shutdown_rx));
/// ```
pub async fn run_worker(
    store: Arc<SnapshotStore>,
    mut action_stream: flume::r#async::RecvStream<'static, ActionRequest>,
    effect_delay: Duration,
    mut shutdown_rx: watch::Receiver<()>,
) {
    use futures::StreamExt;

    tracing::info!("Starting action worker");

    loop {
        tokio::select! {
            Some(request) = action_stream.next() => {
                if !effect_delay.is_zero() {
                    tokio::time::sleep(effect_delay).await;
                }
                let now = chrono::Utc::now().to_rfc3339();
                match execute_action(&store, &request, &now) {
                    Ok(pages) => tracing::info!(
                        source = %request.source,
                        transition = %request.action.transition(),
                        pages,
                        "signoff action applied"
                    ),
                    Err(ActionError::UnknownPipeline(source)) => tracing::debug!(
                        %source,
                        "discarding action result, pipeline no longer shown"
                    ),
                    Err(e) => tracing::warn!(source = %request.source, "signoff action rejected: {}", e),
                }
            }

            _ = shutdown_rx.changed() => {
                tracing::info!("Action worker received shutdown signal");
                break;
            }

            // Stream closed (all senders dropped)
            else => {
                tracing::info!("Action queue closed, shutting down worker");
                break;
            }
        }
    }

    tracing::info!("Action worker shutting down");
}
