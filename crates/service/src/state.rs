use std::sync::Arc;

use common::actions::ActionRequest;
use common::session::SessionState;

use super::action_queue::{action_queue, ActionQueueConfig, ActionReceiver};
use super::config::Config;
use super::snapshots::{SnapshotError, SnapshotStore};

/// Main service state, shared by every handler
#[derive(Clone)]
pub struct State {
    snapshots: Arc<SnapshotStore>,
    action_sender: flume::Sender<ActionRequest>,
}

impl State {
    /// Load the snapshots and set up the action queue.
    ///
    /// Returns the receiver half of the queue, to be handed to the worker.
    pub fn from_config(config: &Config) -> Result<(Self, ActionReceiver), StateSetupError> {
        let snapshots = match config.snapshot_path {
            Some(ref path) => {
                if !path.exists() {
                    return Err(StateSetupError::SnapshotPathDoesNotExist(
                        path.display().to_string(),
                    ));
                }
                SnapshotStore::load(path)?
            }
            None => {
                tracing::warn!("no snapshot file configured, starting with an empty session");
                SnapshotStore::new(SessionState::default())
            }
        };

        let (action_sender, receiver) = action_queue(ActionQueueConfig {
            max_queue_size: config.max_queue_size,
        });

        Ok((Self::new(Arc::new(snapshots), action_sender), receiver))
    }

    pub fn new(snapshots: Arc<SnapshotStore>, action_sender: flume::Sender<ActionRequest>) -> Self {
        Self {
            snapshots,
            action_sender,
        }
    }

    pub fn snapshots(&self) -> &Arc<SnapshotStore> {
        &self.snapshots
    }

    pub fn dispatcher(&self) -> &flume::Sender<ActionRequest> {
        &self.action_sender
    }
}

impl AsRef<SnapshotStore> for State {
    fn as_ref(&self) -> &SnapshotStore {
        &self.snapshots
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("snapshot path does not exist: {0}")]
    SnapshotPathDoesNotExist(String),
    #[error("snapshot setup error: {0}")]
    Snapshot(#[from] SnapshotError),
}
