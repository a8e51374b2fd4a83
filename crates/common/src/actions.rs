//! Workflow actions and their dispatch.
//!
//! Committing a workflow action is a request to the server. The core only
//! hands an [`ActionRequest`] to an [`ActionDispatcher`] and returns; the
//! result comes back as a new snapshot. Dispatch must not block.

use serde::{Deserialize, Serialize};

use crate::signoff::{CollectionRef, Transition};

/// A workflow-mutating request against a source collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignoffAction {
    RequestReview { comment: String },
    ApproveChanges,
    DeclineChanges { comment: String },
    RollbackChanges { comment: String },
}

impl SignoffAction {
    pub fn transition(&self) -> Transition {
        match self {
            SignoffAction::RequestReview { .. } => Transition::RequestReview,
            SignoffAction::ApproveChanges => Transition::Approve,
            SignoffAction::DeclineChanges { .. } => Transition::Decline,
            SignoffAction::RollbackChanges { .. } => Transition::Rollback,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            SignoffAction::RequestReview { comment }
            | SignoffAction::DeclineChanges { comment }
            | SignoffAction::RollbackChanges { comment } => Some(comment),
            SignoffAction::ApproveChanges => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// The source collection of the pipeline.
    pub source: CollectionRef,
    pub action: SignoffAction,
    /// User id of the requester, when known.
    pub requested_by: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("action queue is full")]
    QueueFull,
    #[error("action worker has stopped")]
    Disconnected,
}

/// Sends committed actions to whatever performs them.
pub trait ActionDispatcher {
    fn dispatch(&self, request: ActionRequest) -> Result<(), DispatchError>;
}

impl ActionDispatcher for flume::Sender<ActionRequest> {
    fn dispatch(&self, request: ActionRequest) -> Result<(), DispatchError> {
        tracing::debug!(source = %request.source, transition = %request.action.transition(), "dispatching signoff action");
        self.try_send(request).map_err(|e| match e {
            flume::TrySendError::Full(_) => DispatchError::QueueFull,
            flume::TrySendError::Disconnected(_) => DispatchError::Disconnected,
        })
    }
}
