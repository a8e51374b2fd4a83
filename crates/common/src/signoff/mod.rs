//! # Review and signoff
//!
//! A signed collection exists in up to three places:
//!
//! ```text
//!   source (editable) --request review--> preview (optional) --approve--> destination (signed)
//! ```
//!
//! The server tracks where the source is in that pipeline with a `status`
//! field and a handful of who/when fields. Everything in this module is a
//! derivation over that snapshot:
//!
//! - [`groups`] decides whether the user is an editor or reviewer
//! - [`workflow`] maps `status` to a step and gates the transitions
//! - [`changes`] summarizes the pending diff
//! - [`confirm`] holds the single pending confirmation modal
//! - [`toolbar`] composes the above into the three-panel progress view
//!
//! No local state ever advances the workflow. A committed action goes out
//! through an [`ActionDispatcher`](crate::actions::ActionDispatcher) and the
//! next snapshot decides what is shown.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod changes;
pub mod confirm;
pub mod groups;
pub mod toolbar;
pub mod workflow;

pub use changes::{ChangeSummary, ChangesList};
pub use confirm::{
    ConfirmError, ConfirmationController, ConfirmationKind, PendingConfirmation, SubmitGuard,
};
pub use groups::{resolve_template, GroupKey, GroupMembershipResolver};
pub use toolbar::{ActionButton, ConfirmationView, StepPanel, ToolbarView, UserIntent};
pub use workflow::{GuardRefusal, Transition, WorkflowGuards, WorkflowStep};

/// The `status` field of a signed source collection.
///
/// Unknown values are kept verbatim in [`SignoffStatus::Other`] and treated
/// as work in progress.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignoffStatus {
    WorkInProgress,
    ToReview,
    Signed,
    Other(String),
}

impl SignoffStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SignoffStatus::WorkInProgress => "work-in-progress",
            SignoffStatus::ToReview => "to-review",
            SignoffStatus::Signed => "signed",
            SignoffStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for SignoffStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "work-in-progress" => SignoffStatus::WorkInProgress,
            "to-review" => SignoffStatus::ToReview,
            "signed" => SignoffStatus::Signed,
            _ => SignoffStatus::Other(value),
        }
    }
}

impl From<SignoffStatus> for String {
    fn from(status: SignoffStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for SignoffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A `(bucket, collection)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionRef {
    pub bid: String,
    pub cid: String,
}

impl CollectionRef {
    pub fn new(bid: impl Into<String>, cid: impl Into<String>) -> Self {
        Self {
            bid: bid.into(),
            cid: cid.into(),
        }
    }

    pub fn is(&self, bid: &str, cid: &str) -> bool {
        self.bid == bid && self.cid == cid
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bid, self.cid)
    }
}

/// Signoff metadata of the source collection, as reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignoffSource {
    pub bid: String,
    pub cid: String,
    #[serde(default)]
    pub status: Option<SignoffStatus>,
    /// Per-collection override of the signer's editors group.
    #[serde(default)]
    pub editors_group: Option<String>,
    /// Per-collection override of the signer's reviewers group.
    #[serde(default)]
    pub reviewers_group: Option<String>,
    #[serde(default)]
    pub last_edit_by: Option<String>,
    #[serde(default)]
    pub last_edit_date: Option<String>,
    #[serde(default)]
    pub last_review_request_by: Option<String>,
    #[serde(default)]
    pub last_review_request_date: Option<String>,
    #[serde(default)]
    pub last_editor_comment: Option<String>,
    #[serde(default)]
    pub last_review_by: Option<String>,
    #[serde(default)]
    pub last_review_date: Option<String>,
    #[serde(default)]
    pub last_reviewer_comment: Option<String>,
    #[serde(default)]
    pub last_signature_by: Option<String>,
    #[serde(default)]
    pub last_signature_date: Option<String>,
}

impl SignoffSource {
    pub fn collection(&self) -> CollectionRef {
        CollectionRef::new(self.bid.as_str(), self.cid.as_str())
    }

    pub fn step(&self) -> WorkflowStep {
        WorkflowStep::from_status(self.status.as_ref())
    }

    pub fn is_signed(&self) -> bool {
        matches!(self.status, Some(SignoffStatus::Signed))
    }
}

/// Everything the server reports about the signed collection being viewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionsInfo {
    pub source: SignoffSource,
    pub destination: CollectionRef,
    #[serde(default)]
    pub preview: Option<CollectionRef>,
    #[serde(default)]
    pub changes_on_source: Option<ChangesList>,
    #[serde(default)]
    pub changes_on_preview: Option<ChangesList>,
}

/// Signoff state of one collection view.
///
/// `collections_info` is `None` when the signer is disabled or the viewed
/// collection is not part of a signed pipeline; the toolbar then renders
/// nothing. The confirmation slot is view-local and never serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignoffState {
    #[serde(default)]
    pub collections_info: Option<CollectionsInfo>,
    #[serde(skip)]
    pub confirmation: ConfirmationController,
}

impl SignoffState {
    pub fn new(collections_info: Option<CollectionsInfo>) -> Self {
        Self {
            collections_info,
            confirmation: ConfirmationController::default(),
        }
    }

    pub fn source(&self) -> Option<&SignoffSource> {
        self.collections_info.as_ref().map(|info| &info.source)
    }
}
