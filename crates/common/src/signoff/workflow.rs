//! The three-step publishing workflow.
//!
//! ```text
//!                  request review                approve
//!  WorkInProgress ───────────────▶ ToReview ───────────────▶ Signed
//!        ▲                            │                        │
//!        └─────── decline ────────────┘                        │
//!        └─────── rollback (from WorkInProgress or ToReview)   │
//!        └─────────────────── next edit (server side) ─────────┘
//! ```
//!
//! The step is never stored. It is recomputed from the server's `status`
//! on every render, so a reload always shows the same thing and a failed
//! action simply leaves the step where it was.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::SessionState;

use super::groups::GroupMembershipResolver;
use super::{SignoffSource, SignoffStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkflowStep {
    WorkInProgress = 0,
    ToReview = 1,
    Signed = 2,
}

impl WorkflowStep {
    pub const ALL: [WorkflowStep; 3] = [
        WorkflowStep::WorkInProgress,
        WorkflowStep::ToReview,
        WorkflowStep::Signed,
    ];

    /// `to-review` is step 1, `signed` is step 2, anything else (including
    /// no status at all) is step 0.
    pub fn from_status(status: Option<&SignoffStatus>) -> Self {
        match status {
            Some(SignoffStatus::ToReview) => WorkflowStep::ToReview,
            Some(SignoffStatus::Signed) => WorkflowStep::Signed,
            _ => WorkflowStep::WorkInProgress,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn title(self) -> &'static str {
        match self {
            WorkflowStep::WorkInProgress => "Work in progress",
            WorkflowStep::ToReview => "Waiting review",
            WorkflowStep::Signed => "Approved",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    RequestReview,
    Approve,
    Decline,
    Rollback,
}

impl Transition {
    pub const ALL: [Transition; 4] = [
        Transition::RequestReview,
        Transition::Approve,
        Transition::Decline,
        Transition::Rollback,
    ];

    /// Steps this transition may start from.
    pub fn sources(self) -> &'static [WorkflowStep] {
        match self {
            Transition::RequestReview => &[WorkflowStep::WorkInProgress],
            Transition::Approve | Transition::Decline => &[WorkflowStep::ToReview],
            Transition::Rollback => &[WorkflowStep::WorkInProgress, WorkflowStep::ToReview],
        }
    }

    /// Step the server reports once the transition went through.
    pub fn target(self) -> WorkflowStep {
        match self {
            Transition::RequestReview => WorkflowStep::ToReview,
            Transition::Approve => WorkflowStep::Signed,
            Transition::Decline | Transition::Rollback => WorkflowStep::WorkInProgress,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::RequestReview => write!(f, "request review"),
            Transition::Approve => write!(f, "approve changes"),
            Transition::Decline => write!(f, "decline changes"),
            Transition::Rollback => write!(f, "rollback changes"),
        }
    }
}

/// Why a transition is not available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuardRefusal {
    #[error("cannot {transition} while the collection is {step}")]
    WrongStep {
        transition: Transition,
        step: WorkflowStep,
    },
    #[error("the collection is already signed")]
    AlreadySigned,
    #[error("no write permission on this collection")]
    NoWritePermission,
    #[error("not a member of the editors group")]
    NotEditor,
    #[error("not a member of the reviewers group")]
    NotReviewer,
    #[error("cannot review your own review request")]
    SelfReview,
    #[error("nothing to review: the collection was never edited")]
    NothingToReview,
}

/// Everything the transition guards depend on, evaluated once per render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowGuards {
    pub step: WorkflowStep,
    pub can_edit: bool,
    pub is_editor: bool,
    pub is_reviewer: bool,
    pub has_requested_review: bool,
    /// `last_edit_date` is set on the source.
    pub has_edits: bool,
}

impl WorkflowGuards {
    /// Evaluate the guards for `source` as seen from the collection page
    /// `bid`/`cid`. Write permission is checked on the page being viewed.
    pub fn evaluate(session: &SessionState, bid: &str, cid: &str, source: &SignoffSource) -> Self {
        let resolver = GroupMembershipResolver::from_session(session);
        Self {
            step: source.step(),
            can_edit: session.auth().can_edit_collection(bid, cid),
            is_editor: resolver.is_editor(Some(source)),
            is_reviewer: resolver.is_reviewer(Some(source)),
            has_requested_review: resolver.has_requested_review(Some(source)),
            has_edits: source.last_edit_date.is_some(),
        }
    }

    pub fn check(&self, transition: Transition) -> Result<(), GuardRefusal> {
        if !transition.sources().contains(&self.step) {
            if self.step == WorkflowStep::Signed && transition == Transition::Rollback {
                return Err(GuardRefusal::AlreadySigned);
            }
            return Err(GuardRefusal::WrongStep {
                transition,
                step: self.step,
            });
        }
        if !self.can_edit {
            return Err(GuardRefusal::NoWritePermission);
        }
        match transition {
            Transition::RequestReview => {
                if !self.is_editor {
                    return Err(GuardRefusal::NotEditor);
                }
                if !self.has_edits {
                    return Err(GuardRefusal::NothingToReview);
                }
            }
            Transition::Approve | Transition::Decline => {
                if !self.is_reviewer {
                    return Err(GuardRefusal::NotReviewer);
                }
                if self.has_requested_review {
                    return Err(GuardRefusal::SelfReview);
                }
            }
            Transition::Rollback => {}
        }
        Ok(())
    }

    pub fn allows(&self, transition: Transition) -> bool {
        self.check(transition).is_ok()
    }

    /// Transitions the current user may take from the current step.
    pub fn available(&self) -> Vec<Transition> {
        Transition::ALL
            .into_iter()
            .filter(|transition| self.allows(*transition))
            .collect()
    }
}
