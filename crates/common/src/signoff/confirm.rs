//! The pending confirmation modal.
//!
//! Requesting a review, declining changes and rolling back all ask for a
//! comment first. At most one of those modals exists per collection view,
//! so the controller is a single optional slot rather than a flag per kind.
//!
//! Committing puts the slot in a submitting state that disables the
//! modal's controls until the caller closes it. Approving has no modal,
//! so the controller also records which transition is in flight. While
//! that marker is set no other workflow action can start from this view,
//! however fast the user clicks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::actions::SignoffAction;

use super::workflow::Transition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfirmationKind {
    RequestReview,
    Decline,
    Rollback,
}

impl ConfirmationKind {
    pub fn slug(&self) -> &'static str {
        match self {
            ConfirmationKind::RequestReview => "request-review",
            ConfirmationKind::Decline => "decline",
            ConfirmationKind::Rollback => "rollback",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConfirmationKind::RequestReview => "Leave some notes for the reviewer:",
            ConfirmationKind::Decline => "Leave some notes for the editor:",
            ConfirmationKind::Rollback => {
                "This will reset the collection to the latest approved content. \
                 Any pending change will be lost. Leave a note:"
            }
        }
    }

    pub fn confirm_label(&self) -> &'static str {
        match self {
            ConfirmationKind::RequestReview => "Request review",
            ConfirmationKind::Decline => "Decline changes",
            ConfirmationKind::Rollback => "Rollback",
        }
    }

    pub fn transition(&self) -> Transition {
        match self {
            ConfirmationKind::RequestReview => Transition::RequestReview,
            ConfirmationKind::Decline => Transition::Decline,
            ConfirmationKind::Rollback => Transition::Rollback,
        }
    }

    /// The workflow action committing this confirmation performs.
    pub fn action(&self, comment: String) -> SignoffAction {
        match self {
            ConfirmationKind::RequestReview => SignoffAction::RequestReview { comment },
            ConfirmationKind::Decline => SignoffAction::DeclineChanges { comment },
            ConfirmationKind::Rollback => SignoffAction::RollbackChanges { comment },
        }
    }
}

impl fmt::Display for ConfirmationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown confirmation: {0}")]
pub struct UnknownConfirmation(String);

impl FromStr for ConfirmationKind {
    type Err = UnknownConfirmation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "request-review" => Ok(ConfirmationKind::RequestReview),
            "decline" => Ok(ConfirmationKind::Decline),
            "rollback" => Ok(ConfirmationKind::Rollback),
            other => Err(UnknownConfirmation(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfirmError {
    #[error("no confirmation is pending")]
    NothingPending,
    #[error("a {0} confirmation is already being submitted")]
    AlreadySubmitting(ConfirmationKind),
    #[error("{0} is still in progress")]
    InFlight(Transition),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub kind: ConfirmationKind,
    pub comment: String,
    /// Set once committed; the modal's controls are disabled.
    pub submitting: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ConfirmationController {
    slot: Option<PendingConfirmation>,
    in_flight: Option<Transition>,
}

impl ConfirmationController {
    pub fn pending(&self) -> Option<&PendingConfirmation> {
        self.slot.as_ref()
    }

    pub fn kind(&self) -> Option<ConfirmationKind> {
        self.slot.as_ref().map(|pending| pending.kind)
    }

    pub fn is_submitting(&self) -> bool {
        self.slot.as_ref().is_some_and(|pending| pending.submitting)
    }

    /// The workflow action dispatched from this view and not yet landed.
    pub fn in_flight(&self) -> Option<Transition> {
        self.in_flight
    }

    fn ensure_not_submitting(&self) -> Result<(), ConfirmError> {
        match &self.slot {
            Some(pending) if pending.submitting => Err(ConfirmError::AlreadySubmitting(pending.kind)),
            _ => Ok(()),
        }
    }

    fn ensure_idle(&self) -> Result<(), ConfirmError> {
        self.ensure_not_submitting()?;
        match self.in_flight {
            Some(transition) => Err(ConfirmError::InFlight(transition)),
            None => Ok(()),
        }
    }

    /// Open a confirmation, replacing whichever one was open.
    pub fn open(&mut self, kind: ConfirmationKind) -> Result<(), ConfirmError> {
        self.ensure_idle()?;
        if let Some(previous) = self.slot.take() {
            tracing::debug!(previous = %previous.kind, next = %kind, "replacing pending confirmation");
        }
        self.slot = Some(PendingConfirmation {
            kind,
            comment: String::new(),
            submitting: false,
        });
        Ok(())
    }

    pub fn confirm_request_review(&mut self) -> Result<(), ConfirmError> {
        self.open(ConfirmationKind::RequestReview)
    }

    pub fn confirm_decline_changes(&mut self) -> Result<(), ConfirmError> {
        self.open(ConfirmationKind::Decline)
    }

    pub fn confirm_rollback_changes(&mut self) -> Result<(), ConfirmError> {
        self.open(ConfirmationKind::Rollback)
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) -> Result<(), ConfirmError> {
        self.ensure_not_submitting()?;
        let pending = self.slot.as_mut().ok_or(ConfirmError::NothingPending)?;
        pending.comment = comment.into();
        Ok(())
    }

    /// Cancel the pending confirmation without side effects.
    ///
    /// Refused while submitting: the cancel button is disabled then.
    pub fn cancel(&mut self) -> Result<Option<ConfirmationKind>, ConfirmError> {
        self.ensure_not_submitting()?;
        Ok(self.slot.take().map(|pending| pending.kind))
    }

    /// Commit the pending confirmation with `comment`.
    ///
    /// The slot enters the submitting state and the returned guard carries
    /// the action to dispatch. If the guard is dropped before
    /// [`SubmitGuard::dispatched`] is called, the submitting state is
    /// reset so the modal can be used again.
    pub fn commit(&mut self, comment: impl Into<String>) -> Result<SubmitGuard<'_>, ConfirmError> {
        self.ensure_idle()?;
        let pending = self.slot.as_mut().ok_or(ConfirmError::NothingPending)?;
        pending.comment = comment.into();
        pending.submitting = true;
        let action = pending.kind.action(pending.comment.clone());
        self.in_flight = Some(action.transition());
        Ok(SubmitGuard {
            controller: self,
            action,
            dispatched: false,
        })
    }

    /// Start an action that needs no confirmation, such as approving.
    ///
    /// An open, not yet committed modal stays as it is; it just cannot be
    /// committed until the action lands.
    pub fn submit(&mut self, action: SignoffAction) -> Result<SubmitGuard<'_>, ConfirmError> {
        self.ensure_idle()?;
        self.in_flight = Some(action.transition());
        Ok(SubmitGuard {
            controller: self,
            action,
            dispatched: false,
        })
    }

    /// Settle the in-flight `transition` once its result is known.
    ///
    /// Only the modal that submitted it is closed. Returns false when this
    /// view was not waiting on `transition`, in which case nothing changes.
    pub fn complete(&mut self, transition: Transition) -> bool {
        if self.in_flight != Some(transition) {
            return false;
        }
        self.in_flight = None;
        if self.is_submitting() {
            self.slot = None;
        }
        true
    }

    /// Drop the modal and the in-flight marker unconditionally.
    pub fn close(&mut self) -> Option<PendingConfirmation> {
        self.in_flight = None;
        self.slot.take()
    }
}

/// Holds a committed confirmation in the submitting state.
#[derive(Debug)]
pub struct SubmitGuard<'a> {
    controller: &'a mut ConfirmationController,
    action: SignoffAction,
    dispatched: bool,
}

impl SubmitGuard<'_> {
    pub fn action(&self) -> &SignoffAction {
        &self.action
    }

    /// The action was handed off; keep the modal busy until it is closed.
    pub fn dispatched(mut self) {
        self.dispatched = true;
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if self.dispatched {
            return;
        }
        self.controller.in_flight = None;
        if let Some(pending) = self.controller.slot.as_mut() {
            tracing::debug!(kind = %pending.kind, "submission abandoned, re-enabling confirmation");
            pending.submitting = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_replaces_other_confirmation() {
        let mut controller = ConfirmationController::default();
        controller.confirm_request_review().unwrap();
        controller.set_comment("draft").unwrap();
        assert_eq!(controller.kind(), Some(ConfirmationKind::RequestReview));

        controller.confirm_rollback_changes().unwrap();
        assert_eq!(controller.kind(), Some(ConfirmationKind::Rollback));
        assert_eq!(controller.pending().unwrap().comment, "");
    }

    #[test]
    fn test_cancel_clears_slot() {
        let mut controller = ConfirmationController::default();
        assert_eq!(controller.cancel(), Ok(None));
        controller.confirm_decline_changes().unwrap();
        assert_eq!(controller.cancel(), Ok(Some(ConfirmationKind::Decline)));
        assert!(controller.pending().is_none());
    }

    #[test]
    fn test_commit_requires_pending() {
        let mut controller = ConfirmationController::default();
        assert_eq!(controller.commit("x").err(), Some(ConfirmError::NothingPending));
    }

    #[test]
    fn test_commit_keeps_modal_busy_until_closed() {
        let mut controller = ConfirmationController::default();
        controller.confirm_request_review().unwrap();

        let guard = controller.commit("please review").unwrap();
        assert_eq!(
            guard.action(),
            &SignoffAction::RequestReview {
                comment: "please review".into()
            }
        );
        guard.dispatched();

        assert!(controller.is_submitting());
        assert_eq!(
            controller.commit("again").err(),
            Some(ConfirmError::AlreadySubmitting(ConfirmationKind::RequestReview))
        );
        assert!(controller.cancel().is_err());
        assert!(controller.confirm_rollback_changes().is_err());

        let closed = controller.close().unwrap();
        assert_eq!(closed.comment, "please review");
        assert!(controller.pending().is_none());
    }

    #[test]
    fn test_abandoned_submission_is_released() {
        let mut controller = ConfirmationController::default();
        controller.confirm_decline_changes().unwrap();
        {
            let _guard = controller.commit("nope").unwrap();
        }
        assert!(!controller.is_submitting());
        assert_eq!(controller.kind(), Some(ConfirmationKind::Decline));
        assert!(controller.commit("retry").is_ok());
    }

    #[test]
    fn test_direct_action_blocks_every_other_action() {
        let mut controller = ConfirmationController::default();
        controller.confirm_rollback_changes().unwrap();
        controller
            .submit(SignoffAction::ApproveChanges)
            .unwrap()
            .dispatched();
        assert_eq!(controller.in_flight(), Some(Transition::Approve));

        let busy = Some(ConfirmError::InFlight(Transition::Approve));
        assert_eq!(controller.submit(SignoffAction::ApproveChanges).err(), busy);
        assert_eq!(controller.commit("x").err(), busy);
        assert_eq!(controller.confirm_decline_changes().err(), busy);
        // the draft can still be dismissed
        assert_eq!(controller.cancel(), Ok(Some(ConfirmationKind::Rollback)));

        assert!(controller.complete(Transition::Approve));
        assert!(controller.in_flight().is_none());
        assert!(controller.confirm_decline_changes().is_ok());
    }

    #[test]
    fn test_complete_ignores_other_transitions() {
        let mut controller = ConfirmationController::default();
        controller.confirm_rollback_changes().unwrap();
        controller.commit("undo").unwrap().dispatched();

        assert!(!controller.complete(Transition::Approve));
        assert!(controller.is_submitting());
        assert_eq!(controller.in_flight(), Some(Transition::Rollback));

        assert!(controller.complete(Transition::Rollback));
        assert!(controller.pending().is_none());
    }

    #[test]
    fn test_complete_keeps_draft_of_direct_action_view() {
        let mut controller = ConfirmationController::default();
        controller.confirm_decline_changes().unwrap();
        controller.set_comment("half typed").unwrap();
        controller
            .submit(SignoffAction::ApproveChanges)
            .unwrap()
            .dispatched();

        assert!(controller.complete(Transition::Approve));
        assert_eq!(controller.pending().unwrap().comment, "half typed");
    }

    #[test]
    fn test_abandoned_direct_action_is_released() {
        let mut controller = ConfirmationController::default();
        {
            let _guard = controller.submit(SignoffAction::ApproveChanges).unwrap();
        }
        assert!(controller.in_flight().is_none());
    }

    #[test]
    fn test_kind_slugs() {
        for kind in [
            ConfirmationKind::RequestReview,
            ConfirmationKind::Decline,
            ConfirmationKind::Rollback,
        ] {
            assert_eq!(kind.slug().parse::<ConfirmationKind>(), Ok(kind));
        }
        assert!("approve".parse::<ConfirmationKind>().is_err());
        assert_eq!(ConfirmationKind::Rollback.transition(), Transition::Rollback);
    }
}
