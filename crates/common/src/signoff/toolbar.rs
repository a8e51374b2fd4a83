//! The signoff toolbar.
//!
//! Builds the view model for the three-panel progress bar shown on top of
//! a signed collection. It decides which panel is current, which panels
//! show history, which actions are offered and whether they are enabled,
//! and which confirmation modal is open. Rendering it to markup is left to
//! the caller.

use crate::links::RouteLink;
use crate::session::{BucketState, CollectionState, SessionState};

use super::changes::ChangeSummary;
use super::confirm::ConfirmationKind;
use super::groups::GroupMembershipResolver;
use super::workflow::{GuardRefusal, Transition, WorkflowGuards, WorkflowStep};
use super::{CollectionRef, CollectionsInfo, SignoffSource, SignoffState};

pub const HISTORY_DISABLED_WARNING: &str =
    "The history plugin is not enabled on this server. \
     Changes between review cycles cannot be listed.";

/// What a toolbar button asks for when clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserIntent {
    /// Open the request review confirmation.
    ConfirmRequestReview,
    /// Approve right away, no confirmation.
    ApproveChanges,
    /// Open the decline confirmation.
    ConfirmDeclineChanges,
    /// Open the rollback confirmation.
    ConfirmRollbackChanges,
}

impl UserIntent {
    pub fn transition(&self) -> Transition {
        match self {
            UserIntent::ConfirmRequestReview => Transition::RequestReview,
            UserIntent::ApproveChanges => Transition::Approve,
            UserIntent::ConfirmDeclineChanges => Transition::Decline,
            UserIntent::ConfirmRollbackChanges => Transition::Rollback,
        }
    }

    /// The confirmation this intent opens; `None` for direct actions.
    pub fn confirmation(&self) -> Option<ConfirmationKind> {
        match self {
            UserIntent::ConfirmRequestReview => Some(ConfirmationKind::RequestReview),
            UserIntent::ApproveChanges => None,
            UserIntent::ConfirmDeclineChanges => Some(ConfirmationKind::Decline),
            UserIntent::ConfirmRollbackChanges => Some(ConfirmationKind::Rollback),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserIntent::ConfirmRequestReview => "Request review...",
            UserIntent::ApproveChanges => "Approve",
            UserIntent::ConfirmDeclineChanges => "Decline...",
            UserIntent::ConfirmRollbackChanges => "Rollback...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub intent: UserIntent,
    pub enabled: bool,
    /// Why the button is disabled.
    pub hint: Option<String>,
}

impl ActionButton {
    fn new(intent: UserIntent, guards: &WorkflowGuards) -> Self {
        let refusal = guards.check(intent.transition()).err();
        Self {
            intent,
            enabled: refusal.is_none(),
            hint: refusal.map(|r: GuardRefusal| r.to_string()),
        }
    }

    pub fn label(&self) -> &'static str {
        self.intent.label()
    }

    fn hold(&mut self, in_flight: Transition) {
        self.enabled = false;
        self.hint = Some(format!("waiting for {} to complete", in_flight));
    }
}

/// A who/when line of a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLine {
    pub label: &'static str,
    pub by: String,
    pub date: Option<String>,
}

impl HistoryLine {
    fn from_fields(label: &'static str, by: Option<&String>, date: Option<&String>) -> Option<Self> {
        by.map(|by| HistoryLine {
            label,
            by: by.clone(),
            date: date.cloned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPanel {
    pub step: WorkflowStep,
    pub is_current_step: bool,
    /// The collection this step lives in; the preview may not exist.
    pub collection: Option<CollectionRef>,
    /// `collection` is the page being viewed.
    pub is_current_page: bool,
    /// Cross-link to `collection` when it is not the page being viewed.
    pub link: Option<RouteLink>,
    pub history: Vec<HistoryLine>,
    pub comment: Option<String>,
    pub changes: Option<ChangeSummary>,
    pub actions: Vec<ActionButton>,
}

impl StepPanel {
    fn new(step: WorkflowStep, current: WorkflowStep, collection: Option<&CollectionRef>, page: &CollectionRef) -> Self {
        let is_current_page = collection == Some(page);
        let link = collection
            .filter(|_| !is_current_page)
            .map(RouteLink::records);
        Self {
            step,
            is_current_step: step == current,
            collection: collection.cloned(),
            is_current_page,
            link,
            history: Vec::new(),
            comment: None,
            changes: None,
            actions: Vec::new(),
        }
    }

    pub fn title(&self) -> &'static str {
        self.step.title()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationView {
    pub kind: ConfirmationKind,
    pub description: &'static str,
    pub confirm_label: &'static str,
    pub comment: String,
    /// Controls disabled and a busy indicator shown.
    pub submitting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarView {
    pub source: CollectionRef,
    pub current_step: WorkflowStep,
    pub has_history: bool,
    pub warning: Option<&'static str>,
    pub steps: Vec<StepPanel>,
    pub rollback: Option<ActionButton>,
    pub confirmation: Option<ConfirmationView>,
    /// A workflow action dispatched from this page that has not landed.
    pub in_flight: Option<Transition>,
}

impl ToolbarView {
    /// Build the toolbar for the collection page `bucket`/`collection`.
    ///
    /// Returns `None`, meaning render nothing at all, when the signoff
    /// state carries no collections info.
    pub fn build(
        session: &SessionState,
        bucket: &BucketState,
        collection: &CollectionState,
        signoff: &SignoffState,
    ) -> Option<Self> {
        let info = signoff.collections_info.as_ref()?;
        let source = &info.source;
        let page = CollectionRef::new(bucket.data.id.as_str(), collection.data.id.as_str());

        let guards = WorkflowGuards::evaluate(session, &page.bid, &page.cid, source);
        let resolver = GroupMembershipResolver::from_session(session);
        let has_history = session.has_history();
        let current = guards.step;

        tracing::trace!(
            source = %source.collection(),
            step = %current,
            can_edit = guards.can_edit,
            "building signoff toolbar"
        );

        let steps = vec![
            work_in_progress_panel(info, &page, &guards, resolver.is_editor(Some(source)), has_history),
            review_panel(info, &page, &guards, resolver.is_reviewer(Some(source)), has_history),
            signed_panel(info, &page, current),
        ];

        let rollback = (guards.can_edit && !source.is_signed())
            .then(|| ActionButton::new(UserIntent::ConfirmRollbackChanges, &guards));

        let confirmation = signoff
            .confirmation
            .pending()
            .map(|pending| ConfirmationView {
                kind: pending.kind,
                description: pending.kind.description(),
                confirm_label: pending.kind.confirm_label(),
                comment: pending.comment.clone(),
                submitting: pending.submitting,
            });

        let mut toolbar = Self {
            source: source.collection(),
            current_step: current,
            has_history,
            warning: (!has_history).then_some(HISTORY_DISABLED_WARNING),
            steps,
            rollback,
            confirmation,
            in_flight: signoff.confirmation.in_flight(),
        };
        if let Some(in_flight) = toolbar.in_flight {
            toolbar.buttons_mut().for_each(|button| button.hold(in_flight));
        }
        Some(toolbar)
    }

    fn buttons_mut(&mut self) -> impl Iterator<Item = &mut ActionButton> {
        self.steps
            .iter_mut()
            .flat_map(|panel| panel.actions.iter_mut())
            .chain(self.rollback.iter_mut())
    }

    /// Drop every action control, for read-only consoles.
    pub fn without_actions(mut self) -> Self {
        for panel in &mut self.steps {
            panel.actions.clear();
        }
        self.rollback = None;
        self.confirmation = None;
        self
    }

    pub fn panel(&self, step: WorkflowStep) -> &StepPanel {
        &self.steps[step.index()]
    }

    /// Every button currently shown, rollback included.
    pub fn buttons(&self) -> impl Iterator<Item = &ActionButton> {
        self.steps
            .iter()
            .flat_map(|panel| panel.actions.iter())
            .chain(self.rollback.iter())
    }

    pub fn button(&self, intent: UserIntent) -> Option<&ActionButton> {
        self.buttons().find(|button| button.intent == intent)
    }
}

fn last_edit(source: &SignoffSource) -> Option<HistoryLine> {
    HistoryLine::from_fields(
        "Last update",
        source.last_edit_by.as_ref(),
        source.last_edit_date.as_ref(),
    )
}

fn review_request(source: &SignoffSource) -> Option<HistoryLine> {
    HistoryLine::from_fields(
        "Review requested",
        source.last_review_request_by.as_ref(),
        source.last_review_request_date.as_ref(),
    )
}

fn signature(source: &SignoffSource) -> Option<HistoryLine> {
    HistoryLine::from_fields(
        "Approved",
        source.last_signature_by.as_ref(),
        source.last_signature_date.as_ref(),
    )
}

fn work_in_progress_panel(
    info: &CollectionsInfo,
    page: &CollectionRef,
    guards: &WorkflowGuards,
    is_editor: bool,
    has_history: bool,
) -> StepPanel {
    let source = &info.source;
    let collection = source.collection();
    let mut panel = StepPanel::new(WorkflowStep::WorkInProgress, guards.step, Some(&collection), page);
    panel.history.extend(last_edit(source));

    if panel.is_current_step {
        // A declined review lands back here with the reviewer's notes.
        if source.last_review_by.is_some() {
            panel.comment = source.last_reviewer_comment.clone();
        }
        panel.changes = info
            .changes_on_source
            .as_ref()
            .and_then(|changes| ChangeSummary::new(&collection, changes, has_history));
        if guards.can_edit && is_editor {
            panel
                .actions
                .push(ActionButton::new(UserIntent::ConfirmRequestReview, guards));
        }
    }
    panel
}

fn review_panel(
    info: &CollectionsInfo,
    page: &CollectionRef,
    guards: &WorkflowGuards,
    is_reviewer: bool,
    has_history: bool,
) -> StepPanel {
    let source = &info.source;
    let mut panel = StepPanel::new(WorkflowStep::ToReview, guards.step, info.preview.as_ref(), page);
    panel.history.extend(review_request(source));

    if panel.is_current_step {
        panel.comment = source.last_editor_comment.clone();
        let (changes, diffed) = match (&info.changes_on_preview, &info.preview) {
            (Some(changes), Some(preview)) => (Some(changes), preview.clone()),
            _ => (info.changes_on_source.as_ref(), source.collection()),
        };
        panel.changes = changes.and_then(|changes| ChangeSummary::new(&diffed, changes, has_history));
        if guards.can_edit && is_reviewer {
            panel
                .actions
                .push(ActionButton::new(UserIntent::ApproveChanges, guards));
            panel
                .actions
                .push(ActionButton::new(UserIntent::ConfirmDeclineChanges, guards));
        }
    }
    panel
}

fn signed_panel(info: &CollectionsInfo, page: &CollectionRef, current: WorkflowStep) -> StepPanel {
    let source = &info.source;
    let mut panel = StepPanel::new(WorkflowStep::Signed, current, Some(&info.destination), page);
    panel.history.extend(signature(source));
    if panel.is_current_step {
        panel.history.extend(HistoryLine::from_fields(
            "Reviewed",
            source.last_review_by.as_ref(),
            source.last_review_date.as_ref(),
        ));
    }
    panel
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::permissions::PermissionEntry;
    use crate::session::{Capabilities, HistoryCapability, ServerInfo, SignerCapability, User};
    use crate::signoff::{ChangesList, SignoffStatus};

    fn session(permissions: Option<Vec<PermissionEntry>>, principals: &[&str]) -> SessionState {
        SessionState {
            permissions,
            server_info: ServerInfo {
                user: Some(User {
                    id: Some("fxa:yo".into()),
                    principals: Some(principals.iter().map(|p| p.parse().unwrap()).collect()),
                }),
                capabilities: Capabilities {
                    signer: Some(SignerCapability {
                        editors_group: Some("{collection_id}_editors".into()),
                        reviewers_group: Some("{collection_id}_reviewers".into()),
                    }),
                    history: Some(HistoryCapability::default()),
                },
            },
        }
    }

    fn bucket_write(bid: &str) -> Vec<PermissionEntry> {
        vec![PermissionEntry::Bucket {
            bucket_id: bid.into(),
            permissions: BTreeSet::from(["write".to_string()]),
        }]
    }

    fn signoff(status: Option<SignoffStatus>) -> SignoffState {
        SignoffState::new(Some(CollectionsInfo {
            source: SignoffSource {
                bid: "stage".into(),
                cid: "certs".into(),
                status,
                last_edit_by: Some("fxa:yo".into()),
                last_edit_date: Some("2024-03-01T10:00:00Z".into()),
                ..Default::default()
            },
            destination: CollectionRef::new("prod", "certs"),
            preview: Some(CollectionRef::new("preview", "certs")),
            changes_on_source: Some(ChangesList {
                since: 10,
                updated: 2,
                deleted: 0,
            }),
            changes_on_preview: None,
        }))
    }

    fn build(session: &SessionState, signoff: &SignoffState) -> Option<ToolbarView> {
        ToolbarView::build(
            session,
            &BucketState::new("stage"),
            &CollectionState::new("certs"),
            signoff,
        )
    }

    #[test]
    fn test_absent_info_builds_nothing() {
        let session = session(None, &[]);
        assert!(build(&session, &SignoffState::default()).is_none());
    }

    #[test]
    fn test_editor_can_request_review() {
        let session = session(
            Some(bucket_write("stage")),
            &["fxa:yo", "/buckets/stage/groups/certs_editors"],
        );
        let view = build(&session, &signoff(None)).unwrap();

        assert_eq!(view.current_step, WorkflowStep::WorkInProgress);
        let button = view.button(UserIntent::ConfirmRequestReview).unwrap();
        assert!(button.enabled);
        assert!(view.button(UserIntent::ApproveChanges).is_none());

        let wip = view.panel(WorkflowStep::WorkInProgress);
        assert!(wip.is_current_step);
        assert!(wip.is_current_page);
        assert!(wip.link.is_none());
        assert_eq!(wip.changes.as_ref().unwrap().updated, 2);
    }

    #[test]
    fn test_only_current_panel_has_actions() {
        let session = session(
            Some(bucket_write("stage")),
            &[
                "/buckets/stage/groups/certs_editors",
                "/buckets/stage/groups/certs_reviewers",
            ],
        );
        let view = build(&session, &signoff(Some(SignoffStatus::ToReview))).unwrap();
        assert!(view.panel(WorkflowStep::WorkInProgress).actions.is_empty());
        assert_eq!(view.panel(WorkflowStep::ToReview).actions.len(), 2);
        assert!(view.panel(WorkflowStep::Signed).actions.is_empty());
    }

    #[test]
    fn test_reviewer_cannot_approve_own_request() {
        let session = session(
            Some(bucket_write("stage")),
            &["/buckets/stage/groups/certs_reviewers"],
        );
        let mut state = signoff(Some(SignoffStatus::ToReview));
        if let Some(info) = state.collections_info.as_mut() {
            info.source.last_review_request_by = Some("fxa:yo".into());
        }
        let view = build(&session, &state).unwrap();
        let approve = view.button(UserIntent::ApproveChanges).unwrap();
        assert!(!approve.enabled);
        assert_eq!(approve.hint.as_deref(), Some("cannot review your own review request"));
    }

    #[test]
    fn test_rollback_hidden_when_signed_or_read_only() {
        let writer = session(Some(bucket_write("stage")), &[]);
        assert!(build(&writer, &signoff(None)).unwrap().rollback.is_some());
        assert!(build(&writer, &signoff(Some(SignoffStatus::ToReview)))
            .unwrap()
            .rollback
            .is_some());
        assert!(build(&writer, &signoff(Some(SignoffStatus::Signed)))
            .unwrap()
            .rollback
            .is_none());

        let reader = session(Some(vec![]), &[]);
        assert!(build(&reader, &signoff(None)).unwrap().rollback.is_none());
    }

    #[test]
    fn test_cross_links_to_other_collections() {
        let session = session(None, &[]);
        let view = build(&session, &signoff(None)).unwrap();
        let review = view.panel(WorkflowStep::ToReview);
        assert!(!review.is_current_page);
        assert_eq!(
            review.link.as_ref().unwrap().params,
            CollectionRef::new("preview", "certs")
        );
        let signed = view.panel(WorkflowStep::Signed);
        assert_eq!(
            signed.link.as_ref().unwrap().params,
            CollectionRef::new("prod", "certs")
        );
    }

    #[test]
    fn test_history_warning() {
        let mut session = session(None, &[]);
        session.server_info.capabilities.history = None;
        let view = build(&session, &signoff(None)).unwrap();
        assert_eq!(view.warning, Some(HISTORY_DISABLED_WARNING));
        assert!(view
            .panel(WorkflowStep::WorkInProgress)
            .changes
            .as_ref()
            .unwrap()
            .history
            .is_none());
    }

    #[test]
    fn test_confirmation_view_and_read_only() {
        let session = session(None, &[]);
        let mut state = signoff(None);
        state.confirmation.confirm_rollback_changes().unwrap();
        let view = build(&session, &state).unwrap();
        let confirmation = view.confirmation.as_ref().unwrap();
        assert_eq!(confirmation.kind, ConfirmationKind::Rollback);
        assert!(!confirmation.submitting);

        let read_only = view.without_actions();
        assert!(read_only.confirmation.is_none());
        assert!(read_only.buttons().next().is_none());
    }

    #[test]
    fn test_in_flight_action_disables_every_button() {
        let session = session(
            Some(bucket_write("stage")),
            &[
                "/buckets/stage/groups/certs_editors",
                "/buckets/stage/groups/certs_reviewers",
            ],
        );
        let mut state = signoff(Some(SignoffStatus::ToReview));
        state
            .confirmation
            .submit(crate::actions::SignoffAction::ApproveChanges)
            .unwrap()
            .dispatched();

        let view = build(&session, &state).unwrap();
        assert_eq!(view.in_flight, Some(Transition::Approve));
        assert!(view.buttons().count() >= 3);
        for button in view.buttons() {
            assert!(!button.enabled);
            assert_eq!(
                button.hint.as_deref(),
                Some("waiting for approve changes to complete")
            );
        }
    }
}
