//! Flattens a [`ToolbarView`] into what the toolbar template prints.

use askama::Template;

use common::links::LinkBuilder;
use common::signoff::{
    ActionButton, CollectionRef, ConfirmationView, StepPanel, ToolbarView, UserIntent,
};

use super::links::signoff_path;

#[derive(Debug, Clone)]
pub struct ButtonDisplay {
    pub label: String,
    pub action_url: String,
    pub enabled: bool,
    pub hint: String,
}

#[derive(Debug, Clone)]
pub struct HistoryDisplay {
    pub label: String,
    pub by: String,
    pub date: String,
}

#[derive(Debug, Clone)]
pub struct ChangesDisplay {
    pub updated: String,
    pub deleted: String,
    pub history_href: String,
}

#[derive(Debug, Clone)]
pub struct PanelDisplay {
    pub number: usize,
    pub title: String,
    pub is_current_step: bool,
    pub is_current_page: bool,
    pub collection: String,
    pub link_href: String,
    pub history: Vec<HistoryDisplay>,
    pub comment: String,
    pub changes: Option<ChangesDisplay>,
    pub buttons: Vec<ButtonDisplay>,
}

#[derive(Debug, Clone)]
pub struct ConfirmationDisplay {
    pub kind: String,
    pub description: String,
    pub confirm_label: String,
    pub comment: String,
    pub submitting: bool,
    pub commit_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone)]
pub struct ToolbarDisplay {
    pub source: String,
    pub current_step: usize,
    pub warning: String,
    pub panels: Vec<PanelDisplay>,
    pub rollback: Option<ButtonDisplay>,
    pub confirmation: Option<ConfirmationDisplay>,
    /// Empty unless a workflow action from this page is still pending.
    pub in_flight: String,
}

impl ToolbarDisplay {
    pub fn new(view: &ToolbarView, page: &CollectionRef, links: &impl LinkBuilder) -> Self {
        Self {
            source: view.source.to_string(),
            current_step: view.current_step.index(),
            warning: view.warning.unwrap_or_default().to_string(),
            panels: view
                .steps
                .iter()
                .map(|panel| panel_display(panel, page, links))
                .collect(),
            rollback: view.rollback.as_ref().map(|b| button_display(b, page)),
            confirmation: view
                .confirmation
                .as_ref()
                .map(|c| confirmation_display(c, page)),
            in_flight: view
                .in_flight
                .map(|transition| transition.to_string())
                .unwrap_or_default(),
        }
    }

    /// Something was dispatched from this page and has not landed yet.
    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty() || self.confirmation.as_ref().is_some_and(|c| c.submitting)
    }
}

/// The toolbar on its own. Renders to nothing when there is no toolbar.
#[derive(Template)]
#[template(path = "components/signoff_toolbar.html")]
pub struct SignoffToolbarTemplate {
    pub toolbar: Option<ToolbarDisplay>,
}

fn intent_action(intent: UserIntent) -> String {
    match intent.confirmation() {
        Some(kind) => format!("confirm/{}", kind.slug()),
        None => "approve".to_string(),
    }
}

fn button_display(button: &ActionButton, page: &CollectionRef) -> ButtonDisplay {
    ButtonDisplay {
        label: button.label().to_string(),
        action_url: signoff_path(page, &intent_action(button.intent)),
        enabled: button.enabled,
        hint: button.hint.clone().unwrap_or_default(),
    }
}

fn panel_display(panel: &StepPanel, page: &CollectionRef, links: &impl LinkBuilder) -> PanelDisplay {
    PanelDisplay {
        number: panel.step.index() + 1,
        title: panel.title().to_string(),
        is_current_step: panel.is_current_step,
        is_current_page: panel.is_current_page,
        collection: panel
            .collection
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        link_href: panel
            .link
            .as_ref()
            .map(|link| links.href(link))
            .unwrap_or_default(),
        history: panel
            .history
            .iter()
            .map(|line| HistoryDisplay {
                label: line.label.to_string(),
                by: line.by.clone(),
                date: line.date.clone().unwrap_or_default(),
            })
            .collect(),
        comment: panel.comment.clone().unwrap_or_default(),
        changes: panel.changes.as_ref().map(|changes| ChangesDisplay {
            updated: changes.updated_label(),
            deleted: changes.deleted_label(),
            history_href: changes
                .history
                .as_ref()
                .map(|link| links.href(link))
                .unwrap_or_default(),
        }),
        buttons: panel
            .actions
            .iter()
            .map(|button| button_display(button, page))
            .collect(),
    }
}

fn confirmation_display(confirmation: &ConfirmationView, page: &CollectionRef) -> ConfirmationDisplay {
    ConfirmationDisplay {
        kind: confirmation.kind.slug().to_string(),
        description: confirmation.description.to_string(),
        confirm_label: confirmation.confirm_label.to_string(),
        comment: confirmation.comment.clone(),
        submitting: confirmation.submitting,
        commit_url: signoff_path(page, "commit"),
        cancel_url: signoff_path(page, "cancel"),
    }
}
