//! Form handlers for the signoff toolbar.
//!
//! Every handler re-evaluates the workflow guards against the current
//! snapshot before touching anything, then redirects back to the page.

use axum::extract::{Form, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Extension;
use http::StatusCode;
use serde::Deserialize;
use tracing::instrument;

use common::actions::{ActionDispatcher, ActionRequest, DispatchError, SignoffAction};
use common::session::SessionState;
use common::signoff::confirm::UnknownConfirmation;
use common::signoff::{
    CollectionRef, ConfirmError, ConfirmationKind, GuardRefusal, Transition, WorkflowGuards,
};

use super::links::collection_path;
use crate::snapshots::{CollectionView, SnapshotError};
use crate::{ServiceConfig, ServiceState};

#[derive(Debug, Deserialize)]
pub struct CommitForm {
    #[serde(default)]
    pub comment: String,
}

#[instrument(skip(state, config))]
pub async fn confirm(
    State(state): State<ServiceState>,
    Extension(config): Extension<ServiceConfig>,
    Path((bucket_id, collection_id, kind)): Path<(String, String, String)>,
) -> Result<Redirect, SignoffError> {
    ensure_writable(&config)?;
    let kind: ConfirmationKind = kind.parse()?;
    let page = CollectionRef::new(bucket_id, collection_id);

    state.snapshots().with_view_mut(&page, |session, view| {
        let (guards, _) = guards_for(session, &page, view)?;
        guards.check(kind.transition())?;
        view.signoff.confirmation.open(kind)?;
        Ok::<_, SignoffError>(())
    })??;

    tracing::debug!(%page, %kind, "confirmation opened");
    Ok(Redirect::to(&collection_path(&page)))
}

#[instrument(skip(state, config))]
pub async fn cancel(
    State(state): State<ServiceState>,
    Extension(config): Extension<ServiceConfig>,
    Path((bucket_id, collection_id)): Path<(String, String)>,
) -> Result<Redirect, SignoffError> {
    ensure_writable(&config)?;
    let page = CollectionRef::new(bucket_id, collection_id);

    let cancelled = state
        .snapshots()
        .with_view_mut(&page, |_, view| view.signoff.confirmation.cancel())??;

    if let Some(kind) = cancelled {
        tracing::debug!(%page, %kind, "confirmation cancelled");
    }
    Ok(Redirect::to(&collection_path(&page)))
}

#[instrument(skip(state, config, form))]
pub async fn commit(
    State(state): State<ServiceState>,
    Extension(config): Extension<ServiceConfig>,
    Path((bucket_id, collection_id)): Path<(String, String)>,
    Form(form): Form<CommitForm>,
) -> Result<Redirect, SignoffError> {
    ensure_writable(&config)?;
    let page = CollectionRef::new(bucket_id, collection_id);
    let dispatcher = state.dispatcher();

    state.snapshots().with_view_mut(&page, |session, view| {
        let (guards, source) = guards_for(session, &page, view)?;
        let kind = view
            .signoff
            .confirmation
            .kind()
            .ok_or(ConfirmError::NothingPending)?;
        guards.check(kind.transition())?;

        let guard = view.signoff.confirmation.commit(form.comment)?;
        dispatcher.dispatch(ActionRequest {
            source,
            action: guard.action().clone(),
            requested_by: requester(session),
        })?;
        guard.dispatched();
        Ok::<_, SignoffError>(())
    })??;

    tracing::info!(%page, "signoff action submitted");
    Ok(Redirect::to(&collection_path(&page)))
}

#[instrument(skip(state, config))]
pub async fn approve(
    State(state): State<ServiceState>,
    Extension(config): Extension<ServiceConfig>,
    Path((bucket_id, collection_id)): Path<(String, String)>,
) -> Result<Redirect, SignoffError> {
    ensure_writable(&config)?;
    let page = CollectionRef::new(bucket_id, collection_id);
    let dispatcher = state.dispatcher();

    state.snapshots().with_view_mut(&page, |session, view| -> Result<(), SignoffError> {
        let (guards, source) = guards_for(session, &page, view)?;
        guards.check(Transition::Approve)?;

        let guard = view.signoff.confirmation.submit(SignoffAction::ApproveChanges)?;
        dispatcher.dispatch(ActionRequest {
            source,
            action: guard.action().clone(),
            requested_by: requester(session),
        })?;
        guard.dispatched();
        Ok(())
    })??;

    tracing::info!(%page, "approval submitted");
    Ok(Redirect::to(&collection_path(&page)))
}

fn ensure_writable(config: &ServiceConfig) -> Result<(), SignoffError> {
    if config.read_only {
        return Err(SignoffError::ReadOnly);
    }
    Ok(())
}

/// Guards as seen from `page`, and the source collection of its pipeline.
fn guards_for(
    session: &SessionState,
    page: &CollectionRef,
    view: &CollectionView,
) -> Result<(WorkflowGuards, CollectionRef), SignoffError> {
    let source = view
        .signoff
        .source()
        .ok_or_else(|| SignoffError::NotSigned(page.clone()))?;
    Ok((
        WorkflowGuards::evaluate(session, &page.bid, &page.cid, source),
        source.collection(),
    ))
}

fn requester(session: &SessionState) -> Option<String> {
    session.auth().user_id.map(str::to_string)
}

#[derive(Debug, thiserror::Error)]
pub enum SignoffError {
    #[error("the console is read-only")]
    ReadOnly,
    #[error("unknown collection: {0}")]
    UnknownCollection(CollectionRef),
    #[error("{0} is not part of a signoff pipeline")]
    NotSigned(CollectionRef),
    #[error(transparent)]
    UnknownConfirmation(#[from] UnknownConfirmation),
    #[error(transparent)]
    Refused(#[from] GuardRefusal),
    #[error(transparent)]
    Confirmation(#[from] ConfirmError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("snapshot error: {0}")]
    Snapshot(SnapshotError),
}

impl From<SnapshotError> for SignoffError {
    fn from(e: SnapshotError) -> Self {
        match e {
            SnapshotError::UnknownCollection(page) => SignoffError::UnknownCollection(page),
            other => SignoffError::Snapshot(other),
        }
    }
}

impl IntoResponse for SignoffError {
    fn into_response(self) -> Response {
        let status = match &self {
            SignoffError::ReadOnly => StatusCode::FORBIDDEN,
            SignoffError::UnknownCollection(_) | SignoffError::NotSigned(_) => {
                StatusCode::NOT_FOUND
            }
            SignoffError::UnknownConfirmation(_) => StatusCode::BAD_REQUEST,
            SignoffError::Refused(_) | SignoffError::Confirmation(_) => StatusCode::CONFLICT,
            SignoffError::Dispatch(_) => StatusCode::SERVICE_UNAVAILABLE,
            SignoffError::Snapshot(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("signoff request failed: {}", self);
        } else {
            tracing::debug!("signoff request refused: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}
