use askama::Template;
use askama_axum::IntoResponse;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;

use common::signoff::toolbar::HISTORY_DISABLED_WARNING;
use common::signoff::CollectionRef;

use super::links::collection_path;
use super::signoff::SignoffError;
use crate::ServiceState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub since: Option<u64>,
    #[serde(default)]
    pub exclude_signer: bool,
}

#[derive(Template)]
#[template(path = "pages/history.html")]
pub struct HistoryTemplate {
    pub bucket_id: String,
    pub collection_id: String,
    pub collection_href: String,
    pub has_history: bool,
    pub warning: String,
    pub since: String,
    pub exclude_signer: bool,
}

#[instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Path((bucket_id, collection_id)): Path<(String, String)>,
    Query(query): Query<HistoryQuery>,
) -> Result<askama_axum::Response, SignoffError> {
    let page = CollectionRef::new(bucket_id, collection_id);
    if state.snapshots().view(&page).is_none() {
        return Err(SignoffError::UnknownCollection(page));
    }

    let template = HistoryTemplate {
        collection_href: collection_path(&page),
        bucket_id: page.bid,
        collection_id: page.cid,
        has_history: state.snapshots().session().has_history(),
        warning: HISTORY_DISABLED_WARNING.to_string(),
        since: query.since.map(|s| s.to_string()).unwrap_or_default(),
        exclude_signer: query.exclude_signer,
    };
    Ok(template.into_response())
}
