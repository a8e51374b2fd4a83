use askama::Template;
use askama_axum::IntoResponse;
use axum::extract::{Path, State};
use axum::Extension;
use tracing::instrument;

use common::links::{LinkBuilder, RouteLink};
use common::signoff::{CollectionRef, ToolbarView};

use super::links::{collection_path, HtmlLinks};
use super::signoff::SignoffError;
use super::toolbar::ToolbarDisplay;
use crate::{ServiceConfig, ServiceState};

#[derive(Template)]
#[template(path = "pages/collection.html")]
pub struct CollectionTemplate {
    pub bucket_id: String,
    pub collection_id: String,
    pub collection_href: String,
    pub history_href: String,
    pub read_only: bool,
    /// Reload while an action is in flight so the page picks up the result.
    pub refresh: bool,
    pub toolbar: Option<ToolbarDisplay>,
}

#[instrument(skip(state, config))]
pub async fn handler(
    State(state): State<ServiceState>,
    Extension(config): Extension<ServiceConfig>,
    Path((bucket_id, collection_id)): Path<(String, String)>,
) -> Result<askama_axum::Response, SignoffError> {
    let page = CollectionRef::new(bucket_id, collection_id);
    let view = state.snapshots().toolbar(&page)?;
    let view = if config.read_only {
        view.map(ToolbarView::without_actions)
    } else {
        view
    };

    let toolbar = view
        .as_ref()
        .map(|view| ToolbarDisplay::new(view, &page, &HtmlLinks));
    let refresh = toolbar.as_ref().is_some_and(ToolbarDisplay::is_busy);

    let template = CollectionTemplate {
        collection_href: collection_path(&page),
        history_href: HtmlLinks.href(&RouteLink::history(&page)),
        bucket_id: page.bid,
        collection_id: page.cid,
        read_only: config.read_only,
        refresh,
        toolbar,
    };
    Ok(template.into_response())
}
