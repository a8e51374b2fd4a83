use askama::Template;
use askama_axum::IntoResponse;
use axum::extract::State;
use tracing::instrument;

use super::links::collection_path;
use crate::ServiceState;

#[derive(Debug, Clone)]
pub struct PageLink {
    pub label: String,
    pub href: String,
}

#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub pages: Vec<PageLink>,
}

#[instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>) -> askama_axum::Response {
    let pages = state
        .snapshots()
        .pages()
        .iter()
        .map(|page| PageLink {
            label: page.to_string(),
            href: collection_path(page),
        })
        .collect();

    IndexTemplate { pages }.into_response()
}
