use axum::routing::{get, post};
use axum::Router;
use http::header::{ACCEPT, ORIGIN};
use http::Method;
use tower_http::cors::{Any, CorsLayer};

mod collection;
mod history;
mod index;
pub mod links;
mod signoff;
pub mod toolbar;

pub use links::HtmlLinks;
pub use signoff::SignoffError;
pub use toolbar::{SignoffToolbarTemplate, ToolbarDisplay};

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET])
        .allow_headers(vec![ACCEPT, ORIGIN])
        .allow_origin(Any)
        .allow_credentials(false);

    Router::new()
        .route("/", get(index::handler))
        .route(
            "/buckets/:bucket_id/collections/:collection_id",
            get(collection::handler),
        )
        .route(
            "/buckets/:bucket_id/collections/:collection_id/history",
            get(history::handler),
        )
        .route(
            "/buckets/:bucket_id/collections/:collection_id/signoff/confirm/:kind",
            post(signoff::confirm),
        )
        .route(
            "/buckets/:bucket_id/collections/:collection_id/signoff/cancel",
            post(signoff::cancel),
        )
        .route(
            "/buckets/:bucket_id/collections/:collection_id/signoff/commit",
            post(signoff::commit),
        )
        .route(
            "/buckets/:bucket_id/collections/:collection_id/signoff/approve",
            post(signoff::approve),
        )
        .with_state(state)
        .layer(cors_layer)
}
