use askama::Template;
use askama_axum::IntoResponse;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::Response;
use axum::Json;

#[derive(Template)]
#[template(path = "pages/not_found.html")]
struct NotFoundTemplate {
    path: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Format {
    Json,
    Html,
    Text,
}

fn preferred_format(headers: &HeaderMap) -> Format {
    match headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) {
        Some(accept) if accept.contains("application/json") => Format::Json,
        Some(accept) if accept.contains("text/html") => Format::Html,
        _ => Format::Text,
    }
}

/// Fallback for every path the console does not serve.
pub async fn not_found_handler(uri: Uri, headers: HeaderMap) -> Response {
    let path = uri.path().to_string();
    tracing::debug!(%path, "no route");

    match preferred_format(&headers) {
        Format::Json => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "not found", "path": path })),
        )
            .into_response(),
        Format::Html => (StatusCode::NOT_FOUND, NotFoundTemplate { path }).into_response(),
        Format::Text => (StatusCode::NOT_FOUND, format!("not found: {}", path)).into_response(),
    }
}
