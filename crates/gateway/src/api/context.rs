use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// `GET <context_route>`: the latest completed snapshot.
///
/// If no regeneration has completed yet, one is run inline first so callers
/// never receive the `{}` placeholder while the store is reachable.
pub async fn get_snapshot(State(state): State<AppState>) -> Response {
    if !state.snapshots.is_populated() {
        if let Err(e) = state.snapshots.try_regenerate().await {
            tracing::error!(error = %e, "safety snapshot regeneration failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, TEXT)],
                format!("snapshot unavailable: {e}"),
            )
                .into_response();
        }
    }

    let text = state.snapshots.read();
    (StatusCode::OK, [(header::CONTENT_TYPE, JSON)], text.to_string()).into_response()
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, TEXT)], "not found")
}
