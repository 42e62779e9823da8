pub mod context;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the context server router.
///
/// A single `GET` route serves the current snapshot; every other path gets a
/// plain-text 404.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(&state.config.server.context_route, get(context::get_snapshot))
        .fallback(context::not_found)
}
