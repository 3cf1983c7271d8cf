use axum::routing::get;
use axum::Router;

use crate::handlers::viewer;
use crate::state::AppState;

/// Public viewer routes (root level, NOT under `/api/v1`).
///
/// ```text
/// GET /viewer/{id}    -> show (published only, counts a view)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/viewer/{id}", get(viewer::show))
}
