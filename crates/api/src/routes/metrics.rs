use axum::routing::get;
use axum::Router;

use crate::handlers::metrics;
use crate::state::AppState;

/// Routes mounted at `/metrics`.
///
/// ```text
/// GET    /                 -> list (?experience_id=)
/// POST   /                 -> create
/// GET    /weekly           -> weekly
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(metrics::list).post(metrics::create))
        .route("/weekly", get(metrics::weekly))
}
