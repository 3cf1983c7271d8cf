//! Route definitions for the `/targets` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::target;
use crate::state::AppState;

/// Routes mounted at `/targets`.
///
/// ```text
/// GET    /                 -> list (?experience_id=)
/// POST   /                 -> create (multipart)
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update (multipart)
/// DELETE /{id}             -> delete
/// GET    /{id}/marker      -> marker_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(target::list).post(target::create))
        .route(
            "/{id}",
            get(target::get_by_id)
                .put(target::update)
                .delete(target::delete),
        )
        .route("/{id}/marker", get(target::marker_status))
}
