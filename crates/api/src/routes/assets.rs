//! Route definitions for the `/assets` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::asset;
use crate::state::AppState;

/// Routes mounted at `/assets`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create (multipart)
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update (multipart)
/// DELETE /{id}             -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(asset::list).post(asset::create))
        .route(
            "/{id}",
            get(asset::get_by_id)
                .put(asset::update)
                .delete(asset::delete),
        )
}
