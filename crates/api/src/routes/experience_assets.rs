//! Route definitions for the `/exp-assets` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::experience_asset;
use crate::state::AppState;

/// Routes mounted at `/exp-assets`.
///
/// ```text
/// GET    /                 -> list (?experience_id=)
/// POST   /                 -> create
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// DELETE /{id}             -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(experience_asset::list).post(experience_asset::create),
        )
        .route(
            "/{id}",
            get(experience_asset::get_by_id)
                .put(experience_asset::update)
                .delete(experience_asset::delete),
        )
}
