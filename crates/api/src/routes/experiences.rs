//! Route definitions for the `/experiences` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::experience;
use crate::state::AppState;

/// Routes mounted at `/experiences`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// DELETE /{id}             -> delete
/// PATCH  /{id}/config      -> save_config
/// POST   /{id}/publish     -> publish
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(experience::list).post(experience::create))
        .route(
            "/{id}",
            get(experience::get_by_id)
                .put(experience::update)
                .delete(experience::delete),
        )
        .route("/{id}/config", patch(experience::save_config))
        .route("/{id}/publish", post(experience::publish))
}
