pub mod assets;
pub mod dashboard;
pub mod experience_assets;
pub mod experiences;
pub mod health;
pub mod metrics;
pub mod targets;
pub mod viewer;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /targets                         list, create
/// /targets/{id}                    get, update, delete
/// /targets/{id}/marker             marker generation status
///
/// /assets                          list, create
/// /assets/{id}                     get, update, delete
///
/// /experiences                     list, create
/// /experiences/{id}                get, update, delete
/// /experiences/{id}/config         save configuration (PATCH)
/// /experiences/{id}/publish        publish (POST)
///
/// /exp-assets                      list, create
/// /exp-assets/{id}                 get, update, delete
///
/// /metrics                         list, record detection
/// /metrics/weekly                  last seven days
///
/// /dashboard/stats                 totals
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Marker images and their generated descriptors.
        .nest("/targets", targets::router())
        // Media library.
        .nest("/assets", assets::router())
        // Experiences, configuration and publishing.
        .nest("/experiences", experiences::router())
        // Asset placements on targets.
        .nest("/exp-assets", experience_assets::router())
        // Detection telemetry.
        .nest("/metrics", metrics::router())
        .nest("/dashboard", dashboard::router())
}
