//! Shared response envelope types for API handlers.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: result }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "status": "..." }` acknowledgement for actions without a resource body.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}
