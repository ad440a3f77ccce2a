use axum::http::StatusCode;

use crate::app::errors;

/// Catch-all for unmatched paths and methods.
pub async fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "Not Found")
}
