use core::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use blog_core::DomainError;

use crate::app::errors;

/// Parse a path id. Malformed ids are internal errors, as the store would reject them.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse().map_err(errors::domain_error_to_response)
}

/// Unwrap a JSON body extraction, answering 400 on rejection.
pub fn body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    body.map(|Json(b)| b).map_err(errors::rejection_to_response)
}
