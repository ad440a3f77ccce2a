use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use blog_core::DomainError;
use blog_infra::ModelError;

pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

pub fn model_error_to_response(err: ModelError) -> axum::response::Response {
    match err {
        ModelError::Domain(e) => domain_error_to_response(e),
        other => internal_error(&other),
    }
}

/// Missing fields and conflicts answer in plain text; id mismatches as `{message}`.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::MissingField(_) | DomainError::Conflict(_) => {
            let message = err.to_string();
            tracing::warn!("{message}");
            text_error(StatusCode::BAD_REQUEST, message)
        }
        DomainError::IdMismatch { .. } => {
            let message = err.to_string();
            tracing::warn!("{message}");
            json_error(StatusCode::BAD_REQUEST, message)
        }
        DomainError::InvalidId(_) => internal_error(&err),
    }
}

/// Unreadable request bodies never reach the model layer.
pub fn rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    let message = rejection.body_text();
    tracing::warn!("rejected request body: {message}");
    json_error(StatusCode::BAD_REQUEST, message)
}

/// Log the detail server-side; the client only sees a generic message.
pub fn internal_error(err: &dyn std::error::Error) -> axum::response::Response {
    tracing::error!(error = %err, "internal error");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "message": message.into() }))).into_response()
}

pub fn text_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, message.into()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_core::AuthorId;

    #[test]
    fn client_errors_are_bad_requests() {
        let res = domain_error_to_response(DomainError::missing("title"));
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let content_type = res.headers()["content-type"].to_str().unwrap();
        assert!(content_type.starts_with("text/plain"));

        let res = domain_error_to_response(DomainError::IdMismatch {
            path: "a".into(),
            body: "b".into(),
        });
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(res.headers()["content-type"], "application/json");
    }

    #[test]
    fn lookups_and_ids_are_internal_errors() {
        let res = model_error_to_response(ModelError::NotFound {
            entity: "author",
            id: AuthorId::new().to_string(),
        });
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let res = domain_error_to_response(DomainError::invalid_id("PostId: bad"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
