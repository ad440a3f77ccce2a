//! Request-shape rules shared by every resource.

use blog_core::{DomainError, DomainResult};

/// Update requests must repeat the path id in the body.
///
/// Both ids have to be present, non-empty and byte-equal.
pub fn check_path_id(path_id: &str, body_id: Option<&str>) -> DomainResult<()> {
    match body_id {
        Some(body) if !path_id.is_empty() && !body.is_empty() && body == path_id => Ok(()),
        _ => Err(DomainError::IdMismatch {
            path: path_id.to_string(),
            body: body_id.unwrap_or_default().to_string(),
        }),
    }
}
