//! `blog-core`: shared building blocks for the blog content API.
//!
//! Identifiers and the domain error model. No IO lives here.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{AuthorId, CommentId, PostId};
