//! JSON response views.

use serde::Serialize;

use blog_core::{AuthorId, PostId};

use crate::post::Comment;

/// Post as listed in collections and returned from updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummaryView {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author: String,
    /// Milliseconds since the epoch at serialization time, as a string.
    pub created: String,
}

/// Post as returned by single-item reads and creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetailView {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created: String,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorView {
    #[serde(rename = "_id")]
    pub id: AuthorId,
    pub name: String,
    #[serde(rename = "userName")]
    pub user_name: String,
}
