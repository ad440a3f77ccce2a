use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use blog_core::error::require;
use blog_core::{AuthorId, CommentId, DomainResult, PostId};

use crate::author::Author;
use crate::view::{PostDetailView, PostSummaryView};

/// Comment embedded in a post. Serialized as-is in the single-post view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: CommentId,
    pub content: String,
}

impl Comment {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: CommentId::new(),
            content: content.into(),
        }
    }
}

/// Post document as stored: the author is an unresolved reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    id: PostId,
    title: String,
    content: String,
    author: AuthorId,
    comments: Vec<Comment>,
}

impl Post {
    pub fn new(
        id: PostId,
        title: impl Into<String>,
        content: impl Into<String>,
        author: AuthorId,
        comments: Vec<Comment>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            author,
            comments,
        }
    }

    /// Materialize a validated creation request under a fresh id, with no comments.
    pub fn create(new: NewPost) -> Self {
        Self::new(PostId::new(), new.title, new.content, new.author_id, Vec::new())
    }

    pub fn id_typed(&self) -> PostId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author_id(&self) -> AuthorId {
        self.author
    }

    /// Embedded comments, in insertion order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Apply the fields present in `patch`; absent fields are left untouched.
    pub fn apply(&mut self, patch: &PostPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
    }
}

/// A post joined with the author it references.
///
/// This is the only shape posts are read in, so `author_string` is always
/// backed by a resolved author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulatedPost {
    post: Post,
    author: Author,
}

impl PopulatedPost {
    /// Join `post` with `author`. Returns `None` if `author` is not the one referenced.
    pub fn resolve(post: Post, author: &Author) -> Option<Self> {
        if post.author_id() != author.id_typed() {
            return None;
        }
        Some(Self {
            post,
            author: author.clone(),
        })
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn author_string(&self) -> String {
        self.author.author_name().trim().to_string()
    }

    /// Collection view. `created` reflects `now`, not the post's creation instant.
    pub fn serialize_all(&self, now: DateTime<Utc>) -> PostSummaryView {
        PostSummaryView {
            id: self.post.id,
            title: self.post.title.clone(),
            content: self.post.content.clone(),
            author: self.author_string(),
            created: now.timestamp_millis().to_string(),
        }
    }

    /// Single-item view: the collection view plus the raw comments.
    pub fn serialize_one(&self, now: DateTime<Utc>) -> PostDetailView {
        let summary = self.serialize_all(now);
        PostDetailView {
            id: summary.id,
            title: summary.title,
            content: summary.content,
            author: summary.author,
            created: summary.created,
            comments: self.post.comments.clone(),
        }
    }
}

/// Validated post creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: AuthorId,
}

impl NewPost {
    /// Presence of `title`, `content` and `author_id` is checked (in that order)
    /// before the author id is parsed.
    pub fn try_new(
        title: Option<String>,
        content: Option<String>,
        author_id: Option<String>,
    ) -> DomainResult<Self> {
        let title = require("title", title)?;
        let content = require("content", content)?;
        let author_id = require("author_id", author_id)?;
        Ok(Self {
            title,
            content,
            author_id: author_id.parse()?,
        })
    }
}

/// Partial post update. Only `title` and `content` are updatable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}
