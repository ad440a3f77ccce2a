use serde::Deserialize;

use blog_core::DomainResult;
use blog_domain::{AuthorPatch, NewAuthor, NewPost, PostPatch};

// -------------------------
// Request DTOs
// -------------------------
//
// Every field is optional at the wire level so that a missing field becomes a
// domain validation error rather than a deserialization rejection. An explicit
// `null` counts as missing.

#[derive(Debug, Default, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<String>,
}

impl CreatePostRequest {
    pub fn into_new_post(self) -> DomainResult<NewPost> {
        NewPost::try_new(self.title, self.content, self.author_id)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl UpdatePostRequest {
    /// Split into the body id and the updatable fields; anything else in the body is ignored.
    pub fn into_parts(self) -> (Option<String>, PostPatch) {
        (
            self.id,
            PostPatch {
                title: self.title,
                content: self.content,
            },
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthorRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_name: Option<String>,
}

impl CreateAuthorRequest {
    pub fn into_new_author(self) -> DomainResult<NewAuthor> {
        NewAuthor::try_new(self.first_name, self.last_name, self.user_name)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthorRequest {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_name: Option<String>,
}

impl UpdateAuthorRequest {
    pub fn into_parts(self) -> (Option<String>, AuthorPatch) {
        (
            self.id,
            AuthorPatch {
                first_name: self.first_name,
                last_name: self.last_name,
                user_name: self.user_name,
            },
        )
    }
}
