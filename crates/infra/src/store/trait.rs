use async_trait::async_trait;
use thiserror::Error;

use blog_core::{AuthorId, PostId};
use blog_domain::{Author, AuthorPatch, Post, PostPatch};

/// Store-level failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A unique index rejected the write.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// The backend could not be reached or initialized.
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("storage error: {0}")]
    Backend(String),
}

/// CRUD over the `authors` and `posts` collections.
///
/// Posts are returned unresolved (author as a reference). Joining them with
/// their authors is the caller's job, see `BlogModel`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new author; fails with `DuplicateKey` if `userName` is taken.
    async fn insert_author(&self, author: Author) -> Result<Author, StoreError>;

    async fn find_author(&self, id: AuthorId) -> Result<Option<Author>, StoreError>;

    async fn find_author_by_user_name(&self, user_name: &str) -> Result<Option<Author>, StoreError>;

    async fn find_authors(&self) -> Result<Vec<Author>, StoreError>;

    /// Fetch the authors whose id is in `ids`. Unknown ids are skipped.
    async fn find_authors_by_ids(&self, ids: &[AuthorId]) -> Result<Vec<Author>, StoreError>;

    /// Apply `patch` and return the updated document, or `None` if no author has `id`.
    async fn update_author(
        &self,
        id: AuthorId,
        patch: &AuthorPatch,
    ) -> Result<Option<Author>, StoreError>;

    /// Returns whether a document was removed.
    async fn delete_author(&self, id: AuthorId) -> Result<bool, StoreError>;

    async fn insert_post(&self, post: Post) -> Result<Post, StoreError>;

    async fn find_post(&self, id: PostId) -> Result<Option<Post>, StoreError>;

    /// First post (in natural order) with exactly this title.
    async fn find_post_by_title(&self, title: &str) -> Result<Option<Post>, StoreError>;

    async fn find_posts(&self) -> Result<Vec<Post>, StoreError>;

    async fn update_post(&self, id: PostId, patch: &PostPatch) -> Result<Option<Post>, StoreError>;

    async fn delete_post(&self, id: PostId) -> Result<bool, StoreError>;

    /// Remove every post referencing `author`; returns how many were removed.
    async fn delete_posts_by_author(&self, author: AuthorId) -> Result<u64, StoreError>;

    /// Release the backend's connections. The store must not be used afterwards.
    async fn disconnect(&self) -> Result<(), StoreError>;
}
