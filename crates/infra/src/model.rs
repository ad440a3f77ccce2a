//! Entity operations over a [`DocumentStore`].
//!
//! Every post read goes through [`BlogModel::populate`], so callers only ever
//! see posts joined with their author.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use blog_core::{AuthorId, DomainError, PostId};
use blog_domain::{
    check_path_id, Author, AuthorPatch, NewAuthor, NewPost, PopulatedPost, Post, PostPatch,
};

use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("post {post} references missing author {author}")]
    DanglingAuthor { post: PostId, author: AuthorId },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ModelError {
    fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether the caller is at fault. Everything else is an internal failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_client_error())
    }
}

/// A store duplicate-key failure on an author write means the username is taken.
fn user_name_conflict(err: StoreError) -> ModelError {
    match err {
        StoreError::DuplicateKey(_) => ModelError::Domain(DomainError::username_taken()),
        other => ModelError::Store(other),
    }
}

/// Blog entity operations. Cheap to clone; all clones share one store handle.
#[derive(Clone)]
pub struct BlogModel {
    store: Arc<dyn DocumentStore>,
}

impl BlogModel {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // -------------------------
    // Authors
    // -------------------------

    pub async fn create_author(&self, new: NewAuthor) -> Result<Author, ModelError> {
        // Check-then-insert is racy across requests; the store's unique index
        // catches the loser.
        if self
            .store
            .find_author_by_user_name(&new.user_name)
            .await?
            .is_some()
        {
            return Err(DomainError::username_taken().into());
        }

        let author = self
            .store
            .insert_author(Author::create(new))
            .await
            .map_err(user_name_conflict)?;
        tracing::info!(author_id = %author.id_typed(), "author created");
        Ok(author)
    }

    /// Partial update. `userName` may be kept as-is but not taken from another author.
    pub async fn update_author(
        &self,
        path_id: &str,
        body_id: Option<&str>,
        patch: AuthorPatch,
    ) -> Result<Author, ModelError> {
        check_path_id(path_id, body_id)?;
        let id: AuthorId = path_id.parse()?;

        if let Some(user_name) = &patch.user_name {
            if let Some(holder) = self.store.find_author_by_user_name(user_name).await? {
                if holder.id_typed() != id {
                    return Err(DomainError::username_taken().into());
                }
            }
        }

        self.store
            .update_author(id, &patch)
            .await
            .map_err(user_name_conflict)?
            .ok_or_else(|| ModelError::not_found("author", id))
    }

    /// Remove the author's posts, then the author.
    ///
    /// Two independent store calls: if the second fails the posts stay deleted.
    /// Deleting an unknown id succeeds.
    pub async fn delete_author(&self, id: AuthorId) -> Result<(), ModelError> {
        let removed_posts = self.store.delete_posts_by_author(id).await?;
        let removed = self.store.delete_author(id).await?;
        tracing::info!(author_id = %id, removed, removed_posts, "author deleted");
        Ok(())
    }

    pub async fn list_authors(&self) -> Result<Vec<Author>, ModelError> {
        Ok(self.store.find_authors().await?)
    }

    pub async fn get_author(&self, id: AuthorId) -> Result<Author, ModelError> {
        self.store
            .find_author(id)
            .await?
            .ok_or_else(|| ModelError::not_found("author", id))
    }

    // -------------------------
    // Posts
    // -------------------------

    /// Create a post and return it as re-read by title.
    ///
    /// The re-read matches on `title`, not on the new id, so with duplicate titles
    /// (or a concurrent create) the earliest post carrying that title is returned.
    pub async fn create_post(&self, new: NewPost) -> Result<PopulatedPost, ModelError> {
        if self.store.find_author(new.author_id).await?.is_none() {
            return Err(ModelError::not_found("author", new.author_id));
        }

        let created = self.store.insert_post(Post::create(new)).await?;
        tracing::info!(post_id = %created.id_typed(), "post created");

        let post = self
            .store
            .find_post_by_title(created.title())
            .await?
            .ok_or_else(|| ModelError::not_found("post", created.id_typed()))?;
        self.populate_one(post).await
    }

    pub async fn update_post(
        &self,
        path_id: &str,
        body_id: Option<&str>,
        patch: PostPatch,
    ) -> Result<PopulatedPost, ModelError> {
        check_path_id(path_id, body_id)?;
        let id: PostId = path_id.parse()?;

        let post = self
            .store
            .update_post(id, &patch)
            .await?
            .ok_or_else(|| ModelError::not_found("post", id))?;
        self.populate_one(post).await
    }

    /// Idempotent: removing an unknown id succeeds.
    pub async fn delete_post(&self, id: PostId) -> Result<(), ModelError> {
        let removed = self.store.delete_post(id).await?;
        tracing::info!(post_id = %id, removed, "post deleted");
        Ok(())
    }

    pub async fn list_posts(&self) -> Result<Vec<PopulatedPost>, ModelError> {
        let posts = self.store.find_posts().await?;
        self.populate(posts).await
    }

    pub async fn get_post(&self, id: PostId) -> Result<PopulatedPost, ModelError> {
        let post = self
            .store
            .find_post(id)
            .await?
            .ok_or_else(|| ModelError::not_found("post", id))?;
        self.populate_one(post).await
    }

    /// Join posts with their authors using one author lookup.
    ///
    /// Fails with `DanglingAuthor` if any referenced author is gone.
    pub async fn populate(&self, posts: Vec<Post>) -> Result<Vec<PopulatedPost>, ModelError> {
        let mut ids: Vec<AuthorId> = posts.iter().map(Post::author_id).collect();
        ids.sort_by_key(|id| *id.as_uuid());
        ids.dedup();

        let authors: HashMap<AuthorId, Author> = self
            .store
            .find_authors_by_ids(&ids)
            .await?
            .into_iter()
            .map(|a| (a.id_typed(), a))
            .collect();

        posts
            .into_iter()
            .map(|post| {
                let (post_id, author_id) = (post.id_typed(), post.author_id());
                authors
                    .get(&author_id)
                    .and_then(|author| PopulatedPost::resolve(post, author))
                    .ok_or(ModelError::DanglingAuthor {
                        post: post_id,
                        author: author_id,
                    })
            })
            .collect()
    }

    async fn populate_one(&self, post: Post) -> Result<PopulatedPost, ModelError> {
        let mut populated = self.populate(vec![post]).await?;
        populated
            .pop()
            .ok_or_else(|| ModelError::Store(StoreError::Backend("empty populate".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDocumentStore;
    use async_trait::async_trait;
    use blog_domain::Comment;

    fn model() -> BlogModel {
        BlogModel::new(Arc::new(InMemoryDocumentStore::new()))
    }

    fn new_author(first: &str, last: &str, user: &str) -> NewAuthor {
        NewAuthor {
            first_name: first.to_string(),
            last_name: last.to_string(),
            user_name: user.to_string(),
        }
    }

    fn new_post(title: &str, author: &Author) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: "body".to_string(),
            author_id: author.id_typed(),
        }
    }

    #[tokio::test]
    async fn duplicate_user_name_is_a_conflict_and_creates_nothing() {
        let m = model();
        m.create_author(new_author("Ada", "Lovelace", "ada")).await.unwrap();

        let err = m
            .create_author(new_author("Other", "Person", "ada"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Domain(DomainError::Conflict(_))));
        assert!(err.is_client_error());
        assert_eq!(m.list_authors().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_to_another_authors_user_name_is_rejected() {
        let m = model();
        let ada = m.create_author(new_author("Ada", "Lovelace", "ada")).await.unwrap();
        m.create_author(new_author("Grace", "Hopper", "grace")).await.unwrap();
        let id = ada.id_typed().to_string();

        let steal = AuthorPatch {
            user_name: Some("grace".to_string()),
            ..Default::default()
        };
        let err = m.update_author(&id, Some(id.as_str()), steal).await.unwrap_err();
        assert!(matches!(err, ModelError::Domain(DomainError::Conflict(_))));

        let keep = AuthorPatch {
            user_name: Some("ada".to_string()),
            last_name: Some("King".to_string()),
            ..Default::default()
        };
        let updated = m.update_author(&id, Some(id.as_str()), keep).await.unwrap();
        assert_eq!(updated.author_name(), "Ada King");
        assert_eq!(updated.user_name(), "ada");
    }

    #[tokio::test]
    async fn mismatched_ids_leave_the_author_untouched() {
        let m = model();
        let ada = m.create_author(new_author("Ada", "Lovelace", "ada")).await.unwrap();
        let id = ada.id_typed().to_string();

        let patch = AuthorPatch {
            first_name: Some("Changed".to_string()),
            ..Default::default()
        };
        let err = m
            .update_author(&id, Some("something-else"), patch)
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Domain(DomainError::IdMismatch { .. })));
        assert_eq!(m.get_author(ada.id_typed()).await.unwrap(), ada);
    }

    #[tokio::test]
    async fn created_post_resolves_trimmed_author_name() {
        let m = model();
        let plato = m.create_author(new_author("Plato", "", "plato")).await.unwrap();

        let post = m.create_post(new_post("Republic", &plato)).await.unwrap();
        assert_eq!(post.author_string(), "Plato");

        let fetched = m.get_post(post.post().id_typed()).await.unwrap();
        assert_eq!(fetched.post().title(), "Republic");
        assert_eq!(fetched.post().content(), "body");
        assert_eq!(fetched.author_string(), "Plato");
    }

    #[tokio::test]
    async fn create_post_returns_earliest_post_with_the_same_title() {
        let m = model();
        let ada = m.create_author(new_author("Ada", "Lovelace", "ada")).await.unwrap();
        let first = m.create_post(new_post("Dup", &ada)).await.unwrap();
        let second = m.create_post(new_post("Dup", &ada)).await.unwrap();

        assert_eq!(first.post().id_typed(), second.post().id_typed());
        assert_eq!(m.list_posts().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn create_post_for_unknown_author_stores_nothing() {
        let m = model();
        let ghost = Author::new(AuthorId::new(), "No", "One", "ghost");
        let err = m.create_post(new_post("T", &ghost)).await.unwrap_err();
        assert!(matches!(err, ModelError::NotFound { entity: "author", .. }));
        assert!(!err.is_client_error());
        assert!(m.list_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_an_author_cascades_to_its_posts() {
        let m = model();
        let ada = m.create_author(new_author("Ada", "Lovelace", "ada")).await.unwrap();
        let grace = m.create_author(new_author("Grace", "Hopper", "grace")).await.unwrap();
        for title in ["one", "two", "three"] {
            m.create_post(new_post(title, &ada)).await.unwrap();
        }
        m.create_post(new_post("cobol", &grace)).await.unwrap();

        m.delete_author(ada.id_typed()).await.unwrap();

        let posts = m.list_posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].author().id_typed(), grace.id_typed());
        let authors = m.list_authors().await.unwrap();
        assert!(authors.iter().all(|a| a.id_typed() != ada.id_typed()));

        // Unknown author id still succeeds.
        m.delete_author(AuthorId::new()).await.unwrap();
    }

    #[tokio::test]
    async fn update_post_applies_present_fields_only() {
        let m = model();
        let ada = m.create_author(new_author("Ada", "Lovelace", "ada")).await.unwrap();
        let post = m.create_post(new_post("Draft", &ada)).await.unwrap();
        let id = post.post().id_typed().to_string();

        let patch = PostPatch {
            title: Some("Final".to_string()),
            content: None,
        };
        let updated = m.update_post(&id, Some(id.as_str()), patch).await.unwrap();
        assert_eq!(updated.post().title(), "Final");
        assert_eq!(updated.post().content(), "body");

        let err = m
            .update_post(&id, None, PostPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn reads_fail_when_the_author_is_gone() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let m = BlogModel::new(store.clone());
        let orphan = Post::new(
            PostId::new(),
            "Orphan",
            "x",
            AuthorId::new(),
            vec![Comment::new("lonely")],
        );
        store.insert_post(orphan.clone()).await.unwrap();

        let err = m.list_posts().await.unwrap_err();
        assert!(matches!(err, ModelError::DanglingAuthor { post, .. } if post == orphan.id_typed()));
        assert!(m.get_post(orphan.id_typed()).await.is_err());
    }

    #[tokio::test]
    async fn missing_entities_are_not_found() {
        let m = model();
        assert!(matches!(
            m.get_author(AuthorId::new()).await.unwrap_err(),
            ModelError::NotFound { entity: "author", .. }
        ));
        let id = PostId::new().to_string();
        assert!(matches!(
            m.update_post(&id, Some(id.as_str()), PostPatch::default()).await.unwrap_err(),
            ModelError::NotFound { entity: "post", .. }
        ));
        m.delete_post(PostId::new()).await.unwrap();
    }

    /// Store that loses every `userName` race: lookups miss, writes hit the unique index.
    #[derive(Default)]
    struct RacingStore {
        inner: InMemoryDocumentStore,
    }

    #[async_trait]
    impl DocumentStore for RacingStore {
        async fn insert_author(&self, _author: Author) -> Result<Author, StoreError> {
            Err(StoreError::DuplicateKey("userName".to_string()))
        }

        async fn find_author(&self, id: AuthorId) -> Result<Option<Author>, StoreError> {
            self.inner.find_author(id).await
        }

        async fn find_author_by_user_name(&self, _user_name: &str) -> Result<Option<Author>, StoreError> {
            Ok(None)
        }

        async fn find_authors(&self) -> Result<Vec<Author>, StoreError> {
            self.inner.find_authors().await
        }

        async fn find_authors_by_ids(&self, ids: &[AuthorId]) -> Result<Vec<Author>, StoreError> {
            self.inner.find_authors_by_ids(ids).await
        }

        async fn update_author(
            &self,
            _id: AuthorId,
            _patch: &AuthorPatch,
        ) -> Result<Option<Author>, StoreError> {
            Err(StoreError::DuplicateKey("userName".to_string()))
        }

        async fn delete_author(&self, id: AuthorId) -> Result<bool, StoreError> {
            self.inner.delete_author(id).await
        }

        async fn insert_post(&self, post: Post) -> Result<Post, StoreError> {
            self.inner.insert_post(post).await
        }

        async fn find_post(&self, id: PostId) -> Result<Option<Post>, StoreError> {
            self.inner.find_post(id).await
        }

        async fn find_post_by_title(&self, title: &str) -> Result<Option<Post>, StoreError> {
            self.inner.find_post_by_title(title).await
        }

        async fn find_posts(&self) -> Result<Vec<Post>, StoreError> {
            self.inner.find_posts().await
        }

        async fn update_post(&self, id: PostId, patch: &PostPatch) -> Result<Option<Post>, StoreError> {
            self.inner.update_post(id, patch).await
        }

        async fn delete_post(&self, id: PostId) -> Result<bool, StoreError> {
            self.inner.delete_post(id).await
        }

        async fn delete_posts_by_author(&self, author: AuthorId) -> Result<u64, StoreError> {
            self.inner.delete_posts_by_author(author).await
        }

        async fn disconnect(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn duplicate_key_from_the_store_is_a_conflict() {
        let m = BlogModel::new(Arc::new(RacingStore::default()));

        let err = m
            .create_author(new_author("Ada", "Lovelace", "ada"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Domain(DomainError::Conflict(_))));
        assert!(err.is_client_error());

        let id = AuthorId::new().to_string();
        let patch = AuthorPatch {
            user_name: Some("ada".to_string()),
            ..Default::default()
        };
        let err = m
            .update_author(&id, Some(id.as_str()), patch)
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Domain(DomainError::Conflict(_))));
        assert!(err.is_client_error());
    }
}
