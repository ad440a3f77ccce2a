use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use blog_core::{AuthorId, PostId};
use blog_domain::{Author, AuthorPatch, Post, PostPatch};

use super::r#trait::{DocumentStore, StoreError};

/// In-memory document store.
///
/// Intended for tests/dev. Documents are kept in insertion order, which stands
/// in for MongoDB's natural order. `userName` uniqueness is enforced the way the
/// Mongo unique index enforces it.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    authors: RwLock<Vec<Author>>,
    posts: RwLock<Vec<Post>>,
    disconnected: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `disconnect` has been called.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }

    fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
        lock.read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
        lock.write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn duplicate_user_name(user_name: &str) -> StoreError {
        StoreError::DuplicateKey(format!("userName {user_name:?}"))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_author(&self, author: Author) -> Result<Author, StoreError> {
        let mut authors = Self::write(&self.authors)?;
        if authors.iter().any(|a| a.user_name() == author.user_name()) {
            return Err(Self::duplicate_user_name(author.user_name()));
        }
        authors.push(author.clone());
        Ok(author)
    }

    async fn find_author(&self, id: AuthorId) -> Result<Option<Author>, StoreError> {
        let authors = Self::read(&self.authors)?;
        Ok(authors.iter().find(|a| a.id_typed() == id).cloned())
    }

    async fn find_author_by_user_name(&self, user_name: &str) -> Result<Option<Author>, StoreError> {
        let authors = Self::read(&self.authors)?;
        Ok(authors.iter().find(|a| a.user_name() == user_name).cloned())
    }

    async fn find_authors(&self) -> Result<Vec<Author>, StoreError> {
        Ok(Self::read(&self.authors)?.clone())
    }

    async fn find_authors_by_ids(&self, ids: &[AuthorId]) -> Result<Vec<Author>, StoreError> {
        let authors = Self::read(&self.authors)?;
        Ok(authors
            .iter()
            .filter(|a| ids.contains(&a.id_typed()))
            .cloned()
            .collect())
    }

    async fn update_author(
        &self,
        id: AuthorId,
        patch: &AuthorPatch,
    ) -> Result<Option<Author>, StoreError> {
        let mut authors = Self::write(&self.authors)?;

        if let Some(user_name) = &patch.user_name {
            if authors
                .iter()
                .any(|a| a.id_typed() != id && a.user_name() == user_name)
            {
                return Err(Self::duplicate_user_name(user_name));
            }
        }

        Ok(authors.iter_mut().find(|a| a.id_typed() == id).map(|author| {
            author.apply(patch);
            author.clone()
        }))
    }

    async fn delete_author(&self, id: AuthorId) -> Result<bool, StoreError> {
        let mut authors = Self::write(&self.authors)?;
        let before = authors.len();
        authors.retain(|a| a.id_typed() != id);
        Ok(authors.len() != before)
    }

    async fn insert_post(&self, post: Post) -> Result<Post, StoreError> {
        let mut posts = Self::write(&self.posts)?;
        if posts.iter().any(|p| p.id_typed() == post.id_typed()) {
            return Err(StoreError::DuplicateKey(format!("_id {}", post.id_typed())));
        }
        posts.push(post.clone());
        Ok(post)
    }

    async fn find_post(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        let posts = Self::read(&self.posts)?;
        Ok(posts.iter().find(|p| p.id_typed() == id).cloned())
    }

    async fn find_post_by_title(&self, title: &str) -> Result<Option<Post>, StoreError> {
        let posts = Self::read(&self.posts)?;
        Ok(posts.iter().find(|p| p.title() == title).cloned())
    }

    async fn find_posts(&self) -> Result<Vec<Post>, StoreError> {
        Ok(Self::read(&self.posts)?.clone())
    }

    async fn update_post(&self, id: PostId, patch: &PostPatch) -> Result<Option<Post>, StoreError> {
        let mut posts = Self::write(&self.posts)?;
        Ok(posts.iter_mut().find(|p| p.id_typed() == id).map(|post| {
            post.apply(patch);
            post.clone()
        }))
    }

    async fn delete_post(&self, id: PostId) -> Result<bool, StoreError> {
        let mut posts = Self::write(&self.posts)?;
        let before = posts.len();
        posts.retain(|p| p.id_typed() != id);
        Ok(posts.len() != before)
    }

    async fn delete_posts_by_author(&self, author: AuthorId) -> Result<u64, StoreError> {
        let mut posts = Self::write(&self.posts)?;
        let before = posts.len();
        posts.retain(|p| p.author_id() != author);
        Ok((before - posts.len()) as u64)
    }

    async fn disconnect(&self) -> Result<(), StoreError> {
        self.disconnected.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_domain::Comment;

    fn author(user_name: &str) -> Author {
        Author::new(AuthorId::new(), "First", "Last", user_name)
    }

    #[tokio::test]
    async fn insert_rejects_taken_user_name() {
        let store = InMemoryDocumentStore::new();
        store.insert_author(author("ada")).await.unwrap();

        let err = store.insert_author(author("ada")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(_)));
        assert_eq!(store.find_authors().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_allows_keeping_own_user_name() {
        let store = InMemoryDocumentStore::new();
        let ada = store.insert_author(author("ada")).await.unwrap();
        store.insert_author(author("grace")).await.unwrap();

        let patch = AuthorPatch {
            user_name: Some("ada".to_string()),
            first_name: Some("Augusta".to_string()),
            ..Default::default()
        };
        let updated = store.update_author(ada.id_typed(), &patch).await.unwrap().unwrap();
        assert_eq!(updated.first_name(), "Augusta");

        let steal = AuthorPatch {
            user_name: Some("grace".to_string()),
            ..Default::default()
        };
        let err = store.update_author(ada.id_typed(), &steal).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(_)));
    }

    #[tokio::test]
    async fn update_of_unknown_author_is_none() {
        let store = InMemoryDocumentStore::new();
        let res = store
            .update_author(AuthorId::new(), &AuthorPatch::default())
            .await
            .unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn find_by_title_returns_the_earliest_match() {
        let store = InMemoryDocumentStore::new();
        let owner = AuthorId::new();
        let first = Post::new(PostId::new(), "Same", "one", owner, vec![Comment::new("c")]);
        let second = Post::new(PostId::new(), "Same", "two", owner, vec![]);
        store.insert_post(first.clone()).await.unwrap();
        store.insert_post(second).await.unwrap();

        let found = store.find_post_by_title("Same").await.unwrap().unwrap();
        assert_eq!(found, first);
    }

    #[tokio::test]
    async fn delete_posts_by_author_counts_removed() {
        let store = InMemoryDocumentStore::new();
        let owner = AuthorId::new();
        let other = AuthorId::new();
        for title in ["a", "b", "c"] {
            store
                .insert_post(Post::new(PostId::new(), title, "x", owner, vec![]))
                .await
                .unwrap();
        }
        store
            .insert_post(Post::new(PostId::new(), "d", "x", other, vec![]))
            .await
            .unwrap();

        assert_eq!(store.delete_posts_by_author(owner).await.unwrap(), 3);
        let left = store.find_posts().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].author_id(), other);
        assert!(!store.delete_post(PostId::new()).await.unwrap());
    }
}
