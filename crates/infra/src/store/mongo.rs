//! MongoDB-backed document store.
//!
//! ## Layout
//!
//! | Collection | `_id` | Fields |
//! |------------|-------|--------|
//! | `authors` | UUID string | `firstName`, `lastName`, `userName` (unique index) |
//! | `posts` | UUID string | `title`, `content`, `author` (author `_id`), `comments: [{_id, content}]` |
//!
//! ## Error Mapping
//!
//! | Driver error | Code | StoreError |
//! |--------------|------|------------|
//! | Write / command error | `11000` | `DuplicateKey` |
//! | Client construction, ping, index creation | any | `Connect` |
//! | Anything else | any | `Backend` |

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use blog_core::{AuthorId, CommentId, PostId};
use blog_domain::{Author, AuthorPatch, Comment, Post, PostPatch};

use super::r#trait::{DocumentStore, StoreError};

/// Database used when the connection string does not name one.
pub const DEFAULT_DATABASE: &str = "blog-posts";

const AUTHORS: &str = "authors";
const POSTS: &str = "posts";
const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorRecord {
    #[serde(rename = "_id")]
    id: String,
    first_name: String,
    last_name: String,
    user_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CommentRecord {
    #[serde(rename = "_id")]
    id: String,
    content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PostRecord {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    content: String,
    author: String,
    #[serde(default)]
    comments: Vec<CommentRecord>,
}

impl From<&Author> for AuthorRecord {
    fn from(a: &Author) -> Self {
        Self {
            id: a.id_typed().to_string(),
            first_name: a.first_name().to_string(),
            last_name: a.last_name().to_string(),
            user_name: a.user_name().to_string(),
        }
    }
}

impl TryFrom<AuthorRecord> for Author {
    type Error = StoreError;

    fn try_from(r: AuthorRecord) -> Result<Self, Self::Error> {
        let id: AuthorId = r.id.parse().map_err(corrupt)?;
        Ok(Author::new(id, r.first_name, r.last_name, r.user_name))
    }
}

impl From<&Post> for PostRecord {
    fn from(p: &Post) -> Self {
        Self {
            id: p.id_typed().to_string(),
            title: p.title().to_string(),
            content: p.content().to_string(),
            author: p.author_id().to_string(),
            comments: p
                .comments()
                .iter()
                .map(|c| CommentRecord {
                    id: c.id.to_string(),
                    content: c.content.clone(),
                })
                .collect(),
        }
    }
}

impl TryFrom<PostRecord> for Post {
    type Error = StoreError;

    fn try_from(r: PostRecord) -> Result<Self, Self::Error> {
        let id: PostId = r.id.parse().map_err(corrupt)?;
        let author: AuthorId = r.author.parse().map_err(corrupt)?;
        let comments = r
            .comments
            .into_iter()
            .map(|c| -> Result<Comment, StoreError> {
                Ok(Comment {
                    id: c.id.parse::<CommentId>().map_err(corrupt)?,
                    content: c.content,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Post::new(id, r.title, r.content, author, comments))
    }
}

fn corrupt(err: blog_core::DomainError) -> StoreError {
    StoreError::Backend(format!("corrupt document: {err}"))
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn map_mongo_error(operation: &str, err: mongodb::error::Error) -> StoreError {
    if is_duplicate_key(&err) {
        return StoreError::DuplicateKey(format!("{operation}: {err}"));
    }
    StoreError::Backend(format!("mongodb error in {operation}: {err}"))
}

fn author_set(patch: &AuthorPatch) -> Document {
    let mut set = Document::new();
    if let Some(v) = &patch.first_name {
        set.insert("firstName", v.as_str());
    }
    if let Some(v) = &patch.last_name {
        set.insert("lastName", v.as_str());
    }
    if let Some(v) = &patch.user_name {
        set.insert("userName", v.as_str());
    }
    set
}

fn post_set(patch: &PostPatch) -> Document {
    let mut set = Document::new();
    if let Some(v) = &patch.title {
        set.insert("title", v.as_str());
    }
    if let Some(v) = &patch.content {
        set.insert("content", v.as_str());
    }
    set
}

/// MongoDB document store.
///
/// `Client` is internally pooled and cheap to clone, so the store is `Send + Sync`
/// and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct MongoDocumentStore {
    client: Client,
    authors: Collection<AuthorRecord>,
    posts: Collection<PostRecord>,
}

impl MongoDocumentStore {
    /// Connect, verify the server answers, and ensure the `userName` unique index.
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(database_url)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE));

        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        let authors: Collection<AuthorRecord> = db.collection(AUTHORS);
        let posts: Collection<PostRecord> = db.collection(POSTS);

        let unique_user_name = IndexModel::builder()
            .keys(doc! { "userName": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        authors
            .create_index(unique_user_name)
            .await
            .map_err(|e| StoreError::Connect(format!("create userName index: {e}")))?;

        tracing::info!(database = %db.name(), "connected to mongodb");
        Ok(Self {
            client,
            authors,
            posts,
        })
    }

    async fn collect_authors(&self, filter: Document, op: &str) -> Result<Vec<Author>, StoreError> {
        let records: Vec<AuthorRecord> = self
            .authors
            .find(filter)
            .await
            .map_err(|e| map_mongo_error(op, e))?
            .try_collect()
            .await
            .map_err(|e| map_mongo_error(op, e))?;
        records.into_iter().map(Author::try_from).collect()
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    #[instrument(skip(self, author), fields(user_name = %author.user_name()))]
    async fn insert_author(&self, author: Author) -> Result<Author, StoreError> {
        self.authors
            .insert_one(AuthorRecord::from(&author))
            .await
            .map_err(|e| map_mongo_error("insert_author", e))?;
        Ok(author)
    }

    #[instrument(skip(self))]
    async fn find_author(&self, id: AuthorId) -> Result<Option<Author>, StoreError> {
        self.authors
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(|e| map_mongo_error("find_author", e))?
            .map(Author::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_author_by_user_name(&self, user_name: &str) -> Result<Option<Author>, StoreError> {
        self.authors
            .find_one(doc! { "userName": user_name })
            .await
            .map_err(|e| map_mongo_error("find_author_by_user_name", e))?
            .map(Author::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_authors(&self) -> Result<Vec<Author>, StoreError> {
        self.collect_authors(doc! {}, "find_authors").await
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_authors_by_ids(&self, ids: &[AuthorId]) -> Result<Vec<Author>, StoreError> {
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        self.collect_authors(doc! { "_id": { "$in": ids } }, "find_authors_by_ids")
            .await
    }

    #[instrument(skip(self, patch))]
    async fn update_author(
        &self,
        id: AuthorId,
        patch: &AuthorPatch,
    ) -> Result<Option<Author>, StoreError> {
        // An empty `$set` is rejected by the server.
        if patch.is_empty() {
            return self.find_author(id).await;
        }
        self.authors
            .find_one_and_update(
                doc! { "_id": id.to_string() },
                doc! { "$set": author_set(patch) },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| map_mongo_error("update_author", e))?
            .map(Author::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn delete_author(&self, id: AuthorId) -> Result<bool, StoreError> {
        let res = self
            .authors
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(|e| map_mongo_error("delete_author", e))?;
        Ok(res.deleted_count > 0)
    }

    #[instrument(skip(self, post), fields(post_id = %post.id_typed()))]
    async fn insert_post(&self, post: Post) -> Result<Post, StoreError> {
        self.posts
            .insert_one(PostRecord::from(&post))
            .await
            .map_err(|e| map_mongo_error("insert_post", e))?;
        Ok(post)
    }

    #[instrument(skip(self))]
    async fn find_post(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        self.posts
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(|e| map_mongo_error("find_post", e))?
            .map(Post::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_post_by_title(&self, title: &str) -> Result<Option<Post>, StoreError> {
        self.posts
            .find_one(doc! { "title": title })
            .await
            .map_err(|e| map_mongo_error("find_post_by_title", e))?
            .map(Post::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_posts(&self) -> Result<Vec<Post>, StoreError> {
        let records: Vec<PostRecord> = self
            .posts
            .find(doc! {})
            .await
            .map_err(|e| map_mongo_error("find_posts", e))?
            .try_collect()
            .await
            .map_err(|e| map_mongo_error("find_posts", e))?;
        records.into_iter().map(Post::try_from).collect()
    }

    #[instrument(skip(self, patch))]
    async fn update_post(&self, id: PostId, patch: &PostPatch) -> Result<Option<Post>, StoreError> {
        if patch.is_empty() {
            return self.find_post(id).await;
        }
        self.posts
            .find_one_and_update(
                doc! { "_id": id.to_string() },
                doc! { "$set": post_set(patch) },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| map_mongo_error("update_post", e))?
            .map(Post::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, id: PostId) -> Result<bool, StoreError> {
        let res = self
            .posts
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(|e| map_mongo_error("delete_post", e))?;
        Ok(res.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn delete_posts_by_author(&self, author: AuthorId) -> Result<u64, StoreError> {
        let res = self
            .posts
            .delete_many(doc! { "author": author.to_string() })
            .await
            .map_err(|e| map_mongo_error("delete_posts_by_author", e))?;
        Ok(res.deleted_count)
    }

    async fn disconnect(&self) -> Result<(), StoreError> {
        self.client.clone().shutdown().await;
        tracing::info!("disconnected from mongodb");
        Ok(())
    }
}
