//! Blog content domain: authors, posts and their comments.
//!
//! Entity shapes, request validation and response views, implemented as pure
//! logic (no IO, no HTTP, no storage).

pub mod author;
pub mod post;
pub mod request;
pub mod view;

pub use author::{Author, AuthorPatch, NewAuthor};
pub use post::{Comment, NewPost, PopulatedPost, Post, PostPatch};
pub use request::check_path_id;
pub use view::{AuthorView, PostDetailView, PostSummaryView};
