use axum::Router;

pub mod authors;
pub mod common;
pub mod posts;
pub mod system;

/// Router for every resource endpoint.
pub fn router() -> Router {
    Router::new()
        .merge(posts::router())
        .merge(authors::router())
}
