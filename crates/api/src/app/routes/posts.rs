use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use blog_core::PostId;
use blog_infra::BlogModel;

use crate::app::routes::common::{body, parse_id};
use crate::app::routes::system;
use crate::app::{dto, errors};

/// Each path is also served with a trailing slash.
pub fn router() -> Router {
    let collection = get(list_posts).post(create_post).fallback(system::not_found);
    let item = get(get_post)
        .put(update_post)
        .delete(delete_post)
        .fallback(system::not_found);

    Router::new()
        .route("/posts", collection.clone())
        .route("/posts/", collection)
        .route("/posts/:id", item.clone())
        .route("/posts/:id/", item)
}

pub async fn list_posts(Extension(model): Extension<BlogModel>) -> axum::response::Response {
    let posts = match model.list_posts().await {
        Ok(posts) => posts,
        Err(e) => return errors::model_error_to_response(e),
    };

    let now = Utc::now();
    let posts = posts
        .iter()
        .map(|p| p.serialize_all(now))
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "posts": posts }))).into_response()
}

pub async fn get_post(
    Extension(model): Extension<BlogModel>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PostId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match model.get_post(id).await {
        Ok(post) => (StatusCode::OK, Json(post.serialize_one(Utc::now()))).into_response(),
        Err(e) => errors::model_error_to_response(e),
    }
}

pub async fn create_post(
    Extension(model): Extension<BlogModel>,
    req: Result<Json<dto::CreatePostRequest>, JsonRejection>,
) -> axum::response::Response {
    let req = match body(req) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let new = match req.into_new_post() {
        Ok(n) => n,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match model.create_post(new).await {
        Ok(post) => (StatusCode::CREATED, Json(post.serialize_one(Utc::now()))).into_response(),
        Err(e) => errors::model_error_to_response(e),
    }
}

/// Responds with the collection view (no comments) of the updated post.
pub async fn update_post(
    Extension(model): Extension<BlogModel>,
    Path(id): Path<String>,
    req: Result<Json<dto::UpdatePostRequest>, JsonRejection>,
) -> axum::response::Response {
    let req = match body(req) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let (body_id, patch) = req.into_parts();

    match model.update_post(&id, body_id.as_deref(), patch).await {
        Ok(post) => (StatusCode::OK, Json(post.serialize_all(Utc::now()))).into_response(),
        Err(e) => errors::model_error_to_response(e),
    }
}

pub async fn delete_post(
    Extension(model): Extension<BlogModel>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PostId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match model.delete_post(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::model_error_to_response(e),
    }
}
