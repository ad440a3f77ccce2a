use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use blog_core::AuthorId;
use blog_domain::Author;
use blog_infra::BlogModel;

use crate::app::routes::common::{body, parse_id};
use crate::app::routes::system;
use crate::app::{dto, errors};

pub fn router() -> Router {
    let collection = get(list_authors)
        .post(create_author)
        .fallback(system::not_found);
    let item = get(get_author)
        .put(update_author)
        .delete(delete_author)
        .fallback(system::not_found);

    Router::new()
        .route("/authors", collection.clone())
        .route("/authors/", collection)
        .route("/authors/:id", item.clone())
        .route("/authors/:id/", item)
}

pub async fn list_authors(Extension(model): Extension<BlogModel>) -> axum::response::Response {
    match model.list_authors().await {
        Ok(authors) => {
            let authors = authors.iter().map(Author::serialize).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "authors": authors }))).into_response()
        }
        Err(e) => errors::model_error_to_response(e),
    }
}

pub async fn get_author(
    Extension(model): Extension<BlogModel>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: AuthorId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match model.get_author(id).await {
        Ok(author) => (StatusCode::OK, Json(author.serialize())).into_response(),
        Err(e) => errors::model_error_to_response(e),
    }
}

pub async fn create_author(
    Extension(model): Extension<BlogModel>,
    req: Result<Json<dto::CreateAuthorRequest>, JsonRejection>,
) -> axum::response::Response {
    let req = match body(req) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let new = match req.into_new_author() {
        Ok(n) => n,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match model.create_author(new).await {
        Ok(author) => (StatusCode::CREATED, Json(author.serialize())).into_response(),
        Err(e) => errors::model_error_to_response(e),
    }
}

pub async fn update_author(
    Extension(model): Extension<BlogModel>,
    Path(id): Path<String>,
    req: Result<Json<dto::UpdateAuthorRequest>, JsonRejection>,
) -> axum::response::Response {
    let req = match body(req) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let (body_id, patch) = req.into_parts();

    match model.update_author(&id, body_id.as_deref(), patch).await {
        Ok(author) => (StatusCode::OK, Json(author.serialize())).into_response(),
        Err(e) => errors::model_error_to_response(e),
    }
}

/// Cascades to the author's posts; see `BlogModel::delete_author`.
pub async fn delete_author(
    Extension(model): Extension<BlogModel>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: AuthorId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match model.delete_author(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::model_error_to_response(e),
    }
}
