use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::post::post_service::PostService;
use crate::utils::error::CustomError;
use crate::utils::pagination::{DEFAULT_PAGE_LIMIT, PageQuery};
use crate::utils::storage::StorageService;

pub async fn list_posts(
    post_service: web::Data<PostService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, CustomError> {
    let page = post_service
        .list_published(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            query.search.as_deref(),
            query.tag.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "posts": page.items,
        "numPages": page.num_pages,
        "page": page.page,
    })))
}

pub async fn get_post(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service.get_published(&post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "post": post,
    })))
}

pub async fn get_tags(post_service: web::Data<PostService>) -> Result<HttpResponse, CustomError> {
    let tags = post_service.distinct_tags().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "tags": tags,
    })))
}

pub async fn create_post(post_service: web::Data<PostService>) -> Result<HttpResponse, CustomError> {
    let post = post_service.create_post().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post created successfully",
        "httpStatusCode": 200,
        "post": post,
    })))
}

pub async fn get_drafts(
    post_service: web::Data<PostService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, CustomError> {
    let page = post_service
        .list_drafts(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "posts": page.items,
        "numPages": page.num_pages,
        "page": page.page,
    })))
}

pub async fn update_post(
    post_id: web::Path<String>,
    body: web::Json<crate::post::post_model::UpdatePostRequest>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service
        .update_draft(&post_id.into_inner(), &body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Draft updated",
        "httpStatusCode": 200,
        "post": post,
    })))
}

pub async fn delete_draft(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service.delete_draft(&post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Draft discarded",
        "httpStatusCode": 200,
        "post": post,
    })))
}

pub async fn publish_post(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
    storage: web::Data<StorageService>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service.publish(&post_id.into_inner()).await?;

    // Cached pages are stale from here on; the call never fails the request.
    storage.invalidate_cdn().await;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post published",
        "httpStatusCode": 200,
        "post": post,
    })))
}

pub async fn unpublish_post(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service.unpublish(&post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post unpublished",
        "httpStatusCode": 200,
        "post": post,
    })))
}

pub async fn delete_post(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service.delete_post(&post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post deleted successfully",
        "httpStatusCode": 200,
        "post": post,
    })))
}
