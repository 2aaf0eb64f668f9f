use actix_web::{HttpRequest, HttpResponse, web};

use crate::post::post_service::PostService;
use crate::rss::feed::{FeedOptions, render_feed};
use crate::utils::error::CustomError;
use crate::utils::pagination::{DEFAULT_PAGE_LIMIT, PageQuery};

fn site_url() -> String {
    std::env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn site_name() -> String {
    std::env::var("SITE_NAME").unwrap_or_else(|_| "Blog".to_string())
}

async fn feed_response(
    post_service: &PostService,
    query: &PageQuery,
    tag: Option<&str>,
    req: &HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let page = post_service
        .list_published(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            None,
            tag,
        )
        .await?;

    let site_url = site_url();
    let options = FeedOptions {
        title: format!("Posts | {} | Page {}", site_name(), page.page),
        description: "A mere stream of thoughts".to_string(),
        self_url: format!("{}{}", site_url, req.uri()),
        site_url,
        page: page.page,
        num_pages: page.num_pages,
    };

    let xml = render_feed(&page.items, &options)?;
    Ok(HttpResponse::Ok().content_type("text/xml").body(xml))
}

pub async fn feed(
    post_service: web::Data<PostService>,
    query: web::Query<PageQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    feed_response(&post_service, &query, None, &req).await
}

pub async fn feed_by_tag(
    tag: web::Path<String>,
    post_service: web::Data<PostService>,
    query: web::Query<PageQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let tag = tag.into_inner();
    let tag = tag.strip_suffix(".xml").unwrap_or(&tag).to_string();
    feed_response(&post_service, &query, Some(&tag), &req).await
}
