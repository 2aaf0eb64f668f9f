use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

use super::post_controller::{
    create_post, delete_draft, delete_post, get_drafts, get_post, get_tags, list_posts,
    publish_post, unpublish_post, update_post,
};
use crate::middleware::auth::verify_token;
use crate::uploader::controller::upload;

pub fn post_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/blog")
            .route("/posts", web::get().to(list_posts))
            .route("/posts/{id}", web::get().to(get_post))
            .route("/tags", web::get().to(get_tags)),
    );
    cfg.service(
        web::scope("/admin/posts")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("", web::post().to(create_post))
            .route("", web::get().to(get_drafts))
            .route("/{id}", web::post().to(update_post))
            .route("/{id}", web::delete().to(delete_post))
            .route("/{id}/draft", web::delete().to(delete_draft))
            .route("/{id}/publish", web::post().to(publish_post))
            .route("/{id}/unpublish", web::post().to(unpublish_post))
            .route("/{id}/upload", web::post().to(upload)),
    );
}
