use actix_web::web;

use super::controller::{feed, feed_by_tag};

pub fn rss_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/rss").route(web::get().to(feed)));
    cfg.service(web::resource("/rss.xml").route(web::get().to(feed)));
    cfg.service(web::resource("/rss/{tag}").route(web::get().to(feed_by_tag)));
}
