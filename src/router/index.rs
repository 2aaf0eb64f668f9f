use actix_web::web;

use crate::analytics::index::analytics_routes;
use crate::post::post_index::post_routes;
use crate::rss::index::rss_routes;
use crate::user::index::user_routes;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(user_routes);
    cfg.configure(post_routes);
    cfg.configure(analytics_routes);
    cfg.configure(rss_routes);
}
