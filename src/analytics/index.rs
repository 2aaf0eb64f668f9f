use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

use super::controller::{get_analytics, heartbeat};
use crate::middleware::auth::verify_token;

pub fn analytics_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/analytics").route(web::post().to(heartbeat)));
    cfg.service(
        web::resource("/admin/analytics")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route(web::get().to(get_analytics)),
    );
}
