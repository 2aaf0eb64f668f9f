use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

use super::controller::{change_password, login};
use crate::middleware::auth::verify_token;

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/admin/login").route(web::post().to(login)));
    cfg.service(
        web::resource("/admin/changePassword")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route(web::post().to(change_password)),
    );
}
