use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use dotenv::dotenv;
use env_logger::Env;
use log::info;
use serde_json::json;

mod analytics;
mod database;
mod middleware;
mod post;
mod router;
mod rss;
mod uploader;
mod user;
mod utils;

use analytics::service::AnalyticsService;
use middleware::not_found::not_found;
use post::post_service::PostService;
use router::index::routes;
use user::service::UserService;
use utils::storage::StorageService;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Blog API",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "blog-api".to_string()),
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mongo_client = database::connect_to_mongo()
        .await
        .expect("Failed to connect to MongoDB");

    database::ensure_indexes(&mongo_client)
        .await
        .expect("Failed to create indexes");
    database::ensure_admin_user(&mongo_client)
        .await
        .expect("Failed to seed admin user");

    let user_service = web::Data::new(UserService::new(&mongo_client));
    let post_service = web::Data::new(PostService::new(&mongo_client));
    let analytics_service = web::Data::new(AnalyticsService::new(&mongo_client));
    let storage_service =
        web::Data::new(StorageService::from_env().expect("Storage configuration missing"));

    let host = std::env::var("HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8000);

    info!("Starting server on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(mongo_client.clone()))
            .app_data(user_service.clone())
            .app_data(post_service.clone())
            .app_data(analytics_service.clone())
            .app_data(storage_service.clone())
            .configure(routes)
            .wrap(ErrorHandlers::new().handler(StatusCode::NOT_FOUND, not_found))
            .service(default)
    })
    .bind((host, port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
