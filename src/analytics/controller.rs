use actix_web::{HttpRequest, HttpResponse, web};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

use crate::analytics::model::HeartbeatRequest;
use crate::analytics::service::AnalyticsService;
use crate::utils::error::CustomError;

const PAGEVIEW_HEADER: &str = "Pageview-Id";

#[derive(Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<i64>,
}

/// POST /analytics — per-pageview heartbeat. The `Pageview-Id` header
/// threads events of one view together and is echoed back so the
/// client can repeat it.
pub async fn heartbeat(
    analytics_service: web::Data<AnalyticsService>,
    body: web::Json<HeartbeatRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let request = body.into_inner();
    request.validate()?;

    let view_id = req
        .headers()
        .get(PAGEVIEW_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| ObjectId::parse_str(value).ok())
        .unwrap_or_else(ObjectId::new);

    analytics_service.record(request.into_event(view_id)).await?;

    Ok(HttpResponse::Ok()
        .insert_header((PAGEVIEW_HEADER, view_id.to_hex()))
        .json(json!({ "ok": true })))
}

/// GET /admin/analytics?days=N
pub async fn get_analytics(
    analytics_service: web::Data<AnalyticsService>,
    query: web::Query<AnalyticsQuery>,
) -> Result<HttpResponse, CustomError> {
    let days = query.days.unwrap_or(14);
    let views = analytics_service.views_since(days).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "views": views,
    })))
}
