//! 点击登记端点

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde_json::json;
use tracing::warn;

use super::error_response;
use crate::analytics::ClickService;
use crate::errors::RadiodirError;
use crate::utils::extract_client_ip;

pub struct ClickApi;

impl ClickApi {
    /// POST /api/stations/{id}/click
    ///
    /// 本地电台访问登记：事件落库 + 计数器递增。
    pub async fn register(
        req: HttpRequest,
        path: web::Path<i64>,
        service: web::Data<Arc<ClickService>>,
    ) -> impl Responder {
        let station_id = path.into_inner();

        let ip_address = extract_client_ip(&req);
        let user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .map(String::from);
        let referrer = req
            .headers()
            .get("referer")
            .and_then(|h| h.to_str().ok())
            .map(String::from);

        match service
            .register_click(station_id, ip_address, user_agent, referrer)
            .await
        {
            Ok(outcome) => HttpResponse::Ok().json(json!({
                "success": true,
                "station_id": outcome.station_id,
                "total_clicks": outcome.total_clicks,
            })),
            Err(e) => error_response(&e),
        }
    }

    /// POST /api/external/{uuid}/click
    ///
    /// 外部电台点击透传。目录服务不可达属于软失败：
    /// 仍返回 200，由 success 标志呈现结果。
    pub async fn register_external(
        path: web::Path<String>,
        service: web::Data<Arc<ClickService>>,
    ) -> impl Responder {
        let station_uuid = path.into_inner();

        match service.register_external_click(&station_uuid).await {
            Ok(()) => HttpResponse::Ok().json(json!({
                "success": true,
                "station_uuid": station_uuid,
            })),
            Err(e @ RadiodirError::SourceUnavailable(_)) => {
                warn!("External click proxy failed for {}: {}", station_uuid, e);
                HttpResponse::Ok().json(json!({
                    "success": false,
                    "station_uuid": station_uuid,
                    "message": e.message(),
                }))
            }
            Err(e) => error_response(&e),
        }
    }
}
