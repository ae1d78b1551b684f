//! HTTP 服务层
//!
//! 薄封装：解析请求参数、调用聚合器/点击服务、序列化结果。
//! 分面/搜索响应在部分源失败时仍返回 200 + success 标志，
//! 只有两侧全部失败才映射为非 2xx。

pub mod clicks;
pub mod facets;
pub mod health;
pub mod stations;

use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::errors::RadiodirError;

pub use health::AppStartTime;

/// 错误 → HTTP 响应的统一映射
pub(crate) fn error_response(err: &RadiodirError) -> HttpResponse {
    let body = json!({
        "success": false,
        "code": err.code(),
        "error": err.error_type(),
        "message": err.message(),
    });

    match err {
        RadiodirError::AggregationUnavailable(_) => HttpResponse::ServiceUnavailable().json(body),
        RadiodirError::InvalidReference(_) => HttpResponse::NotFound().json(body),
        RadiodirError::Validation(_) => HttpResponse::BadRequest().json(body),
        RadiodirError::SourceUnavailable(_) => HttpResponse::BadGateway().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

/// API 路由配置
pub fn api_routes() -> actix_web::Scope {
    web::scope("/api")
        .route("/facets/{kind}", web::get().to(facets::FacetService::facet_view))
        .route(
            "/stations/popular",
            web::get().to(stations::StationService::popular),
        )
        .route(
            "/stations/search",
            web::get().to(stations::StationService::search),
        )
        .route("/stations", web::post().to(stations::StationService::create))
        .route(
            "/stations/{id}",
            web::get().to(stations::StationService::get),
        )
        .route(
            "/stations/{id}/stats",
            web::get().to(stations::StationService::stats),
        )
        .route(
            "/stations/{id}/click",
            web::post().to(clicks::ClickApi::register),
        )
        .route(
            "/external/{uuid}/click",
            web::post().to(clicks::ClickApi::register_external),
        )
}
