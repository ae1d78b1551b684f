//! 电台查询/创建端点

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::error_response;
use crate::aggregator::Aggregator;
use crate::errors::RadiodirError;
use crate::sources::StationQuery;
use crate::storage::backend::model_to_station_record;
use crate::storage::{NewStation, SeaOrmStorage};

const DEFAULT_STATION_LIMIT: u64 = 20;
const DEFAULT_STATS_PERIODS: u64 = 6;

#[derive(Debug, Deserialize)]
pub struct PopularParams {
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub genre: Option<String>,
    pub limit: Option<u64>,
    pub page: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub periods: Option<u64>,
}

/// 周期统计行的序列化形状
#[derive(Debug, Serialize)]
struct PeriodStatDto {
    period_start: chrono::DateTime<chrono::Utc>,
    period_end: chrono::DateTime<chrono::Utc>,
    access_count: i64,
    last_updated: chrono::DateTime<chrono::Utc>,
}

pub struct StationService;

impl StationService {
    /// GET /api/stations/popular?limit=
    pub async fn popular(
        params: web::Query<PopularParams>,
        aggregator: web::Data<Arc<Aggregator>>,
    ) -> impl Responder {
        let limit = params.limit.unwrap_or(DEFAULT_STATION_LIMIT);

        match aggregator.popular_stations(limit).await {
            Ok(outcome) => HttpResponse::Ok().json(json!({
                "success": true,
                "external_available": outcome.external_available,
                "custom_available": outcome.custom_available,
                "external_count": outcome.external_count,
                "custom_count": outcome.custom_count,
                "results": outcome.stations,
            })),
            Err(e) => error_response(&e),
        }
    }

    /// GET /api/stations/search?q=&country=&language=&genre=&limit=&page=
    pub async fn search(
        params: web::Query<SearchParams>,
        aggregator: web::Data<Arc<Aggregator>>,
    ) -> impl Responder {
        let limit = params.limit.unwrap_or(DEFAULT_STATION_LIMIT);
        let page = params.page.unwrap_or(1).max(1);

        let query = StationQuery {
            country: params.country.clone().filter(|s| !s.trim().is_empty()),
            language: params.language.clone().filter(|s| !s.trim().is_empty()),
            genre: params.genre.clone().filter(|s| !s.trim().is_empty()),
            search: params.q.clone().filter(|s| !s.trim().is_empty()),
            limit,
            offset: (page - 1) * limit,
        };

        debug!("Search request: {:?}", query);

        match aggregator.search(&query).await {
            Ok(outcome) => HttpResponse::Ok().json(json!({
                "success": true,
                "external_available": outcome.external_available,
                "custom_available": outcome.custom_available,
                "custom_count": outcome.custom_stations.len(),
                "external_count": outcome.external_stations.len(),
                "custom_radios": outcome.custom_stations,
                "external_radios": outcome.external_stations,
            })),
            Err(e) => error_response(&e),
        }
    }

    /// POST /api/stations
    pub async fn create(
        body: web::Json<NewStation>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> impl Responder {
        let new = body.into_inner();

        if new.name.trim().is_empty() {
            return error_response(&RadiodirError::validation("station name must not be empty"));
        }
        if !new.stream_url.starts_with("http://") && !new.stream_url.starts_with("https://") {
            return error_response(&RadiodirError::validation(
                "stream_url must be an http(s) URL",
            ));
        }

        match storage.create_station(new).await {
            Ok(model) => {
                let record = model_to_station_record(model);
                HttpResponse::Created().json(json!({
                    "success": true,
                    "station": record,
                }))
            }
            Err(e) => error_response(&e),
        }
    }

    /// GET /api/stations/{id}
    pub async fn get(
        path: web::Path<i64>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> impl Responder {
        let station_id = path.into_inner();

        match storage.get_station(station_id).await {
            Ok(Some(model)) => {
                let total_clicks = model.total_clicks;
                let record = model_to_station_record(model);
                HttpResponse::Ok().json(json!({
                    "success": true,
                    "station": record,
                    "total_clicks": total_clicks,
                }))
            }
            Ok(None) => error_response(&RadiodirError::invalid_reference(format!(
                "station {} does not exist",
                station_id
            ))),
            Err(e) => error_response(&e),
        }
    }

    /// GET /api/stations/{id}/stats?periods=
    pub async fn stats(
        path: web::Path<i64>,
        params: web::Query<StatsParams>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> impl Responder {
        let station_id = path.into_inner();
        let periods = params.periods.unwrap_or(DEFAULT_STATS_PERIODS);

        let station = match storage.get_station(station_id).await {
            Ok(Some(model)) => model,
            Ok(None) => {
                return error_response(&RadiodirError::invalid_reference(format!(
                    "station {} does not exist",
                    station_id
                )));
            }
            Err(e) => return error_response(&e),
        };

        match storage.station_period_stats(station_id, periods).await {
            Ok(rows) => {
                let stats: Vec<PeriodStatDto> = rows
                    .into_iter()
                    .map(|row| PeriodStatDto {
                        period_start: row.period_start,
                        period_end: row.period_end,
                        access_count: row.access_count,
                        last_updated: row.last_updated,
                    })
                    .collect();

                HttpResponse::Ok().json(json!({
                    "success": true,
                    "station_id": station_id,
                    "total_clicks": station.total_clicks,
                    "periods": stats,
                }))
            }
            Err(e) => error_response(&e),
        }
    }
}
