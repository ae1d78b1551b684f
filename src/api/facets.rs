//! 分面查询端点

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::error_response;
use crate::aggregator::Aggregator;
use crate::errors::RadiodirError;
use crate::sources::FacetKind;

const DEFAULT_FACET_LIMIT: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct FacetParams {
    pub limit: Option<u64>,
}

pub struct FacetService;

impl FacetService {
    /// GET /api/facets/{kind}?limit=
    pub async fn facet_view(
        path: web::Path<String>,
        params: web::Query<FacetParams>,
        aggregator: web::Data<Arc<Aggregator>>,
    ) -> impl Responder {
        let kind = match path.as_str() {
            "countries" => FacetKind::Country,
            "genres" | "tags" => FacetKind::Genre,
            "languages" => FacetKind::Language,
            other => {
                return error_response(&RadiodirError::validation(format!(
                    "unknown facet '{}'. Valid: countries, genres, languages",
                    other
                )));
            }
        };

        let limit = params.limit.unwrap_or(DEFAULT_FACET_LIMIT);
        debug!("Facet request: kind={}, limit={}", kind, limit);

        match aggregator.facet_view(kind, limit).await {
            Ok(outcome) => HttpResponse::Ok().json(json!({
                "success": true,
                "facet": kind.to_string(),
                "external_available": outcome.external_available,
                "custom_available": outcome.custom_available,
                "summary": outcome.summary,
                "total": outcome.summary.unique_total,
                "top": outcome.top,
                "results": outcome.entries,
            })),
            Err(e) => error_response(&e),
        }
    }
}
