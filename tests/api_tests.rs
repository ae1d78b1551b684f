//! API 层集成测试
//!
//! 覆盖响应契约：部分失败仍 200 + success 标志，
//! 全部失败映射为 503，参数错误映射为 400。

use std::sync::Arc;

use actix_web::{App, test, web};
use async_trait::async_trait;

use radiodir::aggregator::Aggregator;
use radiodir::api;
use radiodir::config::{AggregatorConfig, DirectoryConfig};
use radiodir::errors::{RadiodirError, Result};
use radiodir::sources::{
    CatalogSource, FacetEntry, FacetKind, Provenance, StationQuery, StationRecord,
};

struct StubSource {
    provenance: Provenance,
    facets: Vec<FacetEntry>,
    fail: bool,
}

#[async_trait]
impl CatalogSource for StubSource {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn provenance(&self) -> Provenance {
        self.provenance
    }

    async fn fetch_facet(&self, _facet: FacetKind, _limit: u64) -> Result<Vec<FacetEntry>> {
        if self.fail {
            return Err(RadiodirError::source_unavailable("stub down"));
        }
        Ok(self.facets.clone())
    }

    async fn fetch_stations(&self, _query: &StationQuery) -> Result<Vec<StationRecord>> {
        if self.fail {
            return Err(RadiodirError::source_unavailable("stub down"));
        }
        Ok(Vec::new())
    }
}

fn stub_aggregator(local_fail: bool, external_fail: bool) -> Arc<Aggregator> {
    let local = StubSource {
        provenance: Provenance::Custom,
        facets: vec![FacetEntry {
            label: "Brazil".to_string(),
            count: 5,
        }],
        fail: local_fail,
    };
    let external = StubSource {
        provenance: Provenance::External,
        facets: vec![FacetEntry {
            label: "brazil".to_string(),
            count: 120,
        }],
        fail: external_fail,
    };

    Arc::new(Aggregator::new(
        Arc::new(local),
        Arc::new(external),
        &DirectoryConfig {
            timeout_secs: 1,
            ..Default::default()
        },
        &AggregatorConfig::default(),
    ))
}

#[actix_rt::test]
async fn test_facet_endpoint_merges_sources() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(stub_aggregator(false, false)))
            .service(api::api_routes()),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/facets/countries?limit=10")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 1);
    assert_eq!(body["results"][0]["combined"], 125);
    assert_eq!(body["results"][0]["provenance"], "both");
    assert_eq!(body["results"][0]["custom_count"], 5);
}

#[actix_rt::test]
async fn test_facet_endpoint_partial_failure_still_succeeds() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(stub_aggregator(false, true)))
            .service(api::api_routes()),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/facets/countries")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["external_available"], false);
    assert_eq!(body["custom_available"], true);
    assert_eq!(body["results"][0]["provenance"], "custom");
}

#[actix_rt::test]
async fn test_facet_endpoint_total_failure_is_503() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(stub_aggregator(true, true)))
            .service(api::api_routes()),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/facets/genres")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::SERVICE_UNAVAILABLE
    );

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "E008");
}

#[actix_rt::test]
async fn test_unknown_facet_is_400() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(stub_aggregator(false, false)))
            .service(api::api_routes()),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/facets/colors")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_search_without_criteria_is_400() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(stub_aggregator(false, false)))
            .service(api::api_routes()),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/stations/search")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}
