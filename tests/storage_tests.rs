//! 本地目录存储与适配器集成测试（SQLite）

use std::sync::Arc;

use tempfile::TempDir;

use radiodir::config::DatabaseConfig;
use radiodir::sources::{CatalogSource, FacetKind, LocalCatalog, StationQuery};
use radiodir::storage::{NewStation, SeaOrmStorage, StationFilter};

async fn test_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("catalog_test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}", db_path.display()),
        ..Default::default()
    };

    let storage = SeaOrmStorage::new(&config, "sqlite").await.unwrap();
    (Arc::new(storage), dir)
}

fn station(name: &str, country: &str, language: &str, tags: &[&str]) -> NewStation {
    NewStation {
        name: name.to_string(),
        stream_url: "http://example.com/stream".to_string(),
        country: country.to_string(),
        language: language.to_string(),
        tags: tags.iter().map(|s| s.to_string()).collect(),
        description: Some(format!("{} test stream", name)),
    }
}

async fn seed(storage: &SeaOrmStorage) {
    storage
        .create_station(station("Reykjavik Rock", "Iceland", "icelandic", &["Rock"]))
        .await
        .unwrap();
    storage
        .create_station(station(
            "Berlin Mix",
            "Germany",
            "german",
            &["rock", "pop"],
        ))
        .await
        .unwrap();
    storage
        .create_station(station("Hamburg Jazz", "Germany", "german", &["jazz"]))
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_country_counts_group_by() {
    let (storage, _dir) = test_storage().await;
    seed(&storage).await;

    let mut counts = storage.country_counts().await.unwrap();
    counts.sort();

    assert_eq!(
        counts,
        vec![("Germany".to_string(), 2), ("Iceland".to_string(), 1)]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_stations_by_country_and_text() {
    let (storage, _dir) = test_storage().await;
    seed(&storage).await;

    let filter = StationFilter {
        country: Some("Germany".to_string()),
        ..Default::default()
    };
    let (models, total) = storage.search_stations(&filter, 0, 10).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(models.len(), 2);

    // 大小写不敏感的名称子串
    let filter = StationFilter {
        search: Some("BERLIN".to_string()),
        ..Default::default()
    };
    let (models, total) = storage.search_stations(&filter, 0, 10).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(models[0].name, "Berlin Mix");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_local_catalog_genre_facet_is_case_insensitive() {
    let (storage, _dir) = test_storage().await;
    seed(&storage).await;

    let catalog = LocalCatalog::new(Arc::clone(&storage));
    let genres = catalog.fetch_facet(FacetKind::Genre, 100).await.unwrap();

    // "Rock" 和 "rock" 归并为一个 key，计 2 个电台
    let rock = genres
        .iter()
        .find(|g| g.label.eq_ignore_ascii_case("rock"))
        .unwrap();
    assert_eq!(rock.count, 2);
    // 首见大小写保留（种子里 "Rock" 先插入）
    assert_eq!(rock.label, "Rock");

    assert_eq!(genres.len(), 3); // rock, pop, jazz
}

#[tokio::test(flavor = "multi_thread")]
async fn test_local_catalog_genre_query_confirms_membership() {
    let (storage, _dir) = test_storage().await;
    seed(&storage).await;

    let catalog = LocalCatalog::new(Arc::clone(&storage));
    let query = StationQuery {
        genre: Some("ROCK".to_string()),
        limit: 10,
        ..Default::default()
    };

    let records = catalog.fetch_stations(&query).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| {
        r.tags.iter().any(|t| t.eq_ignore_ascii_case("rock"))
    }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_local_records_use_clicks_as_popularity() {
    let (storage, _dir) = test_storage().await;
    let created = storage
        .create_station(station("Click FM", "Iceland", "icelandic", &["pop"]))
        .await
        .unwrap();

    storage
        .record_click(created.id, chrono::Utc::now(), None, None, None)
        .await
        .unwrap();

    let catalog = LocalCatalog::new(Arc::clone(&storage));
    let records = catalog
        .fetch_stations(&StationQuery::popular(10))
        .await
        .unwrap();

    let record = records.iter().find(|r| r.name == "Click FM").unwrap();
    assert_eq!(record.popularity, 1);
    assert_eq!(record.id, created.id.to_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_catalog_stats_aggregates() {
    let (storage, _dir) = test_storage().await;
    seed(&storage).await;

    let stats = storage.get_catalog_stats().await;
    assert_eq!(stats.total_stations, 3);
    assert_eq!(stats.active_stations, 3);
    assert_eq!(stats.total_clicks, 0);
}
