//! 点击统计管道集成测试
//!
//! 走真实的 SQLite 存储（tempfile）：事件落库、计数器、
//! 周期汇总的幂等性、清理任务的安全边界。

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tempfile::TempDir;

use migration::entities::{click_event, period_statistic};
use radiodir::analytics::{
    ClickService, PERIOD_LENGTH_SECS, RetentionTask, StatisticsRoller, period_index,
};
use radiodir::config::{AnalyticsConfig, DatabaseConfig, DirectoryConfig};
use radiodir::errors::RadiodirError;
use radiodir::sources::ExternalDirectory;
use radiodir::storage::{NewStation, SeaOrmStorage};

async fn test_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("radiodir_test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}", db_path.display()),
        ..Default::default()
    };

    let storage = SeaOrmStorage::new(&config, "sqlite").await.unwrap();
    (Arc::new(storage), dir)
}

fn sample_station(name: &str) -> NewStation {
    NewStation {
        name: name.to_string(),
        stream_url: "http://example.com/stream".to_string(),
        country: "Iceland".to_string(),
        language: "icelandic".to_string(),
        tags: vec!["rock".to_string()],
        description: None,
    }
}

/// 固定周期内的时间戳（100 号周期起点 + offset 秒）
fn ts_in_period(period: i64, offset_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(period * PERIOD_LENGTH_SECS + offset_secs, 0).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_click_increments_counter_and_persists_event() {
    let (storage, _dir) = test_storage().await;
    let station = storage.create_station(sample_station("Test FM")).await.unwrap();

    let total = storage
        .record_click(
            station.id,
            Utc::now(),
            Some("203.0.113.7".to_string()),
            Some("test-agent".to_string()),
            None,
        )
        .await
        .unwrap();
    assert_eq!(total, 1);

    let total = storage
        .record_click(station.id, Utc::now(), None, None, None)
        .await
        .unwrap();
    assert_eq!(total, 2);

    // 事件行逐条持久化
    let event_count = click_event::Entity::find()
        .filter(click_event::Column::StationId.eq(station.id))
        .count(storage.get_db())
        .await
        .unwrap();
    assert_eq!(event_count, 2);

    // 计数器读己之写
    let reloaded = storage.get_station(station.id).await.unwrap().unwrap();
    assert_eq!(reloaded.total_clicks, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_click_service_rejects_unknown_station() {
    let (storage, _dir) = test_storage().await;
    let external = Arc::new(ExternalDirectory::new(&DirectoryConfig::default()));
    let service = ClickService::new(Arc::clone(&storage), external);

    let result = service.register_click(9999, None, None, None).await;
    assert!(matches!(result, Err(RadiodirError::InvalidReference(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_roller_folds_same_window_into_one_row() {
    let (storage, _dir) = test_storage().await;
    let station = storage.create_station(sample_station("Roll FM")).await.unwrap();

    // 同一 14 天窗口内的两次点击
    storage
        .record_click(station.id, ts_in_period(100, 10), None, None, None)
        .await
        .unwrap();
    storage
        .record_click(station.id, ts_in_period(100, 5 * 86_400), None, None, None)
        .await
        .unwrap();

    let roller = StatisticsRoller::new(Arc::clone(&storage));
    let report = roller.run_pass().await.unwrap();
    assert_eq!(report.stations_processed, 1);
    assert_eq!(report.events_rolled, 2);
    assert_eq!(report.periods_touched, 1);

    // 恰好一行，access_count = 2，窗口边界正确
    let rows = period_statistic::Entity::find()
        .filter(period_statistic::Column::StationId.eq(station.id))
        .all(storage.get_db())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].access_count, 2);
    assert_eq!(rows[0].period_start.timestamp(), 100 * PERIOD_LENGTH_SECS);
    assert_eq!(rows[0].period_end.timestamp(), 101 * PERIOD_LENGTH_SECS);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_roller_is_idempotent() {
    let (storage, _dir) = test_storage().await;
    let station = storage.create_station(sample_station("Idem FM")).await.unwrap();

    storage
        .record_click(station.id, ts_in_period(100, 60), None, None, None)
        .await
        .unwrap();
    storage
        .record_click(station.id, ts_in_period(100, 120), None, None, None)
        .await
        .unwrap();

    let roller = StatisticsRoller::new(Arc::clone(&storage));
    roller.run_pass().await.unwrap();

    // 第二轮不应重复计数
    let report = roller.run_pass().await.unwrap();
    assert_eq!(report.events_rolled, 0);

    let rows = period_statistic::Entity::find()
        .filter(period_statistic::Column::StationId.eq(station.id))
        .all(storage.get_db())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].access_count, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_roller_upserts_into_existing_period() {
    let (storage, _dir) = test_storage().await;
    let station = storage.create_station(sample_station("Upsert FM")).await.unwrap();
    let roller = StatisticsRoller::new(Arc::clone(&storage));

    storage
        .record_click(station.id, ts_in_period(100, 60), None, None, None)
        .await
        .unwrap();
    roller.run_pass().await.unwrap();

    // 同窗口后到的事件累加进已存在的行
    storage
        .record_click(station.id, ts_in_period(100, 3600), None, None, None)
        .await
        .unwrap();
    roller.run_pass().await.unwrap();

    let rows = period_statistic::Entity::find()
        .filter(period_statistic::Column::StationId.eq(station.id))
        .all(storage.get_db())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].access_count, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_roller_separates_windows_and_stations() {
    let (storage, _dir) = test_storage().await;
    let a = storage.create_station(sample_station("A FM")).await.unwrap();
    let b = storage.create_station(sample_station("B FM")).await.unwrap();

    storage
        .record_click(a.id, ts_in_period(100, 60), None, None, None)
        .await
        .unwrap();
    storage
        .record_click(a.id, ts_in_period(101, 60), None, None, None)
        .await
        .unwrap();
    storage
        .record_click(b.id, ts_in_period(100, 60), None, None, None)
        .await
        .unwrap();

    let roller = StatisticsRoller::new(Arc::clone(&storage));
    let report = roller.run_pass().await.unwrap();
    assert_eq!(report.stations_processed, 2);
    assert_eq!(report.periods_touched, 3);

    let a_rows = period_statistic::Entity::find()
        .filter(period_statistic::Column::StationId.eq(a.id))
        .count(storage.get_db())
        .await
        .unwrap();
    assert_eq!(a_rows, 2);

    let b_rows = period_statistic::Entity::find()
        .filter(period_statistic::Column::StationId.eq(b.id))
        .count(storage.get_db())
        .await
        .unwrap();
    assert_eq!(b_rows, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_retention_prunes_only_rolled_events() {
    let (storage, _dir) = test_storage().await;
    let station = storage.create_station(sample_station("Prune FM")).await.unwrap();
    let old = Utc::now() - Duration::days(90);

    // 一条已汇总的过期事件、一条未汇总的过期事件
    click_event::ActiveModel {
        station_id: Set(station.id),
        clicked_at: Set(old),
        ip_address: Set(None),
        user_agent: Set(None),
        referrer: Set(None),
        rolled: Set(true),
        ..Default::default()
    }
    .insert(storage.get_db())
    .await
    .unwrap();

    click_event::ActiveModel {
        station_id: Set(station.id),
        clicked_at: Set(old),
        ip_address: Set(None),
        user_agent: Set(None),
        referrer: Set(None),
        rolled: Set(false),
        ..Default::default()
    }
    .insert(storage.get_db())
    .await
    .unwrap();

    let task = RetentionTask::new(
        Arc::clone(&storage),
        &AnalyticsConfig {
            retention_grace_days: 30,
            ..Default::default()
        },
    );
    let report = task.run_cleanup().await.unwrap();
    assert_eq!(report.events_deleted, 1);

    // 未汇总的事件必须保留
    let remaining = click_event::Entity::find()
        .filter(click_event::Column::StationId.eq(station.id))
        .all(storage.get_db())
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(!remaining[0].rolled);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_retention_keeps_recent_rolled_events() {
    let (storage, _dir) = test_storage().await;
    let station = storage.create_station(sample_station("Fresh FM")).await.unwrap();

    storage
        .record_click(station.id, Utc::now(), None, None, None)
        .await
        .unwrap();
    StatisticsRoller::new(Arc::clone(&storage))
        .run_pass()
        .await
        .unwrap();

    // 已汇总但在宽限期内 → 不删除
    let task = RetentionTask::new(Arc::clone(&storage), &AnalyticsConfig::default());
    let report = task.run_cleanup().await.unwrap();
    assert_eq!(report.events_deleted, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_period_index_matches_roller_windows() {
    // 确认 roller 使用的分桶函数与窗口定义一致
    let ts = ts_in_period(42, 13 * 86_400 + 86_399);
    assert_eq!(period_index(ts), 42);
    let ts_next = ts_in_period(42, 14 * 86_400);
    assert_eq!(period_index(ts_next), 43);
}
