use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing::info;
use tracing_subscriber::EnvFilter;

use radiodir::aggregator::Aggregator;
use radiodir::analytics::{ClickService, RetentionTask, StatisticsRoller};
use radiodir::api::{self, AppStartTime};
use radiodir::config::AppConfig;
use radiodir::sources::{CatalogSource, ExternalDirectory, LocalCatalog};
use radiodir::storage::StorageFactory;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 记录程序启动时间
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    dotenvy::dotenv().ok();

    // 加载配置（启动后显式注入，无全局单例）
    let config = AppConfig::load();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    // 初始化存储（含迁移）
    let storage = StorageFactory::create(&config)
        .await
        .unwrap_or_else(|e| panic!("Failed to initialize storage: {}", e));

    // 两个目录源
    let external = Arc::new(ExternalDirectory::new(&config.directory));
    let local: Arc<dyn CatalogSource> = Arc::new(LocalCatalog::new(Arc::clone(&storage)));

    // 聚合器与点击服务
    let aggregator = Arc::new(Aggregator::new(
        Arc::clone(&local),
        Arc::clone(&external) as Arc<dyn CatalogSource>,
        &config.directory,
        &config.aggregator,
    ));
    let click_service = Arc::new(ClickService::new(
        Arc::clone(&storage),
        Arc::clone(&external),
    ));

    // 后台任务：周期统计汇总 + 事件清理
    let roller = Arc::new(StatisticsRoller::new(Arc::clone(&storage)));
    roller.spawn_background_task(config.analytics.roller_interval_secs);

    let retention = Arc::new(RetentionTask::new(
        Arc::clone(&storage),
        &config.analytics,
    ));
    retention.spawn_background_task(config.analytics.retention_interval_hours);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting radiodir at http://{}", bind_address);
    info!("External directory: {}", config.directory.base_url);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(Arc::clone(&storage)))
            .app_data(web::Data::new(Arc::clone(&aggregator)))
            .app_data(web::Data::new(Arc::clone(&click_service)))
            .app_data(web::Data::new(app_start_time.clone()))
            .service(api::api_routes())
            .service(radiodir::api::health::health_routes())
    })
    .bind(bind_address)?
    .run()
    .await
}
