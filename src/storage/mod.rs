use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::{SeaOrmStorage, StationFilter};
pub use models::{CatalogStats, NewStation};

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &AppConfig) -> Result<Arc<SeaOrmStorage>> {
        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(&config.database.database_url)?;

        let storage = backend::SeaOrmStorage::new(&config.database, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
