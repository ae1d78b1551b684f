//! 点击写路径
//!
//! 本地电台：校验引用 → 事件行落库 → 递增 total_clicks 计数器。
//! 外部电台：不入本地统计，透传给目录服务自己的登记端点。

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::errors::{RadiodirError, Result};
use crate::sources::ExternalDirectory;
use crate::storage::SeaOrmStorage;
use crate::storage::backend::STATUS_ACTIVE;

/// 本地点击登记结果
#[derive(Debug, Clone, Serialize)]
pub struct ClickOutcome {
    pub station_id: i64,
    /// 登记后的快路径计数值（同连接池读己之写）
    pub total_clicks: i64,
}

/// 点击登记服务
pub struct ClickService {
    storage: Arc<SeaOrmStorage>,
    external: Arc<ExternalDirectory>,
}

impl ClickService {
    pub fn new(storage: Arc<SeaOrmStorage>, external: Arc<ExternalDirectory>) -> Self {
        Self { storage, external }
    }

    /// 登记一次本地电台访问
    ///
    /// 只接受存在且活跃的本地电台，否则返回 `InvalidReference`。
    pub async fn register_click(
        &self,
        station_id: i64,
        ip_address: Option<String>,
        user_agent: Option<String>,
        referrer: Option<String>,
    ) -> Result<ClickOutcome> {
        let station = self
            .storage
            .get_station(station_id)
            .await?
            .ok_or_else(|| {
                RadiodirError::invalid_reference(format!("station {} does not exist", station_id))
            })?;

        if station.status != STATUS_ACTIVE {
            return Err(RadiodirError::invalid_reference(format!(
                "station {} is not active (status: {})",
                station_id, station.status
            )));
        }

        let total_clicks = self
            .storage
            .record_click(station_id, Utc::now(), ip_address, user_agent, referrer)
            .await?;

        debug!(
            "Click registered for station {} (total: {})",
            station_id, total_clicks
        );

        Ok(ClickOutcome {
            station_id,
            total_clicks,
        })
    }

    /// 登记一次外部电台访问（代理给目录服务）
    pub async fn register_external_click(&self, station_uuid: &str) -> Result<()> {
        self.external.register_click(station_uuid).await
    }
}
