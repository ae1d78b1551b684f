//! 热门电台聚合
//!
//! 与分面合并不同的对账策略：跨源不存在电台级身份，不做 key 合并。
//! 两侧记录各自带源标记，拼接后按各源自己的热度字段
//! （外部为投票数，本地为累计点击数）全局稳定排序再截断。

use serde::Serialize;

use super::Aggregator;
use crate::errors::Result;
use crate::sources::{StationQuery, StationRecord};

/// 热门电台聚合结果
#[derive(Debug, Clone, Serialize)]
pub struct PopularOutcome {
    pub stations: Vec<StationRecord>,
    /// 截断前外部侧贡献的记录数
    pub external_count: usize,
    /// 截断前本地侧贡献的记录数
    pub custom_count: usize,
    pub external_available: bool,
    pub custom_available: bool,
}

impl Aggregator {
    /// 热门电台视图
    pub async fn popular_stations(&self, limit: u64) -> Result<PopularOutcome> {
        let limit = self.clamp_limit(limit);
        let query = StationQuery::popular(limit);

        let (external_res, local_res) = self.fetch_stations_both(&query).await;
        Self::check_total_failure(&external_res, &local_res, "popular stations")?;

        let (external, external_available) = Self::degrade("external", external_res);
        let (custom, custom_available) = Self::degrade("local", local_res);

        let external_count = external.len();
        let custom_count = custom.len();

        // 拼接：外部在前；稳定排序保证并列热度时该顺序不变
        let mut stations = external;
        stations.extend(custom);
        stations.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        stations.truncate(limit as usize);

        Ok(PopularOutcome {
            stations,
            external_count,
            custom_count,
            external_available,
            custom_available,
        })
    }
}
