//! 全文搜索聚合
//!
//! 最简单的模式：独立扇出、完全不合并。两个列表分开返回，
//! 向客户端保留来源透明性，呈现方式由调用方决定。

use serde::Serialize;

use super::Aggregator;
use crate::errors::{RadiodirError, Result};
use crate::sources::{StationQuery, StationRecord};

/// 搜索聚合结果：两个来源的列表各自独立
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub custom_stations: Vec<StationRecord>,
    pub external_stations: Vec<StationRecord>,
    pub external_available: bool,
    pub custom_available: bool,
}

impl Aggregator {
    /// 按统一查询做两源搜索
    pub async fn search(&self, query: &StationQuery) -> Result<SearchOutcome> {
        if query.search.as_deref().map(str::trim).unwrap_or("").is_empty()
            && query.country.is_none()
            && query.language.is_none()
            && query.genre.is_none()
        {
            return Err(RadiodirError::validation(
                "search requires a query string or at least one filter",
            ));
        }

        let mut query = query.clone();
        query.limit = self.clamp_limit(query.limit);

        let (external_res, local_res) = self.fetch_stations_both(&query).await;
        Self::check_total_failure(&external_res, &local_res, "station search")?;

        let (external_stations, external_available) = Self::degrade("external", external_res);
        let (custom_stations, custom_available) = Self::degrade("local", local_res);

        Ok(SearchOutcome {
            custom_stations,
            external_stations,
            external_available,
            custom_available,
        })
    }
}
