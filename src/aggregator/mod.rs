//! 聚合器
//!
//! 对一次分面/搜索请求，从两个目录源并发取数并合并成一份
//! 有序、去重的结果集。三种互不统一的合并策略：
//! - 分面（国家/流派/语言）：按归一化 key 合并计数
//! - 热门电台：不做 key 合并，拼接后按各源自己的热度字段全局排序
//! - 全文搜索：只扇出不合并，两个列表原样返回
//!
//! 每次调用无状态、可独立重算；单侧失败降级为空贡献，
//! 只有两侧同时失败才向调用方返回错误。

mod facets;
mod popular;
mod search;

pub use facets::{FacetMergeOutcome, MergeSummary, merge_facet_entries, normalize_key};
pub use popular::PopularOutcome;
pub use search::SearchOutcome;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use crate::config::{AggregatorConfig, DirectoryConfig};
use crate::errors::{RadiodirError, Result};
use crate::sources::{CatalogSource, FacetEntry, FacetKind, Provenance, StationQuery, StationRecord};

/// 合并后的分面计数
///
/// `key` 是归一化（trim + 小写）后的合并键，`label` 保留首见大小写。
/// 不变式：`combined = external_count + custom_count`；
/// `provenance = Both` 当且仅当两侧都有贡献。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    pub key: String,
    pub label: String,
    pub external_count: i64,
    pub custom_count: i64,
    pub combined: i64,
    pub provenance: Provenance,
}

/// 两源聚合器
pub struct Aggregator {
    local: Arc<dyn CatalogSource>,
    external: Arc<dyn CatalogSource>,
    /// 外部源调用的整体超时，超时即放弃该侧（不影响本地侧）
    external_timeout: Duration,
    max_limit: u64,
    top_n: usize,
}

impl Aggregator {
    pub fn new(
        local: Arc<dyn CatalogSource>,
        external: Arc<dyn CatalogSource>,
        directory: &DirectoryConfig,
        config: &AggregatorConfig,
    ) -> Self {
        Self {
            local,
            external,
            external_timeout: Duration::from_secs(directory.timeout_secs),
            max_limit: config.max_limit,
            top_n: config.top_n,
        }
    }

    /// 请求条数夹取到 [1, max_limit]
    fn clamp_limit(&self, limit: u64) -> u64 {
        limit.clamp(1, self.max_limit)
    }

    fn top_n(&self) -> usize {
        self.top_n
    }

    /// 并发拉取两侧分面；外部侧带超时
    async fn fetch_facet_both(
        &self,
        facet: FacetKind,
        limit: u64,
    ) -> (Result<Vec<FacetEntry>>, Result<Vec<FacetEntry>>) {
        let (external, local) = tokio::join!(
            tokio::time::timeout(self.external_timeout, self.external.fetch_facet(facet, limit)),
            self.local.fetch_facet(facet, limit),
        );

        let external = external.unwrap_or_else(|_| {
            Err(RadiodirError::source_unavailable(format!(
                "external facet fetch timed out after {:?}",
                self.external_timeout
            )))
        });

        (external, local)
    }

    /// 并发拉取两侧电台；外部侧带超时
    async fn fetch_stations_both(
        &self,
        query: &StationQuery,
    ) -> (Result<Vec<StationRecord>>, Result<Vec<StationRecord>>) {
        let (external, local) = tokio::join!(
            tokio::time::timeout(self.external_timeout, self.external.fetch_stations(query)),
            self.local.fetch_stations(query),
        );

        let external = external.unwrap_or_else(|_| {
            Err(RadiodirError::source_unavailable(format!(
                "external station fetch timed out after {:?}",
                self.external_timeout
            )))
        });

        (external, local)
    }

    /// 单侧失败降级为空贡献，返回 (数据, 该侧是否可用)
    fn degrade<T>(side: &'static str, result: Result<Vec<T>>) -> (Vec<T>, bool) {
        match result {
            Ok(items) => (items, true),
            Err(e) => {
                warn!("{} catalog source degraded to empty: {}", side, e);
                (Vec::new(), false)
            }
        }
    }

    /// 两侧同时失败 → AggregationUnavailable
    fn check_total_failure<A, B>(
        external: &Result<A>,
        local: &Result<B>,
        what: &str,
    ) -> Result<()> {
        if let (Err(ext_err), Err(local_err)) = (external, local) {
            return Err(RadiodirError::aggregation_unavailable(format!(
                "both catalog sources failed for {}: external: {}; local: {}",
                what, ext_err, local_err
            )));
        }
        Ok(())
    }
}
