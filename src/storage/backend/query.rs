//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, ExprTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use tracing::{debug, error};

use super::{STATUS_ACTIVE, SeaOrmStorage, StationFilter, retry};
use crate::errors::Result;
use crate::storage::models::CatalogStats;

use migration::entities::{period_statistic, station};

/// 用于统计查询的结果结构体（DSL 聚合查询）
#[derive(Debug, FromQueryResult)]
struct StatsResult {
    total_stations: i64,
    total_clicks: Option<i64>,
    active_stations: Option<i64>,
}

impl SeaOrmStorage {
    /// 按 ID 查询电台（不过滤状态，调用方自行判断）
    pub async fn get_station(&self, id: i64) -> Result<Option<station::Model>> {
        let db = &self.db;

        let model = retry::with_retry(
            &format!("get_station({})", id),
            self.retry_config,
            || async { station::Entity::find_by_id(id).one(db).await },
        )
        .await?;

        Ok(model)
    }

    /// 构建电台过滤条件（status = active 隐式附加）
    fn build_condition(filter: &StationFilter) -> Condition {
        let mut condition =
            Condition::all().add(station::Column::Status.eq(STATUS_ACTIVE));

        if let Some(ref country) = filter.country {
            condition = condition.add(station::Column::Country.eq(country.as_str()));
        }

        if let Some(ref language) = filter.language {
            condition = condition.add(station::Column::Language.eq(language.as_str()));
        }

        // 流派：对 JSON tags 列做小写子串匹配（带引号保证整词），
        // 本地适配器在 Rust 侧再做精确确认
        if let Some(ref genre) = filter.genre {
            condition = condition.add(
                Func::lower(Expr::col(station::Column::Tags))
                    .like(format!("%\"{}\"%", genre.trim().to_lowercase())),
            );
        }

        // 搜索：名称或描述子串（统一转小写，跨数据库行为一致）
        if let Some(ref search) = filter.search {
            let pattern = format!("%{}%", search.trim().to_lowercase());
            condition = condition.add(
                Condition::any()
                    .add(Func::lower(Expr::col(station::Column::Name)).like(pattern.clone()))
                    .add(Func::lower(Expr::col(station::Column::Description)).like(pattern)),
            );
        }

        condition
    }

    /// 带过滤条件的电台查询（带 COUNT 缓存）
    ///
    /// 按热度（total_clicks）降序、创建时间降序排列，offset/limit 分页。
    pub async fn search_stations(
        &self,
        filter: &StationFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<station::Model>, u64)> {
        let condition = Self::build_condition(filter);

        // 生成缓存 key（基于过滤条件）
        let cache_key = format!(
            "count:c={:?}:l={:?}:g={:?}:s={:?}",
            filter.country, filter.language, filter.genre, filter.search
        );

        // 尝试从缓存获取总数
        let total = if let Some(cached) = self.count_cache().get(&cache_key) {
            debug!("count cache hit: key={}, value={}", cache_key, cached);
            cached
        } else {
            let db = &self.db;
            let cond = condition.clone();
            let count = retry::with_retry("search_stations(count)", self.retry_config, || async {
                station::Entity::find().filter(cond.clone()).count(db).await
            })
            .await?;

            self.count_cache().insert(cache_key, count);
            count
        };

        let db = &self.db;
        let models = retry::with_retry("search_stations(data)", self.retry_config, || async {
            station::Entity::find()
                .filter(condition.clone())
                .order_by_desc(station::Column::TotalClicks)
                .order_by_desc(station::Column::CreatedAt)
                .offset(offset)
                .limit(limit)
                .all(db)
                .await
        })
        .await?;

        Ok((models, total))
    }

    /// 国家分面计数（SQL GROUP BY）
    pub async fn country_counts(&self) -> Result<Vec<(String, i64)>> {
        self.grouped_counts(station::Column::Country, "country_counts")
            .await
    }

    /// 语言分面计数（SQL GROUP BY）
    pub async fn language_counts(&self) -> Result<Vec<(String, i64)>> {
        self.grouped_counts(station::Column::Language, "language_counts")
            .await
    }

    async fn grouped_counts(
        &self,
        column: station::Column,
        operation_name: &str,
    ) -> Result<Vec<(String, i64)>> {
        let db = &self.db;

        let rows = retry::with_retry(operation_name, self.retry_config, || async {
            station::Entity::find()
                .select_only()
                .column_as(column, "label")
                .column_as(station::Column::Id.count(), "station_count")
                .filter(station::Column::Status.eq(STATUS_ACTIVE))
                .group_by(column)
                .into_tuple::<(String, i64)>()
                .all(db)
                .await
        })
        .await?;

        Ok(rows)
    }

    /// 所有活跃电台的 tags 列（流派分面在 Rust 侧解析计数）
    pub async fn tag_lists(&self) -> Result<Vec<String>> {
        let db = &self.db;

        let rows = retry::with_retry("tag_lists", self.retry_config, || async {
            station::Entity::find()
                .select_only()
                .column(station::Column::Tags)
                .filter(station::Column::Status.eq(STATUS_ACTIVE))
                .into_tuple::<String>()
                .all(db)
                .await
        })
        .await?;

        Ok(rows)
    }

    /// 某电台最近的周期统计行（period_start 降序）
    pub async fn station_period_stats(
        &self,
        station_id: i64,
        limit: u64,
    ) -> Result<Vec<period_statistic::Model>> {
        let db = &self.db;

        let rows = retry::with_retry(
            &format!("station_period_stats({})", station_id),
            self.retry_config,
            || async {
                period_statistic::Entity::find()
                    .filter(period_statistic::Column::StationId.eq(station_id))
                    .order_by_desc(period_statistic::Column::PeriodStart)
                    .limit(limit)
                    .all(db)
                    .await
            },
        )
        .await?;

        Ok(rows)
    }

    /// 获取本地目录统计信息（SeaORM DSL 聚合查询）
    pub async fn get_catalog_stats(&self) -> CatalogStats {
        let result = station::Entity::find()
            .select_only()
            // COUNT(*) - 总电台数
            .column_as(station::Column::Id.count(), "total_stations")
            // SUM(total_clicks) - 总点击数
            .column_as(station::Column::TotalClicks.sum(), "total_clicks")
            // SUM(CASE WHEN status = 'active' THEN 1 ELSE 0 END) - 活跃电台数
            .column_as(
                Expr::case(station::Column::Status.eq(STATUS_ACTIVE), 1)
                    .finally(0)
                    .sum(),
                "active_stations",
            )
            .into_model::<StatsResult>()
            .one(&self.db)
            .await;

        match result {
            Ok(Some(stats)) => CatalogStats {
                total_stations: stats.total_stations as usize,
                total_clicks: stats.total_clicks.unwrap_or(0) as usize,
                active_stations: stats.active_stations.unwrap_or(0) as usize,
            },
            Ok(None) => {
                error!("统计查询返回空结果");
                CatalogStats::default()
            }
            Err(e) => {
                error!("统计查询失败: {}", e);
                CatalogStats::default()
            }
        }
    }
}
