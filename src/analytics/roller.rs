//! 统计汇总任务
//!
//! 把未处理的原始点击事件折叠进 period_statistics（14 天窗口，
//! upsert 语义），随后给事件打 rolled 标记。单站的 upsert 与打标
//! 在同一事务中提交，崩溃后重跑不会重复计数。
//!
//! 独立于请求路径按固定间隔运行，也可按需触发。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use tracing::{debug, error, info};

use super::{period_bounds, period_index};
use crate::storage::SeaOrmStorage;
use migration::entities::{click_event, period_statistic};

/// 一轮汇总的报告
#[derive(Debug, Default)]
pub struct RollerReport {
    pub stations_processed: usize,
    pub stations_failed: usize,
    pub events_rolled: u64,
    pub periods_touched: u64,
}

/// 周期统计汇总器
pub struct StatisticsRoller {
    storage: Arc<SeaOrmStorage>,
}

impl StatisticsRoller {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 运行一轮完整汇总
    ///
    /// 逐站独立处理：单站失败只记录，不中断其余站点。
    pub async fn run_pass(&self) -> anyhow::Result<RollerReport> {
        let db = self.storage.get_db();

        // 找出仍有未汇总事件的站点
        let station_ids: Vec<i64> = click_event::Entity::find()
            .select_only()
            .column(click_event::Column::StationId)
            .filter(click_event::Column::Rolled.eq(false))
            .group_by(click_event::Column::StationId)
            .into_tuple()
            .all(db)
            .await?;

        let mut report = RollerReport::default();

        for station_id in station_ids {
            match self.roll_station(station_id).await {
                Ok((events, periods)) => {
                    report.stations_processed += 1;
                    report.events_rolled += events;
                    report.periods_touched += periods;
                }
                Err(e) => {
                    report.stations_failed += 1;
                    error!("Rollup failed for station {} (continuing): {}", station_id, e);
                }
            }
        }

        info!(
            "Statistics rollup pass completed: {} stations, {} events, {} periods, {} failures",
            report.stations_processed,
            report.events_rolled,
            report.periods_touched,
            report.stations_failed
        );

        Ok(report)
    }

    /// 汇总单个站点的未处理事件
    ///
    /// 返回 (折叠的事件数, 触达的周期数)。
    async fn roll_station(&self, station_id: i64) -> anyhow::Result<(u64, u64)> {
        let db = self.storage.get_db();

        let events: Vec<(i64, DateTime<Utc>)> = click_event::Entity::find()
            .select_only()
            .column(click_event::Column::Id)
            .column(click_event::Column::ClickedAt)
            .filter(click_event::Column::StationId.eq(station_id))
            .filter(click_event::Column::Rolled.eq(false))
            .order_by_asc(click_event::Column::Id)
            .into_tuple()
            .all(db)
            .await?;

        if events.is_empty() {
            return Ok((0, 0));
        }

        // 按周期分桶计数
        let mut buckets: HashMap<i64, i64> = HashMap::new();
        let mut event_ids: Vec<i64> = Vec::with_capacity(events.len());
        for (id, clicked_at) in &events {
            event_ids.push(*id);
            *buckets.entry(period_index(*clicked_at)).or_insert(0) += 1;
        }

        // upsert 与打标必须同事务：崩溃后要么整站重做，要么全部生效
        let txn = db.begin().await?;
        let now = Utc::now();

        for (index, count) in &buckets {
            let (period_start, period_end) = period_bounds(*index);

            let existing = period_statistic::Entity::find()
                .filter(period_statistic::Column::StationId.eq(station_id))
                .filter(period_statistic::Column::PeriodStart.eq(period_start))
                .one(&txn)
                .await?;

            match existing {
                Some(row) => {
                    let new_count = row.access_count + count;
                    let mut active: period_statistic::ActiveModel = row.into();
                    active.access_count = Set(new_count);
                    active.last_updated = Set(now);
                    active.update(&txn).await?;
                }
                None => {
                    period_statistic::ActiveModel {
                        station_id: Set(station_id),
                        period_start: Set(period_start),
                        period_end: Set(period_end),
                        access_count: Set(*count),
                        last_updated: Set(now),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await?;
                }
            }
        }

        // 只给本轮读到的事件打标，窗口期新增的留给下一轮
        click_event::Entity::update_many()
            .col_expr(click_event::Column::Rolled, Expr::value(true))
            .filter(click_event::Column::Id.is_in(event_ids.clone()))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        debug!(
            "Rolled {} events into {} periods for station {}",
            event_ids.len(),
            buckets.len(),
            station_id
        );

        Ok((event_ids.len() as u64, buckets.len() as u64))
    }

    /// 启动后台汇总任务
    pub fn spawn_background_task(self: Arc<Self>, interval_secs: u64) {
        tokio::spawn(async move {
            let interval = StdDuration::from_secs(interval_secs);

            // 首次运行延迟 1 分钟，避开启动高峰
            tokio::time::sleep(StdDuration::from_secs(60)).await;

            loop {
                if let Err(e) = self.run_pass().await {
                    error!("Statistics rollup task failed: {}", e);
                }

                tokio::time::sleep(interval).await;
            }
        });

        info!(
            "Statistics rollup background task started (interval: {} secs)",
            interval_secs
        );
    }
}
