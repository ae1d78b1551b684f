//! 数据清理任务
//!
//! 分批删除已汇总且超过宽限期的原始点击事件，防止事件表无限增长。
//! 未汇总（rolled = false）的事件永远不会被清理。

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::{debug, error, info, warn};

use crate::config::AnalyticsConfig;
use crate::storage::SeaOrmStorage;
use migration::entities::click_event;

/// 清理报告
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// 删除的原始点击事件数量
    pub events_deleted: u64,
    /// 执行的删除批次数
    pub batches: u32,
}

/// 数据清理任务
pub struct RetentionTask {
    storage: Arc<SeaOrmStorage>,
    /// 已汇总事件保留天数
    grace_days: u64,
    /// 每次删除批量大小
    batch_size: u64,
}

impl RetentionTask {
    pub fn new(storage: Arc<SeaOrmStorage>, config: &AnalyticsConfig) -> Self {
        Self {
            storage,
            grace_days: config.retention_grace_days,
            batch_size: config.prune_batch_size,
        }
    }

    /// 运行一次完整清理（分批删除避免长事务）
    pub async fn run_cleanup(&self) -> anyhow::Result<CleanupReport> {
        let db = self.storage.get_db();
        let cutoff = Utc::now() - Duration::days(self.grace_days as i64);

        let mut report = CleanupReport::default();
        let max_iterations = 1000; // 防止无限循环

        loop {
            if report.batches >= max_iterations {
                warn!(
                    "Event cleanup reached max iterations {} (deleted {} rows)",
                    max_iterations, report.events_deleted
                );
                break;
            }

            // 查找要删除的 ID 列表：只限已汇总且过期的事件
            let ids_to_delete: Vec<i64> = click_event::Entity::find()
                .select_only()
                .column(click_event::Column::Id)
                .filter(click_event::Column::Rolled.eq(true))
                .filter(click_event::Column::ClickedAt.lt(cutoff))
                .order_by_asc(click_event::Column::Id)
                .limit(self.batch_size)
                .into_tuple()
                .all(db)
                .await?;

            if ids_to_delete.is_empty() {
                break;
            }

            let deleted = click_event::Entity::delete_many()
                .filter(click_event::Column::Id.is_in(ids_to_delete.clone()))
                .exec(db)
                .await?
                .rows_affected;

            report.events_deleted += deleted;
            report.batches += 1;

            debug!(
                "Event cleanup batch {}: deleted {} rows (total {})",
                report.batches, deleted, report.events_deleted
            );

            if deleted < self.batch_size {
                break;
            }

            // 批次间短暂暂停，避免对数据库造成过大压力
            tokio::time::sleep(StdDuration::from_millis(100)).await;
        }

        info!(
            "Event cleanup completed: {} rows in {} batches",
            report.events_deleted, report.batches
        );

        Ok(report)
    }

    /// 启动后台清理任务
    pub fn spawn_background_task(self: Arc<Self>, interval_hours: u64) {
        tokio::spawn(async move {
            let interval = StdDuration::from_secs(interval_hours * 60 * 60);

            // 首次运行延迟 5 分钟
            tokio::time::sleep(StdDuration::from_secs(300)).await;

            loop {
                if let Err(e) = self.run_cleanup().await {
                    error!("Event cleanup task failed: {}", e);
                }

                tokio::time::sleep(interval).await;
            }
        });

        info!(
            "Event cleanup background task started (interval: {} hours)",
            interval_hours
        );
    }
}
