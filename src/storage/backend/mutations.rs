//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, ExprTrait, QueryFilter,
    QuerySelect,
};
use tracing::{info, warn};

use super::{SeaOrmStorage, retry};
use crate::errors::{RadiodirError, Result};
use crate::storage::models::NewStation;

use migration::entities::{click_event, station};

impl SeaOrmStorage {
    /// 新建电台（用户提交的自建目录条目）
    pub async fn create_station(&self, new: NewStation) -> Result<station::Model> {
        let now = Utc::now();
        let tags_json = serde_json::to_string(&new.tags)?;

        let model = station::ActiveModel {
            name: Set(new.name),
            stream_url: Set(new.stream_url),
            country: Set(new.country),
            language: Set(new.language),
            tags: Set(tags_json),
            description: Set(new.description),
            status: Set(super::STATUS_ACTIVE.to_string()),
            total_clicks: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let db = &self.db;
        let inserted = retry::with_retry("create_station", self.retry_config, || async {
            model.clone().insert(db).await
        })
        .await
        .map_err(|e| RadiodirError::database_operation(format!("新建电台失败: {}", e)))?;

        self.invalidate_count_cache();
        info!("Station created: {} (id {})", inserted.name, inserted.id);
        Ok(inserted)
    }

    /// 写入一条点击事件并递增电台计数器
    ///
    /// 事件行先落库；计数器递增是独立的原子 UPDATE。计数器更新失败
    /// 不回滚事件（事件日志的持久性优先于计数器，汇总任务会补齐
    /// 历史口径），只记录告警。返回更新后的计数值。
    pub async fn record_click(
        &self,
        station_id: i64,
        clicked_at: DateTime<Utc>,
        ip_address: Option<String>,
        user_agent: Option<String>,
        referrer: Option<String>,
    ) -> Result<i64> {
        let event = click_event::ActiveModel {
            station_id: Set(station_id),
            clicked_at: Set(clicked_at),
            ip_address: Set(ip_address),
            user_agent: Set(user_agent),
            referrer: Set(referrer),
            rolled: Set(false),
            ..Default::default()
        };

        let db = &self.db;
        retry::with_retry("record_click(event)", self.retry_config, || async {
            click_event::Entity::insert(event.clone()).exec(db).await
        })
        .await
        .map_err(|e| RadiodirError::database_operation(format!("写入点击事件失败: {}", e)))?;

        // 计数器递增：单条 UPDATE，行锁内读改写
        let counter_result =
            retry::with_retry("record_click(counter)", self.retry_config, || async {
                station::Entity::update_many()
                    .col_expr(
                        station::Column::TotalClicks,
                        Expr::col(station::Column::TotalClicks).add(Expr::val(1i64)),
                    )
                    .filter(station::Column::Id.eq(station_id))
                    .exec(db)
                    .await
            })
            .await;

        if let Err(e) = counter_result {
            // 事件已持久化，计数器留给下一次点击或人工修复
            warn!(
                "Click counter update failed for station {} (event kept): {}",
                station_id, e
            );
        }

        let clicks: Option<i64> = station::Entity::find_by_id(station_id)
            .select_only()
            .column(station::Column::TotalClicks)
            .into_tuple()
            .one(db)
            .await?;

        Ok(clicks.unwrap_or_default())
    }
}
