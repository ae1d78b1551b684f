//! 周期统计表迁移
//!
//! 每站点每 14 天窗口一行，由统计汇总任务以 upsert 语义维护。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PeriodStatistic::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PeriodStatistic::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PeriodStatistic::StationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PeriodStatistic::PeriodStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PeriodStatistic::PeriodEnd)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PeriodStatistic::AccessCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PeriodStatistic::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一索引：station_id + period_start（upsert 语义的基础）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_period_stats_station_period")
                    .table(PeriodStatistic::Table)
                    .col(PeriodStatistic::StationId)
                    .col(PeriodStatistic::PeriodStart)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 周期范围查询索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_period_stats_period_start")
                    .table(PeriodStatistic::Table)
                    .col(PeriodStatistic::PeriodStart)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_period_stats_period_start")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_period_stats_station_period")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(PeriodStatistic::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PeriodStatistic {
    #[sea_orm(iden = "period_statistics")]
    Table,
    Id,
    StationId,
    PeriodStart,
    PeriodEnd,
    AccessCount,
    LastUpdated,
}
