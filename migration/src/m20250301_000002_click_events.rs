use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 click_events 表（原始访问日志）
        manager
            .create_table(
                Table::create()
                    .table(ClickEvent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClickEvent::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClickEvent::StationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClickEvent::ClickedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClickEvent::IpAddress)
                            .string_len(64)
                            .null(),
                    )
                    .col(ColumnDef::new(ClickEvent::UserAgent).text().null())
                    .col(ColumnDef::new(ClickEvent::Referrer).text().null())
                    .col(
                        ColumnDef::new(ClickEvent::Rolled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // 汇总扫描索引：station_id + rolled
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_click_events_station_rolled")
                    .table(ClickEvent::Table)
                    .col(ClickEvent::StationId)
                    .col(ClickEvent::Rolled)
                    .to_owned(),
            )
            .await?;

        // 清理任务的时间范围索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_click_events_clicked_at")
                    .table(ClickEvent::Table)
                    .col(ClickEvent::ClickedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_click_events_clicked_at").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_click_events_station_rolled")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ClickEvent::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClickEvent {
    #[sea_orm(iden = "click_events")]
    Table,
    Id,
    StationId,
    ClickedAt,
    IpAddress,
    UserAgent,
    Referrer,
    Rolled,
}
