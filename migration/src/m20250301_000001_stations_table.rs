use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 stations 表
        manager
            .create_table(
                Table::create()
                    .table(Station::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Station::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Station::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Station::StreamUrl).text().not_null())
                    .col(
                        ColumnDef::new(Station::Country)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Station::Language)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Station::Tags)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Station::Description).text().null())
                    .col(
                        ColumnDef::new(Station::Status)
                            .string_len(32)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Station::TotalClicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Station::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Station::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 状态 + 国家索引（分面统计按国家 GROUP BY）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_stations_status_country")
                    .table(Station::Table)
                    .col(Station::Status)
                    .col(Station::Country)
                    .to_owned(),
            )
            .await?;

        // 热门排序索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_stations_total_clicks")
                    .table(Station::Table)
                    .col(Station::TotalClicks)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_stations_total_clicks").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_stations_status_country")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Station::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Station {
    #[sea_orm(iden = "stations")]
    Table,
    Id,
    Name,
    StreamUrl,
    Country,
    Language,
    Tags,
    Description,
    Status,
    TotalClicks,
    CreatedAt,
    UpdatedAt,
}
