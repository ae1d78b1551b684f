//! Fortnightly access statistics per station
//!
//! One row per (station, period); periods are fixed 14-day windows
//! anchored to the Unix epoch.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "period_statistics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub station_id: i64,
    /// Window start, inclusive
    pub period_start: DateTimeUtc,
    /// Window end, exclusive
    pub period_end: DateTimeUtc,
    pub access_count: i64,
    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
