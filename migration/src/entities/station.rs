//! Station entity for the self-hosted catalog

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "stations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub stream_url: String,
    pub country: String,
    pub language: String,
    /// Tag list serialized as a JSON array (e.g. `["rock","oldies"]`)
    #[sea_orm(column_type = "Text")]
    pub tags: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// `active` | `pending` | `disabled`
    pub status: String,
    /// Denormalized fast-path counter, owned by the click ingestor
    pub total_clicks: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
