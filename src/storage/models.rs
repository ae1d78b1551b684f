//! Storage-level data shapes

use serde::Deserialize;

/// 新建电台的输入（状态固定为 active，计数器从 0 开始）
#[derive(Debug, Clone, Deserialize)]
pub struct NewStation {
    pub name: String,
    pub stream_url: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// 本地目录统计信息
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CatalogStats {
    pub total_stations: usize,
    pub active_stations: usize,
    pub total_clicks: usize,
}
