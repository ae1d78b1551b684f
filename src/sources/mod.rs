//! 目录数据源适配器
//!
//! 两个互换的数据提供方实现同一 `CatalogSource` 契约：
//! - `LocalCatalog`: 查询本地关系库（用户自建目录）
//! - `ExternalDirectory`: 调用远程电台目录 HTTP 服务
//!
//! 适配器把各自的原生记录形状归一化为统一的
//! `StationRecord` / `FacetEntry`，聚合器在其上做合并。

pub mod external;
pub mod local;

pub use external::ExternalDirectory;
pub use local::LocalCatalog;

use async_trait::async_trait;
use serde::Serialize;
use strum::AsRefStr;

use crate::errors::Result;

/// 记录来源标记
///
/// `Both` 只出现在分面合并结果上，电台记录永远只携带单一来源
/// （跨源不存在电台级身份，不做记录融合）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Provenance {
    External,
    Custom,
    Both,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::External => write!(f, "external"),
            Self::Custom => write!(f, "custom"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// 分面维度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FacetKind {
    Country,
    Genre,
    Language,
}

impl std::fmt::Display for FacetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Country => write!(f, "country"),
            Self::Genre => write!(f, "genre"),
            Self::Language => write!(f, "language"),
        }
    }
}

/// 适配器归一化后的单源分面计数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetEntry {
    /// 展示标签（保留源端大小写）
    pub label: String,
    pub count: i64,
}

/// 归一化的电台记录
///
/// `id` 是不透明字符串：外部源为 UUID 文本，本地源为数字转字符串。
/// 同一 provenance 内唯一；跨 provenance 永不视为相等。
#[derive(Debug, Clone, Serialize)]
pub struct StationRecord {
    pub id: String,
    pub name: String,
    pub country: String,
    pub language: String,
    pub tags: Vec<String>,
    pub stream_url: String,
    /// 外部源为投票数，本地源为累计点击数
    pub popularity: i64,
    pub provenance: Provenance,
}

/// 跨源统一的电台查询
///
/// 各适配器把它翻译成自己的查询形式：本地源翻译成 SQL 谓词，
/// 外部源翻译成目录服务的 query 参数。
#[derive(Debug, Clone, Default)]
pub struct StationQuery {
    /// 国家等值过滤
    pub country: Option<String>,
    /// 语言等值过滤
    pub language: Option<String>,
    /// 流派成员过滤
    pub genre: Option<String>,
    /// 名称/描述子串搜索
    pub search: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

impl StationQuery {
    pub fn popular(limit: u64) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }
}

/// 目录数据源契约
///
/// 实现必须可被多个分面请求并发调用；除连接池/HTTP agent 外
/// 不得持有可变共享状态。
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn provenance(&self) -> Provenance;

    /// 拉取一个分面维度的计数列表
    async fn fetch_facet(&self, facet: FacetKind, limit: u64) -> Result<Vec<FacetEntry>>;

    /// 按统一查询拉取电台记录
    async fn fetch_stations(&self, query: &StationQuery) -> Result<Vec<StationRecord>>;
}
