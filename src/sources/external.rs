//! 外部电台目录适配器
//!
//! 调用 radio-browser 风格的公共目录 JSON API，把它的记录形状
//! 归一化成统一的 `StationRecord` / `FacetEntry`。
//!
//! - 同步 HTTP（ureq）包在 spawn_blocking 中执行
//! - 全局超时由配置给定（10-15s 范围）
//! - 任何传输/解码失败都归一化为软错误 `SourceUnavailable`
//! - 分面结果带 Moka 缓存 + Singleflight 语义

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{trace, warn};
use ureq::Agent;
use uuid::Uuid;

use crate::config::DirectoryConfig;
use crate::errors::{RadiodirError, Result};
use crate::sources::{CatalogSource, FacetEntry, FacetKind, Provenance, StationQuery, StationRecord};

/// 分面缓存最大容量
const FACET_CACHE_MAX_CAPACITY: u64 = 64;

/// 目录服务的分面条目（国家/流派/语言通用）
#[derive(Debug, Deserialize)]
struct DirectoryFacet {
    name: String,
    #[serde(default)]
    stationcount: i64,
}

/// 目录服务的电台条目
#[derive(Debug, Deserialize)]
struct DirectoryStation {
    stationuuid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    url_resolved: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    language: String,
    /// 逗号分隔的标签串
    #[serde(default)]
    tags: String,
    #[serde(default)]
    votes: i64,
}

/// 点击登记响应
#[derive(Debug, Deserialize)]
struct ClickResponse {
    ok: bool,
    #[serde(default)]
    message: String,
}

/// 逗号分隔标签串 → 标签列表（保序，去掉空段）
fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// 目录条目 → 归一化电台记录
fn station_from_wire(ws: DirectoryStation) -> StationRecord {
    let stream_url = if ws.url_resolved.is_empty() {
        ws.url
    } else {
        ws.url_resolved
    };

    StationRecord {
        id: ws.stationuuid,
        name: ws.name,
        country: ws.country,
        language: ws.language,
        tags: split_tags(&ws.tags),
        stream_url,
        popularity: ws.votes,
        provenance: Provenance::External,
    }
}

/// 外部目录源
pub struct ExternalDirectory {
    base_url: String,
    user_agent: String,
    agent: Agent,
    /// 分面结果缓存（key: "{facet}:{limit}"）
    facet_cache: Cache<String, Vec<FacetEntry>>,
}

impl ExternalDirectory {
    pub fn new(config: &DirectoryConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();

        let facet_cache = Cache::builder()
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .max_capacity(FACET_CACHE_MAX_CAPACITY)
            .build();

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            agent,
            facet_cache,
        }
    }

    /// 发起同步 GET 请求并解析 JSON（在 spawn_blocking 线程池中调用）
    fn get_sync<T: DeserializeOwned>(agent: Agent, user_agent: String, url: String) -> Result<T> {
        let resp = agent
            .get(&url)
            .header("User-Agent", &user_agent)
            .call()
            .map_err(|e| {
                warn!("Directory request to \"{}\" failed: {}", url, e);
                RadiodirError::source_unavailable(format!("directory request failed: {}", e))
            })?;

        resp.into_body().read_json::<T>().map_err(|e| {
            warn!("Directory response from \"{}\" decode failed: {}", url, e);
            RadiodirError::source_unavailable(format!("directory response decode failed: {}", e))
        })
    }

    /// 异步包装：同步 HTTP 在线程池中执行
    async fn get<T: DeserializeOwned + Send + 'static>(&self, path_and_query: &str) -> Result<T> {
        let agent = self.agent.clone();
        let user_agent = self.user_agent.clone();
        let url = format!("{}{}", self.base_url, path_and_query);

        tokio::task::spawn_blocking(move || Self::get_sync(agent, user_agent, url))
            .await
            .unwrap_or_else(|e| {
                Err(RadiodirError::source_unavailable(format!(
                    "directory task join failed: {}",
                    e
                )))
            })
    }

    async fn fetch_facet_uncached(&self, facet: FacetKind, limit: u64) -> Result<Vec<FacetEntry>> {
        let path = match facet {
            FacetKind::Country => "countries",
            FacetKind::Genre => "tags",
            FacetKind::Language => "languages",
        };
        let url = format!("/{}?order=stationcount&reverse=true&limit={}", path, limit);

        let rows: Vec<DirectoryFacet> = self.get(&url).await?;
        Ok(rows
            .into_iter()
            .map(|f| FacetEntry {
                label: f.name,
                count: f.stationcount,
            })
            .collect())
    }

    /// 把点击透传给目录服务自己的登记端点
    ///
    /// 外部电台的点击不入本地统计，只代理；失败以显式错误返回，
    /// 由调用方决定如何呈现。
    pub async fn register_click(&self, station_uuid: &str) -> Result<()> {
        let uuid = Uuid::parse_str(station_uuid).map_err(|e| {
            RadiodirError::validation(format!("invalid station uuid '{}': {}", station_uuid, e))
        })?;

        let resp: ClickResponse = self.get(&format!("/url/{}", uuid)).await?;
        if resp.ok {
            trace!("External click registered for {}", uuid);
            Ok(())
        } else {
            Err(RadiodirError::source_unavailable(format!(
                "directory rejected click for {}: {}",
                uuid, resp.message
            )))
        }
    }
}

#[async_trait]
impl CatalogSource for ExternalDirectory {
    fn name(&self) -> &'static str {
        "external"
    }

    fn provenance(&self) -> Provenance {
        Provenance::External
    }

    async fn fetch_facet(&self, facet: FacetKind, limit: u64) -> Result<Vec<FacetEntry>> {
        let key = format!("{}:{}", facet, limit);

        // try_get_with 自带 singleflight 语义，失败不缓存
        self.facet_cache
            .try_get_with(key, self.fetch_facet_uncached(facet, limit))
            .await
            .map_err(|e| (*e).clone())
    }

    async fn fetch_stations(&self, query: &StationQuery) -> Result<Vec<StationRecord>> {
        // 统一查询 → 目录服务自己的端点/参数
        let path = if let Some(ref search) = query.search {
            let mut qs = format!("name={}", urlencoding::encode(search));
            if let Some(ref country) = query.country {
                qs.push_str(&format!("&country={}", urlencoding::encode(country)));
            }
            if let Some(ref language) = query.language {
                qs.push_str(&format!("&language={}", urlencoding::encode(language)));
            }
            if let Some(ref genre) = query.genre {
                qs.push_str(&format!("&tag={}", urlencoding::encode(genre)));
            }
            format!(
                "/stations/search?{}&order=votes&reverse=true&limit={}&offset={}",
                qs, query.limit, query.offset
            )
        } else if let Some(ref genre) = query.genre {
            format!(
                "/stations/bytagexact/{}?order=votes&reverse=true&limit={}&offset={}",
                urlencoding::encode(genre),
                query.limit,
                query.offset
            )
        } else if let Some(ref country) = query.country {
            format!(
                "/stations/bycountryexact/{}?order=votes&reverse=true&limit={}&offset={}",
                urlencoding::encode(country),
                query.limit,
                query.offset
            )
        } else if let Some(ref language) = query.language {
            format!(
                "/stations/bylanguageexact/{}?order=votes&reverse=true&limit={}&offset={}",
                urlencoding::encode(language),
                query.limit,
                query.offset
            )
        } else {
            format!("/stations/topvote/{}?offset={}", query.limit, query.offset)
        };

        let rows: Vec<DirectoryStation> = self.get(&path).await?;
        Ok(rows.into_iter().map(station_from_wire).collect())
    }
}
