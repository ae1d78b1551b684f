//! 本地目录适配器
//!
//! 把统一查询翻译成本地关系库的谓词，归一化查询结果。
//! 数据库错误按硬错误向上返回，降级与否由聚合器决定。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;
use crate::sources::{CatalogSource, FacetEntry, FacetKind, Provenance, StationQuery, StationRecord};
use crate::storage::backend::{model_to_station_record, parse_tag_list};
use crate::storage::{SeaOrmStorage, StationFilter};

/// 本地（自建）目录源
pub struct LocalCatalog {
    storage: Arc<SeaOrmStorage>,
}

impl LocalCatalog {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 流派分面：解析每个电台的 tags 列，按大小写不敏感的 key 统计
    ///
    /// 同一电台重复列出的同名流派只计一次（统计的是电台数，不是标签数）。
    async fn genre_counts(&self) -> Result<Vec<FacetEntry>> {
        let tag_lists = self.storage.tag_lists().await?;

        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, FacetEntry> = HashMap::new();

        for raw in &tag_lists {
            let mut seen: HashSet<String> = HashSet::new();
            for tag in parse_tag_list(raw) {
                let key = tag.trim().to_lowercase();
                if key.is_empty() || !seen.insert(key.clone()) {
                    continue;
                }
                match counts.get_mut(&key) {
                    Some(entry) => entry.count += 1,
                    None => {
                        order.push(key.clone());
                        counts.insert(
                            key,
                            FacetEntry {
                                label: tag.trim().to_string(),
                                count: 1,
                            },
                        );
                    }
                }
            }
        }

        let mut entries: Vec<FacetEntry> = order
            .into_iter()
            .filter_map(|key| counts.remove(&key))
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(entries)
    }
}

#[async_trait]
impl CatalogSource for LocalCatalog {
    fn name(&self) -> &'static str {
        "local"
    }

    fn provenance(&self) -> Provenance {
        Provenance::Custom
    }

    async fn fetch_facet(&self, facet: FacetKind, limit: u64) -> Result<Vec<FacetEntry>> {
        let mut entries = match facet {
            FacetKind::Country => self
                .storage
                .country_counts()
                .await?
                .into_iter()
                .map(|(label, count)| FacetEntry { label, count })
                .collect::<Vec<_>>(),
            FacetKind::Language => self
                .storage
                .language_counts()
                .await?
                .into_iter()
                .map(|(label, count)| FacetEntry { label, count })
                .collect::<Vec<_>>(),
            FacetKind::Genre => self.genre_counts().await?,
        };

        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn fetch_stations(&self, query: &StationQuery) -> Result<Vec<StationRecord>> {
        let filter = StationFilter {
            country: query.country.clone(),
            language: query.language.clone(),
            genre: query.genre.clone(),
            search: query.search.clone(),
        };

        let (models, _total) = self
            .storage
            .search_stations(&filter, query.offset, query.limit)
            .await?;

        let mut records: Vec<StationRecord> =
            models.into_iter().map(model_to_station_record).collect();

        // SQL 侧的流派匹配只是子串预筛，这里做精确的整词确认
        if let Some(ref genre) = query.genre {
            let wanted = genre.trim();
            records.retain(|r| r.tags.iter().any(|t| t.trim().eq_ignore_ascii_case(wanted)));
        }

        Ok(records)
    }
}
