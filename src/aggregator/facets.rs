//! 分面合并
//!
//! 国家/流派/语言分面的 key 合并算法：两侧条目按归一化 key
//! 落入同一槽位，计数相加、来源标记按贡献方确定。

use std::collections::HashMap;

use serde::Serialize;

use super::{Aggregator, FacetCount};
use crate::errors::Result;
use crate::sources::{FacetEntry, FacetKind, Provenance};

/// key 归一化：trim + 小写
pub fn normalize_key(label: &str) -> String {
    label.trim().to_lowercase()
}

/// 合并摘要块
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    /// 仅外部源贡献的条目数
    pub external_only: usize,
    /// 仅本地源贡献的条目数
    pub custom_only: usize,
    /// 两侧共同贡献的条目数
    pub shared: usize,
    /// 去重后的条目总数
    pub unique_total: usize,
}

/// 一次分面聚合的完整结果
#[derive(Debug, Clone, Serialize)]
pub struct FacetMergeOutcome {
    /// 排序并截断后的完整列表
    pub entries: Vec<FacetCount>,
    /// top-N 切片（独立于 entries 的截断）
    pub top: Vec<FacetCount>,
    pub summary: MergeSummary,
    pub external_available: bool,
    pub custom_available: bool,
}

/// 合并槽位：按 Option 记录两侧是否出现过（计数为 0 也算出现）
struct MergeSlot {
    label: String,
    external: Option<i64>,
    custom: Option<i64>,
}

/// 两侧分面条目 → 合并计数列表（纯函数）
///
/// - key 按 trim + 小写归一化；流派分面丢弃归一化后为空的条目
/// - 同侧重复 key 的计数累加
/// - 流派分面过滤掉 combined <= 0 的条目
/// - 按 combined 降序稳定排序；并列保持插入序
///   （外部条目在前，各自保持源内顺序）
pub fn merge_facet_entries(
    external: Vec<FacetEntry>,
    custom: Vec<FacetEntry>,
    facet: FacetKind,
) -> Vec<FacetCount> {
    let mut order: Vec<String> = Vec::with_capacity(external.len() + custom.len());
    let mut slots: HashMap<String, MergeSlot> = HashMap::with_capacity(external.len() + custom.len());

    let genre = facet == FacetKind::Genre;

    for entry in external {
        let key = normalize_key(&entry.label);
        if genre && key.is_empty() {
            continue;
        }
        match slots.get_mut(&key) {
            Some(slot) => *slot.external.get_or_insert(0) += entry.count,
            None => {
                order.push(key.clone());
                slots.insert(
                    key,
                    MergeSlot {
                        label: entry.label.trim().to_string(),
                        external: Some(entry.count),
                        custom: None,
                    },
                );
            }
        }
    }

    for entry in custom {
        let key = normalize_key(&entry.label);
        if genre && key.is_empty() {
            continue;
        }
        match slots.get_mut(&key) {
            Some(slot) => *slot.custom.get_or_insert(0) += entry.count,
            None => {
                order.push(key.clone());
                slots.insert(
                    key,
                    MergeSlot {
                        label: entry.label.trim().to_string(),
                        external: None,
                        custom: Some(entry.count),
                    },
                );
            }
        }
    }

    let mut merged: Vec<FacetCount> = order
        .into_iter()
        .filter_map(|key| {
            let slot = slots.remove(&key)?;
            let provenance = match (&slot.external, &slot.custom) {
                (Some(_), Some(_)) => Provenance::Both,
                (Some(_), None) => Provenance::External,
                (None, _) => Provenance::Custom,
            };
            let external_count = slot.external.unwrap_or(0);
            let custom_count = slot.custom.unwrap_or(0);
            Some(FacetCount {
                key,
                label: slot.label,
                external_count,
                custom_count,
                combined: external_count + custom_count,
                provenance,
            })
        })
        .collect();

    if genre {
        merged.retain(|fc| fc.combined > 0);
    }

    // Vec::sort_by 是稳定排序，并列项保持插入序
    merged.sort_by(|a, b| b.combined.cmp(&a.combined));
    merged
}

fn summarize(merged: &[FacetCount]) -> MergeSummary {
    let mut summary = MergeSummary {
        unique_total: merged.len(),
        ..Default::default()
    };
    for fc in merged {
        match fc.provenance {
            Provenance::External => summary.external_only += 1,
            Provenance::Custom => summary.custom_only += 1,
            Provenance::Both => summary.shared += 1,
        }
    }
    summary
}

impl Aggregator {
    /// 一个分面维度的合并视图
    ///
    /// 单侧失败降级为空贡献；两侧同时失败返回 `AggregationUnavailable`。
    pub async fn facet_view(&self, facet: FacetKind, limit: u64) -> Result<FacetMergeOutcome> {
        let limit = self.clamp_limit(limit);

        let (external_res, local_res) = self.fetch_facet_both(facet, limit).await;
        Self::check_total_failure(&external_res, &local_res, facet.as_ref())?;

        let (external, external_available) = Self::degrade("external", external_res);
        let (custom, custom_available) = Self::degrade("local", local_res);

        let merged = merge_facet_entries(external, custom, facet);
        let summary = summarize(&merged);
        let top = merged.iter().take(self.top_n()).cloned().collect();

        let mut entries = merged;
        entries.truncate(limit as usize);

        Ok(FacetMergeOutcome {
            entries,
            top,
            summary,
            external_available,
            custom_available,
        })
    }
}
