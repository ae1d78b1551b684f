//! Model conversion helpers

use tracing::warn;

use crate::sources::{Provenance, StationRecord};
use migration::entities::station;

/// 解析 tags 列的 JSON 数组
///
/// 列值损坏时返回空列表而不是失败，坏数据不应让读路径整体出错。
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(tags) => tags,
        Err(e) => {
            warn!("Malformed tags column ({}): {}", raw, e);
            Vec::new()
        }
    }
}

/// 数据库行 → 归一化电台记录
pub fn model_to_station_record(model: station::Model) -> StationRecord {
    let tags = parse_tag_list(&model.tags);
    StationRecord {
        id: model.id.to_string(),
        name: model.name,
        country: model.country,
        language: model.language,
        tags,
        stream_url: model.stream_url,
        popularity: model.total_clicks,
        provenance: Provenance::Custom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_list() {
        assert_eq!(parse_tag_list(r#"["rock","Oldies"]"#), vec!["rock", "Oldies"]);
        assert!(parse_tag_list("[]").is_empty());
        assert!(parse_tag_list("not json").is_empty());
    }
}
