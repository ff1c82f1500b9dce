//! 资源定位 - 业务能力层
//!
//! 从清单 URL 和清单内容推导资源基础地址和总页数

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{AppError, AppResult};
use crate::models::{AssetLocation, ManifestDocument};

/// 从 JSON 中解析清单结构
pub fn parse_manifest(data: &JsonValue) -> AppResult<ManifestDocument> {
    ManifestDocument::deserialize(data).map_err(|e| AppError::Extraction(e.to_string()))
}

/// 清单 URL 截断到最后一个 `/`，再补上 `/`
pub fn base_url(manifest_url: &str) -> String {
    let head = manifest_url
        .rsplit_once('/')
        .map(|(head, _)| head)
        .unwrap_or(manifest_url);
    format!("{}/", head)
}

/// 推导资源位置
///
/// # 参数
/// - `manifest_url`: space.jsonp 地址
/// - `data`: 解析后的清单 JSON
///
/// # 返回
/// 基础地址和总页数
pub fn locate_assets(manifest_url: &str, data: &JsonValue) -> AppResult<AssetLocation> {
    let manifest = parse_manifest(data)?;
    Ok(AssetLocation {
        base_url: base_url(manifest_url),
        total_pages: manifest.total_pages(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gaps_do_not_affect_count() {
        let data = json!({"space": [{"page": 0}, {"page": 1}, {"page": 3}]});
        let location = locate_assets("https://x/y/space.jsonp", &data).unwrap();
        assert_eq!(location.total_pages, 4);
        assert_eq!(location.base_url, "https://x/y/");
        assert_eq!(location.page_url(2), "https://x/y/score_2.svg");
    }

    #[test]
    fn test_extra_fields_ignored() {
        let data = json!({
            "space": [{"page": 1, "rect": [0, 0, 10, 10], "system": 2}],
            "other": true
        });
        assert_eq!(locate_assets("https://x/space.jsonp", &data).unwrap().total_pages, 2);
    }

    #[test]
    fn test_absent_or_empty_array_is_zero_pages() {
        assert_eq!(locate_assets("https://x/a/space.jsonp", &json!({})).unwrap().total_pages, 0);
        assert_eq!(
            locate_assets("https://x/a/space.jsonp", &json!({"space": []}))
                .unwrap()
                .total_pages,
            0
        );
    }

    #[test]
    fn test_malformed_shape_is_extraction_error() {
        let cases = [
            json!({"space": "nope"}),
            json!({"space": null}),
            json!({"space": [{"pg": 1}]}),
            json!({"space": [{"page": -1}]}),
            json!({"space": [{"page": "two"}]}),
        ];
        for data in cases {
            assert!(
                matches!(locate_assets("https://x/space.jsonp", &data), Err(AppError::Extraction(_))),
                "{data}"
            );
        }
    }

    #[test]
    fn test_base_url_keeps_query_free_prefix() {
        assert_eq!(base_url("https://s3.example.com/a/b/space.jsonp?v=3"), "https://s3.example.com/a/b/");
        assert_eq!(base_url("no-slash"), "no-slash/");
    }
}
