//! 清单获取服务 - 业务能力层
//!
//! 请求 space.jsonp 并把 JSONP 包装剥掉，解析成 JSON

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::REFERER;
use reqwest::{Client, StatusCode};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 前缀：到第一个 `(` 为止；后缀：结尾的 `)` 或 `);`
static JSONP_WRAPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^(]+\(|\);?$").unwrap());

/// 清单获取服务
pub struct ManifestFetcher {
    client: Client,
    timeout: Duration,
}

impl ManifestFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// 获取并解析清单
    ///
    /// # 参数
    /// - `manifest_url`: space.jsonp 的地址，同时作为 Referer
    ///
    /// # 返回
    /// 解析后的 JSON
    pub async fn fetch(&self, manifest_url: &str) -> AppResult<JsonValue> {
        debug!("请求清单: {}", manifest_url);

        let resp = self
            .client
            .get(manifest_url)
            .header(REFERER, manifest_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| AppError::Fetch {
                url: manifest_url.to_string(),
                source,
            })?;

        if resp.status() != StatusCode::OK {
            return Err(AppError::FetchStatus {
                status: resp.status().as_u16(),
            });
        }

        let text = resp.text().await.map_err(|source| AppError::Fetch {
            url: manifest_url.to_string(),
            source,
        })?;

        debug!("清单长度: {} 字节", text.len());
        parse_jsonp(&text)
    }
}

/// 剥掉 JSONP 包装
pub fn unwrap_jsonp(text: &str) -> String {
    JSONP_WRAPPER.replace_all(text.trim_end(), "").into_owned()
}

/// 剥掉 JSONP 包装并解析 JSON
pub fn parse_jsonp(text: &str) -> AppResult<JsonValue> {
    serde_json::from_str(&unwrap_jsonp(text)).map_err(AppError::Parse)
}
