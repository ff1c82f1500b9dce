//! JS 执行器 - 基础设施层
//!
//! 借用 page，只暴露"执行 JS / 读取 DOM"的能力

use chromiumoxide::Page;
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

/// JS 执行器
///
/// 不认识乐谱、清单等业务概念
pub struct JsExecutor<'p> {
    page: &'p Page,
}

impl<'p> JsExecutor<'p> {
    pub fn new(page: &'p Page) -> Self {
        Self { page }
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let result = self
            .page
            .evaluate(js_code.into())
            .await
            .map_err(|e| AppError::navigation("evaluate", e))?;
        result
            .into_value()
            .map_err(|e| AppError::navigation("evaluate", e))
    }

    /// 读取第一个匹配元素的属性，元素或属性不存在时返回 None
    ///
    /// # 参数
    /// - `selector`: CSS 选择器
    /// - `attribute`: 属性名
    pub async fn query_attribute(&self, selector: &str, attribute: &str) -> AppResult<Option<String>> {
        let js_code = format!(
            r#"(() => {{
                const el = document.querySelector({});
                return (el && el.getAttribute({})) || "";
            }})()"#,
            serde_json::to_string(selector).unwrap_or_default(),
            serde_json::to_string(attribute).unwrap_or_default()
        );
        let value: String = self.eval_as(js_code).await?;
        Ok(Some(value).filter(|v| !v.is_empty()))
    }
}
