//! 文件命名工具

use regex::Regex;
use std::sync::LazyLock;

static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\-. ]+").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// 生成可以安全用作文件名的字符串
///
/// # 参数
/// - `name`: 原始名称
/// - `max_len`: 最大字符数
///
/// # 返回
/// 清理后的名称，结果为空时返回 "score"
pub fn sanitize_filename(name: &str, max_len: usize) -> String {
    let cleaned = UNSAFE_CHARS.replace_all(name.trim(), "_");
    let cleaned = WHITESPACE.replace_all(&cleaned, " ");
    if cleaned.is_empty() {
        return "score".to_string();
    }
    cleaned.chars().take(max_len).collect()
}

/// 从乐谱 URL 的最后一段路径取得乐谱 ID
pub fn score_id_from_url(url: &str) -> &str {
    let trimmed = url.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// 第 `index` 页（0 起始）的本地文件名
pub fn page_file_name(stem: &str, index: usize) -> String {
    format!("{} - page - {:02}.svg", stem, index + 1)
}
