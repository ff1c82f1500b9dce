//! 页码范围解析 - 业务能力层
//!
//! 把用户输入的 1 起始页码范围（如 "1-3,5"）转换成 0 起始的页码列表。
//! 非法或越界的片段直接丢弃，不会让整个解析失败。

use std::collections::BTreeSet;
use std::num::IntErrorKind;

/// 解析页码范围
///
/// # 参数
/// - `spec`: "1-3,5,8-10"，None 或空串表示全部页
/// - `total_pages`: 总页数
///
/// # 返回
/// 排序且去重的 0 起始页码，全部片段无效时返回全部页
pub fn parse_page_range(spec: Option<&str>, total_pages: usize) -> Vec<usize> {
    let spec = match spec {
        Some(s) if !s.is_empty() => s,
        _ => return (0..total_pages).collect(),
    };

    let total = total_pages as i64;
    let mut wanted = BTreeSet::new();

    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some((left, right)) = part.split_once('-') {
            let (Some(start), Some(end)) = (page_number(left), page_number(right)) else {
                continue;
            };
            let start = start.max(1);
            let end = end.min(total);
            if start <= end {
                wanted.extend((start..=end).map(|p| (p - 1) as usize));
            }
        } else if let Some(one) = page_number(part) {
            if (1..=total).contains(&one) {
                wanted.insert((one - 1) as usize);
            }
        }
    }

    if wanted.is_empty() {
        (0..total_pages).collect()
    } else {
        wanted.into_iter().collect()
    }
}

/// 解析单个页码，超出 i64 的数字按方向饱和
fn page_number(token: &str) -> Option<i64> {
    match token.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}
