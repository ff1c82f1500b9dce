use serde::Deserialize;

/// 清单中的单页描述，其余字段忽略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageDescriptor {
    /// 0 起始的页码
    pub page: u32,
}

/// 解析后的 space.jsonp 清单
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ManifestDocument {
    #[serde(default)]
    pub space: Vec<PageDescriptor>,
}

impl ManifestDocument {
    /// 总页数 = 最大页码 + 1，没有描述时为 0
    pub fn total_pages(&self) -> usize {
        self.space
            .iter()
            .map(|d| d.page as usize + 1)
            .max()
            .unwrap_or(0)
    }
}

/// 资源位置：带尾部 `/` 的基础 URL 和总页数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocation {
    pub base_url: String,
    pub total_pages: usize,
}

impl AssetLocation {
    /// 第 `index` 页（0 起始）的 SVG 地址
    pub fn page_url(&self, index: usize) -> String {
        format!("{}score_{}.svg", self.base_url, index)
    }

    /// 固定文件名的辅助资源地址
    pub fn file_url(&self, file_name: &str) -> String {
        format!("{}{}", self.base_url, file_name)
    }
}
