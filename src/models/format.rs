/// 可下载的资源格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetFormat {
    /// 分页 SVG
    Svg,
    /// MusicXML
    MusicXml,
    /// MIDI
    Midi,
}

impl AssetFormat {
    pub const ALL: [AssetFormat; 3] = [AssetFormat::Svg, AssetFormat::MusicXml, AssetFormat::Midi];

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            AssetFormat::Svg => "svg",
            AssetFormat::MusicXml => "mxl",
            AssetFormat::Midi => "mid",
        }
    }

    /// 辅助资源在服务器上的文件名，分页资源没有固定文件名
    pub fn remote_file(self) -> Option<&'static str> {
        match self {
            AssetFormat::Svg => None,
            AssetFormat::MusicXml => Some("score.mxl"),
            AssetFormat::Midi => Some("score.mid"),
        }
    }

    /// 日志里显示的名称
    pub fn label(self) -> &'static str {
        match self {
            AssetFormat::Svg => "SVG",
            AssetFormat::MusicXml => "MusicXML",
            AssetFormat::Midi => "MIDI",
        }
    }

    /// 从字符串解析格式（不区分大小写，允许 midi 别名）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "svg" => Some(AssetFormat::Svg),
            "mxl" => Some(AssetFormat::MusicXml),
            "mid" | "midi" => Some(AssetFormat::Midi),
            _ => None,
        }
    }

    /// 解析逗号分隔的格式列表，空项忽略，遇到不支持的格式返回该项
    pub fn parse_list(list: &str) -> Result<Vec<Self>, String> {
        let mut formats = Vec::new();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let format = Self::from_str(item).ok_or_else(|| item.to_lowercase())?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        Ok(formats)
    }
}
