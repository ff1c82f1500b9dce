use std::path::PathBuf;
use std::time::Duration;

use crate::models::AssetFormat;

/// 固定的浏览器标识
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) \
Chrome/120.0.0.0 Safari/537.36";

/// 清单请求路径片段
pub const MANIFEST_MARKER: &str = "space.jsonp";

/// 可选的合并引擎
pub const PDF_ENGINES: &[&str] = &["svg2pdf", "none"];

pub const DEFAULT_RETRIES: u32 = 2;
pub const DEFAULT_THROTTLE_MS: u64 = 75;

/// 程序配置（环境变量可覆盖）
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器可执行文件路径，None 时自动探测
    pub chrome_executable: Option<PathBuf>,
    /// 页面加载后额外等待的毫秒数
    pub settle_wait_ms: u64,
    /// 重试退避的基础时长（毫秒）
    pub backoff_base_ms: u64,
    /// 资源请求超时（秒）
    pub request_timeout_secs: u64,
    /// 清单请求超时（秒）
    pub manifest_timeout_secs: u64,
    /// 默认输出根目录
    pub output_root: PathBuf,
    /// 文件名最大长度
    pub max_filename_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            settle_wait_ms: 4000,
            backoff_base_ms: 750,
            request_timeout_secs: 60,
            manifest_timeout_secs: 30,
            output_root: PathBuf::from("scores"),
            max_filename_len: 128,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            chrome_executable: std::env::var("CHROME_PATH").ok().map(PathBuf::from).or(default.chrome_executable),
            settle_wait_ms: std::env::var("SCASO_WAIT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.settle_wait_ms),
            backoff_base_ms: std::env::var("SCASO_BACKOFF_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.backoff_base_ms),
            request_timeout_secs: std::env::var("SCASO_REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            manifest_timeout_secs: std::env::var("SCASO_MANIFEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.manifest_timeout_secs),
            output_root: std::env::var("SCASO_OUTPUT_ROOT").map(PathBuf::from).unwrap_or(default.output_root),
            max_filename_len: std::env::var("SCASO_MAX_FILENAME").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_filename_len),
        }
    }

    pub fn settle_wait(&self) -> Duration {
        Duration::from_millis(self.settle_wait_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn manifest_timeout(&self) -> Duration {
        Duration::from_secs(self.manifest_timeout_secs)
    }
}

/// 单次运行的参数，创建后只读
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// 乐谱页面 URL
    pub url: String,
    /// 输出目录
    pub output_dir: Option<PathBuf>,
    /// 禁用 PDF 合并
    pub no_pdf: bool,
    /// 合并引擎标识
    pub pdf_engine: String,
    /// 需要下载的格式
    pub formats: Vec<AssetFormat>,
    /// 1 起始的页码范围
    pub page_range: Option<String>,
    /// 每个文件的重试次数
    pub retries: u32,
    /// 每次成功下载后的休眠
    pub throttle: Duration,
    /// 显示浏览器窗口
    pub headful: bool,
}

impl RunConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            output_dir: None,
            no_pdf: false,
            pdf_engine: PDF_ENGINES[0].to_string(),
            formats: AssetFormat::ALL.to_vec(),
            page_range: None,
            retries: DEFAULT_RETRIES,
            throttle: Duration::from_millis(DEFAULT_THROTTLE_MS),
            headful: false,
        }
    }

    pub fn wants(&self, format: AssetFormat) -> bool {
        self.formats.contains(&format)
    }
}
