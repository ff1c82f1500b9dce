use thiserror::Error;

/// 应用程序错误类型
///
/// 只有浏览器、清单获取、清单解析这几个阶段的错误是致命的，
/// 它们会终止本次运行。
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器启动失败
    #[error("浏览器启动失败: {0}")]
    BrowserLaunch(String),

    /// 无法加载目标页面
    #[error("页面加载失败 ({url}): {source}")]
    Navigation {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 页面加载完成但没有捕获到清单请求
    #[error("未能捕获 space.jsonp，乐谱可能是私有的或被屏蔽")]
    ManifestNotCaptured,

    /// HTTP 客户端构建失败
    #[error("HTTP 客户端初始化失败: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// 清单请求失败（网络层）
    #[error("获取 space.jsonp 失败 ({url}): {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 清单请求返回非 200
    #[error("space.jsonp HTTP {status}")]
    FetchStatus { status: u16 },

    /// 清单解包后不是合法 JSON
    #[error("无法解析 space.jsonp JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// 清单结构不符合预期
    #[error("无法提取页面信息: {0}")]
    Extraction(String),

    /// 输出目录等文件系统错误
    #[error("文件错误 ({path}): {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 单个资源下载失败（非致命）
#[derive(Debug, Error)]
pub enum AssetError {
    /// 所有尝试都失败了
    #[error("{url} 在 {attempts} 次尝试后仍然失败")]
    Exhausted { url: String, attempts: u32 },

    /// 下载成功但写盘失败
    #[error("写入文件失败 ({path}): {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 合并文档阶段的错误（非致命）
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// 未知的合并引擎
    #[error("未知的 PDF 引擎: {0}")]
    UnknownEngine(String),

    /// 读取页面文件失败
    #[error("读取页面失败 ({path}): {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 单页转换失败
    #[error("转换失败 ({path}): {reason}")]
    Conversion { path: String, reason: String },

    /// 最终文档保存失败
    #[error("保存 PDF 失败 ({path}): {reason}")]
    Save { path: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建导航错误
    pub fn navigation(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Navigation {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// 创建文件错误
    pub fn file(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File {
            path: path.into(),
            source,
        }
    }
}

impl AssemblyError {
    pub fn conversion(path: impl Into<String>, reason: impl ToString) -> Self {
        AssemblyError::Conversion {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
