//! # Scaso Grabber
//!
//! 把 MuseScore 乐谱下载为分页 SVG、MusicXML、MIDI，并合并成 PDF
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - HTTP 客户端和页面脚本执行
//! - `JsExecutor` - 在页面里执行 JS 并取回结果
//!
//! ### ② 浏览器层（Browser）
//! - `browser/headless` - 启动浏览器，管理会话生命周期
//! - `browser/capture` - 监听网络请求，捕获清单地址和标题
//!
//! ### ③ 业务能力层（Services）
//! - `ManifestFetcher` - 获取并解包 space.jsonp
//! - `asset_locator` - 推导资源基础地址和总页数
//! - `parse_page_range` - 解析页码范围
//! - `AssetDownloader` - 带重试的资源下载
//! - `DocumentAssembler` - 合并 PDF
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/grabber` - 串联整个流程，输出汇总和退出码
//!
//! ## 模块结构

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use browser::{capture_manifest_and_title, CaptureResult};
pub use config::{Config, RunConfig};
pub use error::{AppError, AppResult, AssemblyError, AssetError};
pub use infrastructure::JsExecutor;
pub use models::{AssetFormat, AssetLocation, OutputBundle};
pub use orchestrator::Grabber;
