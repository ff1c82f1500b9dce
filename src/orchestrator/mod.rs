//! 编排层（Orchestration Layer）
//!
//! 负责按顺序调度各个能力，汇总结果，决定退出码。
//!
//! ```text
//! grabber (一次运行)
//!     ↓
//! browser (捕获清单地址)
//!     ↓
//! services (清单 / 定位 / 页码 / 下载 / 合并)
//!     ↓
//! infrastructure (HTTP 客户端、JsExecutor)
//! ```

pub mod grabber;

pub use grabber::Grabber;
