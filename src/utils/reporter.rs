//! 进度输出
//!
//! 面向用户的进度信息都经过 `Reporter`，方便测试时捕获输出。

use std::sync::Mutex;
use tracing::Level;

/// 进度输出能力
pub trait Reporter: Send + Sync {
    fn emit(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.emit(Level::INFO, message);
    }

    fn warn(&self, message: &str) {
        self.emit(Level::WARN, message);
    }

    fn error(&self, message: &str) {
        self.emit(Level::ERROR, message);
    }
}

/// 转发到 tracing 的默认实现
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn emit(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!("{}", message),
            Level::WARN => tracing::warn!("{}", message),
            Level::INFO => tracing::info!("{}", message),
            Level::DEBUG => tracing::debug!("{}", message),
            Level::TRACE => tracing::trace!("{}", message),
        }
    }
}

/// 把输出保存在内存里，用于测试
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有已记录的消息
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// 是否有指定级别且包含 `needle` 的消息
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn emit(&self, level: Level, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}
