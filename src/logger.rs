use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// `RUST_LOG` 存在时优先使用，否则使用传入的级别
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scaso_grabber={level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
