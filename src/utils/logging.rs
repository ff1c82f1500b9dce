/// 日志工具模块
///
/// 提供运行开始和结束时的格式化输出
use std::path::Path;

use crate::models::OutputBundle;
use crate::utils::Reporter;

/// 记录程序启动信息
///
/// # 参数
/// - `reporter`: 输出目标
/// - `url`: 乐谱 URL
pub fn log_startup(reporter: &dyn Reporter, url: &str) {
    reporter.info(&"=".repeat(60));
    reporter.info(&format!("[•] 打开乐谱: {}", url));
    reporter.info(&"=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `reporter`: 输出目标
/// - `bundle`: 本次运行的输出汇总
pub fn print_summary(reporter: &dyn Reporter, bundle: &OutputBundle) {
    reporter.info(&format!("\n{}", "=".repeat(60)));
    reporter.info("--- Summary ---");
    reporter.info(&format!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    reporter.info(&format!("SVG pages: {}", bundle.pages.len()));
    if !bundle.failed_pages.is_empty() {
        reporter.warn(&format!("失败页: {:?}", bundle.failed_pages));
    }
    reporter.info(&format!("MusicXML:  {}", describe(bundle.musicxml.as_deref())));
    reporter.info(&format!("MIDI:      {}", describe(bundle.midi.as_deref())));
    reporter.info(&format!("PDF:       {}", describe(bundle.document.as_deref())));
    reporter.info(&format!("Folder:    {}", display_dir(&bundle.output_dir)));
    reporter.info(&"=".repeat(60));
}

fn describe(path: Option<&Path>) -> String {
    match path.and_then(Path::file_name) {
        Some(name) => format!("yes -> {}", name.to_string_lossy()),
        None => "no".to_string(),
    }
}

fn display_dir(dir: &Path) -> String {
    dir.canonicalize()
        .unwrap_or_else(|_| dir.to_path_buf())
        .display()
        .to_string()
}
