//! 文档合并服务 - 业务能力层
//!
//! 把按顺序排列的页面文件合并成一个 PDF。
//! 引擎按名称选择；单页转换失败只跳过该页。

use std::path::{Path, PathBuf};

use tracing::error;

use crate::error::AssemblyError;
use crate::services::pdf_engine::{PageConverter, PdfAccumulator, Svg2PdfConverter};
use crate::utils::Reporter;

/// 引擎选择结果
pub enum EngineSelection {
    /// 明确禁用（"none"）
    Disabled,
    /// 可用的转换器
    Converter(Box<dyn PageConverter>),
}

/// 根据名称选择引擎
pub fn select_engine(engine: &str) -> Result<EngineSelection, AssemblyError> {
    match engine {
        "svg2pdf" => Ok(EngineSelection::Converter(Box::new(Svg2PdfConverter::new()))),
        "none" => Ok(EngineSelection::Disabled),
        other => Err(AssemblyError::UnknownEngine(other.to_string())),
    }
}

/// 文档合并服务
pub struct DocumentAssembler<'r> {
    reporter: &'r dyn Reporter,
}

impl<'r> DocumentAssembler<'r> {
    pub fn new(reporter: &'r dyn Reporter) -> Self {
        Self { reporter }
    }

    /// 按名称选择引擎后合并
    ///
    /// # 返回
    /// 是否写出了文档
    pub fn combine(&self, pages: &[PathBuf], output: &Path, engine: &str) -> bool {
        if pages.is_empty() {
            self.reporter.info("[i] No SVGs to combine");
            return false;
        }

        match select_engine(engine) {
            Ok(EngineSelection::Disabled) => {
                self.reporter
                    .info(&format!("[i] PDF combine disabled (engine={})", engine));
                false
            }
            Ok(EngineSelection::Converter(converter)) => {
                self.combine_with(pages, output, converter.as_ref())
            }
            Err(e) => {
                self.reporter.error(&format!("[x] {}", e));
                false
            }
        }
    }

    /// 用指定转换器合并
    pub fn combine_with(&self, pages: &[PathBuf], output: &Path, converter: &dyn PageConverter) -> bool {
        if pages.is_empty() {
            self.reporter.info("[i] No SVGs to combine");
            return false;
        }

        let mut writer = PdfAccumulator::new();
        for page in pages {
            match converter.convert(page) {
                Ok(doc) => {
                    writer.append(doc);
                }
                Err(e) => {
                    error!("SVG->PDF 失败: {}", e);
                    self.reporter
                        .warn(&format!("  [x] Failed to convert {}", file_name(page)));
                }
            }
        }

        if writer.page_count() == 0 {
            self.reporter.warn("[x] 没有可用的页面，跳过 PDF 写出");
            return false;
        }

        match writer.save(output) {
            Ok(()) => {
                self.reporter
                    .info(&format!("[✅] PDF saved: {}", file_name(output)));
                true
            }
            Err(e) => {
                self.reporter.error(&format!("[x] {}", e));
                false
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}
