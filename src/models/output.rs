use std::path::{Path, PathBuf};

use crate::error::AssetError;

/// 单个资源的下载结果
#[derive(Debug)]
pub enum DownloadOutcome {
    /// 本次下载并保存
    Saved(PathBuf),
    /// 磁盘上已有非空文件，跳过网络请求
    Reused(PathBuf),
    /// 所有尝试均失败
    Failed(AssetError),
}

impl DownloadOutcome {
    /// 成功时返回文件路径
    pub fn path(&self) -> Option<&Path> {
        match self {
            DownloadOutcome::Saved(p) | DownloadOutcome::Reused(p) => Some(p),
            DownloadOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DownloadOutcome::Failed(_))
    }
}

/// 单页下载结果
#[derive(Debug)]
pub struct PageOutcome {
    /// 0 起始的页码
    pub index: usize,
    pub outcome: DownloadOutcome,
}

/// 下载阶段汇总，下载完成后整体交给编排层
#[derive(Debug, Default)]
pub struct DownloadReport {
    pub pages: Vec<PageOutcome>,
    pub musicxml: Option<PathBuf>,
    pub midi: Option<PathBuf>,
}

impl DownloadReport {
    /// 按页码顺序返回已保存的页面文件
    pub fn saved_pages(&self) -> Vec<PathBuf> {
        self.pages
            .iter()
            .filter_map(|p| p.outcome.path().map(Path::to_path_buf))
            .collect()
    }

    /// 失败页（1 起始，用于展示）
    pub fn failed_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|p| p.outcome.is_failed())
            .map(|p| p.index + 1)
            .collect()
    }
}

/// 一次运行的输出汇总
#[derive(Debug, Default)]
pub struct OutputBundle {
    pub output_dir: PathBuf,
    pub pages: Vec<PathBuf>,
    pub failed_pages: Vec<usize>,
    pub musicxml: Option<PathBuf>,
    pub midi: Option<PathBuf>,
    pub document: Option<PathBuf>,
}

impl OutputBundle {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            ..Default::default()
        }
    }

    /// 合入下载阶段的结果
    pub fn absorb(&mut self, report: &DownloadReport) {
        self.pages = report.saved_pages();
        self.failed_pages = report.failed_pages();
        self.musicxml = report.musicxml.clone();
        self.midi = report.midi.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_keeps_order_and_failures() {
        let report = DownloadReport {
            pages: vec![
                PageOutcome {
                    index: 0,
                    outcome: DownloadOutcome::Reused(PathBuf::from("a - page - 01.svg")),
                },
                PageOutcome {
                    index: 1,
                    outcome: DownloadOutcome::Failed(AssetError::Exhausted {
                        url: "u".to_string(),
                        attempts: 3,
                    }),
                },
                PageOutcome {
                    index: 2,
                    outcome: DownloadOutcome::Saved(PathBuf::from("a - page - 03.svg")),
                },
            ],
            ..Default::default()
        };

        assert_eq!(
            report.saved_pages(),
            vec![
                PathBuf::from("a - page - 01.svg"),
                PathBuf::from("a - page - 03.svg")
            ]
        );
        assert_eq!(report.failed_pages(), vec![2]);

        let mut bundle = OutputBundle::new(PathBuf::from("out"));
        bundle.absorb(&report);
        assert_eq!(bundle.pages.len(), 2);
        assert!(bundle.musicxml.is_none());
    }
}
