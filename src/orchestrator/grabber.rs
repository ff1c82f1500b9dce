//! 单个乐谱抓取器 - 编排层
//!
//! ## 流程
//!
//! 1. 浏览器捕获清单地址和标题
//! 2. 获取并解析清单，推导资源位置
//! 3. 解析页码范围
//! 4. 下载页面和辅助资源
//! 5. 合并 PDF
//!
//! 前两步失败会终止运行；之后的单项失败只体现在汇总里。

use std::path::PathBuf;

use reqwest::Client;

use crate::browser::{capture_manifest_and_title, CaptureResult};
use crate::config::{Config, RunConfig};
use crate::error::{AppError, AppResult};
use crate::infrastructure::build_client;
use crate::models::{AssetFormat, AssetLocation, OutputBundle};
use crate::services::asset_downloader::{AssetDownloader, DownloadRequest, RetryPolicy};
use crate::services::{locate_assets, parse_page_range, DocumentAssembler, ManifestFetcher};
use crate::utils::logging::{log_startup, print_summary};
use crate::utils::{sanitize_filename, score_id_from_url, Reporter};

/// 抓取器
pub struct Grabber<'a> {
    config: &'a Config,
    run: &'a RunConfig,
    reporter: &'a dyn Reporter,
    client: Client,
}

impl<'a> Grabber<'a> {
    pub fn new(config: &'a Config, run: &'a RunConfig, reporter: &'a dyn Reporter) -> AppResult<Self> {
        let client = build_client().map_err(AppError::HttpClient)?;
        Ok(Self {
            config,
            run,
            reporter,
            client,
        })
    }

    /// 执行完整流程并返回退出码（0 成功，1 失败）
    pub async fn run(&self) -> i32 {
        log_startup(self.reporter, &self.run.url);

        match self.execute().await {
            Ok(bundle) => {
                print_summary(self.reporter, &bundle);
                0
            }
            Err(e) => {
                self.reporter.error(&format!("[x] {}", e));
                1
            }
        }
    }

    /// 从浏览器捕获开始执行
    pub async fn execute(&self) -> AppResult<OutputBundle> {
        let capture = capture_manifest_and_title(
            &self.run.url,
            !self.run.headful,
            self.config.settle_wait(),
            self.config.chrome_executable.as_deref(),
        )
        .await?;
        self.execute_from_capture(capture).await
    }

    /// 从已捕获的清单地址开始执行
    pub async fn execute_from_capture(&self, capture: CaptureResult) -> AppResult<OutputBundle> {
        let manifest_url = capture.manifest_url.ok_or(AppError::ManifestNotCaptured)?;
        self.reporter.info(&format!("[+] space.jsonp: {}", manifest_url));
        self.reporter.info(&format!("[+] Title: {}", capture.title));

        let fetcher = ManifestFetcher::new(self.client.clone(), self.config.manifest_timeout());
        let data = fetcher.fetch(&manifest_url).await?;
        let location = locate_assets(&manifest_url, &data)?;
        self.reporter.info(&format!("[+] Base: {}", location.base_url));
        self.reporter
            .info(&format!("[+] Total pages reported: {}", location.total_pages));

        let score_id = score_id_from_url(&self.run.url);
        let base_name = sanitize_filename(
            &format!("{} - {}", capture.title, score_id),
            self.config.max_filename_len,
        );
        let output_dir = self.prepare_output_dir(&base_name).await?;

        let page_indices = self.resolve_pages(&location);

        let policy = RetryPolicy {
            retries: self.run.retries,
            backoff_base: self.config.backoff_base(),
            throttle: self.run.throttle,
        };
        let downloader = AssetDownloader::new(
            self.client.clone(),
            policy,
            self.config.request_timeout(),
            self.reporter,
        );
        let request = DownloadRequest {
            location: &location,
            output_dir: &output_dir,
            page_indices: &page_indices,
            formats: &self.run.formats,
            stem: &base_name,
        };
        let report = downloader.download_all(&request).await;

        let mut bundle = OutputBundle::new(output_dir.clone());
        bundle.absorb(&report);

        if !self.run.no_pdf && self.run.wants(AssetFormat::Svg) {
            let pdf_path = output_dir.join(format!("{}.pdf", base_name));
            let assembler = DocumentAssembler::new(self.reporter);
            if assembler.combine(&bundle.pages, &pdf_path, &self.run.pdf_engine) {
                bundle.document = Some(pdf_path);
            }
        } else {
            self.reporter.info("[i] PDF combine skipped");
        }

        Ok(bundle)
    }

    async fn prepare_output_dir(&self, base_name: &str) -> AppResult<PathBuf> {
        let output_dir = self.run.output_dir.clone().unwrap_or_else(|| {
            self.config
                .output_root
                .join(format!("musescore_{}", base_name))
        });
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| AppError::file(output_dir.display().to_string(), e))?;
        self.reporter
            .info(&format!("[+] Output dir: {}", output_dir.display()));
        Ok(output_dir)
    }

    /// 解析页码范围，并去掉超出总页数的页码
    fn resolve_pages(&self, location: &AssetLocation) -> Vec<usize> {
        let mut indices = parse_page_range(self.run.page_range.as_deref(), location.total_pages);
        if indices.iter().any(|&i| i >= location.total_pages) {
            self.reporter
                .warn("[!] Some requested pages exceed total; trimming");
            indices.retain(|&i| i < location.total_pages);
        }
        indices
    }
}
