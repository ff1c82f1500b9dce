//! 资源下载服务 - 业务能力层
//!
//! 逐个下载分页 SVG 和可选的 MusicXML / MIDI。
//! 每个资源独立重试，单个失败不会中断整批下载；
//! 磁盘上已有非空文件的页面直接复用，不发请求。

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::REFERER;
use reqwest::{Client, StatusCode};
use tokio::fs;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::AssetError;
use crate::models::{AssetFormat, AssetLocation, DownloadOutcome, DownloadReport, PageOutcome};
use crate::utils::{page_file_name, Reporter};

/// 重试、退避和限速参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 失败后的重试次数，总尝试次数为 retries + 1
    pub retries: u32,
    /// 退避基础时长，第 n 次失败后等待 n × backoff_base
    pub backoff_base: Duration,
    /// 每次成功下载后的休眠
    pub throttle: Duration,
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.retries + 1
    }

    /// 第 `attempt` 次（1 起始）失败后的等待时长
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base * attempt
    }
}

/// 一次下载任务的输入
#[derive(Debug, Clone)]
pub struct DownloadRequest<'a> {
    pub location: &'a AssetLocation,
    pub output_dir: &'a Path,
    /// 0 起始页码，已排序
    pub page_indices: &'a [usize],
    pub formats: &'a [AssetFormat],
    /// 输出文件名前缀
    pub stem: &'a str,
}

/// 资源下载服务
pub struct AssetDownloader<'r> {
    client: Client,
    policy: RetryPolicy,
    timeout: Duration,
    reporter: &'r dyn Reporter,
}

impl<'r> AssetDownloader<'r> {
    pub fn new(
        client: Client,
        policy: RetryPolicy,
        timeout: Duration,
        reporter: &'r dyn Reporter,
    ) -> Self {
        Self {
            client,
            policy,
            timeout,
            reporter,
        }
    }

    /// 下载所有请求的资源
    pub async fn download_all(&self, request: &DownloadRequest<'_>) -> DownloadReport {
        let mut report = DownloadReport::default();
        let base = request.location.base_url.as_str();

        if request.formats.contains(&AssetFormat::Svg) && request.location.total_pages > 0 {
            self.reporter.info(&format!(
                "[+] Downloading {} SVG page(s)",
                request.page_indices.len()
            ));
            report.pages = self.download_pages(request).await;
        } else {
            self.reporter.info("[i] Skipping SVG pages");
        }

        for format in [AssetFormat::MusicXml, AssetFormat::Midi] {
            if !request.formats.contains(&format) {
                continue;
            }
            let Some(remote) = format.remote_file() else {
                continue;
            };
            let out = request
                .output_dir
                .join(format!("{}.{}", request.stem, format.name()));
            let saved = self
                .download_auxiliary(&request.location.file_url(remote), base, &out, format)
                .await;
            match format {
                AssetFormat::MusicXml => report.musicxml = saved,
                AssetFormat::Midi => report.midi = saved,
                AssetFormat::Svg => {}
            }
        }

        report
    }

    /// 按顺序下载分页 SVG
    pub async fn download_pages(&self, request: &DownloadRequest<'_>) -> Vec<PageOutcome> {
        let mut outcomes = Vec::with_capacity(request.page_indices.len());
        let referer = request.location.base_url.as_str();

        for &index in request.page_indices {
            let out_file = request
                .output_dir
                .join(page_file_name(request.stem, index));
            let name = display_name(&out_file);

            if is_present(&out_file).await {
                self.reporter.info(&format!("  [skip] {} (exists)", name));
                outcomes.push(PageOutcome {
                    index,
                    outcome: DownloadOutcome::Reused(out_file),
                });
                continue;
            }

            let url = request.location.page_url(index);
            let outcome = match self.fetch_and_save(&url, referer, &out_file).await {
                Ok(()) => {
                    self.reporter.info(&format!("  [+] Saved {}", name));
                    DownloadOutcome::Saved(out_file)
                }
                Err(e) => {
                    warn!("第 {} 页下载失败: {}", index + 1, e);
                    self.reporter.warn(&format!("  [x] Failed page {}", index + 1));
                    DownloadOutcome::Failed(e)
                }
            };
            outcomes.push(PageOutcome { index, outcome });
        }

        outcomes
    }

    /// 下载辅助资源，不存在时返回 None
    pub async fn download_auxiliary(
        &self,
        url: &str,
        referer: &str,
        out_file: &Path,
        format: AssetFormat,
    ) -> Option<PathBuf> {
        match self.fetch_and_save(url, referer, out_file).await {
            Ok(()) => {
                self.reporter.info(&format!(
                    "[+] Saved {}: {}",
                    format.label(),
                    display_name(out_file)
                ));
                Some(out_file.to_path_buf())
            }
            Err(e) => {
                debug!("{} 不可用: {}", format.label(), e);
                self.reporter
                    .info(&format!("[i] {} not available (or blocked)", format.label()));
                None
            }
        }
    }

    /// 下载、写盘、再按限速休眠
    async fn fetch_and_save(&self, url: &str, referer: &str, out_file: &Path) -> Result<(), AssetError> {
        let data = self.get_with_retry(url, referer).await?;

        fs::write(out_file, &data)
            .await
            .map_err(|source| AssetError::Write {
                path: out_file.display().to_string(),
                source,
            })?;

        if !self.policy.throttle.is_zero() {
            sleep(self.policy.throttle).await;
        }
        Ok(())
    }

    /// 带重试的 GET，只有 200 且非空才算成功
    pub async fn get_with_retry(&self, url: &str, referer: &str) -> Result<Vec<u8>, AssetError> {
        let attempts = self.policy.attempts();

        for attempt in 1..=attempts {
            match self.try_get(url, referer).await {
                Ok(data) => return Ok(data),
                Err(reason) => {
                    warn!("GET {} 失败 (尝试 {}/{}): {}", url, attempt, attempts, reason);
                }
            }

            if attempt < attempts {
                sleep(self.policy.backoff(attempt)).await;
            }
        }

        Err(AssetError::Exhausted {
            url: url.to_string(),
            attempts,
        })
    }

    async fn try_get(&self, url: &str, referer: &str) -> Result<Vec<u8>, String> {
        let resp = self
            .client
            .get(url)
            .header(REFERER, referer)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(format!("HTTP {}", status.as_u16()));
        }

        let data = resp.bytes().await.map_err(|e| e.to_string())?;
        if data.is_empty() {
            return Err("响应为空".to_string());
        }
        Ok(data.to_vec())
    }
}

async fn is_present(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MemoryReporter;
    use tempfile::TempDir;
    use tracing::Level;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_policy(retries: u32) -> RetryPolicy {
        RetryPolicy {
            retries,
            backoff_base: Duration::from_millis(1),
            throttle: Duration::ZERO,
        }
    }

    fn location(server: &MockServer, total_pages: usize) -> AssetLocation {
        AssetLocation {
            base_url: format!("{}/scores/7/", server.uri()),
            total_pages,
        }
    }

    async fn mount_page(server: &MockServer, index: usize, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/scores/7/score_{}.svg", index)))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
            .mount(server)
            .await;
    }

    #[test]
    fn test_backoff_is_linear() {
        let policy = RetryPolicy {
            retries: 3,
            backoff_base: Duration::from_millis(750),
            throttle: Duration::ZERO,
        };
        assert_eq!(policy.attempts(), 4);
        assert_eq!(policy.backoff(1), Duration::from_millis(750));
        assert_eq!(policy.backoff(2), Duration::from_millis(1500));
        assert_eq!(policy.backoff(3), Duration::from_millis(2250));
    }

    #[tokio::test]
    async fn test_pages_saved_with_referer_and_names() {
        let server = MockServer::start().await;
        let base = format!("{}/scores/7/", server.uri());
        Mock::given(method("GET"))
            .and(path("/scores/7/score_0.svg"))
            .and(header("referer", base.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string("<svg/>"))
            .expect(1)
            .mount(&server)
            .await;
        mount_page(&server, 2, "<svg id='2'/>").await;

        let dir = TempDir::new().unwrap();
        let reporter = MemoryReporter::new();
        let downloader =
            AssetDownloader::new(Client::new(), fast_policy(0), Duration::from_secs(5), &reporter);
        let loc = location(&server, 3);
        let request = DownloadRequest {
            location: &loc,
            output_dir: dir.path(),
            page_indices: &[0, 2],
            formats: &[AssetFormat::Svg],
            stem: "Song - 7",
        };

        let report = downloader.download_all(&request).await;

        assert_eq!(
            report.saved_pages(),
            vec![
                dir.path().join("Song - 7 - page - 01.svg"),
                dir.path().join("Song - 7 - page - 03.svg")
            ]
        );
        let third = std::fs::read_to_string(dir.path().join("Song - 7 - page - 03.svg")).unwrap();
        assert_eq!(third, "<svg id='2'/>");
        assert!(reporter.contains(Level::INFO, "Saved Song - 7 - page - 01.svg"));
    }

    #[tokio::test]
    async fn test_existing_files_issue_no_requests() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        for index in 0..3 {
            std::fs::write(dir.path().join(page_file_name("S", index)), "<svg/>").unwrap();
        }

        let reporter = MemoryReporter::new();
        let downloader =
            AssetDownloader::new(Client::new(), fast_policy(2), Duration::from_secs(5), &reporter);
        let loc = location(&server, 3);
        let request = DownloadRequest {
            location: &loc,
            output_dir: dir.path(),
            page_indices: &[0, 1, 2],
            formats: &[AssetFormat::Svg],
            stem: "S",
        };

        let report = downloader.download_all(&request).await;

        assert_eq!(report.saved_pages().len(), 3);
        assert!(report
            .pages
            .iter()
            .all(|p| matches!(p.outcome, DownloadOutcome::Reused(_))));
        let received = server.received_requests().await.unwrap();
        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn test_empty_existing_file_is_downloaded_again() {
        let server = MockServer::start().await;
        mount_page(&server, 0, "<svg/>").await;
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(page_file_name("S", 0)), "").unwrap();

        let reporter = MemoryReporter::new();
        let downloader =
            AssetDownloader::new(Client::new(), fast_policy(0), Duration::from_secs(5), &reporter);
        let loc = location(&server, 1);
        let request = DownloadRequest {
            location: &loc,
            output_dir: dir.path(),
            page_indices: &[0],
            formats: &[AssetFormat::Svg],
            stem: "S",
        };

        let report = downloader.download_all(&request).await;

        assert!(matches!(report.pages[0].outcome, DownloadOutcome::Saved(_)));
    }

    #[tokio::test]
    async fn test_failed_page_does_not_block_later_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/scores/7/score_0.svg"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;
        mount_page(&server, 1, "<svg/>").await;

        let dir = TempDir::new().unwrap();
        let reporter = MemoryReporter::new();
        let downloader =
            AssetDownloader::new(Client::new(), fast_policy(2), Duration::from_secs(5), &reporter);
        let loc = location(&server, 2);
        let request = DownloadRequest {
            location: &loc,
            output_dir: dir.path(),
            page_indices: &[0, 1],
            formats: &[AssetFormat::Svg],
            stem: "S",
        };

        let report = downloader.download_all(&request).await;

        assert!(matches!(
            report.pages[0].outcome,
            DownloadOutcome::Failed(AssetError::Exhausted { attempts: 3, .. })
        ));
        assert!(matches!(report.pages[1].outcome, DownloadOutcome::Saved(_)));
        assert_eq!(report.failed_pages(), vec![1]);
        assert!(reporter.contains(Level::WARN, "Failed page 1"));
        server.verify().await;
    }

    #[tokio::test]
    async fn test_empty_body_counts_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let reporter = MemoryReporter::new();
        let downloader =
            AssetDownloader::new(Client::new(), fast_policy(1), Duration::from_secs(5), &reporter);

        let result = downloader
            .get_with_retry(&format!("{}/score_0.svg", server.uri()), "r")
            .await;

        assert!(matches!(result, Err(AssetError::Exhausted { attempts: 2, .. })));
    }

    #[tokio::test]
    async fn test_retry_recovers_after_transient_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let reporter = MemoryReporter::new();
        let downloader =
            AssetDownloader::new(Client::new(), fast_policy(1), Duration::from_secs(5), &reporter);

        let data = downloader
            .get_with_retry(&format!("{}/score.mid", server.uri()), "r")
            .await
            .unwrap();

        assert_eq!(data, b"ok");
    }

    #[tokio::test]
    async fn test_auxiliary_absence_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/scores/7/score.mxl"))
            .respond_with(ResponseTemplate::new(200).set_body_string("PK"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/scores/7/score.mid"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let reporter = MemoryReporter::new();
        let downloader =
            AssetDownloader::new(Client::new(), fast_policy(1), Duration::from_secs(5), &reporter);
        let loc = location(&server, 0);
        let request = DownloadRequest {
            location: &loc,
            output_dir: dir.path(),
            page_indices: &[],
            formats: &AssetFormat::ALL,
            stem: "S",
        };

        let report = downloader.download_all(&request).await;

        assert!(report.pages.is_empty());
        assert_eq!(report.musicxml, Some(dir.path().join("S.mxl")));
        assert_eq!(report.midi, None);
        assert!(reporter.contains(Level::INFO, "Skipping SVG pages"));
        assert!(reporter.contains(Level::INFO, "MIDI not available"));
    }

    #[tokio::test]
    async fn test_backoff_sleeps_between_attempts_only() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/scores/7/score.mid"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let policy = RetryPolicy {
            retries: 2,
            backoff_base: Duration::from_millis(50),
            throttle: Duration::ZERO,
        };
        let reporter = MemoryReporter::new();
        let downloader = AssetDownloader::new(Client::new(), policy, Duration::from_secs(5), &reporter);
        let url = format!("{}/scores/7/score.mid", server.uri());

        let started = std::time::Instant::now();
        let result = downloader.get_with_retry(&url, &server.uri()).await;
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(AssetError::Exhausted { attempts: 3, .. })));
        // 50ms + 100ms，最后一次失败后不再等待（否则还要再加 150ms）
        assert!(elapsed >= policy.backoff(1) + policy.backoff(2), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(300), "{elapsed:?}");
    }

    #[tokio::test]
    async fn test_throttle_follows_each_saved_page() {
        let server = MockServer::start().await;
        mount_page(&server, 0, "<svg/>").await;
        mount_page(&server, 1, "<svg/>").await;

        let policy = RetryPolicy {
            retries: 0,
            backoff_base: Duration::from_millis(1),
            throttle: Duration::from_millis(120),
        };
        let dir = TempDir::new().unwrap();
        let reporter = MemoryReporter::new();
        let downloader = AssetDownloader::new(Client::new(), policy, Duration::from_secs(5), &reporter);
        let loc = location(&server, 2);
        let request = DownloadRequest {
            location: &loc,
            output_dir: dir.path(),
            page_indices: &[0, 1],
            formats: &[AssetFormat::Svg],
            stem: "S",
        };

        let started = std::time::Instant::now();
        let outcomes = downloader.download_pages(&request).await;
        assert!(started.elapsed() >= policy.throttle * 2);
        assert!(outcomes.iter().all(|o| matches!(o.outcome, DownloadOutcome::Saved(_))));

        // 复用已有文件时不休眠
        let started = std::time::Instant::now();
        downloader.download_pages(&request).await;
        assert!(started.elapsed() < policy.throttle);
    }
}
