//! 清单捕获
//!
//! 打开乐谱页面，记录第一个 space.jsonp 请求的地址，并读取标题。
//! 浏览器在任何返回路径上都会被关闭。

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::browser::headless::launch_browser;
use crate::config::MANIFEST_MARKER;
use crate::error::{AppError, AppResult};
use crate::infrastructure::JsExecutor;

const DEFAULT_TITLE: &str = "MuseScore Score";
const SITE_SUFFIX: &str = " | MuseScore";

/// 没有进行中的请求持续这么久，视为网络空闲
const IDLE_WINDOW: Duration = Duration::from_millis(500);
/// 等待网络空闲的上限
const IDLE_CAP: Duration = Duration::from_secs(15);
const IDLE_POLL: Duration = Duration::from_millis(50);

/// 捕获结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    pub manifest_url: Option<String>,
    pub title: String,
}

/// 只接受第一次写入的 URL 槽位
#[derive(Debug, Clone, Default)]
pub struct FirstMatch {
    slot: Arc<OnceLock<String>>,
}

impl FirstMatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// 匹配时记录 URL，返回是否已经有值（观察可以停止）
    pub fn observe(&self, url: &str) -> bool {
        if url.contains(MANIFEST_MARKER) {
            let _ = self.slot.set(url.to_string());
        }
        self.slot.get().is_some()
    }

    pub fn get(&self) -> Option<String> {
        self.slot.get().cloned()
    }
}

/// 进行中的请求计数
#[derive(Debug, Clone, Default)]
pub struct InflightRequests {
    count: Arc<AtomicUsize>,
}

impl InflightRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// 结束一个请求，计数不会低于 0
    pub fn finished(&self) {
        let _ = self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    pub fn in_flight(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// 等到没有进行中的请求并持续 `window`，最多等 `cap`
///
/// # 返回
/// 是否真的等到了空闲
pub async fn wait_for_network_idle(inflight: &InflightRequests, window: Duration, cap: Duration) -> bool {
    let deadline = Instant::now() + cap;
    let mut idle_since: Option<Instant> = None;

    loop {
        let now = Instant::now();
        if inflight.in_flight() == 0 {
            let since = *idle_since.get_or_insert(now);
            if now.duration_since(since) >= window {
                return true;
            }
        } else {
            idle_since = None;
        }
        if now >= deadline {
            return false;
        }
        sleep(IDLE_POLL).await;
    }
}

/// 打开乐谱页面并捕获清单地址和标题
///
/// # 参数
/// - `score_url`: 乐谱页面
/// - `headless`: 是否无头
/// - `wait`: 页面加载后额外等待的时长
/// - `executable`: 浏览器路径
pub async fn capture_manifest_and_title(
    score_url: &str,
    headless: bool,
    wait: Duration,
    executable: Option<&Path>,
) -> AppResult<CaptureResult> {
    let session = launch_browser(headless, executable).await?;
    let result = capture_on_page(&session.page, score_url, wait).await;
    session.close().await;
    result
}

async fn capture_on_page(page: &Page, score_url: &str, wait: Duration) -> AppResult<CaptureResult> {
    let first_match = FirstMatch::new();
    let inflight = InflightRequests::new();

    let mut requests = page
        .event_listener::<EventRequestWillBeSent>()
        .await
        .map_err(|e| AppError::navigation(score_url, e))?;
    let mut finished = page
        .event_listener::<EventLoadingFinished>()
        .await
        .map_err(|e| AppError::navigation(score_url, e))?;
    let mut failed = page
        .event_listener::<EventLoadingFailed>()
        .await
        .map_err(|e| AppError::navigation(score_url, e))?;

    let observers: Vec<JoinHandle<()>> = vec![
        {
            let first_match = first_match.clone();
            let inflight = inflight.clone();
            tokio::spawn(async move {
                while let Some(event) = requests.next().await {
                    // 重定向沿用同一个请求
                    if event.redirect_response.is_none() {
                        inflight.started();
                    }
                    if first_match.get().is_none() && first_match.observe(&event.request.url) {
                        debug!("捕获到清单请求: {}", event.request.url);
                    }
                }
            })
        },
        {
            let inflight = inflight.clone();
            tokio::spawn(async move {
                while finished.next().await.is_some() {
                    inflight.finished();
                }
            })
        },
        {
            let inflight = inflight.clone();
            tokio::spawn(async move {
                while failed.next().await.is_some() {
                    inflight.finished();
                }
            })
        },
    ];
    let stop_observers = || observers.iter().for_each(JoinHandle::abort);

    info!("正在打开: {}", score_url);
    let navigation = async {
        page.goto(score_url).await?;
        page.wait_for_navigation().await?;
        Ok::<(), chromiumoxide::error::CdpError>(())
    }
    .await;

    if let Err(e) = navigation {
        stop_observers();
        return Err(AppError::navigation(score_url, e));
    }

    if !wait_for_network_idle(&inflight, IDLE_WINDOW, IDLE_CAP).await {
        debug!("网络未空闲，仍有 {} 个请求", inflight.in_flight());
    }
    // 等待晚到的请求
    sleep(wait).await;
    stop_observers();

    let title = read_title(page).await;
    Ok(CaptureResult {
        manifest_url: first_match.get(),
        title,
    })
}

async fn read_title(page: &Page) -> String {
    let meta = JsExecutor::new(page)
        .query_attribute(r#"meta[property="og:title"]"#, "content")
        .await
        .unwrap_or_else(|e| {
            debug!("读取 og:title 失败: {}", e);
            None
        });
    let document_title = match meta {
        Some(_) => None,
        None => page.get_title().await.ok().flatten(),
    };
    clean_title(meta, document_title)
}

/// 依次选择 meta 标题、文档标题、默认标题，并去掉站点后缀
pub fn clean_title(meta: Option<String>, document_title: Option<String>) -> String {
    let raw = meta
        .filter(|t| !t.is_empty())
        .or(document_title.filter(|t| !t.is_empty()))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    raw.replace(SITE_SUFFIX, "").trim().to_string()
}
