use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::USER_AGENT;
use crate::error::{AppError, AppResult};

/// 浏览器会话：浏览器、事件处理任务和一个空白页面
pub struct BrowserSession {
    pub browser: Browser,
    pub page: Page,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    /// 关闭浏览器并等待进程退出
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            debug!("关闭浏览器失败: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("等待浏览器退出失败: {}", e);
        }
        self.handler.abort();
        debug!("浏览器已关闭");
    }
}

/// 启动浏览器（固定 User-Agent）并打开一个空白页面
///
/// # 参数
/// - `headless`: 是否无头
/// - `executable`: 浏览器路径，None 时自动探测
pub async fn launch_browser(headless: bool, executable: Option<&Path>) -> AppResult<BrowserSession> {
    info!("🚀 启动浏览器 (headless={})...", headless);

    let builder = BrowserConfig::builder();
    let builder = if headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    let builder = match executable {
        Some(path) => builder.chrome_executable(path),
        None => builder,
    };

    let config = builder
        .args(vec![
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            format!("--user-agent={}", USER_AGENT),
        ])
        .build()
        .map_err(|e| {
            error!("配置浏览器失败: {}", e);
            AppError::BrowserLaunch(e)
        })?;

    let (mut browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        AppError::BrowserLaunch(e.to_string())
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    let handler = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = match open_blank_page(&browser).await {
        Ok(page) => page,
        Err(e) => {
            let _ = browser.close().await;
            let _ = browser.wait().await;
            handler.abort();
            return Err(e);
        }
    };

    Ok(BrowserSession {
        browser,
        page,
        handler,
    })
}

async fn open_blank_page(browser: &Browser) -> AppResult<Page> {
    browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        AppError::BrowserLaunch(e.to_string())
    })
}
