use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig as ChromeConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::BrowserConfig;
use crate::error::{AppError, AppResult};

/// 自行启动浏览器（有头或无头）
pub async fn launch_browser(config: &BrowserConfig) -> AppResult<(Browser, Page)> {
    info!(
        "🚀 启动浏览器 ({})...",
        if config.headless { "无头" } else { "有头" }
    );

    let mut builder = ChromeConfig::builder();
    builder = if config.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(exe) = &config.chrome_executable {
        builder = builder.chrome_executable(Path::new(exe));
    }
    if let Some(dir) = &config.user_data_dir {
        builder = builder.user_data_dir(dir);
    }
    let chrome_config = builder
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--disable-blink-features=AutomationControlled",
        ])
        .build()
        .map_err(|e| {
            error!("配置浏览器失败: {}", e);
            AppError::session_lost(format!("配置浏览器失败: {}", e))
        })?;

    let (browser, mut handler) = Browser::launch(chrome_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        AppError::session_lost(format!("启动浏览器失败: {}", e))
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page("about:blank").await?;
    Ok((browser, page))
}
