//! 登录 cookie 的保存与恢复

use std::path::Path;

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::Page;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// 落盘的 cookie（只保留恢复会话需要的字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

impl StoredCookie {
    fn to_param(&self) -> CookieParam {
        let mut param = CookieParam::new(self.name.clone(), self.value.clone());
        param.domain = Some(self.domain.clone());
        param.path = Some(self.path.clone());
        param.secure = Some(self.secure);
        param.http_only = Some(self.http_only);
        param
    }
}

pub async fn save_cookies(page: &Page, path: &Path) -> Result<usize> {
    let cookies: Vec<StoredCookie> = page
        .get_cookies()
        .await?
        .into_iter()
        .map(|c| StoredCookie {
            name: c.name,
            value: c.value,
            domain: c.domain,
            path: c.path,
            secure: c.secure,
            http_only: c.http_only,
        })
        .collect();

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serde_json::to_vec_pretty(&cookies)?)
        .await
        .with_context(|| format!("写入 cookie 文件失败: {}", path.display()))?;
    info!("🍪 已保存 {} 个 cookie", cookies.len());
    Ok(cookies.len())
}

/// 文件不存在时返回 0
pub async fn restore_cookies(page: &Page, path: &Path) -> Result<usize> {
    if !path.exists() {
        debug!("cookie 文件不存在: {}", path.display());
        return Ok(0);
    }
    let data = tokio::fs::read(path).await?;
    let cookies: Vec<StoredCookie> = serde_json::from_slice(&data)
        .with_context(|| format!("cookie 文件格式错误: {}", path.display()))?;
    if cookies.is_empty() {
        return Ok(0);
    }
    page.set_cookies(cookies.iter().map(StoredCookie::to_param).collect())
        .await?;
    Ok(cookies.len())
}
