use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 浏览器 / DOM 相关错误
    Dom(DomError),
    /// 单次投递失败
    Apply(ApplyError),
    /// 投递记录读写错误
    Ledger(LedgerError),
    /// 配置错误
    Config(ConfigError),
    /// 文件操作错误
    File {
        path: PathBuf,
        source: std::io::Error,
    },
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Dom(e) => write!(f, "浏览器错误: {}", e),
            AppError::Apply(e) => write!(f, "投递错误: {}", e),
            AppError::Ledger(e) => write!(f, "记录错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::File { path, source } => {
                write!(f, "文件错误 ({}): {}", path.display(), source)
            }
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Dom(e) => Some(e),
            AppError::Apply(e) => Some(e),
            AppError::Ledger(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::File { source, .. } => Some(source),
            AppError::Other(_) => None,
        }
    }
}

impl AppError {
    /// 会话是否已经不可用（浏览器断开等），需要终止整个运行
    pub fn is_fatal(&self) -> bool {
        match self {
            AppError::Dom(e) => e.is_fatal(),
            AppError::Apply(e) => e.is_fatal(),
            _ => false,
        }
    }
}

/// 浏览器 / DOM 错误
#[derive(Debug, Error)]
pub enum DomError {
    /// 元素引用已失效（页面重新渲染）
    #[error("元素已失效: {0}")]
    Stale(String),
    /// 点击被其他元素遮挡
    #[error("点击被遮挡: {0}")]
    ClickIntercepted(String),
    /// 找不到元素
    #[error("未找到元素: {0}")]
    NotFound(String),
    /// 等待超时
    #[error("等待 {what} 超时 ({waited_ms} ms)")]
    Timeout { what: String, waited_ms: u64 },
    /// 会话断开，浏览器不可用
    #[error("浏览器会话已断开: {0}")]
    SessionLost(String),
    /// 脚本执行失败
    #[error("执行脚本失败: {0}")]
    Script(String),
}

impl DomError {
    pub fn is_stale(&self) -> bool {
        matches!(self, DomError::Stale(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, DomError::SessionLost(_))
    }
}

impl From<chromiumoxide::error::CdpError> for DomError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        use chromiumoxide::error::CdpError;
        match err {
            CdpError::Ws(e) => DomError::SessionLost(e.to_string()),
            CdpError::NoResponse => DomError::SessionLost("CDP 无响应".to_string()),
            CdpError::Timeout => DomError::Timeout {
                what: "CDP 请求".to_string(),
                waited_ms: 0,
            },
            CdpError::NotFound => DomError::NotFound("CDP 目标".to_string()),
            other => DomError::Script(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for DomError {
    fn from(err: serde_json::Error) -> Self {
        DomError::Script(format!("结果解析失败: {}", err))
    }
}

/// 单次投递失败原因
///
/// `Display` 的内容会原样写入失败记录。
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error(transparent)]
    Dom(#[from] DomError),
    /// 页面上缺少必要的按钮或控件
    #[error("缺少控件: {0}")]
    MissingAffordance(String),
    #[error("提交按钮始终不可点击")]
    SubmitNotActionable,
    #[error("操作员放弃了本次投递")]
    Discarded,
    #[error("第 {iterations} 轮后仍有无法自动回答的问题")]
    Unanswerable { iterations: u32 },
    #[error("无法获取外部投递链接: {0}")]
    ExternalLink(String),
}

impl ApplyError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ApplyError::Dom(e) if e.is_fatal())
    }
}

/// 投递记录错误
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("无法访问 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV 读写失败: {0}")]
    Csv(#[from] csv::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path} 失败: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("配置文件格式错误: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("配置校验失败: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

// ========== 从常见错误类型转换 ==========

impl From<DomError> for AppError {
    fn from(err: DomError) -> Self {
        AppError::Dom(err)
    }
}

impl From<ApplyError> for AppError {
    fn from(err: ApplyError) -> Self {
        AppError::Apply(err)
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError::Ledger(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Dom(err.into())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(format!("JSON 解析失败: {}", err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件错误
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::File {
            path: path.into(),
            source,
        }
    }

    /// 创建会话断开错误
    pub fn session_lost(msg: impl Into<String>) -> Self {
        AppError::Dom(DomError::SessionLost(msg.into()))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(AppError::session_lost("ws closed").is_fatal());
        assert!(!AppError::Dom(DomError::NotFound("x".into())).is_fatal());

        let apply = ApplyError::Dom(DomError::SessionLost("gone".into()));
        assert!(apply.is_fatal());
        assert!(!ApplyError::Discarded.is_fatal());
    }

    #[test]
    fn test_config_invalid_joins_messages() {
        let err = ConfigError::Invalid(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "配置校验失败: a; b");
    }
}
