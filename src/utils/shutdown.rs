//! Ctrl-C 处理
//!
//! 收到信号后只设置标志，正在进行的投递会完成并写入记录，
//! 编排层在下一个职位之前检查标志并退出。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册 Ctrl-C 监听
    pub fn install() -> Self {
        let signal = Self::new();
        let handle = signal.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("\n🛑 收到中断信号，当前职位处理完毕后退出...");
                    handle.request();
                }
                Err(e) => warn!("无法监听 Ctrl-C: {}", e),
            }
        });
        signal
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let signal = ShutdownSignal::new();
        let other = signal.clone();
        assert!(!other.is_requested());
        signal.request();
        assert!(other.is_requested());
    }
}
