//! 运行期间阻止系统休眠
//!
//! macOS 使用 `caffeinate`，Linux 使用 `systemd-inhibit`。
//! 其他平台或命令不存在时只记录警告。

use tokio::process::{Child, Command};
use tracing::{info, warn};

/// 持有期间系统不会进入休眠，drop 时结束子进程
pub struct KeepAwake {
    _child: Child,
}

impl KeepAwake {
    pub fn start() -> Option<Self> {
        let Some(mut command) = inhibit_command() else {
            warn!("当前平台不支持保持唤醒，忽略 keep_screen_awake");
            return None;
        };
        command.kill_on_drop(true);
        match command.spawn() {
            Ok(child) => {
                info!("☕ 已启用保持唤醒");
                Some(Self { _child: child })
            }
            Err(e) => {
                warn!("启动保持唤醒失败: {}", e);
                None
            }
        }
    }
}

fn inhibit_command() -> Option<Command> {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("caffeinate");
        cmd.args(["-d", "-i", "-w", &std::process::id().to_string()]);
        Some(cmd)
    } else if cfg!(target_os = "linux") {
        let mut cmd = Command::new("systemd-inhibit");
        cmd.args([
            "--what=idle:sleep",
            "--who=job_apply_agent",
            "--why=job application run",
            "sleep",
            "infinity",
        ]);
        Some(cmd)
    } else {
        None
    }
}
