/// 日志工具模块
///
/// 初始化 tracing，并提供运行过程中的横幅输出
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::SessionStats;

/// 初始化 tracing：终端 + 运行日志文件
///
/// `RUST_LOG` 优先于配置中的 `log_level`。
pub fn init(level: &str, log_file: Option<&Path>) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("无效的日志级别: {}", level))?,
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact();

    let file_layer = match log_file {
        Some(path) => {
            let file = init_log_file(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("初始化日志失败")?;
    Ok(())
}

/// 以追加方式打开运行日志，先写入一段带时间的头部
pub fn init_log_file(log_file_path: &Path) -> Result<fs::File> {
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法打开日志文件: {}", log_file_path.display()))?;

    let log_header = format!(
        "\n{}\n投递运行日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    file.write_all(log_header.as_bytes())?;
    Ok(file)
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 职位搜索与自动投递");
    info!("🔎 搜索词: {}", config.search.search_terms.join(", "));
    info!("📍 地点: {}", display_or_any(&config.search.search_location));
    info!("🎯 每个搜索词目标: {} 个", config.search.switch_number);
    if config.settings.run_in_background {
        info!("🤖 后台模式：不会暂停等待确认");
    }
    info!("{}", "=".repeat(60));
}

/// 记录一轮搜索开始
pub fn log_pass_start(pass: usize, date_posted: &str, sort_by: &str) {
    info!("\n{}", "=".repeat(60));
    info!("🔁 第 {} 轮 | 发布时间: {} | 排序: {}", pass, date_posted, sort_by);
    info!("{}", "=".repeat(60));
}

/// 记录单个搜索词完成
pub fn log_term_complete(term: &str, processed: usize, stale_events: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 搜索词 \"{}\" 完成: 处理 {} 个", term, processed);
    if stale_events > 0 {
        info!("🔄 卡片失效重试 {} 次", stale_events);
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &SessionStats, passes: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 运行结束统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("Total runs:     {}", passes);
    info!("Easy Applied:   {}", stats.easy_applied);
    info!("External links: {}", stats.external_collected);
    info!("Failed:         {}", stats.failed);
    info!("Skipped:        {}", stats.skipped);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

fn display_or_any(text: &str) -> &str {
    if text.trim().is_empty() {
        "不限"
    } else {
        text
    }
}
