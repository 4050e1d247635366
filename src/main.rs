use std::path::Path;

use anyhow::Result;
use clap::Parser;
use job_apply_agent::cli::{Cli, Command, HistoryArgs, RunArgs};
use job_apply_agent::services::ApplicationLedger;
use job_apply_agent::utils::logging::{self, truncate_text};
use job_apply_agent::{App, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => run(args).await,
        Command::History(args) => history(args),
    }
}

async fn run(args: RunArgs) -> Result<()> {
    // 加载配置
    let mut config = Config::load(args.config.as_deref())?;
    if args.headless {
        config.browser.headless = true;
        config.normalize();
    }
    config.validate()?;

    // 初始化日志
    logging::init(
        &config.settings.log_level,
        Some(Path::new(&config.settings.log_file)),
    )?;

    // 初始化并运行应用
    let summary = App::initialize(config, args.passes).await?.run().await?;
    info!("🏁 共 {} 轮，成功投递 {} 个", summary.passes, summary.stats.applied());

    Ok(())
}

fn history(args: HistoryArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let ledger = ApplicationLedger::load(config.ledger_dir())?;

    let entries: Vec<_> = ledger
        .history()?
        .into_iter()
        .filter(|e| !args.failed || !e.applied)
        .collect();

    for entry in &entries {
        let status = if entry.applied { "✅" } else { "❌" };
        println!(
            "{} {} | {} | {} | {}",
            status,
            entry.timestamp,
            truncate_text(&entry.job_title, 40),
            truncate_text(&entry.company, 30),
            entry.job_url
        );
        if !entry.error_message.is_empty() {
            println!("     {}", entry.error_message);
        }
    }
    println!(
        "\n共 {} 条记录，其中成功投递 {} 个",
        entries.len(),
        ledger.applied_count()
    );
    Ok(())
}
