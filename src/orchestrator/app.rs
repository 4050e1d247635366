//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：日志、浏览器（连接或启动）、投递记录、简历改写
//! 2. **资源管理**：唯一持有浏览器会话的模块
//! 3. **运行控制**：Ctrl-C、保持唤醒、运行轮数
//!
//! 具体的职位处理委托给 `ApplyPipeline`。

use tracing::info;

use crate::browser;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{ConsoleOperator, HeadlessOperator, JsExecutor, LinkedInBoard, Operator};
use crate::orchestrator::pipeline::{ApplyPipeline, RunSummary};
use crate::services::{ApplicationLedger, NoTailor, ResumeRewriter, ResumeTailor};
use crate::utils::logging::log_startup;
use crate::utils::{KeepAwake, ShutdownSignal};

/// LinkedIn 页面的 URL 片段，连接已有浏览器时优先复用该标签页
const PAGE_HINT: &str = "linkedin.com";

/// 应用主结构
pub struct App {
    pipeline: ApplyPipeline<LinkedInBoard>,
    max_passes: Option<usize>,
    _keep_awake: Option<KeepAwake>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config, max_passes: Option<usize>) -> AppResult<Self> {
        log_startup(&config);

        let (browser, page) = if config.browser.launch {
            browser::launch_browser(&config.browser).await?
        } else {
            browser::connect_to_browser_and_page(config.browser.debug_port, Some(PAGE_HINT))
                .await?
        };
        let board = LinkedInBoard::new(browser, JsExecutor::new(page), &config);

        let ledger = ApplicationLedger::load(config.ledger_dir())?;

        let interactive = !config.settings.run_in_background && !config.browser.headless;
        let operator: Box<dyn Operator> = if interactive {
            Box::new(ConsoleOperator::new())
        } else {
            Box::new(HeadlessOperator)
        };

        let tailor: Box<dyn ResumeTailor> =
            match ResumeRewriter::from_config(&config.llm, config.resumes_dir()) {
                Some(rewriter) => {
                    info!("✍️ 已启用简历改写 ({})", config.llm.model);
                    Box::new(rewriter)
                }
                None => Box::new(NoTailor),
            };

        let keep_awake = if config.settings.keep_screen_awake {
            KeepAwake::start()
        } else {
            None
        };

        let pipeline = ApplyPipeline::new(config, board, ledger)
            .with_operator(operator)
            .with_tailor(tailor)
            .with_shutdown(ShutdownSignal::install());

        Ok(Self {
            pipeline,
            max_passes,
            _keep_awake: keep_awake,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(mut self) -> AppResult<RunSummary> {
        self.pipeline.run(self.max_passes).await
    }
}
