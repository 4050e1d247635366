//! 投递流水线 - 编排层
//!
//! ## 职责
//!
//! 对每个搜索词：打开搜索 → 扫描职位 → 过滤 → 打开详情 → 过滤 → 投递 → 记录。
//!
//! ## 不变量
//!
//! - 每次投递尝试（打开过详情或被名称规则拒绝的职位）恰好写入一条记录
//! - 已成功投递的职位（记录或页面标记）不会再次尝试，也不写记录
//! - 会话断开时立即结束整个运行；其他错误只影响当前职位
//! - 无论如何结束，都会输出统计并释放浏览器

use std::path::{Path, PathBuf};

use chrono::Local;
use rand::seq::SliceRandom;
use tracing::{debug, error, info, warn};

use crate::config::{Config, Settings};
use crate::error::{AppError, AppResult, ApplyError};
use crate::filter::{FilterChain, FilterVerdict, VerdictKind};
use crate::infrastructure::{HeadlessOperator, JobBoard, Operator};
use crate::models::job::calculate_date_posted;
use crate::models::{DatePosted, JobPosting, SearchQuery, SessionState, SessionStats, SortBy};
use crate::services::{
    ApplicationLedger, ArchiveStatus, DescriptionArchive, LedgerEntry, NoTailor, ResumeTailor,
};
use crate::utils::logging;
use crate::utils::ShutdownSignal;
use crate::workflow::{EasyApplyFlow, EasyApplyOutcome, ListingScanner, ScannedPosting};

/// 可以直接上传到表单的简历格式
const UPLOADABLE_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// 单个职位的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum ApplicationAttemptResult {
    AppliedEasy { resume: Option<PathBuf> },
    AppliedExternal { link: String },
    Failed { error: String },
    Skipped(FilterVerdict),
}

impl ApplicationAttemptResult {
    pub fn is_applied(&self) -> bool {
        matches!(
            self,
            ApplicationAttemptResult::AppliedEasy { .. }
                | ApplicationAttemptResult::AppliedExternal { .. }
        )
    }
}

/// 一次运行的汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub passes: usize,
    pub stats: SessionStats,
}

/// 详情页检查后的下一步
enum Stage {
    Skip(FilterVerdict),
    Easy(EasyApplyOutcome),
    External(String),
}

/// 投递流水线
///
/// 持有页面能力、记录和会话状态；每个职位的处理都在这里串行完成。
pub struct ApplyPipeline<B: JobBoard> {
    config: Config,
    board: B,
    operator: Box<dyn Operator>,
    tailor: Box<dyn ResumeTailor>,
    ledger: ApplicationLedger,
    archive: DescriptionArchive,
    filter: FilterChain,
    flow: EasyApplyFlow,
    session: SessionState,
    stats: SessionStats,
    shutdown: ShutdownSignal,
    passes: usize,
}

impl<B: JobBoard> ApplyPipeline<B> {
    /// 默认无人值守、不改写简历
    pub fn new(config: Config, board: B, ledger: ApplicationLedger) -> Self {
        let pause = config.settings.pause_before_submit && !config.settings.run_in_background;
        Self {
            archive: DescriptionArchive::new(config.descriptions_dir()),
            filter: FilterChain::new(config.filters.clone()),
            flow: EasyApplyFlow::from_config(&config),
            session: SessionState::new(pause),
            config,
            board,
            operator: Box::new(HeadlessOperator),
            tailor: Box::new(NoTailor),
            ledger,
            stats: SessionStats::default(),
            shutdown: ShutdownSignal::new(),
            passes: 0,
        }
    }

    pub fn with_operator(mut self, operator: Box<dyn Operator>) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_tailor(mut self, tailor: Box<dyn ResumeTailor>) -> Self {
        self.tailor = tailor;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn ledger(&self) -> &ApplicationLedger {
        &self.ledger
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    /// 运行直到完成指定轮数（`None` 时按配置决定）
    ///
    /// 结束时总会输出统计并关闭页面会话。
    pub async fn run(&mut self, max_passes: Option<usize>) -> AppResult<RunSummary> {
        let result = self.run_passes(max_passes).await;

        if let Err(e) = &result {
            error!("❌ 运行终止: {}", e);
        }
        logging::print_final_stats(&self.stats, self.passes, &self.config.settings.log_file);
        if let Err(e) = self.board.close().await {
            warn!("关闭浏览器失败: {}", e);
        }

        result.map(|()| RunSummary {
            passes: self.passes,
            stats: self.stats,
        })
    }

    async fn run_passes(&mut self, max_passes: Option<usize>) -> AppResult<()> {
        self.login().await?;

        let limit = max_passes.or(if self.config.settings.run_non_stop {
            None
        } else {
            Some(1)
        });
        let mut terms: Vec<String> = self
            .config
            .search
            .search_terms
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        let mut date_posted = self.config.search.date_posted;
        let mut sort_by = self.config.search.sort_by;

        loop {
            if self.shutdown.is_requested() {
                break;
            }
            if limit.is_some_and(|limit| self.passes >= limit) {
                break;
            }
            self.passes += 1;
            if self.config.search.randomize_search_order {
                terms.shuffle(&mut rand::rng());
            }
            logging::log_pass_start(self.passes, date_posted.label(), sort_by.label());

            for term in &terms {
                if self.shutdown.is_requested() {
                    break;
                }
                self.search_term(term, date_posted, sort_by).await?;
            }

            (date_posted, sort_by) = next_rotation(&self.config.settings, date_posted, sort_by);
        }
        Ok(())
    }

    /// 登录；自动登录失败时在交互模式下请操作员手动登录
    async fn login(&self) -> AppResult<()> {
        if self.board.ensure_logged_in().await? {
            return Ok(());
        }
        if self.operator.is_interactive() {
            self.operator
                .alert("自动登录失败，请在浏览器中手动登录 LinkedIn")
                .await;
            if self.board.is_logged_in().await? {
                info!("✓ 手动登录成功");
                return Ok(());
            }
        }
        Err(AppError::session_lost("未能登录 LinkedIn"))
    }

    /// 处理一个搜索词，直到达到目标数量或列表结束
    async fn search_term(
        &mut self,
        term: &str,
        date_posted: DatePosted,
        sort_by: SortBy,
    ) -> AppResult<()> {
        let query = self.build_query(term, date_posted, sort_by);
        info!("\n🔎 搜索: \"{}\"", term);
        if let Err(e) = self.board.open_search(&query).await {
            if e.is_fatal() {
                return Err(e.into());
            }
            warn!("⚠️ 打开搜索页失败，跳过 \"{}\": {}", term, e);
            return Ok(());
        }

        let mut scanner = ListingScanner::new(self.config.search.switch_number);
        loop {
            if self.shutdown.is_requested() {
                break;
            }
            let scanned = match scanner.next_posting(&self.board).await {
                Ok(Some(scanned)) => scanned,
                Ok(None) => break,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    warn!("⚠️ 读取职位列表失败，结束当前搜索词: {}", e);
                    break;
                }
            };
            if self.process_posting(&mut scanner, scanned).await?.is_applied() {
                scanner.record_processed();
            }
        }

        logging::log_term_complete(term, scanner.processed(), scanner.stale_events());
        Ok(())
    }

    fn build_query(&self, term: &str, date_posted: DatePosted, sort_by: SortBy) -> SearchQuery {
        let search = &self.config.search;
        SearchQuery {
            keywords: term.to_string(),
            location: search.search_location.clone(),
            date_posted,
            sort_by,
            easy_apply_only: search.easy_apply_only,
            experience_level: search.experience_level.clone(),
            job_type: search.job_type.clone(),
            on_site: search.on_site.clone(),
        }
    }

    /// 处理一个职位
    ///
    /// 只有会话断开和记录写入失败会返回错误。
    pub async fn process_posting(
        &mut self,
        scanner: &mut ListingScanner,
        scanned: ScannedPosting,
    ) -> AppResult<ApplicationAttemptResult> {
        let mut posting = scanned.posting.clone();

        let verdict = if scanned.applied_badge {
            FilterVerdict::skip(VerdictKind::SkipDuplicate, "页面显示已投递")
        } else {
            self.filter
                .screen_listing(&posting, &self.ledger, &self.session)
        };
        if !verdict.is_proceed() {
            return self.skip_at_listing(&posting, verdict);
        }

        info!("➡️ 处理职位 {} [{}]", posting, posting.id);
        let mut tailored = None;
        match self
            .attempt(scanner, &scanned, &mut posting, &mut tailored)
            .await
        {
            Ok(Stage::Skip(verdict)) => self.skip_after_open(&posting, verdict),
            Ok(Stage::Easy(outcome)) => {
                let resume = outcome.resume_uploaded.or(tailored);
                self.ledger
                    .record_success(&LedgerEntry::success(&posting, resume.as_deref()))?;
                self.stats.easy_applied += 1;
                self.archive(&posting, ArchiveStatus::Applied, None, None);
                info!(
                    "✅ 已投递 {} ({} 页, {} 个问题)",
                    posting, outcome.pages, outcome.questions_answered
                );
                Ok(ApplicationAttemptResult::AppliedEasy { resume })
            }
            Ok(Stage::External(link)) => {
                self.ledger
                    .record_success(&LedgerEntry::success(&posting, tailored.as_deref()))?;
                self.stats.external_collected += 1;
                self.archive(&posting, ArchiveStatus::Applied, None, Some(&link));
                info!("🔗 外部投递链接 {}: {}", posting, link);
                Ok(ApplicationAttemptResult::AppliedExternal { link })
            }
            Err(e) => self.record_failure(&posting, tailored.as_deref(), e).await,
        }
    }

    /// 打开详情、执行剩余规则并投递
    async fn attempt(
        &mut self,
        scanner: &mut ListingScanner,
        scanned: &ScannedPosting,
        posting: &mut JobPosting,
        tailored: &mut Option<PathBuf>,
    ) -> Result<Stage, ApplyError> {
        scanner.open(&self.board, scanned).await?;

        let about = self.board.about_company_text().await?;
        let verdict = self.filter.screen_about_company(about.as_deref());
        if !verdict.is_proceed() {
            self.session.blacklist_company(&posting.company);
            return Ok(Stage::Skip(verdict));
        }

        if let Some(text) = self.board.posted_time_text().await? {
            posting.date_listed = calculate_date_posted(&text, Local::now());
        }
        posting.description = self.board.description_text().await?;
        let screen = self.filter.screen_description(posting.description.as_deref());
        posting.experience_required = screen.experience_required;
        if !screen.verdict.is_proceed() {
            return Ok(Stage::Skip(screen.verdict));
        }

        if let Some(description) = posting.description.as_deref() {
            *tailored = self
                .tailor
                .tailor(&posting.title, &posting.company, description)
                .await;
        }

        if self.board.has_easy_apply().await? {
            let upload = self.resume_to_upload(tailored.as_deref());
            let outcome = self
                .flow
                .run(
                    &self.board,
                    self.operator.as_ref(),
                    posting,
                    upload.as_deref(),
                    &mut self.session,
                )
                .await?;
            Ok(Stage::Easy(outcome))
        } else {
            let link = self
                .board
                .capture_external_link(self.config.settings.close_tabs)
                .await
                .map_err(|e| match e {
                    e if e.is_fatal() => ApplyError::Dom(e),
                    e => ApplyError::ExternalLink(e.to_string()),
                })?;
            Ok(Stage::External(link))
        }
    }

    /// 改写出的简历可以直接上传时优先使用，否则按需上传默认简历
    fn resume_to_upload(&self, tailored: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = tailored.filter(|p| is_uploadable(p)) {
            return Some(path.to_path_buf());
        }
        if !self.session.use_new_resume {
            return None;
        }
        let default = self.config.questions.default_resume_path.trim();
        if default.is_empty() {
            return None;
        }
        let path = PathBuf::from(default);
        if !path.exists() {
            warn!("⚠️ 默认简历不存在: {}", path.display());
            return None;
        }
        Some(path)
    }

    fn skip_at_listing(
        &mut self,
        posting: &JobPosting,
        verdict: FilterVerdict,
    ) -> AppResult<ApplicationAttemptResult> {
        match verdict.kind {
            VerdictKind::SkipDuplicate => {
                debug!("⏭️ 跳过 {}: {}", posting, verdict.describe());
            }
            VerdictKind::SkipIrrelevantTitle => {
                info!("⏭️ 跳过 {}: {}", posting, verdict.describe());
                self.ledger.record_failure(&LedgerEntry::failure(
                    posting,
                    None,
                    verdict.describe(),
                ))?;
                self.session.reject(&posting.id);
                self.stats.skipped += 1;
            }
            _ => {
                info!("⏭️ 跳过 {}: {}", posting, verdict.describe());
                self.stats.skipped += 1;
            }
        }
        Ok(ApplicationAttemptResult::Skipped(verdict))
    }

    fn skip_after_open(
        &mut self,
        posting: &JobPosting,
        verdict: FilterVerdict,
    ) -> AppResult<ApplicationAttemptResult> {
        info!("⏭️ 跳过 {}: {}", posting, verdict.describe());
        self.ledger
            .record_failure(&LedgerEntry::failure(posting, None, verdict.describe()))?;
        self.session.reject(&posting.id);
        self.stats.skipped += 1;
        self.archive(
            posting,
            ArchiveStatus::Skipped,
            Some(&verdict.describe()),
            None,
        );
        Ok(ApplicationAttemptResult::Skipped(verdict))
    }

    /// 记录失败；会话断开时记录后返回错误
    async fn record_failure(
        &mut self,
        posting: &JobPosting,
        resume: Option<&Path>,
        err: ApplyError,
    ) -> AppResult<ApplicationAttemptResult> {
        let message = err.to_string();
        error!("❌ 投递失败 {}: {}", posting, message);

        self.ledger
            .record_failure(&LedgerEntry::failure(posting, resume, message.clone()))?;
        self.stats.failed += 1;
        if posting.description.is_some() {
            self.archive(posting, ArchiveStatus::Failed, Some(&message), None);
        }

        if err.is_fatal() {
            return Err(err.into());
        }
        if let Err(e) = self.board.discard_application().await {
            debug!("丢弃表单失败: {}", e);
            if e.is_fatal() {
                return Err(e.into());
            }
        }
        Ok(ApplicationAttemptResult::Failed { error: message })
    }

    fn archive(
        &self,
        posting: &JobPosting,
        status: ArchiveStatus,
        reason: Option<&str>,
        link: Option<&str>,
    ) {
        if let Err(e) = self.archive.write(posting, status, reason, link) {
            warn!("归档职位描述失败: {}", e);
        }
    }
}

/// 一轮结束后切换发布时间和排序方式
pub fn next_rotation(
    settings: &Settings,
    date_posted: DatePosted,
    sort_by: SortBy,
) -> (DatePosted, SortBy) {
    let pinned = settings.stop_date_cycle_at_24hr && date_posted == DatePosted::Past24Hours;
    let date_posted = if settings.cycle_date_posted && !pinned {
        date_posted.next()
    } else {
        date_posted
    };
    let sort_by = if settings.alternate_sort_by {
        sort_by.toggled()
    } else {
        sort_by
    };
    (date_posted, sort_by)
}

fn is_uploadable(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| UPLOADABLE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
}
