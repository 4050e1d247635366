//! Easy Apply 表单流程 - 流程层
//!
//! 核心职责：驱动一次 Easy Apply 弹窗从打开到提交的完整过程
//!
//! 状态流转：
//! ```text
//! ModalOpened → AnsweringPage(1) → AnsweringPage(2) → ... → ReviewReached → Submitted
//!                      │                                          │
//!                      └──→ Failed (达到升级阈值且无人处理)        └──→ Discarded (操作员放弃)
//! ```
//!
//! - 不持有页面资源，只通过 `JobBoard` 操作
//! - 每次进入新的一页都会重新读取并回答所有问题
//! - "Next" 一直存在时，第 `escalation_threshold` 次迭代触发人工升级

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ApplyError, DomError};
use crate::infrastructure::{JobBoard, Operator, ReviewDecision};
use crate::models::{FormField, JobPosting, SessionState};
use crate::workflow::answers::AnswerBook;

/// 表单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    ModalOpened,
    AnsweringPage { iteration: u32 },
    ReviewReached,
    Submitted,
    Discarded,
    Failed,
}

/// 一次成功提交的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EasyApplyOutcome {
    /// 本次实际上传的简历
    pub resume_uploaded: Option<PathBuf>,
    /// 回答过的页数（含升级后重新计数的部分）
    pub pages: u32,
    pub questions_answered: usize,
    pub final_state: FormState,
}

/// 升级相关设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    pub threshold: u32,
    pub max_escalations: u32,
    pub pause_at_failed_question: bool,
}

impl EscalationPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            threshold: config.settings.escalation_threshold.max(2),
            max_escalations: config.settings.max_escalations,
            pause_at_failed_question: config.settings.pause_at_failed_question
                && !config.settings.run_in_background,
        }
    }
}

/// Easy Apply 流程
pub struct EasyApplyFlow {
    answers: AnswerBook,
    policy: EscalationPolicy,
}

impl EasyApplyFlow {
    pub fn new(answers: AnswerBook, policy: EscalationPolicy) -> Self {
        Self { answers, policy }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            AnswerBook::new(config.personals.clone(), config.questions.clone()),
            EscalationPolicy::from_config(config),
        )
    }

    /// 打开弹窗并一直走到提交
    ///
    /// `resume` 为需要上传的简历；上传成功后 `session.use_new_resume` 置为 false。
    /// 返回错误时弹窗可能仍然打开，由调用方负责丢弃。
    pub async fn run<B: JobBoard + ?Sized>(
        &self,
        board: &B,
        operator: &dyn Operator,
        posting: &JobPosting,
        resume: Option<&Path>,
        session: &mut SessionState,
    ) -> Result<EasyApplyOutcome, ApplyError> {
        board
            .open_easy_apply()
            .await
            .map_err(|e| missing_affordance(e, "Easy Apply"))?;
        let mut state = FormState::ModalOpened;
        debug!("📝 [{}] {:?}", posting.id, state);

        let mut uploaded: Option<PathBuf> = None;
        let mut answered = 0usize;
        let mut pages = 0u32;
        let mut iteration = 0u32;
        let mut escalations = 0u32;

        loop {
            iteration += 1;
            if iteration >= self.policy.threshold {
                if operator.is_interactive()
                    && self.policy.pause_at_failed_question
                    && escalations < self.policy.max_escalations
                {
                    escalations += 1;
                    warn!(
                        "⚠️ [{}] 连续 {} 次仍未到达 Review，请求人工处理 ({}/{})",
                        posting.id, iteration, escalations, self.policy.max_escalations
                    );
                    operator
                        .alert(&format!(
                            "无法自动回答 {} 的部分问题，请在浏览器中手动填写并点击 Review 后回到这里",
                            posting
                        ))
                        .await;
                    iteration = 1;
                } else {
                    state = FormState::Failed;
                    debug!("📝 [{}] {:?}", posting.id, state);
                    return Err(ApplyError::Unanswerable { iterations: pages });
                }
            }

            state = FormState::AnsweringPage { iteration };
            debug!("📝 [{}] {:?}", posting.id, state);
            pages += 1;

            answered += self.answer_page(board, posting).await?;

            if uploaded.is_none() {
                if let Some(path) = resume {
                    if board.upload_resume(path).await? {
                        info!("📎 已上传简历: {}", path.display());
                        uploaded = Some(path.to_path_buf());
                        session.use_new_resume = false;
                    }
                }
            }

            if board.has_review().await? {
                break;
            }
            board
                .click_next()
                .await
                .map_err(|e| missing_affordance(e, "Next"))?;
        }

        board
            .click_review()
            .await
            .map_err(|e| missing_affordance(e, "Review"))?;
        state = FormState::ReviewReached;
        debug!("📝 [{}] {:?}", posting.id, state);

        if session.pause_before_submit && operator.is_interactive() {
            match operator
                .review_decision(&format!("即将提交 {}，请检查表单", posting))
                .await
            {
                // 操作员没有给出答复时不提交
                Some(ReviewDecision::Discard) | None => {
                    state = FormState::Discarded;
                    debug!("📝 [{}] {:?}", posting.id, state);
                    return Err(ApplyError::Discarded);
                }
                Some(ReviewDecision::DisableFuturePauses) => {
                    info!("⏩ 本次运行后续投递不再暂停");
                    session.pause_before_submit = false;
                }
                Some(ReviewDecision::Submit) => {}
            }
        }

        if !board.click_submit().await? {
            return Err(ApplyError::SubmitNotActionable);
        }
        state = FormState::Submitted;
        debug!("📝 [{}] {:?}", posting.id, state);

        Ok(EasyApplyOutcome {
            resume_uploaded: uploaded,
            pages,
            questions_answered: answered,
            final_state: state,
        })
    }

    /// 回答当前页所有问题，返回填写成功的数量
    async fn answer_page<B: JobBoard + ?Sized>(
        &self,
        board: &B,
        posting: &JobPosting,
    ) -> Result<usize, ApplyError> {
        let fields = board.form_fields().await?;
        let mut filled = 0;

        for field in &fields {
            let Some(answer) = self.answers.answer(field, &posting.location) else {
                warn!("⚠️ 下拉框没有可选项，跳过: {}", field.label);
                continue;
            };

            match self.fill_with_retry(board, field, &answer).await {
                Ok(()) => {
                    debug!("✏️ [{}] {} = {}", field.kind.name(), field.label, answer);
                    filled += 1;
                }
                Err(DomError::NotFound(what)) => {
                    warn!("⚠️ 无法填写 \"{}\": {}", field.label, what);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    /// 控件失效时重新读取一次问题列表再填写
    async fn fill_with_retry<B: JobBoard + ?Sized>(
        &self,
        board: &B,
        field: &FormField,
        answer: &str,
    ) -> Result<(), DomError> {
        match board.fill_field(field, answer).await {
            Err(e) if e.is_stale() => {
                debug!("🔄 控件已刷新，重试: {}", field.label);
                let fresh = board.form_fields().await?;
                let field = fresh
                    .iter()
                    .find(|f| f.index == field.index && f.label == field.label)
                    .ok_or(e)?;
                board.fill_field(field, answer).await
            }
            other => other,
        }
    }
}

fn missing_affordance(err: DomError, name: &str) -> ApplyError {
    match err {
        DomError::NotFound(_) => ApplyError::MissingAffordance(name.to_string()),
        other => ApplyError::Dom(other),
    }
}
