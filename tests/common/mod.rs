//! 测试用的假页面和假操作员

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use job_apply_agent::config::Config;
use job_apply_agent::error::DomError;
use job_apply_agent::infrastructure::{JobBoard, Operator, ReviewDecision};
use job_apply_agent::models::{FormField, JobCard, SearchQuery};

/// 一个假职位
#[derive(Debug, Clone)]
pub struct FakeJob {
    pub card: JobCard,
    pub about: Option<String>,
    pub description: Option<String>,
    pub posted: Option<String>,
    pub easy_apply: bool,
    pub external_link: String,
    pub form_pages: Vec<Vec<FormField>>,
    pub submit_ok: bool,
}

impl FakeJob {
    pub fn new(id: &str, title: &str, company: &str) -> Self {
        Self {
            card: JobCard {
                id: id.to_string(),
                title: title.to_string(),
                subtitle: format!("{} · Berlin, Germany (Remote)", company),
                applied_badge: false,
            },
            about: Some(format!("{} builds products.", company)),
            description: Some("We need 3 years experience required with React.".to_string()),
            posted: Some("2 days ago".to_string()),
            easy_apply: true,
            external_link: String::new(),
            form_pages: vec![vec![FormField::text(0, "Mobile phone number")]],
            submit_ok: true,
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    pub fn about(mut self, text: &str) -> Self {
        self.about = Some(text.to_string());
        self
    }

    pub fn external(mut self, link: &str) -> Self {
        self.easy_apply = false;
        self.external_link = link.to_string();
        self
    }

    pub fn applied_badge(mut self) -> Self {
        self.card.applied_badge = true;
        self
    }

    pub fn form_pages(mut self, pages: Vec<Vec<FormField>>) -> Self {
        self.form_pages = pages;
        self
    }

    pub fn submit_blocked(mut self) -> Self {
        self.submit_ok = false;
        self
    }
}

/// 假页面的可观察状态
#[derive(Debug, Default)]
pub struct FakeState {
    pub pages: Vec<Vec<FakeJob>>,
    pub current_page: usize,
    pub opened: Option<usize>,
    pub form_page: usize,
    pub logged_in: bool,
    pub never_review: bool,
    /// (页, 位置) → 剩余的失效次数
    pub stale_reads: HashMap<(usize, usize), usize>,
    /// 点击卡片时的剩余失效次数
    pub stale_opens: HashMap<(usize, usize), usize>,
    /// 点击失效后该位置被换成的职位
    pub replaced_on_stale_open: Option<FakeJob>,
    pub session_lost_on_open: Option<String>,
    pub searches: Vec<String>,
    pub opened_ids: Vec<String>,
    pub filled: Vec<(String, String)>,
    pub uploads: Vec<PathBuf>,
    pub next_clicks: usize,
    pub submitted: Vec<String>,
    pub discarded: usize,
    pub closed: bool,
}

impl FakeState {
    fn job(&self) -> Result<&FakeJob, DomError> {
        self.opened
            .and_then(|i| self.pages.get(self.current_page)?.get(i))
            .ok_or_else(|| DomError::NotFound("详情面板".to_string()))
    }
}

#[derive(Clone, Default)]
pub struct FakeBoard {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeBoard {
    pub fn with_pages(pages: Vec<Vec<FakeJob>>) -> Self {
        let board = Self::default();
        {
            let mut state = board.state.lock().unwrap();
            state.pages = pages;
            state.logged_in = true;
        }
        board
    }

    /// 只有一个已打开职位的页面，用于直接驱动表单流程
    pub fn with_open_job(job: FakeJob) -> Self {
        let board = Self::with_pages(vec![vec![job]]);
        board.state.lock().unwrap().opened = Some(0);
        board
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl JobBoard for FakeBoard {
    async fn is_logged_in(&self) -> Result<bool, DomError> {
        Ok(self.state().logged_in)
    }

    async fn ensure_logged_in(&self) -> Result<bool, DomError> {
        Ok(self.state().logged_in)
    }

    async fn open_search(&self, query: &SearchQuery) -> Result<(), DomError> {
        let url = query.to_url()?;
        let mut state = self.state();
        state.searches.push(url);
        state.current_page = 0;
        state.opened = None;
        Ok(())
    }

    async fn job_card_count(&self) -> Result<usize, DomError> {
        let state = self.state();
        Ok(state.pages.get(state.current_page).map_or(0, Vec::len))
    }

    async fn read_job_card(&self, index: usize) -> Result<JobCard, DomError> {
        let mut state = self.state();
        let key = (state.current_page, index);
        if let Some(remaining) = state.stale_reads.get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DomError::Stale(format!("卡片 {}", index)));
            }
        }
        state
            .pages
            .get(state.current_page)
            .and_then(|p| p.get(index))
            .map(|job| job.card.clone())
            .ok_or_else(|| DomError::Stale(format!("卡片 {} 不存在", index)))
    }

    async fn open_job_card(&self, index: usize) -> Result<(), DomError> {
        let mut state = self.state();
        let key = (state.current_page, index);
        if let Some(remaining) = state.stale_opens.get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                if let Some(job) = state.replaced_on_stale_open.take() {
                    let page = state.current_page;
                    if let Some(slot) = state.pages.get_mut(page).and_then(|p| p.get_mut(index)) {
                        *slot = job;
                    }
                }
                return Err(DomError::Stale(format!("点击卡片 {}", index)));
            }
        }
        let id = state
            .pages
            .get(state.current_page)
            .and_then(|p| p.get(index))
            .map(|job| job.card.id.clone())
            .ok_or_else(|| DomError::Stale(format!("卡片 {} 不存在", index)))?;
        if state.session_lost_on_open.as_deref() == Some(id.as_str()) {
            return Err(DomError::SessionLost("浏览器已关闭".to_string()));
        }
        state.opened = Some(index);
        state.form_page = 0;
        state.opened_ids.push(id);
        Ok(())
    }

    async fn active_page(&self) -> Result<Option<u32>, DomError> {
        let state = self.state();
        if state.pages.len() > 1 {
            Ok(Some(state.current_page as u32 + 1))
        } else {
            Ok(None)
        }
    }

    async fn goto_page(&self, page: u32) -> Result<bool, DomError> {
        let mut state = self.state();
        let target = page as usize - 1;
        if target < state.pages.len() {
            state.current_page = target;
            state.opened = None;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn about_company_text(&self) -> Result<Option<String>, DomError> {
        Ok(self.state().job()?.about.clone())
    }

    async fn description_text(&self) -> Result<Option<String>, DomError> {
        Ok(self.state().job()?.description.clone())
    }

    async fn posted_time_text(&self) -> Result<Option<String>, DomError> {
        Ok(self.state().job()?.posted.clone())
    }

    async fn has_easy_apply(&self) -> Result<bool, DomError> {
        Ok(self.state().job()?.easy_apply)
    }

    async fn open_easy_apply(&self) -> Result<(), DomError> {
        let mut state = self.state();
        if !state.job()?.easy_apply {
            return Err(DomError::NotFound("Easy Apply 按钮".to_string()));
        }
        state.form_page = 0;
        Ok(())
    }

    async fn capture_external_link(&self, _close_tab: bool) -> Result<String, DomError> {
        Ok(self.state().job()?.external_link.clone())
    }

    async fn form_fields(&self) -> Result<Vec<FormField>, DomError> {
        let state = self.state();
        let job = state.job()?;
        Ok(job.form_pages.get(state.form_page).cloned().unwrap_or_default())
    }

    async fn fill_field(&self, field: &FormField, answer: &str) -> Result<(), DomError> {
        self.state()
            .filled
            .push((field.label.clone(), answer.to_string()));
        Ok(())
    }

    async fn upload_resume(&self, path: &Path) -> Result<bool, DomError> {
        self.state().uploads.push(path.to_path_buf());
        Ok(true)
    }

    async fn has_review(&self) -> Result<bool, DomError> {
        let state = self.state();
        if state.never_review {
            return Ok(false);
        }
        let pages = state.job()?.form_pages.len().max(1);
        Ok(state.form_page + 1 >= pages)
    }

    async fn click_next(&self) -> Result<(), DomError> {
        let mut state = self.state();
        state.next_clicks += 1;
        state.form_page += 1;
        Ok(())
    }

    async fn click_review(&self) -> Result<(), DomError> {
        Ok(())
    }

    async fn click_submit(&self) -> Result<bool, DomError> {
        let mut state = self.state();
        let job = state.job()?.clone();
        if !job.submit_ok {
            return Ok(false);
        }
        state.submitted.push(job.card.id);
        Ok(true)
    }

    async fn discard_application(&self) -> Result<(), DomError> {
        self.state().discarded += 1;
        Ok(())
    }

    async fn close(&self) -> Result<(), DomError> {
        self.state().closed = true;
        Ok(())
    }
}

/// 按预设脚本回答的操作员
#[derive(Clone, Default)]
pub struct ScriptedOperator {
    pub interactive: bool,
    pub decisions: Arc<Mutex<VecDeque<ReviewDecision>>>,
    pub alerts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedOperator {
    pub fn interactive(decisions: Vec<ReviewDecision>) -> Self {
        Self {
            interactive: true,
            decisions: Arc::new(Mutex::new(decisions.into())),
            alerts: Arc::default(),
        }
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    async fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    async fn review_decision(&self, _message: &str) -> Option<ReviewDecision> {
        self.decisions.lock().unwrap().pop_front()
    }
}

/// 输出目录指向临时目录的测试配置
pub fn test_config(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.search.search_terms = vec!["Frontend Developer".to_string()];
    config.search.switch_number = 10;
    config.filters.current_experience = 5;
    config.personals.first_name = "Jane".to_string();
    config.personals.phone_number = "5551234567".to_string();
    config.settings.output_dir = output_dir.display().to_string();
    config.settings.log_file = output_dir.join("run.log").display().to_string();
    config.settings.pause_before_submit = false;
    config.settings.cycle_date_posted = false;
    config.settings.alternate_sort_by = false;

    let resume = output_dir.join("resume.pdf");
    std::fs::write(&resume, b"%PDF-1.4").unwrap();
    config.questions.default_resume_path = resume.display().to_string();
    config
}
