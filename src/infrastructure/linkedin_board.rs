//! LinkedIn 页面操作 - 基础设施层
//!
//! `JobBoard` 的真实实现。所有 DOM 查询都是 JS 片段，参数统一通过
//! `serde_json::to_string` 嵌入，避免转义问题。
//!
//! 点击统一走 `click_target`：先检查目标是否被遮挡，被遮挡时滚动到视口中央
//! 再试一次，仍然被遮挡则返回 `DomError::ClickIntercepted`。

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::Browser;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::browser::cookies;
use crate::config::{Config, Credentials};
use crate::error::DomError;
use crate::infrastructure::job_board::JobBoard;
use crate::infrastructure::js_executor::JsExecutor;
use crate::models::{FormField, JobCard, SearchQuery};

const LOGIN_URL: &str = "https://www.linkedin.com/login";
const FEED_URL: &str = "https://www.linkedin.com/feed/";

const JOB_CARD: &str = "li[data-occludable-job-id]";
const MODAL: &str = ".jobs-easy-apply-modal";
const FORM_ELEMENT: &str = ".jobs-easy-apply-modal div[data-test-form-element]";
const APPLY_BUTTON: &str = "button.jobs-apply-button.artdeco-button--3";
const EASY_APPLY_BUTTON: &str = "button.jobs-apply-button.artdeco-button--3[aria-label*='Easy']";

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const LOGIN_ATTEMPTS: usize = 2;

/// 点击结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum ClickOutcome {
    Clicked,
    Intercepted,
    Missing,
}

/// LinkedIn 实现
pub struct LinkedInBoard {
    browser: Mutex<Browser>,
    executor: JsExecutor,
    credentials: Credentials,
    cookie_file: PathBuf,
    wait_timeout: Duration,
    click_gap: Duration,
    /// 自己启动的浏览器在结束时关闭，连接的浏览器保持打开
    owns_browser: bool,
}

impl LinkedInBoard {
    pub fn new(browser: Browser, executor: JsExecutor, config: &Config) -> Self {
        Self {
            browser: Mutex::new(browser),
            executor,
            credentials: config.credentials.clone(),
            cookie_file: PathBuf::from(&config.browser.cookie_file),
            wait_timeout: Duration::from_secs(config.browser.wait_timeout_secs),
            click_gap: Duration::from_millis(config.settings.click_gap_ms),
            owns_browser: config.browser.launch,
        }
    }

    pub fn executor(&self) -> &JsExecutor {
        &self.executor
    }

    /// 轮询 JS 条件直到为真或超时
    async fn wait_for(&self, what: &str, condition_js: &str) -> Result<(), DomError> {
        let deadline = Instant::now() + self.wait_timeout;
        loop {
            let ok = match self
                .executor
                .eval_as::<bool>(format!("(() => !!({}))()", condition_js))
                .await
            {
                Ok(ok) => ok,
                Err(e) if e.is_fatal() => return Err(e),
                Err(_) => false,
            };
            if ok {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DomError::Timeout {
                    what: what.to_string(),
                    waited_ms: self.wait_timeout.as_millis() as u64,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// `locate_js` 是一个返回元素或 null 的 JS 表达式
    async fn click_once(&self, locate_js: &str, scroll_first: bool) -> Result<ClickOutcome, DomError> {
        let js = format!(
            r#"
            (() => {{
                const el = ({locate});
                if (!el) return 'missing';
                if ({scroll}) el.scrollIntoView({{ block: 'center' }});
                const r = el.getBoundingClientRect();
                const top = document.elementFromPoint(r.left + r.width / 2, r.top + r.height / 2);
                if (!top || (top !== el && !el.contains(top))) return 'intercepted';
                el.click();
                return 'clicked';
            }})()
            "#,
            locate = locate_js,
            scroll = scroll_first,
        );
        self.executor.eval_as(js).await
    }

    async fn click_target(&self, what: &str, locate_js: &str) -> Result<(), DomError> {
        match self.click_once(locate_js, false).await? {
            ClickOutcome::Clicked => {}
            ClickOutcome::Missing => return Err(DomError::NotFound(what.to_string())),
            ClickOutcome::Intercepted => {
                debug!("点击 {} 被遮挡，滚动后重试", what);
                sleep(Duration::from_millis(300)).await;
                match self.click_once(locate_js, true).await? {
                    ClickOutcome::Clicked => {}
                    ClickOutcome::Missing => return Err(DomError::Stale(what.to_string())),
                    ClickOutcome::Intercepted => {
                        return Err(DomError::ClickIntercepted(what.to_string()))
                    }
                }
            }
        }
        sleep(self.click_gap).await;
        Ok(())
    }

    /// `scope` 内包含指定文字 span 的按钮
    fn button_with_span(scope: &str, text: &str) -> Result<String, DomError> {
        Ok(format!(
            r#"Array.from(document.querySelectorAll('{scope} button')).find(b =>
                Array.from(b.querySelectorAll('span')).some(s => (s.innerText || '').trim() === {text}))"#,
            scope = scope,
            text = serde_json::to_string(text)?,
        ))
    }

    fn modal_button_with_span(text: &str) -> Result<String, DomError> {
        Self::button_with_span(MODAL, text)
    }

    fn job_card_link(index: usize) -> String {
        format!(
            "(document.querySelectorAll(\"{}\")[{}] || null)?.querySelector('a')",
            JOB_CARD, index
        )
    }

    async fn text_of(&self, selector: &str) -> Result<Option<String>, DomError> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                return el ? el.innerText : null;
            }})()"#,
            sel = serde_json::to_string(selector)?,
        );
        let text: Option<String> = self.executor.eval_as(js).await?;
        Ok(text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()))
    }

    async fn credential_login(&self) -> Result<bool, DomError> {
        if self.credentials.email.is_empty() || self.credentials.password.is_empty() {
            warn!("未配置 LINKEDIN_EMAIL / LINKEDIN_PASSWORD，无法自动登录");
            return Ok(false);
        }

        for attempt in 1..=LOGIN_ATTEMPTS {
            info!("🔑 账号密码登录 (尝试 {}/{})", attempt, LOGIN_ATTEMPTS);
            self.executor.goto(LOGIN_URL).await?;
            if self.wait_for("登录表单", "document.querySelector('#username')").await.is_err() {
                // 已经登录时会直接跳转
                if self.is_logged_in().await? {
                    return Ok(true);
                }
                continue;
            }

            let js = format!(
                r#"(() => {{
                    const set = (el, v) => {{
                        Object.getOwnPropertyDescriptor(HTMLInputElement.prototype, 'value').set.call(el, v);
                        el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                    }};
                    set(document.querySelector('#username'), {email});
                    set(document.querySelector('#password'), {password});
                    const btn = document.querySelector("button[type='submit']");
                    if (btn) btn.click();
                    return !!btn;
                }})()"#,
                email = serde_json::to_string(&self.credentials.email)?,
                password = serde_json::to_string(&self.credentials.password)?,
            );
            let submitted: bool = self.executor.eval_as(js).await?;
            if !submitted {
                continue;
            }

            if self
                .wait_for("登录跳转", "location.href.includes('/feed')")
                .await
                .is_ok()
            {
                return Ok(true);
            }
            warn!("登录后未跳转到首页（可能需要验证码）");
        }
        Ok(false)
    }
}

#[async_trait]
impl JobBoard for LinkedInBoard {
    async fn is_logged_in(&self) -> Result<bool, DomError> {
        let url = self.executor.current_url().await?;
        Ok(!url.contains("/login") && (url.contains("/feed") || url.contains("/jobs")))
    }

    async fn ensure_logged_in(&self) -> Result<bool, DomError> {
        match cookies::restore_cookies(self.executor.page(), &self.cookie_file).await {
            Ok(0) => {}
            Ok(n) => debug!("已恢复 {} 个 cookie", n),
            Err(e) => warn!("恢复 cookie 失败: {:#}", e),
        }

        self.executor.goto(FEED_URL).await?;
        sleep(Duration::from_secs(2)).await;
        if self.is_logged_in().await? {
            info!("✓ 已通过 cookie 登录");
            return Ok(true);
        }

        if !self.credential_login().await? {
            return Ok(false);
        }
        info!("✓ 登录成功");
        if let Err(e) = cookies::save_cookies(self.executor.page(), &self.cookie_file).await {
            warn!("保存 cookie 失败: {:#}", e);
        }
        Ok(true)
    }

    async fn open_search(&self, query: &SearchQuery) -> Result<(), DomError> {
        let url = query.to_url()?;
        debug!("打开搜索: {}", url);
        self.executor.goto(&url).await?;
        sleep(self.click_gap).await;
        Ok(())
    }

    async fn job_card_count(&self) -> Result<usize, DomError> {
        let condition = format!("document.querySelector(\"{}\")", JOB_CARD);
        if self.wait_for("职位列表", &condition).await.is_err() {
            return Ok(0);
        }
        self.executor
            .eval_as(format!("document.querySelectorAll(\"{}\").length", JOB_CARD))
            .await
    }

    async fn read_job_card(&self, index: usize) -> Result<JobCard, DomError> {
        let js = format!(
            r#"
            (() => {{
                const card = document.querySelectorAll("{card}")[{index}];
                if (!card) return null;
                card.scrollIntoView({{ block: 'center' }});
                const link = card.querySelector('a');
                if (!link) return null;
                const subtitle = card.querySelector('.artdeco-entity-lockup__subtitle');
                const footer = card.querySelector('.job-card-container__footer-job-state');
                return {{
                    id: card.getAttribute('data-occludable-job-id') || '',
                    title: (link.innerText || '').trim(),
                    subtitle: subtitle ? subtitle.innerText.trim() : '',
                    applied_badge: !!footer && footer.innerText.trim() === 'Applied',
                }};
            }})()
            "#,
            card = JOB_CARD,
            index = index,
        );
        let card: Option<JobCard> = self.executor.eval_as(js).await?;
        match card {
            Some(card) if !card.id.is_empty() && !card.title.is_empty() => Ok(card),
            _ => Err(DomError::Stale(format!("职位卡片 #{}", index))),
        }
    }

    async fn open_job_card(&self, index: usize) -> Result<(), DomError> {
        match self
            .click_target("职位卡片", &Self::job_card_link(index))
            .await
        {
            Err(DomError::NotFound(what)) => return Err(DomError::Stale(what)),
            other => other?,
        }
        if let Err(e) = self
            .wait_for(
                "职位详情",
                "document.querySelector('.jobs-box__html-content, .jobs-details__main-content')",
            )
            .await
        {
            debug!("{}", e);
        }
        Ok(())
    }

    async fn active_page(&self) -> Result<Option<u32>, DomError> {
        let js = r#"
            (() => {
                const p = document.querySelector('.jobs-search-pagination__pages, .artdeco-pagination, .artdeco-pagination__pages');
                if (!p) return null;
                const active = p.querySelector("button.active, button[aria-current='true'], button[aria-current='page'], li.active button");
                if (!active) return null;
                const n = parseInt((active.innerText || '').trim(), 10);
                return Number.isNaN(n) ? null : n;
            })()
        "#;
        self.executor.eval_as(js).await
    }

    async fn goto_page(&self, page: u32) -> Result<bool, DomError> {
        let locate = format!("document.querySelector(\"button[aria-label='Page {}']\")", page);
        match self.click_target(&format!("第 {} 页按钮", page), &locate).await {
            Ok(()) => {
                info!("📄 切换到第 {} 页", page);
                Ok(true)
            }
            Err(DomError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn about_company_text(&self) -> Result<Option<String>, DomError> {
        self.text_of(".jobs-company__box").await
    }

    async fn description_text(&self) -> Result<Option<String>, DomError> {
        if self
            .wait_for("职位描述", "document.querySelector('.jobs-box__html-content')")
            .await
            .is_err()
        {
            return Ok(None);
        }
        self.text_of(".jobs-box__html-content").await
    }

    async fn posted_time_text(&self) -> Result<Option<String>, DomError> {
        let js = r#"
            (() => {
                const roots = [
                    '.job-details-jobs-unified-top-card__primary-description-container',
                    '.job-details-jobs-unified-top-card__primary-description',
                    '.jobs-unified-top-card__primary-description',
                    '.jobs-details__main-content',
                ];
                for (const sel of roots) {
                    const root = document.querySelector(sel);
                    if (!root) continue;
                    const span = Array.from(root.querySelectorAll('span'))
                        .find(s => (s.innerText || '').includes(' ago'));
                    if (span) return span.innerText.trim();
                }
                return null;
            })()
        "#;
        self.executor.eval_as(js).await
    }

    async fn has_easy_apply(&self) -> Result<bool, DomError> {
        let condition = format!("document.querySelector(\"{}\")", APPLY_BUTTON);
        if self.wait_for("投递按钮", &condition).await.is_err() {
            return Ok(false);
        }
        self.executor
            .eval_as(format!("!!document.querySelector(\"{}\")", EASY_APPLY_BUTTON))
            .await
    }

    async fn open_easy_apply(&self) -> Result<(), DomError> {
        let locate = format!("document.querySelector(\"{}\")", EASY_APPLY_BUTTON);
        self.click_target("Easy Apply 按钮", &locate).await?;
        self.wait_for("Easy Apply 弹窗", &format!("document.querySelector('{}')", MODAL))
            .await
    }

    async fn capture_external_link(&self, close_tab: bool) -> Result<String, DomError> {
        let browser = self.browser.lock().await;
        let before: Vec<_> = browser
            .pages()
            .await?
            .iter()
            .map(|p| p.target_id().clone())
            .collect();

        let locate = format!("document.querySelector(\"{}\")", APPLY_BUTTON);
        self.click_target("外部投递按钮", &locate).await?;
        // 部分职位会先弹出 "Continue" 确认
        let _ = self
            .click_once(&Self::button_with_span("body", "Continue")?, true)
            .await;

        let deadline = Instant::now() + self.wait_timeout;
        loop {
            let pages = browser.pages().await?;
            for page in pages {
                if before.contains(page.target_id()) {
                    continue;
                }
                let url = page.url().await?.unwrap_or_default();
                if url.is_empty() || url == "about:blank" {
                    continue;
                }
                if close_tab {
                    if let Err(e) = page.close().await {
                        debug!("关闭外部标签页失败: {}", e);
                    }
                }
                self.executor.page().bring_to_front().await?;
                return Ok(url);
            }
            if Instant::now() >= deadline {
                return Err(DomError::Timeout {
                    what: "外部投递页面".to_string(),
                    waited_ms: self.wait_timeout.as_millis() as u64,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn form_fields(&self) -> Result<Vec<FormField>, DomError> {
        let js = format!(
            r#"
            (() => {{
                if (!document.querySelector('{modal}')) return null;
                const out = [];
                document.querySelectorAll('{field}').forEach((el, index) => {{
                    const labelEl = el.querySelector('label');
                    const label = labelEl ? labelEl.innerText.trim() : 'Unknown';
                    const select = el.querySelector('select');
                    if (select) {{
                        out.push({{ index, label, kind: 'dropdown',
                            options: Array.from(select.options).map(o => o.text.trim()) }});
                        return;
                    }}
                    if (el.querySelector("input[type='text']")) {{
                        out.push({{ index, label, kind: 'text' }});
                        return;
                    }}
                    if (el.querySelector('textarea')) {{
                        out.push({{ index, label, kind: 'text_area' }});
                    }}
                }});
                return out;
            }})()
            "#,
            modal = MODAL,
            field = FORM_ELEMENT,
        );
        let fields: Option<Vec<FormField>> = self.executor.eval_as(js).await?;
        fields.ok_or_else(|| DomError::NotFound("Easy Apply 弹窗".to_string()))
    }

    async fn fill_field(&self, field: &FormField, answer: &str) -> Result<(), DomError> {
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelectorAll('{field}')[{index}];
                if (!el) return 'missing';
                const value = {value};
                const select = el.querySelector('select');
                if (select) {{
                    const opt = Array.from(select.options).find(o => o.text.trim() === value);
                    if (!opt) return 'no_option';
                    select.value = opt.value;
                    select.dispatchEvent(new Event('change', {{ bubbles: true }}));
                    return 'ok';
                }}
                const input = el.querySelector("input[type='text'], textarea");
                if (!input) return 'missing';
                const proto = input.tagName === 'TEXTAREA'
                    ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
                Object.getOwnPropertyDescriptor(proto, 'value').set.call(input, value);
                input.dispatchEvent(new Event('input', {{ bubbles: true }}));
                input.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return 'ok';
            }})()
            "#,
            field = FORM_ELEMENT,
            index = field.index,
            value = serde_json::to_string(answer)?,
        );
        let status: String = self.executor.eval_as(js).await?;
        match status.as_str() {
            "ok" => Ok(()),
            "no_option" => Err(DomError::NotFound(format!(
                "\"{}\" 的选项 \"{}\"",
                field.label, answer
            ))),
            _ => Err(DomError::Stale(format!("问题 \"{}\"", field.label))),
        }
    }

    async fn upload_resume(&self, path: &Path) -> Result<bool, DomError> {
        let Ok(absolute) = std::fs::canonicalize(path) else {
            warn!("简历文件不存在: {}", path.display());
            return Ok(false);
        };
        let Ok(input) = self
            .executor
            .page()
            .find_element(format!("{} input[name='file']", MODAL))
            .await
        else {
            return Ok(false);
        };

        let mut params = SetFileInputFilesParams::new(vec![absolute.display().to_string()]);
        params.backend_node_id = Some(input.backend_node_id);
        self.executor.page().execute(params).await?;
        sleep(self.click_gap).await;
        Ok(true)
    }

    async fn has_review(&self) -> Result<bool, DomError> {
        let js = format!(
            r#"
            (() => {{
                const modal = document.querySelector('{modal}');
                if (!modal) return false;
                return Array.from(modal.querySelectorAll('span')).some(s => {{
                    const t = (s.innerText || '').trim();
                    return t === 'Review' || t === 'Submit application';
                }});
            }})()
            "#,
            modal = MODAL,
        );
        self.executor.eval_as(js).await
    }

    async fn click_next(&self) -> Result<(), DomError> {
        self.click_target("Next 按钮", &Self::modal_button_with_span("Next")?)
            .await
    }

    async fn click_review(&self) -> Result<(), DomError> {
        match self
            .click_target("Review 按钮", &Self::modal_button_with_span("Review")?)
            .await
        {
            // 没有 Review 按钮时已经在提交页
            Err(DomError::NotFound(_)) => Ok(()),
            other => other,
        }
    }

    async fn click_submit(&self) -> Result<bool, DomError> {
        let locate = Self::modal_button_with_span("Submit application")?;
        let condition = format!("(() => {{ const b = {}; return b && !b.disabled; }})()", locate);
        match self.wait_for("提交按钮", &condition).await {
            Ok(()) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(_) => return Ok(false),
        }
        self.click_target("提交按钮", &locate).await?;

        // 关闭提交成功后的提示框
        sleep(Duration::from_secs(2)).await;
        let _ = self
            .click_once("document.querySelector(\"button[aria-label='Dismiss']\")", true)
            .await;
        Ok(true)
    }

    async fn discard_application(&self) -> Result<(), DomError> {
        let dismiss = format!("document.querySelector(\"{} button[aria-label='Dismiss']\")", MODAL);
        if self.click_once(&dismiss, true).await? == ClickOutcome::Missing {
            return Ok(());
        }
        sleep(Duration::from_millis(500)).await;
        let confirm = r#"document.querySelector("button[data-control-name='discard_application_confirm_btn']")
            || Array.from(document.querySelectorAll('button')).find(b => (b.innerText || '').trim() === 'Discard')"#;
        self.click_once(confirm, true).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), DomError> {
        if !self.owns_browser {
            debug!("浏览器由外部启动，保持打开");
            return Ok(());
        }
        let mut browser = self.browser.lock().await;
        browser.close().await?;
        info!("浏览器已关闭");
        Ok(())
    }
}
