use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::{DatePosted, SortBy};

/// 程序配置
///
/// 启动时构建一次，之后以引用传给各层。各段都带 `#[serde(default)]`，
/// 配置文件只写需要覆盖的项即可。
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    pub search: SearchConfig,
    pub filters: FilterRules,
    pub personals: Personals,
    pub questions: Questions,
    pub settings: Settings,
    pub llm: LlmConfig,
    /// 登录凭据只从环境变量读取
    #[serde(skip)]
    pub credentials: Credentials,
}

/// 浏览器配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// 连接已有浏览器时的调试端口
    pub debug_port: u16,
    /// true 时自行启动浏览器，否则连接 `debug_port`
    pub launch: bool,
    pub headless: bool,
    pub chrome_executable: Option<String>,
    pub user_data_dir: Option<String>,
    /// 等待页面元素的超时（秒）
    pub wait_timeout_secs: u64,
    pub cookie_file: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            launch: false,
            headless: false,
            chrome_executable: None,
            user_data_dir: None,
            wait_timeout_secs: 10,
            cookie_file: "outputs/cookies/linkedin_cookies.json".to_string(),
        }
    }
}

/// 搜索配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub search_terms: Vec<String>,
    pub randomize_search_order: bool,
    pub search_location: String,
    /// 每个搜索词成功投递多少个后切换到下一个
    pub switch_number: usize,
    pub sort_by: SortBy,
    pub date_posted: DatePosted,
    pub easy_apply_only: bool,
    pub experience_level: Vec<String>,
    pub job_type: Vec<String>,
    pub on_site: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_terms: Vec::new(),
            randomize_search_order: false,
            search_location: String::new(),
            switch_number: 30,
            sort_by: SortBy::MostRecent,
            date_posted: DatePosted::PastWeek,
            easy_apply_only: true,
            experience_level: Vec::new(),
            job_type: Vec::new(),
            on_site: Vec::new(),
        }
    }
}

/// 过滤规则
///
/// 空列表表示"不限制"；`current_experience = -1` 表示不检查经验要求。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    pub relevant_titles: Vec<String>,
    pub about_company_bad_words: Vec<String>,
    pub about_company_good_words: Vec<String>,
    pub bad_words: Vec<String>,
    /// 是否接受需要安全审查的职位
    pub security_clearance: bool,
    pub did_masters: bool,
    pub current_experience: i32,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            relevant_titles: Vec::new(),
            about_company_bad_words: Vec::new(),
            about_company_good_words: Vec::new(),
            bad_words: Vec::new(),
            security_clearance: false,
            did_masters: false,
            current_experience: -1,
        }
    }
}

/// 个人信息
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Personals {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub current_city: String,
    pub state: String,
    pub country: String,
    pub zipcode: String,
}

/// 表单常见问题的答案
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Questions {
    /// "Yes" / "No"
    pub require_visa: String,
    pub linkedin: String,
    pub website: String,
    pub linkedin_headline: String,
    pub linkedin_summary: String,
    pub years_of_experience: String,
    pub notice_period_days: u32,
    pub current_ctc: u64,
    pub desired_salary: u64,
    pub default_resume_path: String,
}

impl Default for Questions {
    fn default() -> Self {
        Self {
            require_visa: "No".to_string(),
            linkedin: String::new(),
            website: String::new(),
            linkedin_headline: String::new(),
            linkedin_summary: String::new(),
            years_of_experience: String::new(),
            notice_period_days: 30,
            current_ctc: 0,
            desired_salary: 0,
            default_resume_path: "all resumes/default/resume.pdf".to_string(),
        }
    }
}

/// 运行行为
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 点击之间的间隔（毫秒）
    pub click_gap_ms: u64,
    pub run_non_stop: bool,
    pub alternate_sort_by: bool,
    pub cycle_date_posted: bool,
    /// 轮换到 "Past 24 hours" 后不再继续轮换
    pub stop_date_cycle_at_24hr: bool,
    pub close_tabs: bool,
    pub pause_before_submit: bool,
    pub pause_at_failed_question: bool,
    pub run_in_background: bool,
    pub keep_screen_awake: bool,
    /// 表单翻页多少轮后请求人工介入
    pub escalation_threshold: u32,
    /// 同一次投递最多请求人工介入的次数
    pub max_escalations: u32,
    pub output_dir: String,
    pub log_file: String,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            click_gap_ms: 1000,
            run_non_stop: false,
            alternate_sort_by: true,
            cycle_date_posted: true,
            stop_date_cycle_at_24hr: true,
            close_tabs: true,
            pause_before_submit: true,
            pause_at_failed_question: true,
            run_in_background: false,
            keep_screen_awake: false,
            escalation_threshold: 15,
            max_escalations: 3,
            output_dir: "outputs".to_string(),
            log_file: "outputs/logs/run.log".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// 简历改写所用的 LLM 配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    /// Markdown 格式的基础简历
    pub base_resume_path: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_resume_path: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Config {
    /// 读取 TOML 配置文件（可选），再用环境变量覆盖
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env();
        config.normalize();
        Ok(config)
    }

    fn apply_env(&mut self) {
        let b = &mut self.browser;
        b.debug_port = env_parse("BROWSER_DEBUG_PORT").unwrap_or(b.debug_port);
        b.headless = env_parse("BROWSER_HEADLESS").unwrap_or(b.headless);
        b.chrome_executable = std::env::var("CHROME_EXECUTABLE").ok().or(b.chrome_executable.take());

        self.credentials.email = std::env::var("LINKEDIN_EMAIL").unwrap_or_default();
        self.credentials.password = std::env::var("LINKEDIN_PASSWORD").unwrap_or_default();

        self.llm.api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty());
        if let Ok(base) = std::env::var("OPENAI_API_BASE") {
            self.llm.api_base = base;
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            self.llm.model = model;
        }
        self.settings.log_level = std::env::var("LOG_LEVEL").unwrap_or(self.settings.log_level.clone());
    }

    /// 后台运行时关闭所有需要人工操作的功能
    pub fn normalize(&mut self) {
        if self.browser.headless {
            self.browser.launch = true;
        }
        if self.settings.run_in_background {
            self.settings.pause_before_submit = false;
            self.settings.pause_at_failed_question = false;
            self.settings.run_non_stop = false;
        }
    }

    /// 校验配置，一次性返回所有问题
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.search.search_terms.iter().all(|t| t.trim().is_empty()) {
            problems.push("search.search_terms 至少需要一个搜索词".to_string());
        }
        if self.search.switch_number < 1 {
            problems.push("search.switch_number 必须 >= 1".to_string());
        }
        if self.filters.current_experience < -1 {
            problems.push("filters.current_experience 必须 >= -1".to_string());
        }
        let phone = &self.personals.phone_number;
        if !phone.is_empty() && phone.chars().count() < 10 {
            problems.push(format!("personals.phone_number 长度不足 10: {}", phone));
        }
        if !matches!(self.questions.require_visa.as_str(), "Yes" | "No") {
            problems.push(format!(
                "questions.require_visa 只能是 Yes / No: {}",
                self.questions.require_visa
            ));
        }
        // 为 1 时第一页还没回答就会触发人工介入
        if self.settings.escalation_threshold < 2 {
            problems.push("settings.escalation_threshold 必须 >= 2".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.settings.output_dir)
    }

    pub fn ledger_dir(&self) -> PathBuf {
        self.output_dir().join("logs")
    }

    pub fn descriptions_dir(&self) -> PathBuf {
        self.output_dir().join("descriptions")
    }

    pub fn resumes_dir(&self) -> PathBuf {
        self.output_dir().join("resumes")
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
