//! 投递记录 - 业务能力层
//!
//! 两个只追加的 CSV 文件：`success.csv`（applied=true）和 `failure.csv`（applied=false）。
//! 启动时读取一次 success.csv，之后只追加写入。

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::error::LedgerError;
use crate::filter::JobHistory;
use crate::models::JobPosting;

pub const SUCCESS_FILE: &str = "success.csv";
pub const FAILURE_FILE: &str = "failure.csv";

const HEADER: [&str; 7] = [
    "timestamp",
    "job_title",
    "company",
    "job_url",
    "applied",
    "resume_path",
    "error_message",
];

/// 一条投递记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub timestamp: String,
    pub job_title: String,
    pub company: String,
    pub job_url: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub applied: bool,
    #[serde(default)]
    pub resume_path: String,
    #[serde(default)]
    pub error_message: String,
}

impl LedgerEntry {
    pub fn success(posting: &JobPosting, resume_path: Option<&Path>) -> Self {
        Self {
            timestamp: now_iso(),
            job_title: posting.title.clone(),
            company: posting.company.clone(),
            job_url: posting.job_url(),
            applied: true,
            resume_path: display_path(resume_path),
            error_message: String::new(),
        }
    }

    pub fn failure(posting: &JobPosting, resume_path: Option<&Path>, error: impl Into<String>) -> Self {
        Self {
            timestamp: now_iso(),
            job_title: posting.title.clone(),
            company: posting.company.clone(),
            job_url: posting.job_url(),
            applied: false,
            resume_path: display_path(resume_path),
            error_message: error.into(),
        }
    }

    /// 从 job_url 中解析出职位 ID
    pub fn job_id(&self) -> Option<&str> {
        job_id_from_url(&self.job_url)
    }
}

/// 去重只依赖 job_url 列，其他列格式不对也不影响
#[derive(Debug, Deserialize)]
struct UrlOnly {
    job_url: String,
}

/// 兼容 `true` / `True` / `1` 等写法
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let text = String::deserialize(deserializer)?;
    match text.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!("无法识别的 applied 值: {}", other))),
    }
}

/// URL 最后一段必须是纯数字才认为是合法 ID
pub fn job_id_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let last = path.trim_end_matches('/').rsplit('/').next()?;
    (!last.is_empty() && last.chars().all(|c| c.is_ascii_digit())).then_some(last)
}

fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}

/// 投递记录
///
/// 唯一持有持久化结果的组件。
#[derive(Debug)]
pub struct ApplicationLedger {
    success_path: PathBuf,
    failure_path: PathBuf,
    applied: HashSet<String>,
}

impl ApplicationLedger {
    /// 打开（必要时创建）记录目录并加载已成功投递的职位 ID
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| LedgerError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let success_path = dir.join(SUCCESS_FILE);
        let failure_path = dir.join(FAILURE_FILE);

        let mut applied = HashSet::new();
        for row in read_rows::<UrlOnly>(&success_path)? {
            match job_id_from_url(&row.job_url) {
                Some(id) => {
                    applied.insert(id.to_string());
                }
                None => debug!("忽略无法解析 ID 的记录: {}", row.job_url),
            }
        }
        info!("📒 已加载 {} 条成功投递记录", applied.len());

        Ok(Self {
            success_path,
            failure_path,
            applied,
        })
    }

    pub fn was_applied(&self, job_id: &str) -> bool {
        self.applied.contains(job_id)
    }

    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    pub fn record_success(&mut self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        append_entry(&self.success_path, entry)?;
        if let Some(id) = entry.job_id() {
            self.applied.insert(id.to_string());
        } else {
            warn!("成功记录的 URL 无法解析出 ID，将无法用于去重: {}", entry.job_url);
        }
        Ok(())
    }

    pub fn record_failure(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        append_entry(&self.failure_path, entry)
    }

    /// 合并两个文件，按时间排序
    pub fn history(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        let mut entries = read_rows::<LedgerEntry>(&self.success_path)?;
        entries.extend(read_rows::<LedgerEntry>(&self.failure_path)?);
        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(entries)
    }
}

impl JobHistory for ApplicationLedger {
    fn was_applied(&self, job_id: &str) -> bool {
        ApplicationLedger::was_applied(self, job_id)
    }
}

fn append_entry(path: &Path, entry: &LedgerEntry) -> Result<(), LedgerError> {
    let io_err = |source| LedgerError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;
    let is_empty = file.metadata().map_err(io_err)?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if is_empty {
        writer.write_record(HEADER)?;
    }
    writer.serialize(entry)?;
    writer.flush().map_err(io_err)?;
    Ok(())
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LedgerError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut entries = Vec::new();
    for (line, row) in reader.deserialize::<T>().enumerate() {
        match row {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!("{} 第 {} 行格式错误，已忽略: {}", path.display(), line + 2, e),
        }
    }
    Ok(entries)
}
