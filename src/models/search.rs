//! 搜索条件模型
//!
//! 所有筛选条件都编码进搜索 URL 的查询参数，不再逐个点击筛选面板。

use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::error::DomError;

const SEARCH_BASE_URL: &str = "https://www.linkedin.com/jobs/search/";

/// 经验等级 → `f_E`
static EXPERIENCE_LEVEL_CODES: phf::Map<&'static str, &'static str> = phf_map! {
    "internship" => "1",
    "entry level" => "2",
    "associate" => "3",
    "mid-senior level" => "4",
    "director" => "5",
    "executive" => "6",
};

/// 工作类型 → `f_JT`
static JOB_TYPE_CODES: phf::Map<&'static str, &'static str> = phf_map! {
    "full-time" => "F",
    "part-time" => "P",
    "contract" => "C",
    "temporary" => "T",
    "volunteer" => "V",
    "internship" => "I",
    "other" => "O",
};

/// 办公方式 → `f_WT`
static ON_SITE_CODES: phf::Map<&'static str, &'static str> = phf_map! {
    "on-site" => "1",
    "remote" => "2",
    "hybrid" => "3",
};

/// 发布时间窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DatePosted {
    #[default]
    #[serde(rename = "Any time")]
    AnyTime,
    #[serde(rename = "Past month")]
    PastMonth,
    #[serde(rename = "Past week")]
    PastWeek,
    #[serde(rename = "Past 24 hours")]
    Past24Hours,
}

impl DatePosted {
    /// 轮换顺序
    pub const CYCLE: [DatePosted; 4] = [
        DatePosted::AnyTime,
        DatePosted::PastMonth,
        DatePosted::PastWeek,
        DatePosted::Past24Hours,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DatePosted::AnyTime => "Any time",
            DatePosted::PastMonth => "Past month",
            DatePosted::PastWeek => "Past week",
            DatePosted::Past24Hours => "Past 24 hours",
        }
    }

    /// `f_TPR` 参数，"Any time" 不带参数
    pub fn code(self) -> Option<&'static str> {
        match self {
            DatePosted::AnyTime => None,
            DatePosted::PastMonth => Some("r2592000"),
            DatePosted::PastWeek => Some("r604800"),
            DatePosted::Past24Hours => Some("r86400"),
        }
    }

    /// 轮换到下一个时间窗口（循环）
    pub fn next(self) -> Self {
        let idx = Self::CYCLE.iter().position(|d| *d == self).unwrap_or(0);
        Self::CYCLE[(idx + 1) % Self::CYCLE.len()]
    }
}

/// 排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "Most recent")]
    MostRecent,
    #[serde(rename = "Most relevant")]
    MostRelevant,
}

impl SortBy {
    pub fn label(self) -> &'static str {
        match self {
            SortBy::MostRecent => "Most recent",
            SortBy::MostRelevant => "Most relevant",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            SortBy::MostRecent => "DD",
            SortBy::MostRelevant => "R",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortBy::MostRecent => SortBy::MostRelevant,
            SortBy::MostRelevant => SortBy::MostRecent,
        }
    }
}

/// 一次搜索的完整条件
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub keywords: String,
    pub location: String,
    pub date_posted: DatePosted,
    pub sort_by: SortBy,
    pub easy_apply_only: bool,
    pub experience_level: Vec<String>,
    pub job_type: Vec<String>,
    pub on_site: Vec<String>,
}

impl SearchQuery {
    /// 生成搜索 URL
    ///
    /// 无法识别的多选项会被忽略并记录到 debug 日志。
    pub fn to_url(&self) -> Result<String, DomError> {
        let mut params: Vec<(&str, String)> = vec![("keywords", self.keywords.clone())];

        if !self.location.trim().is_empty() {
            params.push(("location", self.location.trim().to_string()));
        }
        if let Some(code) = self.date_posted.code() {
            params.push(("f_TPR", code.to_string()));
        }
        params.push(("sortBy", self.sort_by.code().to_string()));
        if self.easy_apply_only {
            params.push(("f_AL", "true".to_string()));
        }
        for (key, map, values) in [
            ("f_E", &EXPERIENCE_LEVEL_CODES, &self.experience_level),
            ("f_JT", &JOB_TYPE_CODES, &self.job_type),
            ("f_WT", &ON_SITE_CODES, &self.on_site),
        ] {
            let codes = join_codes(map, values);
            if !codes.is_empty() {
                params.push((key, codes));
            }
        }

        reqwest::Url::parse_with_params(SEARCH_BASE_URL, &params)
            .map(|url| url.to_string())
            .map_err(|e| DomError::Script(format!("无法构建搜索 URL: {}", e)))
    }
}

fn join_codes(map: &phf::Map<&'static str, &'static str>, values: &[String]) -> String {
    values
        .iter()
        .filter_map(|v| {
            let code = map.get(v.trim().to_lowercase().as_str());
            if code.is_none() {
                tracing::debug!("忽略无法识别的筛选项: {}", v);
            }
            code.copied()
        })
        .collect::<Vec<_>>()
        .join(",")
}
