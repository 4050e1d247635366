use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, Local};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 职位详情页 URL 前缀
pub const JOB_VIEW_URL: &str = "https://www.linkedin.com/jobs/view/";

static POSTED_AGO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s+(second|minute|hour|day|week|month|year)s?\s+ago")
        .expect("posted-time pattern is valid")
});

/// 办公方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorkStyle {
    OnSite,
    Remote,
    Hybrid,
    #[default]
    Unknown,
}

impl WorkStyle {
    pub fn parse(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "on-site" | "onsite" | "on site" => WorkStyle::OnSite,
            "remote" => WorkStyle::Remote,
            "hybrid" => WorkStyle::Hybrid,
            _ => WorkStyle::Unknown,
        }
    }
}

impl fmt::Display for WorkStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkStyle::OnSite => "On-site",
            WorkStyle::Remote => "Remote",
            WorkStyle::Hybrid => "Hybrid",
            WorkStyle::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// 列表页上读到的原始职位卡片
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobCard {
    pub id: String,
    pub title: String,
    /// "Company · Location (Work style)"
    #[serde(default)]
    pub subtitle: String,
    /// 卡片底部是否显示 "Applied"
    #[serde(default)]
    pub applied_badge: bool,
}

impl JobCard {
    pub fn into_posting(self) -> JobPosting {
        let (company, location, work_style) = parse_subtitle(&self.subtitle);
        JobPosting {
            id: self.id,
            title: self.title.lines().next().unwrap_or_default().trim().to_string(),
            company,
            location,
            work_style,
            ..Default::default()
        }
    }
}

/// 一条职位
///
/// 扫描时创建；描述、发布时间、经验要求在打开详情后补充。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub work_style: WorkStyle,
    pub description: Option<String>,
    pub date_listed: Option<DateTime<Local>>,
    pub experience_required: Option<u32>,
}

impl JobPosting {
    pub fn job_url(&self) -> String {
        format!("{}{}", JOB_VIEW_URL, self.id)
    }
}

impl fmt::Display for JobPosting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{} | {}\"", self.title, self.company)
    }
}

/// 拆分卡片副标题
pub fn parse_subtitle(subtitle: &str) -> (String, String, WorkStyle) {
    let (company, rest) = match subtitle.split_once(" · ") {
        Some((c, r)) => (c.trim(), r.trim()),
        None => (subtitle.trim(), ""),
    };

    match (rest.rfind('('), rest.rfind(')')) {
        (Some(open), Some(close)) if open < close => (
            company.to_string(),
            rest[..open].trim().to_string(),
            WorkStyle::parse(&rest[open + 1..close]),
        ),
        _ => (company.to_string(), rest.to_string(), WorkStyle::Unknown),
    }
}

/// 根据 "3 days ago" / "Reposted 2 weeks ago" 推算发布时间
///
/// 月按 30 天、年按 365 天计算。
pub fn calculate_date_posted(text: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let text = text.replace("Reposted", "");
    let caps = POSTED_AGO.captures(text.trim())?;
    let value: i64 = caps[1].parse().ok()?;
    let delta = match caps[2].to_lowercase().as_str() {
        "second" => Duration::seconds(value),
        "minute" => Duration::minutes(value),
        "hour" => Duration::hours(value),
        "day" => Duration::days(value),
        "week" => Duration::weeks(value),
        "month" => Duration::days(value * 30),
        "year" => Duration::days(value * 365),
        _ => return None,
    };
    Some(now - delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subtitle_with_work_style() {
        let (company, location, style) = parse_subtitle("Acme · Berlin, Germany (Remote)");
        assert_eq!(company, "Acme");
        assert_eq!(location, "Berlin, Germany");
        assert_eq!(style, WorkStyle::Remote);
    }

    #[test]
    fn test_parse_subtitle_without_location() {
        let (company, location, style) = parse_subtitle("Acme");
        assert_eq!(company, "Acme");
        assert_eq!(location, "");
        assert_eq!(style, WorkStyle::Unknown);
    }

    #[test]
    fn test_card_title_keeps_first_line() {
        let card = JobCard {
            id: "123".into(),
            title: "Frontend Developer\nwith verification".into(),
            subtitle: "Acme · Paris (Hybrid)".into(),
            applied_badge: false,
        };
        let posting = card.into_posting();
        assert_eq!(posting.title, "Frontend Developer");
        assert_eq!(posting.work_style, WorkStyle::Hybrid);
        assert_eq!(posting.job_url(), "https://www.linkedin.com/jobs/view/123");
    }

    #[test]
    fn test_calculate_date_posted() {
        let now = Local::now();
        let listed = calculate_date_posted("Reposted 2 weeks ago", now).unwrap();
        assert_eq!(now - listed, Duration::days(14));

        let listed = calculate_date_posted("1 month ago", now).unwrap();
        assert_eq!(now - listed, Duration::days(30));

        assert!(calculate_date_posted("just now", now).is_none());
    }
}
