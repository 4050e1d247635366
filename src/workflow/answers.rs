//! 表单问题答案表
//!
//! 有序的 (标签匹配 → 答案) 规则表，按顺序匹配，第一条命中的规则生效。
//! 新增问题类型只需要在 `ANSWER_RULES` 中加一行。

use crate::config::{Personals, Questions};
use crate::models::{FieldKind, FormField};

/// 没有任何规则命中时的答案
pub const FALLBACK_ANSWER: &str = "Yes";

/// 下拉框中不算作有效选项的占位文字
const PLACEHOLDER_OPTIONS: [&str; 2] = ["select an option", "please select"];

/// 解析答案时的上下文
#[derive(Debug, Clone, Copy)]
pub struct AnswerContext<'a> {
    /// 已规范化（小写、合并空白）的标签
    pub label: &'a str,
    /// 职位所在地，城市问题的兜底答案
    pub work_location: &'a str,
}

/// 一条答案规则
pub struct AnswerRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub resolve: fn(&AnswerBook, &AnswerContext<'_>) -> String,
}

/// 按顺序匹配；地址类规则放在最后，避免 "state your salary" 之类的措辞误命中
pub static ANSWER_RULES: &[AnswerRule] = &[
    AnswerRule {
        name: "visa",
        matches: |l| l.contains("visa"),
        resolve: |b, _| b.questions.require_visa.clone(),
    },
    AnswerRule {
        name: "first_name",
        matches: |l| l.contains("first name"),
        resolve: |b, _| b.personals.first_name.clone(),
    },
    AnswerRule {
        name: "last_name",
        matches: |l| l.contains("last name"),
        resolve: |b, _| b.personals.last_name.clone(),
    },
    AnswerRule {
        name: "phone",
        matches: |l| l.contains("phone"),
        resolve: |b, _| b.personals.phone_number.clone(),
    },
    AnswerRule {
        name: "linkedin",
        matches: |l| l.contains("linkedin"),
        resolve: |b, _| b.questions.linkedin.clone(),
    },
    AnswerRule {
        name: "website",
        matches: |l| l.contains("website") || l.contains("portfolio"),
        resolve: |b, _| b.questions.website.clone(),
    },
    AnswerRule {
        name: "headline",
        matches: |l| l.contains("headline"),
        resolve: |b, _| b.questions.linkedin_headline.clone(),
    },
    AnswerRule {
        name: "notice_months",
        matches: |l| l.contains("notice") && l.contains("month"),
        resolve: |b, _| (b.questions.notice_period_days / 30).to_string(),
    },
    AnswerRule {
        name: "notice_weeks",
        matches: |l| l.contains("notice") && l.contains("week"),
        resolve: |b, _| (b.questions.notice_period_days / 7).to_string(),
    },
    AnswerRule {
        name: "notice_days",
        matches: |l| l.contains("notice"),
        resolve: |b, _| b.questions.notice_period_days.to_string(),
    },
    AnswerRule {
        name: "salary",
        matches: |l| l.contains("salary") || l.contains("compensation"),
        resolve: |b, ctx| b.salary_answer(ctx.label),
    },
    AnswerRule {
        name: "experience_years",
        matches: |l| l.contains("experience") && l.contains("year"),
        resolve: |b, _| b.questions.years_of_experience.clone(),
    },
    AnswerRule {
        name: "city",
        matches: |l| l.contains("city"),
        resolve: |b, ctx| {
            if b.personals.current_city.trim().is_empty() {
                ctx.work_location.to_string()
            } else {
                b.personals.current_city.clone()
            }
        },
    },
    AnswerRule {
        name: "state",
        matches: |l| has_word(l, "state") || has_word(l, "province"),
        resolve: |b, _| b.personals.state.clone(),
    },
    AnswerRule {
        name: "country",
        matches: |l| l.contains("country"),
        resolve: |b, _| b.personals.country.clone(),
    },
    AnswerRule {
        name: "zipcode",
        matches: |l| l.contains("zipcode") || l.contains("zip code") || l.contains("postal"),
        resolve: |b, _| b.personals.zipcode.clone(),
    },
];

fn has_word(label: &str, word: &str) -> bool {
    label
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}

/// 答案来源
#[derive(Debug, Clone)]
pub struct AnswerBook {
    personals: Personals,
    questions: Questions,
}

impl AnswerBook {
    pub fn new(personals: Personals, questions: Questions) -> Self {
        Self {
            personals,
            questions,
        }
    }

    /// 文本答案，返回 (规则名, 答案)
    pub fn answer_text(&self, label: &str, work_location: &str) -> (&'static str, String) {
        let label = normalize_label(label);
        let ctx = AnswerContext {
            label: &label,
            work_location,
        };
        ANSWER_RULES
            .iter()
            .find(|rule| (rule.matches)(&label))
            .map(|rule| (rule.name, (rule.resolve)(self, &ctx)))
            .unwrap_or(("fallback", FALLBACK_ANSWER.to_string()))
    }

    /// 根据控件类型给出答案；下拉框没有任何可选项时返回 `None`
    pub fn answer(&self, field: &FormField, work_location: &str) -> Option<String> {
        match &field.kind {
            FieldKind::TextArea => Some(self.questions.linkedin_summary.trim().to_string()),
            FieldKind::Text => Some(self.answer_text(&field.label, work_location).1),
            FieldKind::Dropdown { options } => {
                let (_, wanted) = self.answer_text(&field.label, work_location);
                pick_option(options, &wanted)
            }
        }
    }

    /// 薪资：区分当前 / 期望，再区分月薪 / lakh / 年薪
    fn salary_answer(&self, label: &str) -> String {
        let amount = if label.contains("current") {
            self.questions.current_ctc
        } else {
            self.questions.desired_salary
        } as f64;

        if label.contains("month") {
            format_amount(amount / 12.0)
        } else if label.contains("lakh") {
            format_amount(amount / 100_000.0)
        } else {
            format_amount(amount)
        }
    }
}

/// 小写并合并连续空白
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 保留两位小数，去掉多余的 0
fn format_amount(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.2}", rounded).trim_end_matches('0').to_string()
    }
}

/// 从下拉选项中选择答案：完全匹配 → 包含关系 → 第一个非占位选项
pub fn pick_option(options: &[String], wanted: &str) -> Option<String> {
    let wanted = wanted.trim().to_lowercase();
    let real: Vec<&String> = options
        .iter()
        .filter(|o| {
            let o = o.trim().to_lowercase();
            !o.is_empty() && !PLACEHOLDER_OPTIONS.contains(&o.as_str())
        })
        .collect();

    if !wanted.is_empty() {
        if let Some(exact) = real.iter().find(|o| o.trim().to_lowercase() == wanted) {
            return Some(exact.trim().to_string());
        }
        if let Some(partial) = real.iter().find(|o| {
            let o = o.trim().to_lowercase();
            o.contains(&wanted) || wanted.contains(&o)
        }) {
            return Some(partial.trim().to_string());
        }
    }
    real.first().map(|o| o.trim().to_string())
}
