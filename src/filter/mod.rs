//! 过滤链
//!
//! 纯函数：输入职位和规则，输出一个判定，不产生任何副作用。
//! 规则按固定优先级执行，遇到第一个不通过的规则立即返回：
//!
//! 1. 重复（已成功投递 / 本次运行已拒绝）
//! 2. 公司黑名单（本次运行）
//! 3. 职位名称相关性
//! 4. 公司简介好词 / 坏词
//! 5. 描述坏词
//! 6. 安全审查
//! 7. 经验要求
//!
//! 1-3 只需要列表卡片；4 需要打开详情；5-7 需要描述。

pub mod experience;

use std::collections::HashSet;
use std::fmt;

use crate::config::FilterRules;
use crate::models::{JobPosting, SessionState};

pub use experience::extract_years_of_experience;

/// 描述中出现即视为需要安全审查
pub const CLEARANCE_TERMS: [&str; 3] = ["polygraph", "clearance", "secret"];

/// 硕士学历额外抵扣的年限
pub const MASTERS_BONUS_YEARS: u32 = 2;

/// 判定结果类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictKind {
    Proceed,
    SkipDuplicate,
    SkipBlacklistedCompany,
    SkipIrrelevantTitle,
    SkipBadWord,
    SkipClearanceRequired,
    SkipOverexperienced,
}

impl fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerdictKind::Proceed => "通过",
            VerdictKind::SkipDuplicate => "重复",
            VerdictKind::SkipBlacklistedCompany => "公司黑名单",
            VerdictKind::SkipIrrelevantTitle => "职位不相关",
            VerdictKind::SkipBadWord => "描述含屏蔽词",
            VerdictKind::SkipClearanceRequired => "需要安全审查",
            VerdictKind::SkipOverexperienced => "经验要求过高",
        };
        f.write_str(s)
    }
}

/// 过滤链对一个职位的判定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterVerdict {
    pub kind: VerdictKind,
    pub reason: Option<String>,
}

impl FilterVerdict {
    pub fn proceed() -> Self {
        Self {
            kind: VerdictKind::Proceed,
            reason: None,
        }
    }

    pub fn skip(kind: VerdictKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: Some(reason.into()),
        }
    }

    pub fn is_proceed(&self) -> bool {
        self.kind == VerdictKind::Proceed
    }

    /// 写入记录 / 日志用的文字
    pub fn describe(&self) -> String {
        match &self.reason {
            Some(reason) => format!("{}: {}", self.kind, reason),
            None => self.kind.to_string(),
        }
    }
}

/// "是否已成功投递过"的查询能力
pub trait JobHistory {
    fn was_applied(&self, job_id: &str) -> bool;
}

impl JobHistory for HashSet<String> {
    fn was_applied(&self, job_id: &str) -> bool {
        self.contains(job_id)
    }
}

/// 描述阶段的结果：判定 + 提取到的经验年限
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionScreen {
    pub verdict: FilterVerdict,
    pub experience_required: Option<u32>,
}

/// 过滤链
#[derive(Debug, Clone)]
pub struct FilterChain {
    rules: FilterRules,
}

impl FilterChain {
    /// 词表在构建时统一转为小写
    pub fn new(mut rules: FilterRules) -> Self {
        for list in [
            &mut rules.relevant_titles,
            &mut rules.about_company_bad_words,
            &mut rules.about_company_good_words,
            &mut rules.bad_words,
        ] {
            *list = list
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect();
        }
        Self { rules }
    }

    pub fn rules(&self) -> &FilterRules {
        &self.rules
    }

    /// 规则 1-3：只依赖列表卡片上的信息
    pub fn screen_listing(
        &self,
        posting: &JobPosting,
        history: &impl JobHistory,
        session: &SessionState,
    ) -> FilterVerdict {
        if history.was_applied(&posting.id) {
            return FilterVerdict::skip(VerdictKind::SkipDuplicate, "已成功投递过");
        }
        if session.rejected_jobs.contains(&posting.id) {
            return FilterVerdict::skip(VerdictKind::SkipDuplicate, "本次运行已拒绝");
        }
        if session.blacklisted_companies.contains(&posting.company) {
            return FilterVerdict::skip(
                VerdictKind::SkipBlacklistedCompany,
                format!("公司 {} 已被拉黑", posting.company),
            );
        }
        if !self.rules.relevant_titles.is_empty() {
            let title = posting.title.to_lowercase();
            if !self.rules.relevant_titles.iter().any(|t| title.contains(t.as_str())) {
                return FilterVerdict::skip(
                    VerdictKind::SkipIrrelevantTitle,
                    format!("职位名称 \"{}\" 不在配置范围内", posting.title),
                );
            }
        }
        FilterVerdict::proceed()
    }

    /// 规则 4：公司简介
    ///
    /// 简介找不到时无法判断，直接通过。
    pub fn screen_about_company(&self, about: Option<&str>) -> FilterVerdict {
        let Some(about) = about else {
            return FilterVerdict::proceed();
        };
        let about = about.to_lowercase();

        if self
            .rules
            .about_company_good_words
            .iter()
            .any(|w| about.contains(w.as_str()))
        {
            return FilterVerdict::proceed();
        }
        match self
            .rules
            .about_company_bad_words
            .iter()
            .find(|w| about.contains(w.as_str()))
        {
            Some(word) => FilterVerdict::skip(VerdictKind::SkipBlacklistedCompany, word.clone()),
            None => FilterVerdict::proceed(),
        }
    }

    /// 规则 5-7：描述
    ///
    /// 描述缺失时经验要求视为未知，不会触发规则 7。
    pub fn screen_description(&self, description: Option<&str>) -> DescriptionScreen {
        let Some(description) = description else {
            return DescriptionScreen {
                verdict: FilterVerdict::proceed(),
                experience_required: None,
            };
        };
        let lower = description.to_lowercase();
        let experience_required = extract_years_of_experience(description);
        let screen = |verdict| DescriptionScreen {
            verdict,
            experience_required,
        };

        if let Some(word) = self.rules.bad_words.iter().find(|w| lower.contains(w.as_str())) {
            return screen(FilterVerdict::skip(VerdictKind::SkipBadWord, word.clone()));
        }

        if !self.rules.security_clearance {
            if let Some(term) = CLEARANCE_TERMS.iter().find(|t| lower.contains(*t)) {
                return screen(FilterVerdict::skip(
                    VerdictKind::SkipClearanceRequired,
                    term.to_string(),
                ));
            }
        }

        if let (Some(required), Ok(current)) = (
            experience_required,
            u32::try_from(self.rules.current_experience),
        ) {
            let bonus = if self.rules.did_masters && lower.contains("master") {
                MASTERS_BONUS_YEARS
            } else {
                0
            };
            if required > current + bonus {
                return screen(FilterVerdict::skip(
                    VerdictKind::SkipOverexperienced,
                    format!("要求 {} 年，当前 {} 年 (+{})", required, current, bonus),
                ));
            }
        }

        screen(FilterVerdict::proceed())
    }

    /// 完整过滤链：按优先级依次执行全部规则
    pub fn evaluate(
        &self,
        posting: &JobPosting,
        about_company: Option<&str>,
        history: &impl JobHistory,
        session: &SessionState,
    ) -> FilterVerdict {
        let verdict = self.screen_listing(posting, history, session);
        if !verdict.is_proceed() {
            return verdict;
        }
        let verdict = self.screen_about_company(about_company);
        if !verdict.is_proceed() {
            return verdict;
        }
        self.screen_description(posting.description.as_deref()).verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> FilterRules {
        FilterRules {
            relevant_titles: vec!["Frontend".into(), "React".into()],
            about_company_bad_words: vec!["Staffing".into()],
            about_company_good_words: vec!["Product company".into()],
            bad_words: vec!["Crypto".into()],
            security_clearance: false,
            did_masters: false,
            current_experience: 3,
        }
    }

    fn posting(description: &str) -> JobPosting {
        JobPosting {
            id: "123".into(),
            title: "Senior Frontend Developer".into(),
            company: "Acme".into(),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    fn evaluate(chain: &FilterChain, p: &JobPosting) -> FilterVerdict {
        chain.evaluate(p, None, &HashSet::new(), &SessionState::default())
    }

    #[test]
    fn test_duplicate_wins_over_everything() {
        let chain = FilterChain::new(rules());
        let history: HashSet<String> = ["123".to_string()].into();
        let mut session = SessionState::default();
        session.blacklist_company("Acme");

        let verdict = chain.evaluate(&posting("crypto secret 10 years"), None, &history, &session);
        assert_eq!(verdict.kind, VerdictKind::SkipDuplicate);
    }

    #[test]
    fn test_rejected_in_this_run_is_duplicate() {
        let chain = FilterChain::new(rules());
        let mut session = SessionState::default();
        session.reject("123");
        let verdict = chain.screen_listing(&posting(""), &HashSet::new(), &session);
        assert_eq!(verdict.kind, VerdictKind::SkipDuplicate);
    }

    #[test]
    fn test_blacklisted_company_in_session() {
        let chain = FilterChain::new(rules());
        let mut session = SessionState::default();
        session.blacklist_company("Acme");
        let verdict = chain.screen_listing(&posting(""), &HashSet::new(), &session);
        assert_eq!(verdict.kind, VerdictKind::SkipBlacklistedCompany);
    }

    #[test]
    fn test_title_relevance_is_case_insensitive() {
        let chain = FilterChain::new(rules());
        let mut p = posting("");
        p.title = "REACT engineer".into();
        assert!(evaluate(&chain, &p).is_proceed());

        p.title = "Backend Engineer".into();
        assert_eq!(evaluate(&chain, &p).kind, VerdictKind::SkipIrrelevantTitle);
    }

    #[test]
    fn test_empty_title_list_means_no_restriction() {
        let mut r = rules();
        r.relevant_titles.clear();
        let chain = FilterChain::new(r);
        let mut p = posting("");
        p.title = "Backend Engineer".into();
        assert!(evaluate(&chain, &p).is_proceed());
    }

    #[test]
    fn test_about_company_good_word_bypasses_bad_words() {
        let chain = FilterChain::new(rules());
        let verdict = chain.screen_about_company(Some("A PRODUCT COMPANY, not a staffing agency"));
        assert!(verdict.is_proceed());

        let verdict = chain.screen_about_company(Some("Leading staffing partner"));
        assert_eq!(verdict.kind, VerdictKind::SkipBlacklistedCompany);
        assert_eq!(verdict.reason.as_deref(), Some("staffing"));
    }

    #[test]
    fn test_missing_about_company_proceeds() {
        let chain = FilterChain::new(rules());
        assert!(chain.screen_about_company(None).is_proceed());
    }

    #[test]
    fn test_bad_word_any_case_fires_before_experience() {
        let chain = FilterChain::new(rules());
        let verdict = evaluate(&chain, &posting("We build CRYPTO wallets. 10 years required."));
        assert_eq!(verdict.kind, VerdictKind::SkipBadWord);
        assert_eq!(verdict.reason.as_deref(), Some("crypto"));
    }

    #[test]
    fn test_clearance_unless_permitted() {
        let chain = FilterChain::new(rules());
        let verdict = evaluate(&chain, &posting("Active Secret clearance needed"));
        assert_eq!(verdict.kind, VerdictKind::SkipClearanceRequired);

        let mut r = rules();
        r.security_clearance = true;
        let chain = FilterChain::new(r);
        assert!(evaluate(&chain, &posting("Active Secret clearance needed")).is_proceed());
    }

    #[test]
    fn test_overexperienced_and_masters_bonus() {
        let chain = FilterChain::new(rules());
        let screen = chain.screen_description(Some("5 years of experience, Master's preferred"));
        assert_eq!(screen.verdict.kind, VerdictKind::SkipOverexperienced);
        assert_eq!(screen.experience_required, Some(5));

        let mut r = rules();
        r.did_masters = true;
        let chain = FilterChain::new(r);
        let screen = chain.screen_description(Some("5 years of experience, Master's preferred"));
        assert!(screen.verdict.is_proceed());

        // 描述里没有 "master" 时不加分
        let screen = chain.screen_description(Some("5 years of experience"));
        assert_eq!(screen.verdict.kind, VerdictKind::SkipOverexperienced);
    }

    #[test]
    fn test_no_experience_limit() {
        let mut r = rules();
        r.current_experience = -1;
        let chain = FilterChain::new(r);
        assert!(chain.screen_description(Some("15 years required")).verdict.is_proceed());
    }

    #[test]
    fn test_unknown_description_never_trips_experience() {
        let chain = FilterChain::new(rules());
        let screen = chain.screen_description(None);
        assert!(screen.verdict.is_proceed());
        assert_eq!(screen.experience_required, None);
    }
}
