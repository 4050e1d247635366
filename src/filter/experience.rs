//! 从职位描述中提取经验年限要求

use std::sync::LazyLock;

use regex::Regex;

/// 超过这个数字的 "N years" 视为无意义匹配（公司历史、年龄等）
pub const MAX_PLAUSIBLE_YEARS: u32 = 40;

/// "(3) - 5+ years" / "5 to 7 years" / "Requires 7 years"
static YEARS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(?\s*(\d+)\s*\)?\s*(?:-|–|to)?\s*(\d+)?\s*\+?\s*years?")
        .expect("experience pattern is valid")
});

/// 返回所有 "years" 前面的数字中不超过 40 的最大值，找不到返回 `None`
///
/// 区间的两端都参与比较。
pub fn extract_years_of_experience(text: &str) -> Option<u32> {
    YEARS_PATTERN
        .captures_iter(text)
        .flat_map(|caps| {
            [caps.get(1), caps.get(2)]
                .into_iter()
                .flatten()
                .filter_map(|m| m.as_str().parse::<u32>().ok())
                .collect::<Vec<_>>()
        })
        .filter(|years| *years <= MAX_PLAUSIBLE_YEARS)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_takes_upper_bound() {
        assert_eq!(extract_years_of_experience("(3) - 5+ years"), Some(5));
        assert_eq!(extract_years_of_experience("5 to 7 years of React"), Some(7));
    }

    #[test]
    fn test_out_of_range_upper_bound_falls_back() {
        assert_eq!(extract_years_of_experience("3 - 50 years"), Some(3));
    }

    #[test]
    fn test_single_values() {
        assert_eq!(extract_years_of_experience("Requires 7 years"), Some(7));
        assert_eq!(extract_years_of_experience("1 year of TypeScript"), Some(1));
        assert_eq!(extract_years_of_experience("50 years"), None);
        assert_eq!(extract_years_of_experience("no experience mentioned"), None);
    }

    #[test]
    fn test_maximum_across_mentions() {
        let text = "2+ years with CSS and 4 YEARS with JavaScript; founded 100 years ago";
        assert_eq!(extract_years_of_experience(text), Some(4));
    }
}
