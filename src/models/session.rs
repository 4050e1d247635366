//! 单次运行内的会话状态
//!
//! 只存在于内存中，进程重启后清空。

use std::collections::HashSet;
use std::fmt;

/// 编排层持有的可变会话状态
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// 本次运行中因公司简介命中坏词而拉黑的公司
    pub blacklisted_companies: HashSet<String>,
    /// 本次运行中已被拒绝的职位 ID
    pub rejected_jobs: HashSet<String>,
    /// 下一次投递是否需要重新上传简历
    pub use_new_resume: bool,
    /// 提交前是否暂停等待确认（操作员可以在运行中关闭）
    pub pause_before_submit: bool,
}

impl SessionState {
    pub fn new(pause_before_submit: bool) -> Self {
        Self {
            use_new_resume: true,
            pause_before_submit,
            ..Default::default()
        }
    }

    pub fn reject(&mut self, job_id: &str) {
        self.rejected_jobs.insert(job_id.to_string());
    }

    pub fn blacklist_company(&mut self, company: &str) {
        self.blacklisted_companies.insert(company.to_string());
    }
}

/// 运行统计，仅用于展示
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub easy_applied: usize,
    pub external_collected: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SessionStats {
    pub fn applied(&self) -> usize {
        self.easy_applied + self.external_collected
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Easy Apply {} | 外部链接 {} | 失败 {} | 跳过 {}",
            self.easy_applied, self.external_collected, self.failed, self.skipped
        )
    }
}
