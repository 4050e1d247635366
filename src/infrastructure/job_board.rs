//! 招聘网站能力抽象 - 基础设施层
//!
//! 流程层只通过这个 trait 操作页面，测试中可以用假实现替换浏览器。
//! 所有方法都对应页面上的一个原子动作；重试策略由调用方决定。

use std::path::Path;

use async_trait::async_trait;

use crate::error::DomError;
use crate::models::{FormField, JobCard, SearchQuery};

#[async_trait]
pub trait JobBoard: Send + Sync {
    // ========== 会话 ==========

    async fn is_logged_in(&self) -> Result<bool, DomError>;

    /// 恢复 cookie 或使用账号密码登录，返回最终是否已登录
    async fn ensure_logged_in(&self) -> Result<bool, DomError>;

    /// 打开搜索结果页
    async fn open_search(&self, query: &SearchQuery) -> Result<(), DomError>;

    // ========== 列表页 ==========

    /// 等待列表加载后返回当前页的卡片数量
    async fn job_card_count(&self) -> Result<usize, DomError>;

    /// 读取第 `index` 张卡片；卡片已不存在时返回 `DomError::Stale`
    async fn read_job_card(&self, index: usize) -> Result<JobCard, DomError>;

    /// 点击卡片，在右侧打开详情
    async fn open_job_card(&self, index: usize) -> Result<(), DomError>;

    /// 分页控件上当前激活的页码，找不到分页控件时返回 `None`
    async fn active_page(&self) -> Result<Option<u32>, DomError>;

    /// 跳转到指定页码，页码按钮不存在时返回 `false`
    async fn goto_page(&self, page: u32) -> Result<bool, DomError>;

    // ========== 详情 ==========

    async fn about_company_text(&self) -> Result<Option<String>, DomError>;

    async fn description_text(&self) -> Result<Option<String>, DomError>;

    /// "2 weeks ago" 之类的发布时间文本
    async fn posted_time_text(&self) -> Result<Option<String>, DomError>;

    // ========== 投递 ==========

    async fn has_easy_apply(&self) -> Result<bool, DomError>;

    async fn open_easy_apply(&self) -> Result<(), DomError>;

    /// 点击外部投递按钮，读取新标签页的 URL 后回到原页面
    async fn capture_external_link(&self, close_tab: bool) -> Result<String, DomError>;

    /// 弹窗当前页上的问题
    async fn form_fields(&self) -> Result<Vec<FormField>, DomError>;

    async fn fill_field(&self, field: &FormField, answer: &str) -> Result<(), DomError>;

    /// 当前页没有文件上传控件时返回 `false`
    async fn upload_resume(&self, path: &Path) -> Result<bool, DomError>;

    /// 是否已经到达 "Review" 步骤
    async fn has_review(&self) -> Result<bool, DomError>;

    async fn click_next(&self) -> Result<(), DomError>;

    async fn click_review(&self) -> Result<(), DomError>;

    /// 提交按钮在超时内始终不可点击时返回 `false`
    async fn click_submit(&self) -> Result<bool, DomError>;

    /// 关闭弹窗并放弃本次填写
    async fn discard_application(&self) -> Result<(), DomError>;

    /// 释放浏览器会话
    async fn close(&self) -> Result<(), DomError>;
}
