//! # Job Apply Agent
//!
//! 在 LinkedIn 上搜索职位、按规则过滤并自动投递的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Browser、Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() 能力
//! - `JobBoard` / `LinkedInBoard` - 页面上的原子动作（读卡片、点按钮、填表单）
//! - `Operator` - 人工介入（终端 / 无人值守）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ApplicationLedger` - 成功 / 失败记录（CSV）
//! - `DescriptionArchive` - 职位描述归档
//! - `ResumeRewriter` - 基于 LLM 的简历改写
//! - `filter/` - 纯函数过滤链
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个职位"的处理流程
//! - `ListingScanner` - 逐张读取列表卡片、翻页、处理失效
//! - `EasyApplyFlow` - Easy Apply 表单状态机
//! - `AnswerBook` - 表单问题答案表
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 应用入口，管理资源
//! - `orchestrator/pipeline` - 搜索词轮换与逐个职位处理
//!
//! ## 模块结构

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use filter::{FilterChain, FilterVerdict};
pub use infrastructure::{JobBoard, JsExecutor, Operator};
pub use models::{JobPosting, SessionState};
pub use orchestrator::{ApplicationAttemptResult, ApplyPipeline, App};
pub use workflow::{EasyApplyFlow, ListingScanner};
