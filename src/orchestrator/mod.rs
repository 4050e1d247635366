//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整次运行的调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行、清理）
//! - 管理浏览器资源（Browser、JsExecutor）
//! - 选择人工介入方式和简历改写实现
//!
//! ### `pipeline` - 投递流水线
//! - 按轮次遍历搜索词，轮换发布时间和排序
//! - 对每个职位执行过滤、投递、记录
//! - 输出运行统计
//!
//! ## 层次关系
//!
//! ```text
//! app (资源与生命周期)
//!     ↓
//! pipeline (搜索词 → 职位)
//!     ↓
//! workflow (ListingScanner / EasyApplyFlow)
//!     ↓
//! services (ledger / archive / resume) + filter
//!     ↓
//! infrastructure (JobBoard / Operator / JsExecutor)
//! ```

pub mod app;
pub mod pipeline;

// 重新导出主要类型
pub use app::App;
pub use pipeline::{next_rotation, ApplicationAttemptResult, ApplyPipeline, RunSummary};
