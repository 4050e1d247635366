pub mod job_board;
pub mod js_executor;
pub mod linkedin_board;
pub mod operator;

pub use job_board::JobBoard;
pub use js_executor::JsExecutor;
pub use linkedin_board::LinkedInBoard;
pub use operator::{ConsoleOperator, HeadlessOperator, Operator, ReviewDecision};
