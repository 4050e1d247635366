pub mod answers;
pub mod easy_apply;
pub mod listing_scanner;

pub use answers::{pick_option, AnswerBook, ANSWER_RULES};
pub use easy_apply::{EasyApplyFlow, EasyApplyOutcome, EscalationPolicy, FormState};
pub use listing_scanner::{ListingScanner, ScannedPosting};
