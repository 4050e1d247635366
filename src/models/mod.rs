pub mod form;
pub mod job;
pub mod search;
pub mod session;

pub use form::{FieldKind, FormField};
pub use job::{JobCard, JobPosting, WorkStyle};
pub use search::{DatePosted, SearchQuery, SortBy};
pub use session::{SessionState, SessionStats};
