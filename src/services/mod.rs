pub mod description_archive;
pub mod ledger;
pub mod resume_rewriter;

pub use description_archive::{ArchiveStatus, DescriptionArchive};
pub use ledger::{ApplicationLedger, LedgerEntry};
pub use resume_rewriter::{NoTailor, ResumeRewriter, ResumeTailor};
