pub mod status;
pub mod walker;

pub use status::{FileState, FileStatus, WorkingDirectoryStatus};
pub use walker::{GitWalker, DEFAULT_EXCLUDED_REFS};
