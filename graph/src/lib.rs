pub mod core;
pub mod error;
pub mod git_backend;
pub mod history;
pub mod layout;

pub use self::core::{CommitId, CommitRef, LabelKind, LaneIdx, RefLabel};
pub use error::LayoutError;
pub use git_backend::{FileState, FileStatus, GitWalker, WorkingDirectoryStatus};
pub use history::{HistoryBuilder, LogEntry};
pub use layout::{compute, Color, GraphEntry, GraphLine, LayoutEngine};
