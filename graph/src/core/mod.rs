pub mod commit;

pub use commit::{CommitId, CommitRef, LabelKind, RefLabel};

/// A lane represents a vertical column in the graph
pub type LaneIdx = usize;
