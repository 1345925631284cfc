use thiserror::Error;

use crate::core::LaneIdx;

/// A produced row broke one of the lane invariants. Every later row would
/// inherit the damage, so the engine refuses to continue from it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("lane continuity broken: previous row left columns {expected:?}, this row continues {found:?}")]
    Discontinuity {
        expected: Vec<LaneIdx>,
        found: Vec<LaneIdx>,
    },

    #[error("open columns are not dense: {columns:?}")]
    SparseColumns { columns: Vec<LaneIdx> },

    #[error("column {column} carries lines of different lineages or targets")]
    ColumnConflict { column: LaneIdx },

    #[error("branch {branch_index} is open in columns {first} and {second}")]
    DuplicateBranch {
        branch_index: usize,
        first: LaneIdx,
        second: LaneIdx,
    },

    #[error("working directory row must come first, {rows} rows already emitted")]
    WorkingDirectoryNotFirst { rows: usize },
}
