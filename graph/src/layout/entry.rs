use serde::Serialize;
use smallvec::SmallVec;

use crate::core::{CommitId, LaneIdx};
use super::palette::Color;

/// One segment drawn within a single row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphLine {
    /// Lane at the top edge of the row
    pub start_index: LaneIdx,
    /// Lane at the bottom edge of the row
    pub end_index: LaneIdx,
    /// Segment begins at this row's commit marker
    pub starts_from_this_revision: bool,
    /// Segment stops at this row's commit marker
    pub ends_in_this_revision: bool,
    pub branch_index: usize,
    pub color: Color,
    /// Commit this lane is waiting to reach; `None` once the lineage has no parent
    pub parent_id: Option<CommitId>,
}

impl GraphLine {
    /// Whether the segment leaves through the bottom edge of the row
    pub fn is_open(&self) -> bool {
        !self.ends_in_this_revision
    }
}

pub type GraphLines = SmallVec<[GraphLine; 4]>;

/// Lane geometry of one row. Produced once per commit and never revisited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEntry {
    /// `None` for the uncommitted-changes row
    pub revision_id: Option<CommitId>,
    /// Lane holding the commit marker
    pub revision_index: LaneIdx,
    pub revision_color: Color,
    pub lines: GraphLines,
    /// Nothing is drawn above this row
    pub is_first: bool,
    /// Row stands for the checked-out state
    pub is_current: bool,
}

impl GraphEntry {
    pub(crate) fn new(revision_id: Option<CommitId>, revision_color: Color) -> Self {
        Self {
            revision_id,
            revision_index: 0,
            revision_color,
            lines: GraphLines::new(),
            is_first: false,
            is_current: false,
        }
    }

    /// Lines continuing into the next row
    pub fn open_lines(&self) -> impl Iterator<Item = &GraphLine> {
        self.lines.iter().filter(|l| l.is_open())
    }

    /// One representative line per occupied bottom column, ordered by column.
    /// When several lines share a column the first one emitted wins.
    pub fn lanes_to_continue(&self) -> Vec<&GraphLine> {
        let mut seen: SmallVec<[LaneIdx; 8]> = SmallVec::new();
        let mut lanes: Vec<&GraphLine> = self
            .open_lines()
            .filter(|l| {
                if seen.contains(&l.end_index) {
                    false
                } else {
                    seen.push(l.end_index);
                    true
                }
            })
            .collect();
        lanes.sort_by_key(|l| l.end_index);
        lanes
    }

    /// Number of distinct lanes leaving the row
    pub fn open_lane_count(&self) -> usize {
        self.lanes_to_continue().len()
    }

    /// Columns a renderer has to reserve for this row
    pub fn width(&self) -> usize {
        self.lines
            .iter()
            .map(|l| l.start_index.max(l.end_index) + 1)
            .max()
            .unwrap_or(0)
            .max(self.revision_index + 1)
    }

    pub fn max_branch_index(&self) -> Option<usize> {
        self.lines.iter().map(|l| l.branch_index).max()
    }
}
