use tracing::{error, trace};

use crate::core::{CommitId, CommitRef, LaneIdx};
use crate::error::LayoutError;
use super::check::validate;
use super::entry::{GraphEntry, GraphLine};
use super::palette::color_for;

/// Compute the row for `commit` from the row above it.
///
/// `previous` is `None` only for the topmost row. The result depends on nothing
/// but its two arguments, so replaying a commit sequence always yields the same rows.
pub fn compute(previous: Option<&GraphEntry>, commit: &CommitRef) -> GraphEntry {
    let mut entry = match previous {
        None => first_entry(commit),
        Some(previous) => continued_entry(previous, commit),
    };

    add_new_branches(commit, &mut entry);
    entry
}

/// The synthetic uncommitted-changes row, whose single lane heads for the checked-out commit.
pub fn working_directory_entry(head: &CommitId, has_changes: bool) -> GraphEntry {
    let mut entry = GraphEntry::new(None, color_for(0));
    entry.is_first = true;
    entry.is_current = has_changes;
    entry.lines.push(GraphLine {
        start_index: 0,
        end_index: 0,
        starts_from_this_revision: true,
        ends_in_this_revision: false,
        branch_index: 0,
        color: color_for(0),
        parent_id: Some(head.clone()),
    });
    entry
}

fn first_entry(commit: &CommitRef) -> GraphEntry {
    let mut entry = GraphEntry::new(Some(commit.id.clone()), color_for(0));
    entry.is_first = true;
    entry.lines.push(GraphLine {
        start_index: 0,
        end_index: 0,
        starts_from_this_revision: true,
        ends_in_this_revision: commit.is_root(),
        branch_index: 0,
        color: color_for(0),
        parent_id: commit.first_parent().cloned(),
    });
    entry
}

fn continued_entry(previous: &GraphEntry, commit: &CommitRef) -> GraphEntry {
    let mut entry = GraphEntry::new(Some(commit.id.clone()), color_for(0));

    if continue_previous_lines(previous, commit, &mut entry).is_none() {
        start_new_lineage(commit, &mut entry);
    }

    entry
}

/// Carry every lane leaving `previous` through this row. Lanes waiting for
/// `commit` bend into its marker; the first of them places the marker.
///
/// Returns the marker column, or `None` when no lane was waiting for the commit.
fn continue_previous_lines(
    previous: &GraphEntry,
    commit: &CommitRef,
    entry: &mut GraphEntry,
) -> Option<LaneIdx> {
    let mut marker: Option<LaneIdx> = None;

    for lane in previous.lanes_to_continue() {
        let column = lane.end_index;

        if lane.parent_id.as_ref() == Some(&commit.id) {
            let revision_index = match marker {
                Some(index) => index,
                None => {
                    entry.revision_index = column;
                    entry.revision_color = lane.color;
                    marker = Some(column);
                    column
                }
            };

            entry.lines.push(GraphLine {
                start_index: column,
                end_index: revision_index,
                starts_from_this_revision: false,
                ends_in_this_revision: column != revision_index || commit.is_root(),
                branch_index: lane.branch_index,
                color: lane.color,
                parent_id: commit.first_parent().cloned(),
            });
        } else {
            let end_index = entry.open_lines().count();
            entry.lines.push(GraphLine {
                start_index: column,
                end_index,
                starts_from_this_revision: false,
                ends_in_this_revision: false,
                branch_index: lane.branch_index,
                color: lane.color,
                parent_id: lane.parent_id.clone(),
            });
        }
    }

    marker
}

/// A commit nobody above was waiting for (a branch tip that sorts below other
/// history) opens a lane of its own to the right of the existing ones.
fn start_new_lineage(commit: &CommitRef, entry: &mut GraphEntry) {
    let column = entry.open_lane_count();
    let branch_index = next_branch_index(entry);

    entry.revision_index = column;
    entry.revision_color = color_for(branch_index);

    if let Some(parent) = commit.first_parent() {
        entry.lines.push(GraphLine {
            start_index: column,
            end_index: column,
            starts_from_this_revision: true,
            ends_in_this_revision: false,
            branch_index,
            color: color_for(branch_index),
            parent_id: Some(parent.clone()),
        });
    }
}

/// Route every parent beyond the first out of the marker. A parent some open
/// lane already heads for joins that lane instead of opening a new one.
fn add_new_branches(commit: &CommitRef, entry: &mut GraphEntry) {
    let mut branch_index = next_branch_index(entry);

    for parent in commit.extra_parents() {
        let existing = entry
            .open_lines()
            .find(|l| l.parent_id.as_ref() == Some(parent))
            .map(|l| (l.branch_index, l.end_index));

        let (current_branch, end_index) = match existing {
            Some(found) => found,
            None => {
                let allocated = (branch_index, entry.open_lane_count());
                branch_index += 1;
                allocated
            }
        };

        entry.lines.push(GraphLine {
            start_index: entry.revision_index,
            end_index,
            starts_from_this_revision: true,
            ends_in_this_revision: false,
            branch_index: current_branch,
            color: color_for(current_branch),
            parent_id: Some(parent.clone()),
        });
    }
}

fn next_branch_index(entry: &GraphEntry) -> usize {
    entry.max_branch_index().map_or(0, |max| max + 1)
}

#[derive(Debug, Clone)]
struct Checkout {
    head: CommitId,
    /// `Some(has_changes)` when the uncommitted-changes row was emitted
    working_directory: Option<bool>,
}

/// Streaming driver around [`compute`]: feeds each row the one before it and
/// refuses to build on a row that breaks the lane invariants.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    previous: Option<GraphEntry>,
    checkout: Option<Checkout>,
    rows: usize,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit the uncommitted-changes row. Only allowed before any other row.
    ///
    /// Remembers `head` so its row is later marked current (and topmost) when
    /// the working directory is clean. Use [`LayoutEngine::track_checkout`]
    /// instead when the row is not going to be shown.
    pub fn push_working_directory(
        &mut self,
        head: &CommitId,
        has_changes: bool,
    ) -> Result<GraphEntry, LayoutError> {
        if self.rows > 0 {
            return Err(LayoutError::WorkingDirectoryNotFirst { rows: self.rows });
        }

        self.checkout = Some(Checkout {
            head: head.clone(),
            working_directory: Some(has_changes),
        });
        self.accept(working_directory_entry(head, has_changes))
    }

    /// Mark the row of `head` current without emitting an uncommitted-changes
    /// row above it. That row keeps its topmost flag only if it is the first row.
    pub fn track_checkout(&mut self, head: &CommitId) {
        self.checkout = Some(Checkout {
            head: head.clone(),
            working_directory: None,
        });
    }

    pub fn push(&mut self, commit: &CommitRef) -> Result<GraphEntry, LayoutError> {
        let mut entry = compute(self.previous.as_ref(), commit);

        if let Some(checkout) = &self.checkout {
            if checkout.head == commit.id {
                match checkout.working_directory {
                    Some(has_changes) => {
                        entry.is_current = !has_changes;
                        entry.is_first = !has_changes;
                    }
                    None => entry.is_current = true,
                }
            }
        }

        self.accept(entry)
    }

    /// Row most recently emitted
    pub fn previous(&self) -> Option<&GraphEntry> {
        self.previous.as_ref()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    fn accept(&mut self, entry: GraphEntry) -> Result<GraphEntry, LayoutError> {
        if let Err(err) = validate(self.previous.as_ref(), &entry) {
            error!(row = self.rows, revision = ?entry.revision_id, %err, "lane layout invariant violated");
            return Err(err);
        }

        trace!(
            row = self.rows,
            revision = ?entry.revision_id,
            column = entry.revision_index,
            lines = entry.lines.len(),
            "row laid out"
        );

        self.rows += 1;
        self.previous = Some(entry.clone());
        Ok(entry)
    }
}
