use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::core::{CommitId, LaneIdx};
use crate::error::LayoutError;
use super::entry::GraphEntry;

/// Check `entry` against the row it continues.
///
/// - every lane leaving `previous` enters `entry` exactly once, at the same column
/// - columns leaving `entry` are dense, `0..k`
/// - all lines leaving through one column share lineage and target
/// - a lineage leaves through at most one column
pub fn validate(previous: Option<&GraphEntry>, entry: &GraphEntry) -> Result<(), LayoutError> {
    check_continuity(previous, entry)?;

    let columns = open_columns(entry)?;

    if columns.keys().enumerate().any(|(i, &column)| i != column) {
        return Err(LayoutError::SparseColumns {
            columns: columns.keys().copied().collect(),
        });
    }

    let mut owners: BTreeMap<usize, LaneIdx> = BTreeMap::new();
    for (&column, &(branch_index, _)) in &columns {
        if let Some(&first) = owners.get(&branch_index) {
            return Err(LayoutError::DuplicateBranch {
                branch_index,
                first,
                second: column,
            });
        }
        owners.insert(branch_index, column);
    }

    Ok(())
}

fn check_continuity(previous: Option<&GraphEntry>, entry: &GraphEntry) -> Result<(), LayoutError> {
    let expected: Vec<LaneIdx> = previous
        .map(|p| p.lanes_to_continue().iter().map(|l| l.end_index).collect())
        .unwrap_or_default();

    let mut found: Vec<LaneIdx> = entry
        .lines
        .iter()
        .filter(|l| !l.starts_from_this_revision)
        .map(|l| l.start_index)
        .collect();
    found.sort_unstable();

    if found != expected {
        return Err(LayoutError::Discontinuity { expected, found });
    }
    Ok(())
}

/// Open column -> (branch index, target) of the lines leaving through it
fn open_columns(entry: &GraphEntry) -> Result<BTreeMap<LaneIdx, (usize, Option<&CommitId>)>, LayoutError> {
    let mut columns = BTreeMap::new();

    for line in entry.open_lines() {
        let lane = (line.branch_index, line.parent_id.as_ref());
        match columns.entry(line.end_index) {
            Entry::Occupied(existing) if *existing.get() != lane => {
                return Err(LayoutError::ColumnConflict {
                    column: line.end_index,
                });
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(lane);
            }
        }
    }

    Ok(columns)
}
