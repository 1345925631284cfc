use git2::{Status, Statuses};
use serde::Serialize;

/// What happened to a file, in listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    Modified,
    Added,
    Removed,
    Missing,
    Renamed,
    Untracked,
    Conflicted,
}

impl FileState {
    pub fn label(self) -> &'static str {
        match self {
            FileState::Modified => "modified",
            FileState::Added => "added",
            FileState::Removed => "removed",
            FileState::Missing => "missing",
            FileState::Renamed => "renamed",
            FileState::Untracked => "untracked",
            FileState::Conflicted => "conflicted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    pub path: String,
    pub state: FileState,
}

/// Uncommitted changes split the way `git status` does
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkingDirectoryStatus {
    /// Changes recorded in the index
    pub staged: Vec<FileStatus>,
    /// Changes only in the working directory, untracked files included
    pub unstaged: Vec<FileStatus>,
}

impl WorkingDirectoryStatus {
    pub fn from_statuses(statuses: &Statuses<'_>) -> Self {
        let mut status = Self::default();

        for entry in statuses.iter() {
            let Some(path) = entry.path() else { continue };
            let bits = entry.status();

            if let Some(state) = staged_state(bits) {
                status.staged.push(FileStatus { path: path.to_string(), state });
            }
            if let Some(state) = unstaged_state(bits) {
                status.unstaged.push(FileStatus { path: path.to_string(), state });
            }
        }

        for list in [&mut status.staged, &mut status.unstaged] {
            list.sort_by(|a, b| a.state.cmp(&b.state).then_with(|| a.path.cmp(&b.path)));
        }
        status
    }

    pub fn has_content(&self) -> bool {
        !self.staged.is_empty() || !self.unstaged.is_empty()
    }
}

fn staged_state(bits: Status) -> Option<FileState> {
    if bits.is_index_new() {
        Some(FileState::Added)
    } else if bits.is_index_deleted() {
        Some(FileState::Removed)
    } else if bits.is_index_renamed() {
        Some(FileState::Renamed)
    } else if bits.is_index_modified() || bits.is_index_typechange() {
        Some(FileState::Modified)
    } else {
        None
    }
}

// conflicts have no index side of their own, they are listed with the working directory
fn unstaged_state(bits: Status) -> Option<FileState> {
    if bits.is_conflicted() {
        Some(FileState::Conflicted)
    } else if bits.is_wt_new() {
        Some(FileState::Untracked)
    } else if bits.is_wt_deleted() {
        Some(FileState::Missing)
    } else if bits.is_wt_renamed() {
        Some(FileState::Renamed)
    } else if bits.is_wt_modified() || bits.is_wt_typechange() {
        Some(FileState::Modified)
    } else {
        None
    }
}
