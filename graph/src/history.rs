//! Chains the commit source into the layout engine: an optional
//! uncommitted-changes row first, then one row per commit.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::core::CommitRef;
use crate::git_backend::GitWalker;
use crate::layout::{GraphEntry, LayoutEngine};

pub const WORKING_DIRECTORY_MESSAGE: &str = "Uncommitted changes";

/// One line of the history view
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEntry {
    WorkingDirectory { graph: GraphEntry, has_changes: bool },
    Revision { commit: CommitRef, graph: GraphEntry },
}

impl LogEntry {
    pub fn graph(&self) -> &GraphEntry {
        match self {
            LogEntry::WorkingDirectory { graph, .. } | LogEntry::Revision { graph, .. } => graph,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LogEntry::WorkingDirectory { .. } => WORKING_DIRECTORY_MESSAGE,
            LogEntry::Revision { commit, .. } => &commit.message,
        }
    }

    pub fn commit(&self) -> Option<&CommitRef> {
        match self {
            LogEntry::Revision { commit, .. } => Some(commit),
            LogEntry::WorkingDirectory { .. } => None,
        }
    }
}

/// Builder for the laid-out history of a repository
pub struct HistoryBuilder {
    walker: GitWalker,
    max_count: Option<usize>,
    include_working_directory: bool,
    show_clean_working_directory: bool,
}

impl HistoryBuilder {
    pub fn new(repo_path: &Path) -> Result<Self> {
        Ok(Self::from_walker(GitWalker::new(Some(repo_path))?))
    }

    pub fn from_walker(walker: GitWalker) -> Self {
        Self {
            walker,
            max_count: None,
            include_working_directory: true,
            show_clean_working_directory: true,
        }
    }

    /// Set maximum number of commits to load
    pub fn max_count(mut self, count: usize) -> Self {
        self.max_count = Some(count);
        self
    }

    /// Replace the ref prefixes whose commits are left out
    pub fn exclude_refs<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.walker = self.walker.exclude_refs(prefixes);
        self
    }

    /// Set whether to lead with the uncommitted-changes row
    pub fn include_working_directory(mut self, include: bool) -> Self {
        self.include_working_directory = include;
        self
    }

    /// Set whether the uncommitted-changes row is kept when nothing is pending
    pub fn show_clean_working_directory(mut self, show: bool) -> Self {
        self.show_clean_working_directory = show;
        self
    }

    /// Build the history
    pub fn build(&self) -> Result<Vec<LogEntry>> {
        self.walker.ensure_idle()?;

        let commits = self.walker.commits(self.max_count)?;
        let mut engine = LayoutEngine::new();
        let mut entries = Vec::with_capacity(commits.len() + 1);

        if let Some(head) = self.walker.get_head()? {
            let has_changes = self.include_working_directory && self.walker.has_uncommitted_changes()?;

            if self.include_working_directory && (has_changes || self.show_clean_working_directory) {
                let graph = engine.push_working_directory(&head, has_changes)?;
                entries.push(LogEntry::WorkingDirectory { graph, has_changes });
            } else {
                engine.track_checkout(&head);
            }
        }

        for commit in commits {
            let graph = engine
                .push(&commit)
                .with_context(|| format!("Failed to lay out commit {}", commit.id))?;
            entries.push(LogEntry::Revision { commit, graph });
        }

        info!(rows = entries.len(), "history laid out");
        Ok(entries)
    }
}
