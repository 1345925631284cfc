use chrono::{DateTime, Utc};
use serde::Serialize;

/// Hex object id of a commit
pub type CommitId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    Branch,
    Tag,
}

/// A branch or tag name pointing at a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefLabel {
    pub name: String,
    pub kind: LabelKind,
}

impl RefLabel {
    pub fn branch(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: LabelKind::Branch }
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: LabelKind::Tag }
    }
}

/// A commit as delivered by the commit source, in traversal order
#[derive(Debug, Clone, Serialize)]
pub struct CommitRef {
    /// Unique commit ID (SHA)
    pub id: CommitId,
    /// Parent commit IDs; the first one is the mainline
    pub parents: Vec<CommitId>,
    pub author: String,
    pub email: String,
    pub author_time: DateTime<Utc>,
    pub commit_time: DateTime<Utc>,
    /// Commit message (short)
    pub message: String,
    /// Branch tips and tags at this commit
    pub labels: Vec<RefLabel>,
}

impl CommitRef {
    pub fn new(
        id: CommitId,
        parents: Vec<CommitId>,
        timestamp: DateTime<Utc>,
        author: String,
        message: String,
    ) -> Self {
        Self {
            id,
            parents,
            author,
            email: String::new(),
            author_time: timestamp,
            commit_time: timestamp,
            message,
            labels: Vec::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_times(mut self, author_time: DateTime<Utc>, commit_time: DateTime<Utc>) -> Self {
        self.author_time = author_time;
        self.commit_time = commit_time;
        self
    }

    pub fn with_labels(mut self, labels: Vec<RefLabel>) -> Self {
        self.labels = labels;
        self
    }

    pub fn first_parent(&self) -> Option<&CommitId> {
        self.parents.first()
    }

    /// Parents beyond the first, i.e. the merged-in lineages
    pub fn extra_parents(&self) -> &[CommitId] {
        self.parents.get(1..).unwrap_or(&[])
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}
