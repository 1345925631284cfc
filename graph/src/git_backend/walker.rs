use anyhow::{bail, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use git2::{Commit, ErrorCode, Repository, RepositoryState, Sort, StatusOptions};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::core::{CommitId, CommitRef, RefLabel};
use super::status::WorkingDirectoryStatus;

/// Ref namespaces left out of the history by default
pub const DEFAULT_EXCLUDED_REFS: &[&str] = &["refs/stash"];

/// Commit source backed by a git2 repository
pub struct GitWalker {
    repo: Repository,
    excluded_refs: Vec<String>,
}

impl GitWalker {
    pub fn new(repo_path: Option<&Path>) -> Result<Self> {
        let repo = match repo_path {
            Some(path) => Repository::open(path),
            None => Repository::open_from_env(),
        }.context("Failed to open repository")?;

        Ok(Self {
            repo,
            excluded_refs: DEFAULT_EXCLUDED_REFS.iter().map(|r| r.to_string()).collect(),
        })
    }

    /// Replace the excluded ref prefixes
    pub fn exclude_refs<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_refs = prefixes.into_iter().map(Into::into).collect();
        self
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.excluded_refs.iter().any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// Every commit reachable from HEAD and the non-excluded refs, newest
    /// first by committer time, then by author time.
    pub fn commits(&self, limit: Option<usize>) -> Result<Vec<CommitRef>> {
        let labels = self.get_labels()?;
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        let mut tips = 0;
        if let Ok(head) = self.repo.head() {
            if let Ok(commit) = head.peel_to_commit() {
                revwalk.push(commit.id())?;
                tips += 1;
            }
        }

        for reference in self.repo.references()? {
            let reference = reference?;
            let Some(name) = reference.name() else { continue };

            if self.is_excluded(name) {
                debug!(name, "skipping excluded ref");
                continue;
            }

            match reference.peel_to_commit() {
                Ok(commit) => {
                    revwalk.push(commit.id())?;
                    tips += 1;
                }
                Err(_) => debug!(name, "ref does not lead to a commit"),
            }
        }

        if tips == 0 {
            return Ok(Vec::new());
        }

        // The limit only applies after sorting: a commit far down the walk can still
        // have the newest committer time, so the whole reachable history is read.
        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(self.commit_to_ref(&commit, &labels)?);
        }

        // stable, so equal timestamps keep the topological order of the walk
        commits.sort_by(|a, b| {
            b.commit_time
                .cmp(&a.commit_time)
                .then_with(|| b.author_time.cmp(&a.author_time))
        });

        if let Some(limit) = limit {
            commits.truncate(limit);
        }

        debug!(count = commits.len(), tips, "collected commits");
        Ok(commits)
    }

    /// Convert a git2::Commit to CommitRef
    fn commit_to_ref(
        &self,
        commit: &Commit,
        labels: &HashMap<CommitId, Vec<RefLabel>>,
    ) -> Result<CommitRef> {
        let id = commit.id().to_string();
        let parents: Vec<String> = commit.parent_ids().map(|oid| oid.to_string()).collect();

        let author = commit.author();
        let author_time = to_utc(author.when().seconds())?;
        let commit_time = to_utc(commit.time().seconds())?;

        let node = CommitRef::new(
            id.clone(),
            parents,
            commit_time,
            author.name().unwrap_or("Unknown").to_string(),
            commit.summary().unwrap_or("").to_string(),
        )
        .with_email(author.email().unwrap_or(""))
        .with_times(author_time, commit_time)
        .with_labels(labels.get(&id).cloned().unwrap_or_default());

        Ok(node)
    }

    /// Branch tips (local and remote) and tags, keyed by the commit they point at
    pub fn get_labels(&self) -> Result<HashMap<CommitId, Vec<RefLabel>>> {
        let mut labels: HashMap<CommitId, Vec<RefLabel>> = HashMap::new();

        for branch in self.repo.branches(None)? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                if let Some(target) = branch.get().target() {
                    labels
                        .entry(target.to_string())
                        .or_default()
                        .push(RefLabel::branch(name));
                }
            }
        }

        for reference in self.repo.references_glob("refs/tags/*")? {
            let reference = reference?;
            let Some(name) = reference.shorthand() else { continue };

            match reference.peel_to_commit() {
                Ok(commit) => labels
                    .entry(commit.id().to_string())
                    .or_default()
                    .push(RefLabel::tag(name)),
                Err(_) => debug!(name, "tag does not lead to a commit"),
            }
        }

        Ok(labels)
    }

    /// Get HEAD commit, `None` on an unborn branch
    pub fn get_head(&self) -> Result<Option<CommitId>> {
        match self.repo.head() {
            Ok(head) => {
                let commit = head.peel_to_commit().context("HEAD does not point at a commit")?;
                Ok(Some(commit.id().to_string()))
            }
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e).context("Failed to resolve HEAD"),
        }
    }

    /// Staged and unstaged changes against HEAD. Ignored files are left out.
    pub fn working_directory_status(&self) -> Result<WorkingDirectoryStatus> {
        if self.repo.is_bare() {
            return Ok(WorkingDirectoryStatus::default());
        }

        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .include_ignored(false)
            .recurse_untracked_dirs(true);

        let statuses = self
            .repo
            .statuses(Some(&mut options))
            .context("Failed to read working directory status")?;

        Ok(WorkingDirectoryStatus::from_statuses(&statuses))
    }

    pub fn has_uncommitted_changes(&self) -> Result<bool> {
        Ok(self.working_directory_status()?.has_content())
    }

    /// Refuse to read history while another git operation is half done
    pub fn ensure_idle(&self) -> Result<()> {
        match self.repo.state() {
            RepositoryState::Clean => Ok(()),
            state => bail!("Waiting for external Git operation to complete ({:?})", state),
        }
    }
}

fn to_utc(seconds: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .context("Invalid commit timestamp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LabelKind;
    use crate::git_backend::{FileState, FileStatus};
    use git2::{Oid, Signature, Time};
    use tempfile::TempDir;

    fn create_test_repo() -> Result<(TempDir, Repository)> {
        let dir = TempDir::new()?;
        let repo = Repository::init(dir.path())?;

        // Configure repo
        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;

        Ok((dir, repo))
    }

    fn commit_at(
        repo: &Repository,
        message: &str,
        parents: &[Oid],
        update_ref: Option<&str>,
        seconds: i64,
    ) -> Result<Oid> {
        let sig = Signature::new("Test User", "test@example.com", &Time::new(seconds, 0))?;
        let tree_id = {
            let mut index = repo.index()?;
            index.write_tree()?
        };
        let tree = repo.find_tree(tree_id)?;
        let parents: Vec<Commit> = parents
            .iter()
            .map(|oid| repo.find_commit(*oid))
            .collect::<std::result::Result<_, _>>()?;
        let parent_refs: Vec<&Commit> = parents.iter().collect();

        Ok(repo.commit(update_ref, &sig, &sig, message, &tree, &parent_refs)?)
    }

    fn ids(commits: &[CommitRef]) -> Vec<String> {
        commits.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_linear_history_newest_first() -> Result<()> {
        let (dir, repo) = create_test_repo()?;

        let c1 = commit_at(&repo, "First commit", &[], Some("HEAD"), 100)?;
        let c2 = commit_at(&repo, "Second commit", &[c1], Some("HEAD"), 200)?;
        let c3 = commit_at(&repo, "Third commit", &[c2], Some("HEAD"), 300)?;

        let walker = GitWalker::new(Some(dir.path()))?;
        let commits = walker.commits(None)?;

        assert_eq!(ids(&commits), vec![c3.to_string(), c2.to_string(), c1.to_string()]);
        assert_eq!(commits[0].parents, vec![c2.to_string()]);
        assert!(commits[2].is_root());
        assert_eq!(commits[0].message, "Third commit");
        assert_eq!(commits[0].email, "test@example.com");
        assert_eq!(commits[0].commit_time.timestamp(), 300);

        Ok(())
    }

    #[test]
    fn test_branches_interleave_by_commit_time() -> Result<()> {
        let (dir, repo) = create_test_repo()?;

        let base = commit_at(&repo, "Base", &[], Some("HEAD"), 100)?;
        let main = commit_at(&repo, "Main", &[base], Some("HEAD"), 200)?;
        let feature = commit_at(&repo, "Feature", &[base], Some("refs/heads/feature"), 300)?;

        let walker = GitWalker::new(Some(dir.path()))?;
        let commits = walker.commits(None)?;

        assert_eq!(
            ids(&commits),
            vec![feature.to_string(), main.to_string(), base.to_string()]
        );

        let limited = walker.commits(Some(2))?;
        assert_eq!(ids(&limited), vec![feature.to_string(), main.to_string()]);

        Ok(())
    }

    #[test]
    fn test_stash_is_excluded_by_default() -> Result<()> {
        let (dir, repo) = create_test_repo()?;

        let base = commit_at(&repo, "Base", &[], Some("HEAD"), 100)?;
        let stash = commit_at(&repo, "WIP", &[base], None, 200)?;
        repo.reference("refs/stash", stash, true, "stash")?;

        let walker = GitWalker::new(Some(dir.path()))?;
        assert_eq!(ids(&walker.commits(None)?), vec![base.to_string()]);

        let walker = walker.exclude_refs(Vec::<String>::new());
        assert_eq!(
            ids(&walker.commits(None)?),
            vec![stash.to_string(), base.to_string()]
        );

        Ok(())
    }

    #[test]
    fn test_labels_for_branches_and_tags() -> Result<()> {
        let (dir, repo) = create_test_repo()?;

        let base = commit_at(&repo, "Base", &[], Some("HEAD"), 100)?;
        let tip = commit_at(&repo, "Tip", &[base], Some("HEAD"), 200)?;
        let base_commit = repo.find_commit(base)?;
        let sig = Signature::new("Test User", "test@example.com", &Time::new(150, 0))?;
        repo.tag("v1.0", base_commit.as_object(), &sig, "release", false)?;
        repo.tag_lightweight("light", base_commit.as_object(), false)?;

        let head_name = repo.head()?.shorthand().unwrap_or_default().to_string();

        let walker = GitWalker::new(Some(dir.path()))?;
        let commits = walker.commits(None)?;

        assert_eq!(commits[0].id, tip.to_string());
        assert_eq!(commits[0].labels, vec![RefLabel::branch(head_name)]);

        let mut tags: Vec<_> = commits[1]
            .labels
            .iter()
            .filter(|l| l.kind == LabelKind::Tag)
            .map(|l| l.name.clone())
            .collect();
        tags.sort();
        assert_eq!(tags, vec!["light".to_string(), "v1.0".to_string()]);

        Ok(())
    }

    #[test]
    fn test_head_and_working_directory_state() -> Result<()> {
        let (dir, repo) = create_test_repo()?;

        let walker = GitWalker::new(Some(dir.path()))?;
        assert_eq!(walker.get_head()?, None);
        assert!(walker.commits(None)?.is_empty());

        let c1 = commit_at(&repo, "First commit", &[], Some("HEAD"), 100)?;
        assert_eq!(walker.get_head()?, Some(c1.to_string()));
        assert!(!walker.has_uncommitted_changes()?);

        std::fs::write(dir.path().join("notes.txt"), "pending")?;
        assert!(walker.has_uncommitted_changes()?);

        Ok(())
    }

    #[test]
    fn test_status_splits_staged_and_unstaged() -> Result<()> {
        let (dir, repo) = create_test_repo()?;

        std::fs::write(dir.path().join("tracked.txt"), "one")?;
        std::fs::write(dir.path().join("gone.txt"), "two")?;
        let mut index = repo.index()?;
        index.add_path(Path::new("tracked.txt"))?;
        index.add_path(Path::new("gone.txt"))?;
        index.write()?;
        commit_at(&repo, "First commit", &[], Some("HEAD"), 100)?;

        std::fs::write(dir.path().join("staged.txt"), "new")?;
        index.add_path(Path::new("staged.txt"))?;
        index.write()?;
        std::fs::write(dir.path().join("tracked.txt"), "one, edited")?;
        std::fs::remove_file(dir.path().join("gone.txt"))?;
        std::fs::write(dir.path().join("scratch.txt"), "untracked")?;

        let walker = GitWalker::new(Some(dir.path()))?;
        let status = walker.working_directory_status()?;

        let file = |path: &str, state| FileStatus { path: path.to_string(), state };
        assert_eq!(status.staged, vec![file("staged.txt", FileState::Added)]);
        assert_eq!(
            status.unstaged,
            vec![
                file("tracked.txt", FileState::Modified),
                file("gone.txt", FileState::Missing),
                file("scratch.txt", FileState::Untracked),
            ]
        );
        assert!(walker.has_uncommitted_changes()?);

        Ok(())
    }

    #[test]
    fn test_refuses_while_merge_in_progress() -> Result<()> {
        let (dir, repo) = create_test_repo()?;

        let c1 = commit_at(&repo, "First commit", &[], Some("HEAD"), 100)?;
        let walker = GitWalker::new(Some(dir.path()))?;
        walker.ensure_idle()?;

        std::fs::write(repo.path().join("MERGE_HEAD"), format!("{}\n", c1))?;
        assert!(walker.ensure_idle().is_err());

        Ok(())
    }
}
