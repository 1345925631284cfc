use anyhow::Result;
use graph::{FileStatus, GraphEntry, LabelKind, LogEntry};

/// Lane column for a text listing: `*` marks the commit (`@` when it is the
/// checked-out state), `|` every other lane crossing the row.
pub fn lane_column(graph: &GraphEntry) -> String {
    let mut cells = vec![' '; graph.width()];

    for line in &graph.lines {
        if !line.starts_from_this_revision {
            cells[line.start_index] = '|';
        }
        if line.is_open() {
            cells[line.end_index] = '|';
        }
    }

    cells[graph.revision_index] = if graph.is_current { '@' } else { '*' };
    cells.into_iter().collect()
}

pub fn format_entry(entry: &LogEntry) -> String {
    let lanes = lane_column(entry.graph());

    match entry.commit() {
        None => format!("{} {:>7} {}", lanes, "", entry.message()),
        Some(commit) => {
            let short = commit.id.get(..7).unwrap_or(&commit.id);
            let date = commit
                .commit_time
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M");

            let labels: Vec<String> = commit
                .labels
                .iter()
                .map(|l| match l.kind {
                    LabelKind::Branch => l.name.clone(),
                    LabelKind::Tag => format!("tag: {}", l.name),
                })
                .collect();

            if labels.is_empty() {
                format!("{} {} {} {} <{}>", lanes, short, commit.message, date, commit.author)
            } else {
                format!(
                    "{} {} ({}) {} {} <{}>",
                    lanes,
                    short,
                    labels.join(", "),
                    commit.message,
                    date,
                    commit.author
                )
            }
        }
    }
}

pub fn format_file(file: &FileStatus) -> String {
    format!("    {:<11}{}", format!("{}:", file.state.label()), file.path)
}

pub fn to_json(entries: &[LogEntry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use graph::{CommitRef, FileState, LayoutEngine, RefLabel};
    use pretty_assertions::assert_eq;

    fn commit(id: &str, parents: &[&str]) -> CommitRef {
        CommitRef::new(
            id.to_string(),
            parents.iter().map(|p| p.to_string()).collect(),
            Utc::now(),
            "Alice".to_string(),
            format!("Commit {}", id),
        )
    }

    fn history(commits: Vec<CommitRef>) -> Vec<LogEntry> {
        let mut engine = LayoutEngine::new();
        commits
            .into_iter()
            .map(|commit| {
                let graph = engine.push(&commit).unwrap();
                LogEntry::Revision { commit, graph }
            })
            .collect()
    }

    #[test]
    fn lane_column_marks_commit_and_crossing_lanes() {
        let entries = history(vec![
            commit("m", &["a", "b"]),
            commit("b", &["base"]),
            commit("a", &["base"]),
            commit("base", &[]),
        ]);

        let columns: Vec<_> = entries.iter().map(|e| lane_column(e.graph())).collect();
        assert_eq!(columns, vec!["*|", "|*", "*|", "*|"]);
    }

    #[test]
    fn working_directory_row_is_marked_current() {
        let mut engine = LayoutEngine::new();
        let graph = engine.push_working_directory(&"head".to_string(), true).unwrap();
        let entry = LogEntry::WorkingDirectory { graph, has_changes: true };

        assert_eq!(lane_column(entry.graph()), "@");
        assert!(format_entry(&entry).ends_with("Uncommitted changes"));
    }

    #[test]
    fn entry_lists_labels_and_message() {
        let mut c = commit("0123456789abcdef", &[]);
        c.labels = vec![RefLabel::branch("main"), RefLabel::tag("v1")];
        let entries = history(vec![c]);

        let text = format_entry(&entries[0]);
        assert!(text.starts_with("* 0123456 (main, tag: v1) Commit 0123456789abcdef"));
        assert!(text.ends_with("<Alice>"));
    }

    #[test]
    fn json_tags_entry_kind() {
        let entries = history(vec![commit("c1", &[])]);
        let json = to_json(&entries).unwrap();

        assert!(json.contains("\"kind\": \"revision\""));
        assert!(json.contains("\"revision_index\": 0"));
    }

    #[test]
    fn file_lines_show_state_then_path() {
        let file = FileStatus { path: "src/lib.rs".to_string(), state: FileState::Modified };
        assert_eq!(format_file(&file), "    modified:  src/lib.rs");
    }
}
