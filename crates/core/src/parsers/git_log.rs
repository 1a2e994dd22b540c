use std::collections::HashMap;

use commit_graph_protocol::{CommitRecord, SharedStr};
use thiserror::Error;

/// The `git log --format` string [`parse_git_log`] understands.
///
/// One record per commit, fields separated by the ASCII unit separator and
/// records terminated by the record separator: full hash, parent hashes,
/// author name, author timestamp, ref decorations, subject.
pub const GIT_LOG_FORMAT: &str = "%H%x1f%P%x1f%an%x1f%at%x1f%D%x1f%s%x1e";

const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

#[derive(Debug, Error)]
pub enum GitLogParseError {
    #[error("record {record}: missing field `{field}`")]
    MissingField { record: usize, field: &'static str },
    #[error("record {record}: invalid timestamp `{value}`")]
    InvalidTimestamp { record: usize, value: String },
}

/// Parse `git log --format=<GIT_LOG_FORMAT>` output, newest first.
///
/// Branch labels come from each tip's decorations and are then carried
/// down the first-parent chain (see [`propagate_branch_labels`]).
///
/// Authors and subjects are not guaranteed to be UTF-8. Invalid bytes are
/// replaced with U+FFFD; the separators are ASCII, so record boundaries
/// survive decoding.
pub fn parse_git_log(data: &[u8]) -> Result<Vec<CommitRecord>, GitLogParseError> {
    let text = String::from_utf8_lossy(data);
    let mut commits = Vec::new();

    for (record, raw) in text.split(RECORD_SEP).enumerate() {
        let raw = raw.trim_start_matches(['\n', '\r']);
        if raw.trim().is_empty() {
            continue;
        }

        let mut fields = raw.split(FIELD_SEP);
        let mut next = |field: &'static str| {
            fields
                .next()
                .ok_or(GitLogParseError::MissingField { record, field })
        };

        let id = next("hash")?.trim();
        if id.is_empty() {
            return Err(GitLogParseError::MissingField {
                record,
                field: "hash",
            });
        }
        let parents = next("parents")?;
        let author = next("author")?;
        let timestamp = next("timestamp")?.trim();
        let decorations = next("decorations")?;
        let subject = next("subject")?;

        let timestamp = timestamp
            .parse::<i64>()
            .map_err(|_| GitLogParseError::InvalidTimestamp {
                record,
                value: timestamp.to_string(),
            })?;

        commits.push(CommitRecord {
            id: SharedStr::from(id),
            message: subject.trim_end().to_string(),
            author: author.to_string(),
            timestamp,
            parent_ids: parents.split_whitespace().map(SharedStr::from).collect(),
            branch_label: branch_from_decorations(decorations),
        });
    }

    propagate_branch_labels(&mut commits);
    Ok(commits)
}

/// First branch named in a `%D` decoration list.
///
/// `HEAD -> main, origin/main, tag: v1` yields `main`. Tags and a bare
/// detached `HEAD` are skipped.
pub fn branch_from_decorations(decorations: &str) -> Option<String> {
    decorations
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty() && !d.starts_with("tag:") && *d != "HEAD")
        .map(|d| d.strip_prefix("HEAD -> ").unwrap_or(d))
        .map(str::to_string)
        .next()
}

/// Carry each label down its commit's first-parent chain, stopping at the
/// first commit that already has a label.
///
/// Only parents listed below the child are followed, so malformed input with
/// cycles cannot loop.
pub fn propagate_branch_labels(commits: &mut [CommitRecord]) {
    let rows: HashMap<SharedStr, usize> = commits
        .iter()
        .enumerate()
        .map(|(row, c)| (c.id.clone(), row))
        .collect();

    for row in 0..commits.len() {
        let Some(label) = commits[row].branch_label.clone() else {
            continue;
        };
        let mut current = row;
        while let Some(parent) = commits[current].primary_parent()
            && let Some(&parent_row) = rows.get(parent)
            && parent_row > current
            && commits[parent_row].branch_label.is_none()
        {
            commits[parent_row].branch_label = Some(label.clone());
            current = parent_row;
        }
    }
}
