pub mod branches;
pub mod git_log;
pub mod json;

pub use branches::parse_branch_list;
pub use git_log::{GIT_LOG_FORMAT, parse_git_log};
pub use json::parse_json;

use commit_graph_protocol::CommitRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("git log: {0}")]
    GitLog(#[from] git_log::GitLogParseError),
    #[error("json: {0}")]
    Json(#[from] json::JsonParseError),
}

/// Auto-detect the history format and parse it.
///
/// A document whose first non-blank byte is `[` is a JSON snapshot;
/// anything else is treated as `git log` output.
pub fn parse_auto(data: &[u8]) -> Result<Vec<CommitRecord>, ParseError> {
    let first = data.iter().find(|b| !b.is_ascii_whitespace());
    if first == Some(&b'[') {
        return Ok(json::parse_json(data)?);
    }
    Ok(git_log::parse_git_log(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_json() {
        let data = br#"  [{"id": "a", "message": "m", "author": "x", "timestamp": 1}]"#;
        let commits = parse_auto(data).unwrap_or_default();
        assert_eq!(commits.len(), 1);
    }

    #[test]
    fn falls_back_to_git_log() {
        let data = "a0\u{1f}\u{1f}Ada\u{1f}1\u{1f}\u{1f}init\u{1e}\n";
        let commits = parse_auto(data.as_bytes()).unwrap_or_default();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].message, "init");
    }

    #[test]
    fn errors_name_the_format() {
        let err = parse_auto(b"[1, 2").err().map(|e| e.to_string());
        assert!(err.is_some_and(|e| e.starts_with("json:")));
    }
}
