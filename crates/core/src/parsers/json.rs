use commit_graph_protocol::CommitRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonParseError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a JSON array of commit records, newest first.
///
/// `parent_ids` and `branch_label` may be omitted.
pub fn parse_json(data: &[u8]) -> Result<Vec<CommitRecord>, JsonParseError> {
    Ok(serde_json::from_slice(data)?)
}
