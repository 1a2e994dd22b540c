use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;

/// A normalized commit as delivered by the version-control collaborator.
///
/// This is the input IR for the graph engine. Records arrive in display
/// order (newest first); `row` and `lane` are derived by the engine and are
/// not part of the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Opaque unique identifier (the commit hash).
    pub id: SharedStr,
    pub message: String,
    pub author: String,
    /// Author time, seconds since the Unix epoch.
    pub timestamp: i64,
    /// Ordered parent ids. The first entry is the primary parent.
    #[serde(default)]
    pub parent_ids: Vec<SharedStr>,
    /// Branch this commit is rendered under. Informational only.
    #[serde(default)]
    pub branch_label: Option<String>,
}

impl CommitRecord {
    pub fn new(id: impl Into<SharedStr>, parent_ids: &[&str]) -> Self {
        Self {
            id: id.into(),
            message: String::new(),
            author: String::new(),
            timestamp: 0,
            parent_ids: parent_ids.iter().map(|&p| SharedStr::from(p)).collect(),
            branch_label: None,
        }
    }

    pub fn primary_parent(&self) -> Option<&SharedStr> {
        self.parent_ids.first()
    }

    pub fn is_merge(&self) -> bool {
        self.parent_ids.len() > 1
    }

    /// Parent ids with duplicates removed, keeping first occurrences.
    pub fn unique_parents(&self) -> Vec<&SharedStr> {
        let mut out: Vec<&SharedStr> = Vec::with_capacity(self.parent_ids.len());
        for parent in &self.parent_ids {
            if !out.contains(&parent) {
                out.push(parent);
            }
        }
        out
    }
}

/// A branch as listed by the collaborator. Display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub is_head: bool,
}
