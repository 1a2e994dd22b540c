//! Merging a freshly fetched commit batch into the displayed graph.

use std::collections::HashSet;

use commit_graph_protocol::{CommitRecord, SharedStr};
use serde::Serialize;

use crate::error::GraphError;
use crate::model::{GraphState, SelectionEvent};

/// What a reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// Commits that were not in the store before, in display order.
    pub added: Vec<SharedStr>,
    /// Commits present before and in the batch (metadata refreshed).
    pub refreshed: usize,
    /// Commits that vanished from the overlapping window.
    pub removed: Vec<SharedStr>,
    /// Lanes were recomputed from scratch.
    pub full_relayout: bool,
    pub selection_cleared: bool,
    /// Commits excluded from the new layout.
    pub rejected: Vec<GraphError>,
}

impl ReconcileReport {
    /// The rewrite condition, if this reconciliation detected one.
    pub fn rewrite(&self) -> Option<GraphError> {
        (!self.removed.is_empty()).then(|| GraphError::HistoryRewriteDetected {
            removed: self.removed.clone(),
        })
    }

    /// True when the batch carried nothing new and nothing vanished.
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Merge `batch` (newest first, possibly a truncated page of history) into
/// `current`.
///
/// The batch is authoritative for the window it covers: every stored commit
/// down to the deepest one the batch also contains. Stored commits inside
/// that window but missing from the batch count as a history rewrite and
/// force a full relayout; stored commits below it are kept as they are.
/// Otherwise kept commits keep their lanes and only new commits are placed.
///
/// An empty batch means "no new data" and returns `current` unchanged.
/// Calling this again with the same batch yields the same state.
pub fn reconcile(current: &GraphState, batch: Vec<CommitRecord>) -> (GraphState, ReconcileReport) {
    let batch = dedup(batch);
    if batch.is_empty() {
        return (current.clone(), ReconcileReport::default());
    }

    let in_batch: HashSet<&str> = batch.iter().map(|c| c.id.as_str()).collect();
    let anchor = batch.iter().filter_map(|c| current.row(&c.id)).max();

    let (removed, tail): (Vec<SharedStr>, Vec<CommitRecord>) = match anchor {
        Some(anchor) => {
            let (window, below) = current.commits().split_at(anchor + 1);
            let removed = window
                .iter()
                .filter(|c| !in_batch.contains(c.id.as_str()))
                .map(|c| c.id.clone())
                .collect();
            (removed, below.to_vec())
        }
        // Nothing in common: the whole store is replaced.
        None => (
            current.commits().iter().map(|c| c.id.clone()).collect(),
            Vec::new(),
        ),
    };

    let added: Vec<SharedStr> = batch
        .iter()
        .filter(|c| !current.contains(&c.id))
        .map(|c| c.id.clone())
        .collect();
    let refreshed = batch.len() - added.len();

    let full_relayout = !removed.is_empty();
    let previous = (!full_relayout).then(|| current.lanes());

    let mut selection = current.selection().clone();
    let mut selection_cleared = false;
    if let Some(selected) = selection.selected().cloned()
        && removed.contains(&selected)
    {
        selection = selection.apply(SelectionEvent::CommitRemoved(selected));
        selection_cleared = true;
    }

    let commits: Vec<CommitRecord> = batch.into_iter().chain(tail).collect();
    let state = GraphState::build(commits, previous, selection);

    let report = ReconcileReport {
        added,
        refreshed,
        removed,
        full_relayout,
        selection_cleared,
        rejected: state.rejected().to_vec(),
    };

    if let Some(rewrite) = report.rewrite() {
        tracing::info!(
            selection_cleared = report.selection_cleared,
            "{rewrite}, relaying out {} commits",
            state.len()
        );
    }
    tracing::debug!(
        added = report.added.len(),
        refreshed = report.refreshed,
        removed = report.removed.len(),
        lanes = state.lanes().width(),
        "reconciled batch"
    );

    (state, report)
}

fn dedup(batch: Vec<CommitRecord>) -> Vec<CommitRecord> {
    let mut seen = HashSet::with_capacity(batch.len());
    batch
        .into_iter()
        .filter(|c| {
            let fresh = seen.insert(c.id.clone());
            if !fresh {
                tracing::warn!(id = %c.id, "duplicate commit id in batch, keeping first");
            }
            fresh
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Selection;

    fn history() -> Vec<CommitRecord> {
        vec![
            CommitRecord::new("c3", &["c2"]),
            CommitRecord::new("c2", &["c1"]),
            CommitRecord::new("c1", &[]),
        ]
    }

    #[test]
    fn first_batch_fills_empty_store() {
        let (state, report) = reconcile(&GraphState::default(), history());
        assert_eq!(state.len(), 3);
        assert_eq!(report.added.len(), 3);
        assert!(report.removed.is_empty());
        assert!(!report.full_relayout);
    }

    #[test]
    fn empty_batch_is_no_new_data() {
        let state = GraphState::from_commits(history());
        let (next, report) = reconcile(&state, Vec::new());
        assert_eq!(next, state);
        assert!(report.is_unchanged());
    }

    #[test]
    fn prepended_commits_keep_existing_lanes() {
        let state = GraphState::from_commits(vec![
            CommitRecord::new("side", &["c1"]),
            CommitRecord::new("c2", &["c1"]),
            CommitRecord::new("c1", &[]),
        ]);
        let mut batch = vec![CommitRecord::new("new", &["c2"])];
        batch.extend(state.commits().iter().cloned());

        let (next, report) = reconcile(&state, batch);
        assert_eq!(report.added, vec![SharedStr::from("new")]);
        for id in ["side", "c2", "c1"] {
            assert_eq!(next.lane(id), state.lane(id), "{id}");
        }
        assert_eq!(next.row("c2"), Some(2));
    }

    #[test]
    fn metadata_is_refreshed_in_place() {
        let state = GraphState::from_commits(history());
        let mut batch = history();
        batch[1].message = "reworded".into();
        let (next, report) = reconcile(&state, batch);
        assert_eq!(report.refreshed, 3);
        assert_eq!(next.commit("c2").map(|c| c.message.as_str()), Some("reworded"));
    }

    #[test]
    fn truncated_page_keeps_older_tail() {
        let state = GraphState::from_commits(history());
        let batch = vec![
            CommitRecord::new("c4", &["c3"]),
            CommitRecord::new("c3", &["c2"]),
        ];
        let (next, report) = reconcile(&state, batch);
        assert!(report.removed.is_empty());
        let ids: Vec<&str> = next.commits().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c4", "c3", "c2", "c1"]);
    }

    #[test]
    fn vanished_commit_triggers_relayout_and_clears_selection() {
        let mut state = GraphState::from_commits(history());
        assert!(
            state
                .apply_selection(SelectionEvent::Click("c2".into()))
                .is_ok()
        );
        let batch = vec![
            CommitRecord::new("c3b", &["c1"]),
            CommitRecord::new("c1", &[]),
        ];
        let (next, report) = reconcile(&state, batch);
        assert!(report.full_relayout);
        assert!(report.selection_cleared);
        assert_eq!(report.removed.len(), 2);
        assert_eq!(next.selection(), &Selection::None);
        assert!(matches!(
            report.rewrite(),
            Some(GraphError::HistoryRewriteDetected { .. })
        ));
    }

    #[test]
    fn disjoint_batch_replaces_store() {
        let state = GraphState::from_commits(history());
        let (next, report) = reconcile(&state, vec![CommitRecord::new("other", &[])]);
        assert_eq!(next.len(), 1);
        assert_eq!(report.removed.len(), 3);
    }

    #[test]
    fn reconciling_twice_is_idempotent() {
        let state = GraphState::from_commits(history());
        let batch = vec![
            CommitRecord::new("m", &["c3", "f"]),
            CommitRecord::new("f", &["c2"]),
            CommitRecord::new("c3", &["c2"]),
            CommitRecord::new("c2", &["c1"]),
        ];
        let (once, _) = reconcile(&state, batch.clone());
        let (twice, report) = reconcile(&once, batch);
        assert_eq!(once, twice);
        assert!(report.is_unchanged());
    }
}
