use std::collections::{HashMap, HashSet};

use commit_graph_protocol::{CommitRecord, SharedStr};
use serde::Serialize;

use super::selection::{Selection, SelectionEvent};
use crate::error::GraphError;
use crate::layout::lanes::{LaneAssignment, assign_lanes};

/// The engine's view of one repository: the ordered commit store plus the
/// layout and selection derived from it.
///
/// A `GraphState` is only ever built whole (see [`GraphState::build`]), so
/// observers never see rows, lanes and selection that disagree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphState {
    commits: Vec<CommitRecord>,
    #[serde(skip)]
    rows: HashMap<SharedStr, usize>,
    lanes: LaneAssignment,
    selection: Selection,
    rejected: Vec<GraphError>,
}

impl GraphState {
    /// Lay out a full commit sequence from scratch.
    pub fn from_commits(commits: Vec<CommitRecord>) -> Self {
        Self::build(commits, None, Selection::None)
    }

    /// Build a state from commits in display order.
    ///
    /// Lanes recorded in `previous` are kept for every commit still present.
    /// Duplicate ids keep their first occurrence. A selection that does not
    /// name a laid-out commit is dropped.
    pub fn build(
        commits: Vec<CommitRecord>,
        previous: Option<&LaneAssignment>,
        selection: Selection,
    ) -> Self {
        let mut seen = HashSet::with_capacity(commits.len());
        let commits: Vec<CommitRecord> = commits
            .into_iter()
            .filter(|c| {
                let fresh = seen.insert(c.id.clone());
                if !fresh {
                    tracing::warn!(id = %c.id, "duplicate commit id in store, keeping first");
                }
                fresh
            })
            .collect();

        let rows: HashMap<SharedStr, usize> = commits
            .iter()
            .enumerate()
            .map(|(row, c)| (c.id.clone(), row))
            .collect();

        let layout = assign_lanes(&commits, previous);
        for err in &layout.rejected {
            tracing::warn!("{err}");
        }

        let selection = match selection.selected().cloned() {
            Some(id) if layout.assignment.get(&id).is_none() => {
                selection.apply(SelectionEvent::CommitRemoved(id))
            }
            _ => selection,
        };

        Self {
            commits,
            rows,
            lanes: layout.assignment,
            selection,
            rejected: layout.rejected,
        }
    }

    pub fn commits(&self) -> &[CommitRecord] {
        &self.commits
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rows.contains_key(id)
    }

    pub fn commit(&self, id: &str) -> Option<&CommitRecord> {
        self.row(id).map(|row| &self.commits[row])
    }

    /// Display row of a commit (0 = newest).
    pub fn row(&self, id: &str) -> Option<usize> {
        self.rows.get(id).copied()
    }

    /// Lane of a commit. `None` for commits excluded from layout.
    pub fn lane(&self, id: &str) -> Option<usize> {
        self.lanes.get(id)
    }

    pub fn lanes(&self) -> &LaneAssignment {
        &self.lanes
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Commits excluded from layout, with the reason.
    pub fn rejected(&self) -> &[GraphError] {
        &self.rejected
    }

    /// Run a selection transition. Clicking a commit that is not in the
    /// store, or that was excluded from layout, is refused and leaves the
    /// selection untouched.
    pub fn apply_selection(&mut self, event: SelectionEvent) -> Result<(), GraphError> {
        if let SelectionEvent::Click(id) = &event
            && self.lane(id).is_none()
        {
            let rejected = self.rejected.iter().find(
                |err| matches!(err, GraphError::InvalidHistory { id: bad, .. } if bad == id),
            );
            return Err(rejected
                .cloned()
                .unwrap_or_else(|| GraphError::UnknownCommit { id: id.clone() }));
        }
        let current = std::mem::take(&mut self.selection);
        self.selection = current.apply(event);
        Ok(())
    }
}
