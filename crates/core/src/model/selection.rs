use commit_graph_protocol::SharedStr;
use serde::{Deserialize, Serialize};

/// Which commit, if any, is highlighted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    None,
    Selected(SharedStr),
}

/// Inputs to the selection state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    Click(SharedStr),
    Dismiss,
    /// Reconciliation dropped this commit from the store.
    CommitRemoved(SharedStr),
    RepositoryClosed,
}

impl Selection {
    pub fn selected(&self) -> Option<&SharedStr> {
        match self {
            Selection::None => None,
            Selection::Selected(id) => Some(id),
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected().is_some_and(|s| s.as_str() == id)
    }

    /// Apply one transition. Events that do not concern the current state
    /// (removing a commit that is not selected, dismissing nothing) leave it
    /// unchanged.
    #[must_use]
    pub fn apply(self, event: SelectionEvent) -> Selection {
        match (self, event) {
            (Selection::Selected(current), SelectionEvent::Click(id)) if current == id => {
                Selection::None
            }
            (_, SelectionEvent::Click(id)) => Selection::Selected(id),
            (_, SelectionEvent::Dismiss | SelectionEvent::RepositoryClosed) => Selection::None,
            (Selection::Selected(current), SelectionEvent::CommitRemoved(id)) if current == id => {
                Selection::None
            }
            (state, SelectionEvent::CommitRemoved(_)) => state,
        }
    }
}
