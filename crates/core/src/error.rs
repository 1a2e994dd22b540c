use commit_graph_protocol::SharedStr;
use serde::Serialize;
use thiserror::Error;

/// Engine-level conditions. All of them are recoverable: the engine stays in
/// a consistent, renderable state whichever one is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum GraphError {
    #[error("invalid history at {id}: {reason}")]
    InvalidHistory { id: SharedStr, reason: InvalidReason },

    #[error("history rewrite detected: {} commit(s) vanished", removed.len())]
    HistoryRewriteDetected { removed: Vec<SharedStr> },

    #[error("stale refresh discarded: {reason}")]
    StaleRefreshDiscarded { reason: StaleReason },

    #[error("unknown commit {id}")]
    UnknownCommit { id: SharedStr },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InvalidReason {
    /// The commit lists itself as a parent.
    SelfParent,
    /// Following parents from this commit leads back to it; `via` is the
    /// parent edge that closes the loop.
    ParentCycle { via: SharedStr },
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfParent => write!(f, "commit lists itself as a parent"),
            Self::ParentCycle { via } => write!(f, "parent cycle through {via}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StaleReason {
    /// The repository the refresh was issued for is no longer open.
    RepositoryClosed,
    /// A refresh issued later has already been applied.
    Superseded { applied: u64, received: u64 },
}

impl std::fmt::Display for StaleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RepositoryClosed => write!(f, "repository closed"),
            Self::Superseded { applied, received } => {
                write!(f, "refresh #{received} superseded by #{applied}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_commit() {
        let err = GraphError::InvalidHistory {
            id: "abc".into(),
            reason: InvalidReason::SelfParent,
        };
        assert_eq!(
            err.to_string(),
            "invalid history at abc: commit lists itself as a parent"
        );
    }

    #[test]
    fn rewrite_message_counts_removed() {
        let err = GraphError::HistoryRewriteDetected {
            removed: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "history rewrite detected: 2 commit(s) vanished");
    }

    #[test]
    fn superseded_message() {
        let err = GraphError::StaleRefreshDiscarded {
            reason: StaleReason::Superseded {
                applied: 4,
                received: 3,
            },
        };
        assert_eq!(
            err.to_string(),
            "stale refresh discarded: refresh #3 superseded by #4"
        );
    }
}
