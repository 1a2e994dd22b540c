//! Event-driven façade used by front-ends.
//!
//! The engine owns one [`GraphState`] and mutates it only in response to
//! discrete events: repository open/close, refresh results, and clicks.
//! Fetching history is the caller's business; the engine only sees the
//! finished batch, tagged with the [`RefreshTicket`] it handed out when the
//! fetch started.

use std::path::{Path, PathBuf};

use commit_graph_protocol::{BranchInfo, CommitRecord, Point, RenderCommand, SharedStr, Viewport};
use serde::{Deserialize, Serialize};

use crate::config::GraphConfig;
use crate::error::{GraphError, StaleReason};
use crate::layout::route_connectors;
use crate::model::{GraphState, Selection, SelectionEvent};
use crate::reconcile::{ReconcileReport, reconcile};
use crate::views::commit_graph::render_commit_graph;

/// Identifies one refresh request.
///
/// `epoch` changes whenever a repository is opened or closed, so results of
/// fetches started against an earlier repository are recognisable. `seq`
/// increases with every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTicket {
    pub epoch: u64,
    pub seq: u64,
}

#[derive(Debug, Default)]
pub struct GraphEngine {
    config: GraphConfig,
    repository: Option<PathBuf>,
    epoch: u64,
    issued: u64,
    applied: Option<u64>,
    state: GraphState,
    branches: Vec<BranchInfo>,
}

impl GraphEngine {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn state(&self) -> &GraphState {
        &self.state
    }

    pub fn repository(&self) -> Option<&Path> {
        self.repository.as_deref()
    }

    pub fn selection(&self) -> &Selection {
        self.state.selection()
    }

    /// Start showing a repository. Any previous repository is closed first.
    pub fn open_repository(&mut self, path: impl Into<PathBuf>) {
        if self.repository.is_some() {
            self.close_repository();
        }
        let path = path.into();
        tracing::info!(path = %path.display(), "repository opened");
        self.epoch += 1;
        self.repository = Some(path);
    }

    /// Drop the store, layout, branches and selection. Refreshes still in
    /// flight will be discarded when their results arrive.
    pub fn close_repository(&mut self) {
        if let Some(path) = self.repository.take() {
            tracing::info!(path = %path.display(), "repository closed");
        }
        self.epoch += 1;
        self.applied = None;
        self.state = GraphState::default();
        self.branches.clear();
    }

    /// Hand out a ticket for a fetch that is about to start.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket {
            epoch: self.epoch,
            seq: self.issued,
        }
    }

    /// Apply the result of the fetch started with `ticket`.
    ///
    /// Results for a closed repository, or older than a result already
    /// applied, are dropped with [`GraphError::StaleRefreshDiscarded`] and
    /// leave the engine untouched. Otherwise the new state replaces the old
    /// one in a single step.
    pub fn on_refresh_result(
        &mut self,
        ticket: RefreshTicket,
        batch: Vec<CommitRecord>,
    ) -> Result<ReconcileReport, GraphError> {
        if self.repository.is_none() || ticket.epoch != self.epoch {
            return Err(self.discard(StaleReason::RepositoryClosed));
        }
        if let Some(applied) = self.applied
            && ticket.seq <= applied
        {
            return Err(self.discard(StaleReason::Superseded {
                applied,
                received: ticket.seq,
            }));
        }

        let (state, report) = reconcile(&self.state, batch);
        self.state = state;
        self.applied = Some(ticket.seq);
        Ok(report)
    }

    fn discard(&self, reason: StaleReason) -> GraphError {
        tracing::debug!(%reason, "dropping refresh result");
        GraphError::StaleRefreshDiscarded { reason }
    }

    /// Convenience for callers that fetch synchronously.
    pub fn refresh_with(
        &mut self,
        batch: Vec<CommitRecord>,
    ) -> Result<ReconcileReport, GraphError> {
        let ticket = self.begin_refresh();
        self.on_refresh_result(ticket, batch)
    }

    pub fn set_branches(&mut self, branches: Vec<BranchInfo>) {
        self.branches = branches;
    }

    pub fn branches(&self) -> &[BranchInfo] {
        &self.branches
    }

    pub fn head_branch(&self) -> Option<&str> {
        self.branches
            .iter()
            .find(|b| b.is_head)
            .map(|b| b.name.as_str())
    }

    /// Toggle selection of a commit.
    pub fn on_commit_click(&mut self, id: &str) -> Result<&Selection, GraphError> {
        self.state
            .apply_selection(SelectionEvent::Click(SharedStr::from(id)))?;
        Ok(self.state.selection())
    }

    pub fn dismiss_selection(&mut self) {
        let _ = self.state.apply_selection(SelectionEvent::Dismiss);
    }

    /// The laid-out commit whose row contains `point`, if any.
    pub fn commit_at(&self, point: Point) -> Option<SharedStr> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let row = (point.y / self.config.row_height).floor() as usize;
        let commit = self.state.commits().get(row)?;
        self.state.lane(&commit.id).map(|_| commit.id.clone())
    }

    /// Click at a scene position. Positions that do not hit a commit leave
    /// the selection alone.
    pub fn on_click_at(&mut self, point: Point) -> Option<&Selection> {
        let id = self.commit_at(point)?;
        self.on_commit_click(&id).ok()
    }

    /// Project the current state into render commands for `viewport`.
    pub fn current_scene(&self, viewport: &Viewport) -> Vec<RenderCommand> {
        let connectors = route_connectors(&self.state, &self.config);
        render_commit_graph(
            &self.state,
            &connectors,
            &self.config,
            viewport,
            self.head_branch(),
        )
    }

    /// Height of the full scene in logical pixels.
    pub fn content_height(&self) -> f64 {
        self.state.len() as f64 * self.config.row_height
    }
}
