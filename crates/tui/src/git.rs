//! Where commit history comes from: a live repository through the `git`
//! CLI, or a snapshot file captured earlier.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use commit_graph_core::parsers::{GIT_LOG_FORMAT, parse_auto, parse_branch_list};
use commit_graph_protocol::{BranchInfo, CommitRecord};

pub trait HistorySource: Send + Sync {
    /// Commits newest first, as one refresh batch.
    fn list_commits(&self) -> Result<Vec<CommitRecord>>;

    fn list_branches(&self) -> Result<Vec<BranchInfo>>;

    fn location(&self) -> &Path;
}

/// Runs `git log` / `git branch` against a working tree.
pub struct GitCli {
    repo: PathBuf,
    limit: usize,
}

impl GitCli {
    pub fn new(repo: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            repo: repo.into(),
            limit,
        }
    }

    fn git(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .args(args)
            .output()
            .context("failed to run git")?;
        if !output.status.success() {
            bail!(
                "git {} failed: {}",
                args.first().copied().unwrap_or_default(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(output.stdout)
    }
}

impl HistorySource for GitCli {
    fn list_commits(&self) -> Result<Vec<CommitRecord>> {
        let format = format!("--format={GIT_LOG_FORMAT}");
        let max_count = format!("--max-count={}", self.limit);
        let out = self.git(&[
            "log",
            "--topo-order",
            "--no-color",
            &format,
            &max_count,
            "--branches",
            "HEAD",
        ])?;
        let commits = commit_graph_core::parsers::parse_git_log(&out)?;
        tracing::debug!(count = commits.len(), repo = %self.repo.display(), "git log");
        Ok(commits)
    }

    fn list_branches(&self) -> Result<Vec<BranchInfo>> {
        let out = self.git(&["branch", "--no-color"])?;
        Ok(parse_branch_list(&String::from_utf8_lossy(&out)))
    }

    fn location(&self) -> &Path {
        &self.repo
    }
}

/// Reads a saved history (JSON array or `git log` output). Re-read on every
/// refresh so edits to the file show up.
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HistorySource for SnapshotFile {
    fn list_commits(&self) -> Result<Vec<CommitRecord>> {
        let data = std::fs::read(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        Ok(parse_auto(&data)?)
    }

    fn list_branches(&self) -> Result<Vec<BranchInfo>> {
        Ok(Vec::new())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
