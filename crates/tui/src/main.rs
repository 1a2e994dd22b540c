mod canvas;
mod git;
mod renderer;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use commit_graph_core::{GraphConfig, GraphEngine, svg::render_svg};
use commit_graph_protocol::Viewport;
use tracing_subscriber::{EnvFilter, fmt};

use crate::git::{GitCli, HistorySource, SnapshotFile};

/// Browse a repository's commit graph in the terminal.
#[derive(Parser, Debug)]
#[command(name = "commit-graph")]
#[command(about = "Terminal commit graph viewer")]
struct Args {
    /// Repository to show
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Maximum number of commits fetched per refresh
    #[arg(long, default_value_t = 1000)]
    limit: usize,

    /// Seconds between automatic refreshes
    #[arg(long, default_value_t = 5)]
    refresh_secs: u64,

    /// Layout config as JSON (row_height, lane_width, ...)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs here; the terminal is busy with the UI
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Read history from a JSON or `git log` snapshot instead of running git
    #[arg(long)]
    input: Option<PathBuf>,

    /// Render the whole graph to an SVG file and exit
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Dark palette for --svg
    #[arg(long)]
    dark: bool,
}

fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>, fallback: GraphConfig) -> Result<GraphConfig> {
    let Some(path) = path else {
        return Ok(fallback);
    };
    let data =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let config = GraphConfig::from_json(&data)?;
    tracing::info!(path = %path.display(), "loaded layout config");
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let source: Arc<dyn HistorySource> = match &args.input {
        Some(path) => Arc::new(SnapshotFile::new(path)),
        None => Arc::new(GitCli::new(&args.repo, args.limit)),
    };

    if let Some(out) = &args.svg {
        let config = load_config(args.config.as_deref(), GraphConfig::default())?;
        let mut engine = GraphEngine::new(config);
        engine.open_repository(source.location());
        engine.set_branches(source.list_branches()?);
        engine.refresh_with(source.list_commits()?)?;

        let height = engine.content_height();
        let width = 1200.0;
        let scene = engine.current_scene(&Viewport::new(width, height));
        let svg = render_svg(&scene, width, height, args.dark);
        std::fs::write(out, svg).with_context(|| format!("failed to write {}", out.display()))?;
        tracing::info!(path = %out.display(), commits = engine.state().len(), "wrote svg");
        return Ok(());
    }

    let config = load_config(args.config.as_deref(), GraphConfig::terminal())?;
    let mut engine = GraphEngine::new(config);
    engine.open_repository(source.location());

    let app = renderer::App::new(engine, source, Duration::from_secs(args.refresh_secs.max(1)));
    renderer::run_tui(app)
}
