pub mod commit_graph;

pub use commit_graph::render_commit_graph;
