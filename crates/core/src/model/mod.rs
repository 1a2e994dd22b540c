pub mod graph;
pub mod selection;

pub use graph::GraphState;
pub use selection::{Selection, SelectionEvent};
