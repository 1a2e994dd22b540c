//! Commit graph layout and rendering engine.
//!
//! ```text
//!   git log ─▶ parsers ─▶ CommitRecord[] ─▶ reconcile ─▶ GraphState
//!                                                          │
//!          RenderCommand[] ◀── views::commit_graph ◀── route ◀── lanes
//! ```
//!
//! [`engine::GraphEngine`] is the event-driven entry point used by front-ends.

pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod model;
pub mod parsers;
pub mod reconcile;
pub mod svg;
pub mod views;

pub use config::GraphConfig;
pub use engine::{GraphEngine, RefreshTicket};
pub use error::{GraphError, InvalidReason, StaleReason};
pub use model::{GraphState, Selection, SelectionEvent};
pub use parsers::{ParseError, parse_auto};
pub use reconcile::{ReconcileReport, reconcile};
