//! JavaScript bindings around a single [`GraphEngine`].
//!
//! Everything crosses the boundary as JSON strings. The host runs `git`
//! (or fetches history some other way) and feeds batches back with the
//! ticket it got from [`begin_refresh`].

use std::sync::{Mutex, MutexGuard};

use commit_graph_core::{GraphConfig, GraphEngine, GraphError, RefreshTicket};
use commit_graph_protocol::{BranchInfo, CommitRecord, Point, Viewport};
use serde::Serialize;
use wasm_bindgen::prelude::*;

static ENGINE: Mutex<Option<GraphEngine>> = Mutex::new(None);

fn engine() -> Result<MutexGuard<'static, Option<GraphEngine>>, JsError> {
    ENGINE
        .lock()
        .map_err(|_| JsError::new("engine state poisoned"))
}

/// Run `f` against the engine, creating one with the default config on
/// first use.
fn with_engine<T>(f: impl FnOnce(&mut GraphEngine) -> Result<T, String>) -> Result<T, JsError> {
    let mut guard = engine()?;
    let engine = guard.get_or_insert_with(|| GraphEngine::new(GraphConfig::default()));
    f(engine).map_err(|e| JsError::new(&e))
}

fn to_json(value: &impl Serialize) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

/// Replace the engine with one using `config_json`. Any open repository is
/// dropped.
#[wasm_bindgen]
pub fn configure(config_json: &str) -> Result<(), JsError> {
    let config =
        GraphConfig::from_json(config_json.as_bytes()).map_err(|e| JsError::new(&e.to_string()))?;
    *engine()? = Some(GraphEngine::new(config));
    Ok(())
}

#[wasm_bindgen]
pub fn open_repository(path: &str) -> Result<(), JsError> {
    with_engine(|engine| {
        engine.open_repository(path);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn close_repository() -> Result<(), JsError> {
    with_engine(|engine| {
        engine.close_repository();
        Ok(())
    })
}

/// Ticket JSON to hand back with the fetched batch.
#[wasm_bindgen]
pub fn begin_refresh() -> Result<String, JsError> {
    with_engine(|engine| to_json(&engine.begin_refresh()))
}

/// Apply a fetched batch. Returns the reconcile report as JSON, or `null`
/// when the result was stale and dropped.
#[wasm_bindgen]
pub fn on_refresh_result(ticket_json: &str, batch_json: &str) -> Result<String, JsError> {
    with_engine(|engine| refresh_result(engine, ticket_json, batch_json))
}

/// Turn raw `git log` output or a JSON snapshot into a batch JSON array.
#[wasm_bindgen]
pub fn parse_history(data: &[u8]) -> Result<String, JsError> {
    commit_graph_core::parse_auto(data)
        .map_err(|e| e.to_string())
        .and_then(|commits| to_json(&commits))
        .map_err(|e| JsError::new(&e))
}

#[wasm_bindgen]
pub fn set_branches(branches_json: &str) -> Result<(), JsError> {
    with_engine(|engine| {
        let branches: Vec<BranchInfo> =
            serde_json::from_str(branches_json).map_err(|e| e.to_string())?;
        engine.set_branches(branches);
        Ok(())
    })
}

/// Toggle selection of `id`. Returns the new selection as JSON.
#[wasm_bindgen]
pub fn on_commit_click(id: &str) -> Result<String, JsError> {
    with_engine(|engine| {
        let selection = engine.on_commit_click(id).map_err(|e| e.to_string())?;
        to_json(selection)
    })
}

#[wasm_bindgen]
pub fn dismiss_selection() -> Result<(), JsError> {
    with_engine(|engine| {
        engine.dismiss_selection();
        Ok(())
    })
}

/// Id of the commit at scene position `(x, y)`, if any.
#[wasm_bindgen]
pub fn commit_at(x: f64, y: f64) -> Result<Option<String>, JsError> {
    with_engine(|engine| Ok(engine.commit_at(Point::new(x, y)).map(|id| id.to_string())))
}

/// Render commands for the given viewport, as JSON.
#[wasm_bindgen]
pub fn current_scene(x: f64, y: f64, width: f64, height: f64) -> Result<String, JsError> {
    let viewport = Viewport {
        x,
        y,
        width,
        height,
    };
    with_engine(|engine| to_json(&engine.current_scene(&viewport)))
}

/// Total scene height, for sizing the host's scroll container.
#[wasm_bindgen]
pub fn content_height() -> Result<f64, JsError> {
    with_engine(|engine| Ok(engine.content_height()))
}

fn refresh_result(
    engine: &mut GraphEngine,
    ticket_json: &str,
    batch_json: &str,
) -> Result<String, String> {
    let ticket: RefreshTicket = serde_json::from_str(ticket_json).map_err(|e| e.to_string())?;
    let batch: Vec<CommitRecord> = serde_json::from_str(batch_json).map_err(|e| e.to_string())?;
    match engine.on_refresh_result(ticket, batch) {
        Ok(report) => to_json(&report),
        Err(GraphError::StaleRefreshDiscarded { .. }) => Ok("null".to_string()),
        Err(err) => Err(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATCH: &str = r#"[
        {"id": "c2", "message": "second", "author": "a", "timestamp": 2, "parent_ids": ["c1"]},
        {"id": "c1", "message": "first", "author": "a", "timestamp": 1}
    ]"#;

    fn open() -> GraphEngine {
        let mut engine = GraphEngine::new(GraphConfig::default());
        engine.open_repository("/repo");
        engine
    }

    #[test]
    fn refresh_round_trip_through_json() {
        let mut engine = open();
        let ticket = to_json(&engine.begin_refresh()).unwrap_or_default();
        let report = refresh_result(&mut engine, &ticket, BATCH).unwrap_or_default();
        assert!(report.contains(r#""added":["c2","c1"]"#));
        assert_eq!(engine.state().len(), 2);
    }

    #[test]
    fn stale_result_is_null() {
        let mut engine = open();
        let ticket = to_json(&engine.begin_refresh()).unwrap_or_default();
        engine.close_repository();
        assert_eq!(
            refresh_result(&mut engine, &ticket, BATCH).as_deref(),
            Ok("null")
        );
        assert!(engine.state().is_empty());
    }

    #[test]
    fn malformed_ticket_is_an_error() {
        let mut engine = open();
        assert!(refresh_result(&mut engine, "{}", BATCH).is_err());
    }
}
