use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

/// A single, stateless render instruction.
///
/// The core emits a `Vec<RenderCommand>` as the scene for one viewport.
/// Renderers consume this list sequentially; each command carries all the
/// data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle, optionally tagged with the commit it belongs
    /// to (for hit-testing / selection).
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
        commit_id: Option<SharedStr>,
    },

    /// Draw a filled circle (a commit node).
    DrawCircle {
        center: Point,
        radius: f64,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
        commit_id: Option<SharedStr>,
    },

    /// Draw a left-aligned text string, vertically centred on `position`.
    DrawText {
        position: Point,
        text: SharedStr,
        color: ThemeToken,
        font_size: f64,
    },

    /// Stroke an open path made of line and curve segments.
    DrawPath {
        segments: Vec<PathSegment>,
        color: ThemeToken,
        width: f64,
    },

    /// Begin a logical group. Renderers may use this for batching, layer
    /// separation, or accessibility.
    BeginGroup {
        id: SharedStr,
        label: Option<SharedStr>,
    },

    /// End the current group.
    EndGroup,
}

/// One step of a `DrawPath`. The first segment is always a `MoveTo`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { ctrl: Point, to: Point },
    CubicTo { ctrl1: Point, ctrl2: Point, to: Point },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_serialize_with_variant_tags() {
        let cmd = RenderCommand::DrawCircle {
            center: Point::new(10.0, 12.0),
            radius: 4.0,
            color: ThemeToken::Branch0,
            border_color: None,
            commit_id: Some("c1".into()),
        };
        let json = serde_json::to_string(&cmd).unwrap_or_default();
        assert!(json.starts_with("{\"DrawCircle\""));
        assert!(json.contains("\"commit_id\":\"c1\""));
    }
}
