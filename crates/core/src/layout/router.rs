//! Connector geometry between a commit and one of its parents.

use commit_graph_protocol::{PathSegment, Point, SharedStr, ThemeToken};
use serde::Serialize;

use crate::config::GraphConfig;
use crate::model::GraphState;

/// A commit's cell in the graph grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridPos {
    pub row: usize,
    pub lane: usize,
}

impl GridPos {
    pub fn new(row: usize, lane: usize) -> Self {
        Self { row, lane }
    }

    pub fn center(&self, config: &GraphConfig) -> Point {
        Point::new(config.lane_x(self.lane), config.row_y(self.row))
    }
}

/// Horizontal direction a corner curve turns towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Bend {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PathKind {
    Straight,
    SCurve,
    CornerCurve,
}

/// Drawable description of one child→parent edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ConnectorPath {
    /// Same lane: a vertical segment.
    Straight { from: Point, to: Point },
    /// Lane change over a short distance: one cubic curve, symmetric about
    /// the midpoint between the two nodes.
    SCurve {
        from: Point,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    },
    /// Lane change over a long distance: a vertical run in the child's lane
    /// to one node radius before the parent's row, a quarter bend at
    /// `corner`, then a horizontal run into the parent.
    CornerCurve {
        from: Point,
        bend_start: Point,
        corner: Point,
        bend_end: Point,
        to: Point,
        bend: Bend,
    },
}

impl ConnectorPath {
    pub fn kind(&self) -> PathKind {
        match self {
            Self::Straight { .. } => PathKind::Straight,
            Self::SCurve { .. } => PathKind::SCurve,
            Self::CornerCurve { .. } => PathKind::CornerCurve,
        }
    }

    pub fn from(&self) -> Point {
        match *self {
            Self::Straight { from, .. }
            | Self::SCurve { from, .. }
            | Self::CornerCurve { from, .. } => from,
        }
    }

    pub fn to(&self) -> Point {
        match *self {
            Self::Straight { to, .. } | Self::SCurve { to, .. } | Self::CornerCurve { to, .. } => {
                to
            }
        }
    }

    /// Topmost and bottommost y the path touches.
    pub fn vertical_extent(&self) -> (f64, f64) {
        let (a, b) = (self.from().y, self.to().y);
        (a.min(b), a.max(b))
    }

    pub fn segments(&self) -> Vec<PathSegment> {
        match *self {
            Self::Straight { from, to } => vec![PathSegment::MoveTo(from), PathSegment::LineTo(to)],
            Self::SCurve {
                from,
                ctrl1,
                ctrl2,
                to,
            } => vec![
                PathSegment::MoveTo(from),
                PathSegment::CubicTo { ctrl1, ctrl2, to },
            ],
            Self::CornerCurve {
                from,
                bend_start,
                corner,
                bend_end,
                to,
                ..
            } => vec![
                PathSegment::MoveTo(from),
                PathSegment::LineTo(bend_start),
                PathSegment::QuadTo {
                    ctrl: corner,
                    to: bend_end,
                },
                PathSegment::LineTo(to),
            ],
        }
    }
}

/// Route the connector from `child` to `parent`.
///
/// Pure: the same positions and config always give the same path.
pub fn route_path(child: GridPos, parent: GridPos, config: &GraphConfig) -> ConnectorPath {
    let from = child.center(config);
    let to = parent.center(config);

    if child.lane == parent.lane {
        return ConnectorPath::Straight { from, to };
    }

    if child.row.abs_diff(parent.row) < config.corner_threshold_rows {
        let mid_y = (from.y + to.y) / 2.0;
        return ConnectorPath::SCurve {
            from,
            ctrl1: Point::new(from.x, mid_y),
            ctrl2: Point::new(to.x, mid_y),
            to,
        };
    }

    let bend = if parent.lane > child.lane {
        Bend::Right
    } else {
        Bend::Left
    };
    let dx = match bend {
        Bend::Right => config.node_radius,
        Bend::Left => -config.node_radius,
    };
    // Parents normally sit below their children; flip if not.
    let dy = if to.y >= from.y {
        config.node_radius
    } else {
        -config.node_radius
    };

    ConnectorPath::CornerCurve {
        from,
        bend_start: Point::new(from.x, to.y - dy),
        corner: Point::new(from.x, to.y),
        bend_end: Point::new(from.x + dx, to.y),
        to,
        bend,
    }
}

/// A routed edge, ready for projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connector {
    pub child: SharedStr,
    pub parent: SharedStr,
    pub path: ConnectorPath,
    pub color: ThemeToken,
}

/// Route every edge whose two ends are laid out in `state`. Edges to
/// parents that are not in the store, or were rejected, are skipped.
pub fn route_connectors(state: &GraphState, config: &GraphConfig) -> Vec<Connector> {
    let mut connectors = Vec::new();
    for (row, commit) in state.commits().iter().enumerate() {
        let Some(lane) = state.lane(&commit.id) else {
            continue;
        };
        let child = GridPos::new(row, lane);
        for parent_id in commit.unique_parents() {
            let (Some(parent_row), Some(parent_lane)) =
                (state.row(parent_id), state.lane(parent_id))
            else {
                continue;
            };
            connectors.push(Connector {
                child: commit.id.clone(),
                parent: parent_id.clone(),
                path: route_path(child, GridPos::new(parent_row, parent_lane), config),
                color: ThemeToken::for_lane(lane),
            });
        }
    }
    connectors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GraphConfig {
        GraphConfig {
            row_height: 20.0,
            lane_width: 10.0,
            node_radius: 4.0,
            corner_threshold_rows: 2,
            ..GraphConfig::default()
        }
    }

    #[test]
    fn same_lane_is_straight() {
        let path = route_path(GridPos::new(0, 1), GridPos::new(5, 1), &config());
        assert_eq!(
            path,
            ConnectorPath::Straight {
                from: Point::new(15.0, 10.0),
                to: Point::new(15.0, 110.0),
            }
        );
    }

    #[test]
    fn adjacent_rows_give_symmetric_s_curve() {
        let path = route_path(GridPos::new(2, 0), GridPos::new(3, 2), &config());
        assert_eq!(
            path,
            ConnectorPath::SCurve {
                from: Point::new(5.0, 50.0),
                ctrl1: Point::new(5.0, 60.0),
                ctrl2: Point::new(25.0, 60.0),
                to: Point::new(25.0, 70.0),
            }
        );
    }

    #[test]
    fn long_lane_change_bends_at_parent_row() {
        let path = route_path(GridPos::new(0, 0), GridPos::new(3, 1), &config());
        assert_eq!(
            path,
            ConnectorPath::CornerCurve {
                from: Point::new(5.0, 10.0),
                bend_start: Point::new(5.0, 66.0),
                corner: Point::new(5.0, 70.0),
                bend_end: Point::new(9.0, 70.0),
                to: Point::new(15.0, 70.0),
                bend: Bend::Right,
            }
        );
        assert_eq!(path.segments().len(), 4);
    }

    #[test]
    fn bend_direction_follows_lane_sign() {
        let left = route_path(GridPos::new(0, 3), GridPos::new(4, 1), &config());
        assert!(matches!(
            left,
            ConnectorPath::CornerCurve {
                bend: Bend::Left,
                ..
            }
        ));
        if let ConnectorPath::CornerCurve { bend_end, from, .. } = left {
            assert!(bend_end.x < from.x);
        }
    }

    #[test]
    fn threshold_is_configurable() {
        let wide = GraphConfig {
            corner_threshold_rows: 5,
            ..config()
        };
        let path = route_path(GridPos::new(0, 0), GridPos::new(3, 1), &wide);
        assert_eq!(path.kind(), PathKind::SCurve);
    }

    #[test]
    fn routing_is_deterministic() {
        let a = route_path(GridPos::new(1, 4), GridPos::new(9, 0), &config());
        let b = route_path(GridPos::new(1, 4), GridPos::new(9, 0), &config());
        assert_eq!(
            serde_json::to_string(&a).unwrap_or_default(),
            serde_json::to_string(&b).unwrap_or_default()
        );
    }
}
