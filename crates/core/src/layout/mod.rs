pub mod lanes;
pub mod router;

pub use lanes::{LaneAssignment, LaneLayout, assign_lanes};
pub use router::{Bend, Connector, ConnectorPath, GridPos, PathKind, route_connectors, route_path};
