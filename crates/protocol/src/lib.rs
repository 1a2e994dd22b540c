pub mod commands;
pub mod commit;
pub mod shared_str;
pub mod theme;
pub mod types;

pub use commands::{PathSegment, RenderCommand};
pub use commit::{BranchInfo, CommitRecord};
pub use shared_str::SharedStr;
pub use theme::ThemeToken;
pub use types::{Point, Rect, Viewport};
