use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// The visible window onto the scene, in logical pixels.
///
/// `y` is the vertical scroll offset; a scene projected for this viewport
/// only contains rows and connectors that intersect `[y, y + height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    /// Whether the vertical span `[top, bottom]` overlaps the viewport.
    pub fn intersects_rows(&self, top: f64, bottom: f64) -> bool {
        bottom >= self.y && top <= self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_intersection() {
        let vp = Viewport {
            y: 100.0,
            ..Viewport::new(800.0, 200.0)
        };
        assert!(vp.intersects_rows(90.0, 110.0));
        assert!(vp.intersects_rows(0.0, 1000.0));
        assert!(!vp.intersects_rows(0.0, 99.0));
        assert!(!vp.intersects_rows(301.0, 400.0));
    }
}
