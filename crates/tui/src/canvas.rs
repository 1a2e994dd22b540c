//! Rasterises a commit graph scene onto a grid of terminal cells.
//!
//! Scene units map one-to-one onto cells (the terminal [`GraphConfig`]
//! preset uses one row and two columns per lane), so a point `(x, y)` lands
//! in cell `(floor(x), floor(y - scroll))`.
//!
//! [`GraphConfig`]: commit_graph_core::GraphConfig

use commit_graph_protocol::{PathSegment, Point, RenderCommand, ThemeToken};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<ThemeToken>,
    pub bg: Option<ThemeToken>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stroke {
    Vertical,
    Horizontal,
    Falling,
    Rising,
}

pub struct Canvas {
    width: u16,
    height: u16,
    scroll: f64,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(width: u16, height: u16, scroll: f64) -> Self {
        Self {
            width,
            height,
            scroll,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, col: u16, row: u16) -> Option<&Cell> {
        self.index(col, row).and_then(|i| self.cells.get(i))
    }

    fn get_mut(&mut self, col: u16, row: u16) -> Option<&mut Cell> {
        self.index(col, row).and_then(|i| self.cells.get_mut(i))
    }

    fn index(&self, col: u16, row: u16) -> Option<usize> {
        (col < self.width && row < self.height)
            .then(|| usize::from(row) * usize::from(self.width) + usize::from(col))
    }

    /// Cell under a scene point, if on the canvas.
    fn cell_at(&self, p: Point) -> Option<(u16, u16)> {
        let col = p.x.floor();
        let row = (p.y - self.scroll).floor();
        if col < 0.0 || row < 0.0 || col >= f64::from(self.width) || row >= f64::from(self.height)
        {
            return None;
        }
        Some((col as u16, row as u16))
    }

    pub fn paint(&mut self, commands: &[RenderCommand]) {
        for cmd in commands {
            match cmd {
                RenderCommand::DrawRect { rect, color, .. } => {
                    let top = (rect.y - self.scroll).floor().max(0.0) as u16;
                    let bottom = (rect.y + rect.h - self.scroll).ceil().max(0.0) as u16;
                    let left = rect.x.floor().max(0.0) as u16;
                    let right = (rect.x + rect.w).ceil().max(0.0) as u16;
                    for row in top..bottom.max(top + 1) {
                        for col in left..right {
                            if let Some(cell) = self.get_mut(col, row) {
                                cell.bg = Some(*color);
                            }
                        }
                    }
                }
                RenderCommand::DrawText {
                    position,
                    text,
                    color,
                    ..
                } => {
                    let origin = Point::new(position.x.max(0.0), position.y);
                    let Some((col, row)) = self.cell_at(origin) else {
                        continue;
                    };
                    for (i, ch) in text.chars().enumerate() {
                        let Some(cell) = self.get_mut(col.saturating_add(i as u16), row) else {
                            break;
                        };
                        cell.ch = ch;
                        cell.fg = Some(*color);
                    }
                }
                RenderCommand::DrawCircle {
                    center,
                    color,
                    border_color,
                    ..
                } => {
                    let Some((col, row)) = self.cell_at(*center) else {
                        continue;
                    };
                    let (ch, fg) = if *color == ThemeToken::MergeNodeFill {
                        ('◉', border_color.unwrap_or(*color))
                    } else {
                        ('●', *color)
                    };
                    if let Some(cell) = self.get_mut(col, row) {
                        cell.ch = ch;
                        cell.fg = Some(fg);
                    }
                }
                RenderCommand::DrawPath {
                    segments, color, ..
                } => self.stroke_path(segments, *color),
                _ => {}
            }
        }
    }

    fn stroke_path(&mut self, segments: &[PathSegment], color: ThemeToken) {
        let points = flatten(segments);
        // Per-cell strokes for this path, so a vertical run meeting a
        // horizontal one in the same cell becomes a corner glyph.
        let mut strokes: Vec<((u16, u16), Stroke, f64)> = Vec::new();
        for pair in points.windows(2) {
            let [a, b] = pair else { continue };
            let (dx, dy) = (b.x - a.x, b.y - a.y);
            if dx == 0.0 && dy == 0.0 {
                continue;
            }
            let stroke = if dx.abs() < dy.abs() * 0.4 {
                Stroke::Vertical
            } else if dy.abs() < dx.abs() * 0.4 {
                Stroke::Horizontal
            } else if (dx > 0.0) == (dy > 0.0) {
                Stroke::Falling
            } else {
                Stroke::Rising
            };
            let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
            if let Some(cell) = self.cell_at(mid) {
                strokes.push((cell, stroke, dx));
            }
        }

        let mut i = 0;
        while i < strokes.len() {
            let (cell, first, _) = strokes[i];
            let mut has_vertical = false;
            let mut horizontal_dx = None;
            let mut last = first;
            while let Some(&(c, stroke, dx)) = strokes.get(i)
                && c == cell
            {
                match stroke {
                    Stroke::Vertical => has_vertical = true,
                    Stroke::Horizontal => horizontal_dx = Some(dx),
                    _ => {}
                }
                last = stroke;
                i += 1;
            }
            let ch = match (has_vertical, horizontal_dx) {
                (true, Some(dx)) if dx > 0.0 => '╰',
                (true, Some(_)) => '╯',
                _ => glyph(last),
            };
            if let Some(target) = self.get_mut(cell.0, cell.1) {
                target.ch = ch;
                target.fg = Some(color);
            }
        }
    }

    /// Give every cell of `row` without a background the `token` background.
    pub fn highlight_row(&mut self, row: u16, token: ThemeToken) {
        for col in 0..self.width {
            if let Some(cell) = self.get_mut(col, row)
                && cell.bg.is_none()
            {
                cell.bg = Some(token);
            }
        }
    }

    #[cfg(test)]
    fn row_text(&self, row: u16) -> String {
        (0..self.width)
            .filter_map(|col| self.get(col, row).map(|c| c.ch))
            .collect()
    }
}

fn glyph(stroke: Stroke) -> char {
    match stroke {
        Stroke::Vertical => '│',
        Stroke::Horizontal => '─',
        Stroke::Falling => '╲',
        Stroke::Rising => '╱',
    }
}

/// Sample a path into a polyline, a few points per cell.
fn flatten(segments: &[PathSegment]) -> Vec<Point> {
    let mut points = Vec::new();
    let mut pen = Point::new(0.0, 0.0);
    for segment in segments {
        match *segment {
            PathSegment::MoveTo(p) => {
                points.push(p);
                pen = p;
            }
            PathSegment::LineTo(p) => {
                let steps = steps(pen, p);
                points.extend((1..=steps).map(|i| lerp(pen, p, i as f64 / steps as f64)));
                pen = p;
            }
            PathSegment::QuadTo { ctrl, to } => {
                let steps = steps(pen, to);
                let from = pen;
                points.extend((1..=steps).map(|i| {
                    let t = i as f64 / steps as f64;
                    lerp(lerp(from, ctrl, t), lerp(ctrl, to, t), t)
                }));
                pen = to;
            }
            PathSegment::CubicTo { ctrl1, ctrl2, to } => {
                let steps = steps(pen, to) * 2;
                let from = pen;
                points.extend((1..=steps).map(|i| {
                    let t = i as f64 / steps as f64;
                    let a = lerp(lerp(from, ctrl1, t), lerp(ctrl1, ctrl2, t), t);
                    let b = lerp(lerp(ctrl1, ctrl2, t), lerp(ctrl2, to, t), t);
                    lerp(a, b, t)
                }));
                pen = to;
            }
        }
    }
    points
}

fn steps(a: Point, b: Point) -> usize {
    let len = (b.x - a.x).abs() + (b.y - a.y).abs();
    ((len * 4.0).ceil() as usize).max(2)
}

fn lerp(a: Point, b: Point, t: f64) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}
