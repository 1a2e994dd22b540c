//! SVG renderer: converts a commit graph scene into a standalone SVG string.

use std::fmt::Write as _;

use commit_graph_protocol::{PathSegment, RenderCommand, ThemeToken};

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions.
/// `dark` selects the color palette.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, dark: bool) -> String {
    let mut svg = String::with_capacity(commands.len() * 120);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:ui-monospace,monospace;font-size:12px">"#,
    );

    let bg = resolve_color(ThemeToken::Background, dark);
    let _ = write!(svg, r#"<rect width="{width}" height="{height}" fill="{bg}"/>"#);

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                commit_id,
                ..
            } => {
                let fill = resolve_color(*color, dark);
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill}" rx="2""#,
                    rect.x, rect.y, rect.w, rect.h,
                );
                if let Some(id) = commit_id {
                    let _ = write!(svg, r#" data-commit="{}""#, escape_xml(id));
                }
                svg.push_str("/>");
            }
            RenderCommand::DrawCircle {
                center,
                radius,
                color,
                border_color,
                commit_id,
            } => {
                let fill = resolve_color(*color, dark);
                let _ = write!(
                    svg,
                    r#"<circle cx="{}" cy="{}" r="{radius}" fill="{fill}""#,
                    center.x, center.y,
                );
                if let Some(border) = border_color {
                    let _ = write!(
                        svg,
                        r#" stroke="{}" stroke-width="1.5""#,
                        resolve_color(*border, dark)
                    );
                }
                if let Some(id) = commit_id {
                    let _ = write!(svg, r#" data-commit="{}""#, escape_xml(id));
                }
                svg.push_str("/>");
            }
            RenderCommand::DrawPath {
                segments,
                color,
                width: line_width,
            } => {
                let stroke = resolve_color(*color, dark);
                let _ = write!(
                    svg,
                    r#"<path d="{}" fill="none" stroke="{stroke}" stroke-width="{line_width}"/>"#,
                    path_data(segments),
                );
            }
            RenderCommand::DrawText {
                text,
                position,
                color,
                font_size,
            } => {
                let fill = resolve_color(*color, dark);
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" fill="{fill}" font-size="{font_size}" dominant-baseline="middle">{}</text>"#,
                    position.x,
                    position.y,
                    escape_xml(text),
                );
            }
            // Group commands don't affect static SVG output
            _ => {}
        }
    }

    svg.push_str("</svg>");
    svg
}

/// SVG `d` attribute for a path.
pub fn path_data(segments: &[PathSegment]) -> String {
    let mut d = String::new();
    for segment in segments {
        if !d.is_empty() {
            d.push(' ');
        }
        let _ = match segment {
            PathSegment::MoveTo(p) => write!(d, "M {} {}", p.x, p.y),
            PathSegment::LineTo(p) => write!(d, "L {} {}", p.x, p.y),
            PathSegment::QuadTo { ctrl, to } => {
                write!(d, "Q {} {} {} {}", ctrl.x, ctrl.y, to.x, to.y)
            }
            PathSegment::CubicTo { ctrl1, ctrl2, to } => write!(
                d,
                "C {} {} {} {} {} {}",
                ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y
            ),
        };
    }
    d
}

fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    if dark {
        match token {
            ThemeToken::Branch0 => "#42a5f5",
            ThemeToken::Branch1 => "#ef5350",
            ThemeToken::Branch2 => "#66bb6a",
            ThemeToken::Branch3 => "#ffa726",
            ThemeToken::Branch4 => "#ab47bc",
            ThemeToken::Branch5 => "#26c6da",
            ThemeToken::Branch6 => "#ec407a",
            ThemeToken::Branch7 => "#d4e157",
            ThemeToken::NodeBorder => "#303030",
            ThemeToken::MergeNodeFill => "#181818",
            ThemeToken::BranchLabelBackground => "#37474f",
            ThemeToken::HeadLabelBackground => "#2e7d32",
            ThemeToken::BranchLabelText | ThemeToken::TextPrimary => "#ececec",
            ThemeToken::TextSecondary => "#9e9e9e",
            ThemeToken::TextMuted => "#757575",
            ThemeToken::SelectionHighlight => "#263850",
            ThemeToken::HoverHighlight => "#202a36",
            ThemeToken::Background => "#181818",
        }
    } else {
        match token {
            ThemeToken::Branch0 => "#1e88e5",
            ThemeToken::Branch1 => "#e53935",
            ThemeToken::Branch2 => "#43a047",
            ThemeToken::Branch3 => "#fb8c00",
            ThemeToken::Branch4 => "#8e24aa",
            ThemeToken::Branch5 => "#00acc1",
            ThemeToken::Branch6 => "#d81b60",
            ThemeToken::Branch7 => "#9e9d24",
            ThemeToken::NodeBorder => "#dee2e6",
            ThemeToken::MergeNodeFill => "#ffffff",
            ThemeToken::BranchLabelBackground => "#cfd8dc",
            ThemeToken::HeadLabelBackground => "#a5d6a7",
            ThemeToken::BranchLabelText | ThemeToken::TextPrimary => "#1a1a2e",
            ThemeToken::TextSecondary => "#555566",
            ThemeToken::TextMuted => "#888899",
            ThemeToken::SelectionHighlight => "#fff3c4",
            ThemeToken::HoverHighlight => "#f1f3f5",
            ThemeToken::Background => "#ffffff",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use commit_graph_protocol::{Point, SharedStr};

    #[test]
    fn basic_svg_output() {
        let commands = vec![RenderCommand::DrawCircle {
            center: Point::new(8.0, 12.0),
            radius: 4.0,
            color: ThemeToken::Branch0,
            border_color: None,
            commit_id: Some("abc123".into()),
        }];
        let svg = render_svg(&commands, 400.0, 100.0, true);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"data-commit="abc123""#));
        assert!(svg.contains("#42a5f5"));
    }

    #[test]
    fn corner_path_data() {
        let segments = [
            PathSegment::MoveTo(Point::new(8.0, 12.0)),
            PathSegment::LineTo(Point::new(8.0, 80.0)),
            PathSegment::QuadTo {
                ctrl: Point::new(8.0, 84.0),
                to: Point::new(12.0, 84.0),
            },
            PathSegment::LineTo(Point::new(24.0, 84.0)),
        ];
        assert_eq!(path_data(&segments), "M 8 12 L 8 80 Q 8 84 12 84 L 24 84");
    }

    #[test]
    fn escapes_xml_entities() {
        let commands = vec![RenderCommand::DrawText {
            position: Point::new(0.0, 0.0),
            text: SharedStr::from("fix <T> & \"quotes\""),
            color: ThemeToken::TextPrimary,
            font_size: 12.0,
        }];
        let svg = render_svg(&commands, 400.0, 100.0, false);
        assert!(svg.contains("fix &lt;T&gt; &amp; &quot;quotes&quot;"));
        assert!(svg.contains(r#"font-size="12""#));
    }
}
