use std::collections::HashSet;

use commit_graph_protocol::{
    CommitRecord, Point, Rect, RenderCommand, SharedStr, ThemeToken, Viewport,
};

use crate::config::GraphConfig;
use crate::layout::Connector;
use crate::model::GraphState;

/// Render the commit graph: one row per commit, nodes in their lanes,
/// connectors to parents, and text columns to the right of the lanes.
///
/// Pure projection of its inputs. Rows and connectors that fall outside the
/// viewport are culled; commits without a lane are not drawn.
pub fn render_commit_graph(
    state: &GraphState,
    connectors: &[Connector],
    config: &GraphConfig,
    viewport: &Viewport,
    head_branch: Option<&str>,
) -> Vec<RenderCommand> {
    if state.is_empty() {
        return Vec::new();
    }

    let half_row = config.row_height / 2.0;
    let visible = |row: usize| {
        let y = config.row_y(row);
        viewport.intersects_rows(y - half_row, y + half_row)
    };

    let mut commands = Vec::with_capacity(state.len() * 4 + connectors.len() + 3);
    commands.push(RenderCommand::BeginGroup {
        id: "commit-graph".into(),
        label: Some("Commit Graph".into()),
    });

    // Highlight band behind everything else.
    if let Some(selected) = state.selection().selected()
        && let Some(row) = state.row(selected)
        && visible(row)
    {
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(
                viewport.x,
                config.row_y(row) - half_row,
                viewport.width,
                config.row_height,
            ),
            color: ThemeToken::SelectionHighlight,
            border_color: None,
            commit_id: Some(selected.clone()),
        });
    }

    for connector in connectors {
        let (top, bottom) = connector.path.vertical_extent();
        if !viewport.intersects_rows(top, bottom) {
            continue;
        }
        commands.push(RenderCommand::DrawPath {
            segments: connector.path.segments(),
            color: connector.color,
            width: config.connector_width,
        });
    }

    let text_x = state.lanes().width() as f64 * config.lane_width + config.label_gap;
    let tips = branch_tips(state.commits());

    for (row, commit) in state.commits().iter().enumerate() {
        let Some(lane) = state.lane(&commit.id) else {
            continue;
        };
        if !visible(row) {
            continue;
        }
        let center = Point::new(config.lane_x(lane), config.row_y(row));
        let lane_color = ThemeToken::for_lane(lane);
        let (color, border_color) = if commit.is_merge() {
            (ThemeToken::MergeNodeFill, Some(lane_color))
        } else {
            (lane_color, Some(ThemeToken::NodeBorder))
        };
        commands.push(RenderCommand::DrawCircle {
            center,
            radius: config.node_radius,
            color,
            border_color,
            commit_id: Some(commit.id.clone()),
        });

        push_labels(
            &mut commands,
            commit,
            Point::new(text_x, center.y),
            config,
            tips.contains(commit.id.as_str()),
            head_branch,
        );
    }

    commands.push(RenderCommand::EndGroup);
    commands
}

fn push_labels(
    commands: &mut Vec<RenderCommand>,
    commit: &CommitRecord,
    origin: Point,
    config: &GraphConfig,
    is_tip: bool,
    head_branch: Option<&str>,
) {
    let advance = config.char_width;
    let mut x = origin.x;

    commands.push(text(
        Point::new(x, origin.y),
        commit.id.short(config.short_hash_len),
        ThemeToken::TextMuted,
        config,
    ));
    x += (config.short_hash_len + 1) as f64 * advance;

    if is_tip && let Some(label) = &commit.branch_label {
        let chip_w = (label.chars().count() + 2) as f64 * advance;
        let background = if head_branch == Some(label.as_str()) {
            ThemeToken::HeadLabelBackground
        } else {
            ThemeToken::BranchLabelBackground
        };
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(x, origin.y - config.font_size / 2.0, chip_w, config.font_size),
            color: background,
            border_color: None,
            commit_id: None,
        });
        commands.push(text(
            Point::new(x + advance, origin.y),
            label,
            ThemeToken::BranchLabelText,
            config,
        ));
        x += chip_w + advance;
    }

    let message = truncate(first_line(&commit.message), config.max_label_chars);
    let message_len = message.chars().count();
    commands.push(text(
        Point::new(x, origin.y),
        &message,
        ThemeToken::TextPrimary,
        config,
    ));

    if !commit.author.is_empty() {
        x += (message_len + 2) as f64 * advance;
        commands.push(text(
            Point::new(x, origin.y),
            &commit.author,
            ThemeToken::TextSecondary,
            config,
        ));
    }
}

fn text(position: Point, text: &str, color: ThemeToken, config: &GraphConfig) -> RenderCommand {
    RenderCommand::DrawText {
        position,
        text: SharedStr::from(text),
        color,
        font_size: config.font_size,
    }
}

/// Commits that carry a branch label not continued by a child on the same
/// branch. Their label is drawn as a chip.
fn branch_tips(commits: &[CommitRecord]) -> HashSet<&str> {
    let mut continued: HashSet<&str> = HashSet::new();
    let labels: std::collections::HashMap<&str, &str> = commits
        .iter()
        .filter_map(|c| c.branch_label.as_deref().map(|l| (c.id.as_str(), l)))
        .collect();
    for commit in commits {
        let (Some(label), Some(parent)) = (commit.branch_label.as_deref(), commit.primary_parent())
        else {
            continue;
        };
        if labels.get(parent.as_str()) == Some(&label) {
            continued.insert(parent.as_str());
        }
    }
    labels
        .keys()
        .copied()
        .filter(|id| !continued.contains(id))
        .collect()
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars && max_chars > 1 {
        let cut: String = s.chars().take(max_chars - 1).collect();
        format!("{cut}…")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::route_connectors;
    use crate::model::SelectionEvent;

    fn commit(id: &str, parents: &[&str], message: &str, label: Option<&str>) -> CommitRecord {
        CommitRecord {
            message: message.into(),
            author: "ada".into(),
            branch_label: label.map(str::to_string),
            ..CommitRecord::new(id, parents)
        }
    }

    fn state() -> GraphState {
        GraphState::from_commits(vec![
            commit("m0000000", &["a0000000", "b0000000"], "merge feature", Some("main")),
            commit("a0000000", &["r0000000"], "work on main", Some("main")),
            commit("b0000000", &["r0000000"], "feature work", Some("feature")),
            commit("r0000000", &[], "initial", Some("main")),
        ])
    }

    fn scene(state: &GraphState, viewport: &Viewport) -> Vec<RenderCommand> {
        let config = GraphConfig::default();
        let connectors = route_connectors(state, &config);
        render_commit_graph(state, &connectors, &config, viewport, Some("main"))
    }

    fn count(cmds: &[RenderCommand], pred: impl Fn(&RenderCommand) -> bool) -> usize {
        cmds.iter().filter(|c| pred(c)).count()
    }

    #[test]
    fn draws_nodes_and_connectors() {
        let cmds = scene(&state(), &Viewport::new(800.0, 600.0));
        assert_eq!(count(&cmds, |c| matches!(c, RenderCommand::DrawCircle { .. })), 4);
        assert_eq!(count(&cmds, |c| matches!(c, RenderCommand::DrawPath { .. })), 4);
        assert!(matches!(cmds.first(), Some(RenderCommand::BeginGroup { .. })));
        assert!(matches!(cmds.last(), Some(RenderCommand::EndGroup)));
    }

    #[test]
    fn chips_only_on_branch_tips() {
        let cmds = scene(&state(), &Viewport::new(800.0, 600.0));
        let chips: Vec<ThemeToken> = cmds
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawRect { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(
            chips,
            vec![
                ThemeToken::HeadLabelBackground,
                ThemeToken::BranchLabelBackground
            ]
        );
    }

    #[test]
    fn selection_adds_highlight_band_first() {
        let mut state = state();
        assert!(
            state
                .apply_selection(SelectionEvent::Click("a0000000".into()))
                .is_ok()
        );
        let cmds = scene(&state, &Viewport::new(800.0, 600.0));
        let band = cmds.get(1);
        assert!(matches!(
            band,
            Some(RenderCommand::DrawRect {
                color: ThemeToken::SelectionHighlight,
                ..
            })
        ));
        if let Some(RenderCommand::DrawRect {
            commit_id, rect, ..
        }) = band
        {
            assert_eq!(commit_id.as_deref(), Some("a0000000"));
            assert!((rect.y - 24.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn culls_rows_outside_viewport() {
        // Default rows are 24px; this window shows only row 3.
        let viewport = Viewport {
            y: 80.0,
            ..Viewport::new(800.0, 10.0)
        };
        let cmds = scene(&state(), &viewport);
        assert_eq!(count(&cmds, |c| matches!(c, RenderCommand::DrawCircle { .. })), 1);
        // Connectors ending on row 3 still pass through.
        assert!(count(&cmds, |c| matches!(c, RenderCommand::DrawPath { .. })) >= 2);
    }

    #[test]
    fn same_inputs_same_scene() {
        let state = state();
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(scene(&state, &vp), scene(&state, &vp));
    }

    #[test]
    fn long_messages_are_cut() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
        assert_eq!(first_line("subject\n\nbody"), "subject");
    }

    #[test]
    fn empty_state_renders_nothing() {
        let cmds = scene(&GraphState::default(), &Viewport::new(800.0, 600.0));
        assert!(cmds.is_empty());
    }
}
