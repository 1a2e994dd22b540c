//! Lane assignment: maps each commit to a column so that a branch's commits
//! stay visually contiguous.
//!
//! Commits are walked in display order (newest first). Each active lane
//! remembers the id it expects to meet next, which is the primary parent of
//! the last commit placed in it. A commit takes the lowest lane expecting it,
//! or else the lowest free lane, so lane numbers are reused before the graph
//! grows wider.

use std::collections::{HashMap, HashSet};

use commit_graph_protocol::{CommitRecord, SharedStr};
use serde::Serialize;

use crate::error::{GraphError, InvalidReason};

/// Mapping from commit id to lane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LaneAssignment {
    lanes: HashMap<SharedStr, usize>,
    width: usize,
}

impl LaneAssignment {
    fn new(lanes: HashMap<SharedStr, usize>) -> Self {
        let width = lanes.values().max().map_or(0, |&max| max + 1);
        Self { lanes, width }
    }

    pub fn get(&self, id: &str) -> Option<usize> {
        self.lanes.get(id).copied()
    }

    /// Number of lane columns needed to draw the graph.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

/// Result of a layout pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneLayout {
    pub assignment: LaneAssignment,
    /// Commits left out of the layout, in row order.
    pub rejected: Vec<GraphError>,
}

/// Assign lanes to `commits` (display order, newest first).
///
/// With `previous`, every commit that already has a lane keeps it and only
/// commits without one are placed by the algorithm. Commits that list
/// themselves as a parent, or that close a parent cycle, get no lane and are
/// reported in [`LaneLayout::rejected`].
///
/// Parents missing from `commits` (history cut at a page boundary) and
/// parents that appear above their child reserve no lane.
pub fn assign_lanes(commits: &[CommitRecord], previous: Option<&LaneAssignment>) -> LaneLayout {
    let rows: HashMap<&str, usize> = commits
        .iter()
        .enumerate()
        .map(|(row, c)| (c.id.as_str(), row))
        .collect();

    let rejected = find_invalid(commits, &rows);
    let excluded: HashSet<&str> = rejected
        .iter()
        .filter_map(|err| match err {
            GraphError::InvalidHistory { id, .. } => Some(id.as_str()),
            _ => None,
        })
        .collect();

    let mut active = ActiveLanes::default();
    let mut lanes = HashMap::with_capacity(commits.len());

    for (row, commit) in commits.iter().enumerate() {
        if excluded.contains(commit.id.as_str()) {
            continue;
        }

        let pinned = previous.and_then(|p| p.get(&commit.id));
        // A new commit on top of kept history leans towards its parent's lane.
        let hint = previous.and_then(|p| commit.primary_parent().and_then(|pp| p.get(pp)));
        let lane = active.place(&commit.id, pinned, hint);
        lanes.insert(commit.id.clone(), lane);

        // Only parents still below this row can continue a lane.
        let pending = |parent: &SharedStr| {
            rows.get(parent.as_str()).is_some_and(|&r| r > row)
                && !excluded.contains(parent.as_str())
        };

        let parents = commit.unique_parents();
        match parents.first() {
            Some(&primary) if pending(primary) => active.expect(lane, primary.clone()),
            _ => active.retire(lane),
        }
        for &parent in parents.iter().skip(1) {
            if pending(parent) && !active.is_expected(parent) {
                active.open(parent.clone());
            }
        }
    }

    LaneLayout {
        assignment: LaneAssignment::new(lanes),
        rejected,
    }
}

/// Lane slots, each holding the id it expects next.
#[derive(Debug, Default)]
struct ActiveLanes {
    slots: Vec<Option<SharedStr>>,
}

impl ActiveLanes {
    /// Choose the lane for `id` and release every other lane waiting on it.
    ///
    /// Preference: the kept lane, then the lowest lane expecting `id`, then
    /// `hint` if it is free, then the lowest free lane.
    fn place(&mut self, id: &SharedStr, pinned: Option<usize>, hint: Option<usize>) -> usize {
        let expecting: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.as_ref() == Some(id))
            .map(|(lane, _)| lane)
            .collect();

        let lane = match pinned {
            Some(lane) => lane,
            None => match (expecting.first(), hint) {
                (Some(&lane), _) => lane,
                (None, Some(lane)) if self.is_free(lane) => lane,
                (None, _) => self.lowest_free(),
            },
        };

        // Lines converging on this commit end here.
        for l in expecting {
            self.slots[l] = None;
        }

        if self.slots.len() <= lane {
            self.slots.resize(lane + 1, None);
        }
        // A kept lane can collide with a line opened by a newer commit;
        // that line moves to a free lane.
        let displaced = self.slots[lane].replace(id.clone());
        if let Some(displaced) = displaced {
            self.open(displaced);
        }
        lane
    }

    fn expect(&mut self, lane: usize, id: SharedStr) {
        self.slots[lane] = Some(id);
    }

    fn retire(&mut self, lane: usize) {
        self.slots[lane] = None;
    }

    fn open(&mut self, id: SharedStr) {
        let lane = self.lowest_free();
        self.slots[lane] = Some(id);
    }

    fn is_expected(&self, id: &SharedStr) -> bool {
        self.slots.iter().any(|slot| slot.as_ref() == Some(id))
    }

    fn is_free(&self, lane: usize) -> bool {
        self.slots.get(lane).is_none_or(Option::is_none)
    }

    fn lowest_free(&mut self) -> usize {
        if let Some(lane) = self.slots.iter().position(Option::is_none) {
            return lane;
        }
        self.slots.push(None);
        self.slots.len() - 1
    }
}

/// Find commits that cannot be laid out: self-parents, and for each parent
/// cycle the commit whose parent edge closes it.
fn find_invalid(commits: &[CommitRecord], rows: &HashMap<&str, usize>) -> Vec<GraphError> {
    const WHITE: u8 = 0;
    const GRAY: u8 = 1;
    const BLACK: u8 = 2;

    let mut found: Vec<(usize, GraphError)> = Vec::new();
    let mut bad = vec![false; commits.len()];

    for (row, commit) in commits.iter().enumerate() {
        if commit.parent_ids.contains(&commit.id) {
            bad[row] = true;
            found.push((
                row,
                GraphError::InvalidHistory {
                    id: commit.id.clone(),
                    reason: InvalidReason::SelfParent,
                },
            ));
        }
    }

    let mut color = vec![WHITE; commits.len()];
    for start in 0..commits.len() {
        if color[start] != WHITE || bad[start] {
            continue;
        }
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        color[start] = GRAY;

        while let Some(&(row, next)) = stack.last() {
            let parents = &commits[row].parent_ids;
            if next >= parents.len() || bad[row] {
                color[row] = BLACK;
                stack.pop();
                continue;
            }
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }
            let parent = &parents[next];

            let Some(&p) = rows.get(parent.as_str()) else {
                continue;
            };
            if bad[p] {
                continue;
            }
            match color[p] {
                WHITE => {
                    color[p] = GRAY;
                    stack.push((p, 0));
                }
                GRAY => {
                    bad[row] = true;
                    found.push((
                        row,
                        GraphError::InvalidHistory {
                            id: commits[row].id.clone(),
                            reason: InvalidReason::ParentCycle { via: parent.clone() },
                        },
                    ));
                }
                _ => {}
            }
        }
    }

    found.sort_by_key(|(row, _)| *row);
    found.into_iter().map(|(_, err)| err).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lanes_of(layout: &LaneLayout, ids: &[&str]) -> Vec<Option<usize>> {
        ids.iter().map(|id| layout.assignment.get(id)).collect()
    }

    #[test]
    fn linear_history_single_lane() {
        let commits = vec![
            CommitRecord::new("c3", &["c2"]),
            CommitRecord::new("c2", &["c1"]),
            CommitRecord::new("c1", &[]),
        ];
        let layout = assign_lanes(&commits, None);
        assert_eq!(
            lanes_of(&layout, &["c3", "c2", "c1"]),
            vec![Some(0), Some(0), Some(0)]
        );
        assert_eq!(layout.assignment.width(), 1);
        assert!(layout.rejected.is_empty());
    }

    #[test]
    fn merge_opens_lane_for_second_parent() {
        let commits = vec![
            CommitRecord::new("m", &["a", "b"]),
            CommitRecord::new("a", &["base"]),
            CommitRecord::new("b", &["base"]),
            CommitRecord::new("base", &[]),
        ];
        let layout = assign_lanes(&commits, None);
        assert_eq!(
            lanes_of(&layout, &["m", "a", "b", "base"]),
            vec![Some(0), Some(0), Some(1), Some(0)]
        );
    }

    #[test]
    fn freed_lane_is_reused() {
        // Two short side branches, one after the other, share lane 1.
        let commits = vec![
            CommitRecord::new("m2", &["m1", "y"]),
            CommitRecord::new("y", &["m1"]),
            CommitRecord::new("m1", &["base", "x"]),
            CommitRecord::new("x", &["base"]),
            CommitRecord::new("base", &[]),
        ];
        let layout = assign_lanes(&commits, None);
        assert_eq!(layout.assignment.get("y"), Some(1));
        assert_eq!(layout.assignment.get("x"), Some(1));
        assert_eq!(layout.assignment.width(), 2);
    }

    #[test]
    fn merge_does_not_reassign_expected_parent() {
        // "b" is already expected in lane 1 when "m" names it as a merge
        // source, so no third lane opens.
        let commits = vec![
            CommitRecord::new("tip", &["b"]),
            CommitRecord::new("m", &["a", "b"]),
            CommitRecord::new("b", &["a"]),
            CommitRecord::new("a", &[]),
        ];
        let layout = assign_lanes(&commits, None);
        assert_eq!(
            lanes_of(&layout, &["tip", "m", "b", "a"]),
            vec![Some(0), Some(1), Some(0), Some(0)]
        );
        assert_eq!(layout.assignment.width(), 2);
    }

    #[test]
    fn unrelated_roots_get_separate_lanes() {
        let commits = vec![
            CommitRecord::new("a2", &["a1"]),
            CommitRecord::new("b1", &[]),
            CommitRecord::new("a1", &[]),
        ];
        let layout = assign_lanes(&commits, None);
        assert_eq!(
            lanes_of(&layout, &["a2", "b1", "a1"]),
            vec![Some(0), Some(1), Some(0)]
        );
    }

    #[test]
    fn missing_parent_reserves_no_lane() {
        let commits = vec![
            CommitRecord::new("m", &["a", "not-fetched"]),
            CommitRecord::new("a", &["also-missing"]),
            CommitRecord::new("side", &[]),
        ];
        let layout = assign_lanes(&commits, None);
        assert_eq!(
            lanes_of(&layout, &["m", "a", "side"]),
            vec![Some(0), Some(0), Some(0)]
        );
    }

    #[test]
    fn duplicate_parents_are_one_edge() {
        let commits = vec![
            CommitRecord::new("m", &["a", "a"]),
            CommitRecord::new("a", &[]),
        ];
        let layout = assign_lanes(&commits, None);
        assert_eq!(layout.assignment.width(), 1);
    }

    #[test]
    fn self_parent_is_rejected() {
        let commits = vec![
            CommitRecord::new("bad", &["bad"]),
            CommitRecord::new("ok", &[]),
        ];
        let layout = assign_lanes(&commits, None);
        assert_eq!(layout.assignment.get("bad"), None);
        assert_eq!(layout.assignment.get("ok"), Some(0));
        assert_eq!(
            layout.rejected,
            vec![GraphError::InvalidHistory {
                id: "bad".into(),
                reason: InvalidReason::SelfParent,
            }]
        );
    }

    #[test]
    fn cycle_rejects_the_closing_commit() {
        let commits = vec![
            CommitRecord::new("a", &["b"]),
            CommitRecord::new("b", &["c"]),
            CommitRecord::new("c", &["a"]),
            CommitRecord::new("d", &[]),
        ];
        let layout = assign_lanes(&commits, None);
        assert_eq!(
            layout.rejected,
            vec![GraphError::InvalidHistory {
                id: "c".into(),
                reason: InvalidReason::ParentCycle { via: "a".into() },
            }]
        );
        assert_eq!(layout.assignment.get("a"), Some(0));
        assert_eq!(layout.assignment.get("c"), None);
        assert!(layout.assignment.get("d").is_some());
    }

    #[test]
    fn previous_lanes_are_kept() {
        let old = vec![
            CommitRecord::new("f", &["base"]),
            CommitRecord::new("main", &["base"]),
            CommitRecord::new("base", &[]),
        ];
        let first = assign_lanes(&old, None);
        assert_eq!(first.assignment.get("main"), Some(1));

        let mut grown = vec![CommitRecord::new("new", &["main"])];
        grown.extend(old);
        let second = assign_lanes(&grown, Some(&first.assignment));
        for id in ["f", "main", "base"] {
            assert_eq!(second.assignment.get(id), first.assignment.get(id), "{id}");
        }
        assert_eq!(second.assignment.get("new"), Some(1));
    }

    #[test]
    fn kept_lane_displaces_pending_line() {
        let previous = assign_lanes(
            &[
                CommitRecord::new("old", &["x"]),
                CommitRecord::new("x", &[]),
            ],
            None,
        );
        // "new" opens lane 0 waiting for "y"; the kept commit "old" owns
        // lane 0, so the line waiting for "y" moves to lane 1.
        let commits = vec![
            CommitRecord::new("new", &["y"]),
            CommitRecord::new("old", &["x"]),
            CommitRecord::new("y", &[]),
            CommitRecord::new("x", &[]),
        ];
        let layout = assign_lanes(&commits, Some(&previous.assignment));
        assert_eq!(
            lanes_of(&layout, &["new", "old", "y", "x"]),
            vec![Some(0), Some(0), Some(1), Some(0)]
        );
    }
}
