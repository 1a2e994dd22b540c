use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    // Lane palette, cycled by lane index.
    Branch0,
    Branch1,
    Branch2,
    Branch3,
    Branch4,
    Branch5,
    Branch6,
    Branch7,

    NodeBorder,
    MergeNodeFill,

    BranchLabelBackground,
    BranchLabelText,
    HeadLabelBackground,

    TextPrimary,
    TextSecondary,
    TextMuted,

    SelectionHighlight,
    HoverHighlight,

    Background,
}

impl ThemeToken {
    pub const LANE_PALETTE: [ThemeToken; 8] = [
        ThemeToken::Branch0,
        ThemeToken::Branch1,
        ThemeToken::Branch2,
        ThemeToken::Branch3,
        ThemeToken::Branch4,
        ThemeToken::Branch5,
        ThemeToken::Branch6,
        ThemeToken::Branch7,
    ];

    /// Palette entry for a lane; wraps after eight lanes.
    pub fn for_lane(lane: usize) -> ThemeToken {
        Self::LANE_PALETTE[lane % Self::LANE_PALETTE.len()]
    }
}
