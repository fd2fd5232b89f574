#![forbid(unsafe_code)]

//! Panel identities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three fixed layout regions, in left-to-right order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelId {
    /// Context map (project tree).
    Left,
    /// Chat stream. Never collapses.
    Center,
    /// Task timeline.
    Right,
}

impl PanelId {
    /// All panels in layout order.
    pub const ALL: [PanelId; 3] = [PanelId::Left, PanelId::Center, PanelId::Right];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    /// Protected panels ignore collapse requests.
    #[inline]
    #[must_use]
    pub const fn is_protected(self) -> bool {
        matches!(self, Self::Center)
    }

    /// Position in [`PanelId::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_center_is_protected() {
        let protected: Vec<_> = PanelId::ALL.iter().filter(|p| p.is_protected()).collect();
        assert_eq!(protected, vec![&PanelId::Center]);
    }

    #[test]
    fn index_matches_layout_order() {
        for (i, id) in PanelId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&PanelId::Right).unwrap();
        assert_eq!(json, "\"right\"");
        assert_eq!(PanelId::Left.to_string(), "left");
    }
}
