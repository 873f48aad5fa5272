//! Engagement edges: likes and bookmarks.
//!
//! Both relations share one shape, a `(user, post)` edge whose existence is
//! the whole state, so they are modelled as one ledger keyed by
//! [`EngagementKind`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relation an edge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    Like,
    Bookmark,
}

impl EngagementKind {
    /// Every relation, in a stable order.
    pub const ALL: [Self; 2] = [Self::Like, Self::Bookmark];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Bookmark => "bookmark",
        }
    }
}

impl fmt::Display for EngagementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of flipping an edge: the state after the flip and the post's
/// edge count observed in the same atomic step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub active: bool,
    pub count: i64,
}

impl ToggleOutcome {
    pub const fn new(active: bool, count: i64) -> Self {
        Self { active, count }
    }
}
