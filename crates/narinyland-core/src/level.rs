//! Level and XP math.
//!
//! The level is derived from the combined lifetime points of both partners.
//! Every hundred points is one level, starting at level 1 and capped at 50.
//! Points past the cap still accumulate, they just stop moving the level.

use serde::{Deserialize, Serialize};

/// Points needed to advance one level.
pub const XP_PER_LEVEL: i64 = 100;

/// Highest reachable level.
pub const MAX_LEVEL: i64 = 50;

/// A level together with progress inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub level: i64,
    pub xp_in_level: i64,
    pub xp_for_next_level: i64,
}

/// Compute the level for a lifetime points total.
///
/// Uses floor division, so a negative total yields a level below 1 rather
/// than being clamped.
pub fn calculate_level(total_xp: i64) -> LevelProgress {
    let level = (total_xp.div_euclid(XP_PER_LEVEL) + 1).min(MAX_LEVEL);

    LevelProgress {
        level,
        xp_in_level: total_xp.rem_euclid(XP_PER_LEVEL),
        xp_for_next_level: XP_PER_LEVEL,
    }
}

/// Result of granting XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpOutcome {
    pub previous: LevelProgress,
    pub current: LevelProgress,
    pub leveled_up: bool,
}

/// Level transition for adding `amount` to a lifetime total.
pub fn apply_xp(previous_total: i64, amount: i64) -> XpOutcome {
    let previous = calculate_level(previous_total);
    let current = calculate_level(previous_total.saturating_add(amount));

    XpOutcome {
        previous,
        current,
        leveled_up: current.level > previous.level,
    }
}
