//! The authoritative progression ledger for one account.

use serde::{Deserialize, Serialize};

use crate::constants::{MIN_LEVEL, XP_PER_LEVEL};
use crate::numbers::clamp_u64_to_u32;

/// Compute the level for an XP total.
///
/// One level per 1000 XP, closed on the lower bound of each band:
/// 0 and 999 XP are level 1, 1000 XP is level 2. Total and deterministic;
/// never returns less than 1.
#[must_use]
pub fn level_for_xp(xp_total: u64) -> u32 {
    clamp_u64_to_u32(xp_total / XP_PER_LEVEL)
        .saturating_add(1)
        .max(MIN_LEVEL)
}

/// XP remaining until the next level threshold.
///
/// Exactly at a threshold the full band width remains, so the value is
/// always in `1..=1000`.
#[must_use]
pub const fn xp_to_next_level(xp_total: u64) -> u64 {
    XP_PER_LEVEL - (xp_total % XP_PER_LEVEL)
}

/// The progression ledger: XP, derived level, coin wallet, quest count,
/// and streaks for a single account.
///
/// Created once per account with [`ProgressionState::default`] and only
/// ever mutated through the applier functions in [`crate::applier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    /// Total experience earned; monotonically non-decreasing.
    #[serde(default)]
    pub xp_total: u64,
    /// Derived from `xp_total`. Persisted redundantly for consumers, but
    /// never trusted on load: [`ProgressionState::normalize`] re-derives it.
    #[serde(default = "ProgressionState::default_level")]
    pub level: u32,
    /// Coin wallet balance; never decreases outside an administrative reset.
    #[serde(default)]
    pub coins_balance: u64,
    /// Incremented exactly once per distinct completed quest.
    #[serde(default)]
    pub quests_completed_count: u32,
    /// Consecutive qualifying check-in periods.
    #[serde(default)]
    pub streak_current: u32,
    /// Best-ever streak; always `>= streak_current`.
    #[serde(default)]
    pub streak_best: u32,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            xp_total: 0,
            level: Self::default_level(),
            coins_balance: 0,
            quests_completed_count: 0,
            streak_current: 0,
            streak_best: 0,
        }
    }
}

impl ProgressionState {
    const fn default_level() -> u32 {
        MIN_LEVEL
    }

    /// Restore invariants after deserialization.
    ///
    /// `xp_total` is the source of truth: a stored `level` that disagrees
    /// with it is overridden, and `streak_best` is raised to cover
    /// `streak_current` if a stale snapshot left it behind.
    pub fn normalize(&mut self) {
        let derived = level_for_xp(self.xp_total);
        if self.level != derived {
            log::warn!(
                "stored level {} disagrees with xp total {}; re-deriving to {}",
                self.level,
                self.xp_total,
                derived
            );
            self.level = derived;
        }
        if self.streak_best < self.streak_current {
            self.streak_best = self.streak_current;
        }
    }

    /// XP remaining until this ledger's next level threshold.
    #[must_use]
    pub const fn xp_to_next_level(&self) -> u64 {
        xp_to_next_level(self.xp_total)
    }

    /// Build the outbound snapshot consumed by presentation.
    #[must_use]
    pub const fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            level: self.level,
            xp_total: self.xp_total,
            xp_to_next_level: self.xp_to_next_level(),
            coins_balance: self.coins_balance,
            quests_completed_count: self.quests_completed_count,
            streak_current: self.streak_current,
            streak_best: self.streak_best,
        }
    }
}

/// Read-only progression summary handed to dashboards and widgets.
///
/// Field names follow the server contract consumed by the front end
/// (`xp_total`, `xp_to_next_level`, `coins_balance`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub level: u32,
    pub xp_total: u64,
    pub xp_to_next_level: u64,
    pub coins_balance: u64,
    pub quests_completed_count: u32,
    pub streak_current: u32,
    pub streak_best: u32,
}
