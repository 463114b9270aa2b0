//! Reward events: immutable requests to mutate the ledger.

use serde::{Deserialize, Serialize};

use crate::applier::LedgerError;
use crate::numbers::int_amount_from_f64;

/// Server-confirmed reward payload for a completed quest.
///
/// Either side may be zero; a quest can carry only XP or only coins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRewards {
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub coins: u64,
}

/// One inbound mutation request for the progression ledger.
///
/// Events map 1:1 to the actions the surrounding app produces: workout XP,
/// coin gains, a completed quest with its confirmed rewards, and a daily
/// check-in recorded as a streak increment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardEvent {
    GainXp { amount: i64 },
    GainCoins { amount: i64 },
    CompleteQuest { quest_id: String, rewards: QuestRewards },
    IncrementStreak,
}

impl RewardEvent {
    /// Build a `GainXp` event from a loosely-typed payload value.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] when the value is non-finite
    /// or carries a fractional part. Sign is checked by the applier.
    pub fn gain_xp_from(value: f64) -> Result<Self, LedgerError> {
        int_amount_from_f64(value)
            .map(|amount| Self::GainXp { amount })
            .ok_or(LedgerError::InvalidAmount { field: "xp", value })
    }

    /// Build a `GainCoins` event from a loosely-typed payload value.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] when the value is non-finite
    /// or carries a fractional part.
    pub fn gain_coins_from(value: f64) -> Result<Self, LedgerError> {
        int_amount_from_f64(value)
            .map(|amount| Self::GainCoins { amount })
            .ok_or(LedgerError::InvalidAmount {
                field: "coins",
                value,
            })
    }
}
