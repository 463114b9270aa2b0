//! The event applier: the single authorized mutator of `ProgressionState`.
//!
//! Every operation is synchronous, validates before touching the ledger
//! (a rejected call leaves the state bit-for-bit unchanged), and reports
//! what it awarded so the UI can show feedback.

use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::event::{QuestRewards, RewardEvent};
use crate::numbers::i64_to_f64;
use crate::state::{ProgressionState, level_for_xp};

/// Errors raised when a reward event carries a malformed amount.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum LedgerError {
    /// A caller supplied a non-positive, non-integral, or non-finite
    /// amount. This indicates a caller bug, not a user-facing condition.
    #[error("{field} amount must be a positive integer (got {value})")]
    InvalidAmount { field: &'static str, value: f64 },
}

/// Description of what a successfully applied event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardOutcome {
    pub xp_awarded: u64,
    pub coins_awarded: u64,
    pub level_before: u32,
    pub level_after: u32,
}

impl RewardOutcome {
    /// Whether the event pushed the ledger across a level threshold.
    #[must_use]
    pub const fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

fn positive_amount(field: &'static str, amount: i64) -> Result<u64, LedgerError> {
    u64::try_from(amount)
        .ok()
        .filter(|value| *value > 0)
        .ok_or(LedgerError::InvalidAmount {
            field,
            value: i64_to_f64(amount),
        })
}

fn credit_xp(state: &mut ProgressionState, amount: u64) {
    state.xp_total = state.xp_total.saturating_add(amount);
    state.level = level_for_xp(state.xp_total);
}

fn credit_coins(state: &mut ProgressionState, amount: u64) {
    state.coins_balance = state.coins_balance.saturating_add(amount);
}

/// Award XP and re-derive the level.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAmount`] for a non-positive amount; the
/// state is left untouched.
pub fn apply_gain_xp(
    state: &mut ProgressionState,
    amount: i64,
) -> Result<RewardOutcome, LedgerError> {
    let amount = positive_amount("xp", amount)?;
    let level_before = state.level;
    credit_xp(state, amount);
    debug!("gained {amount} xp (total {}, level {})", state.xp_total, state.level);
    Ok(RewardOutcome {
        xp_awarded: amount,
        coins_awarded: 0,
        level_before,
        level_after: state.level,
    })
}

/// Award coins.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAmount`] for a non-positive amount; the
/// state is left untouched.
pub fn apply_gain_coins(
    state: &mut ProgressionState,
    amount: i64,
) -> Result<RewardOutcome, LedgerError> {
    let amount = positive_amount("coins", amount)?;
    credit_coins(state, amount);
    debug!("gained {amount} coins (balance {})", state.coins_balance);
    Ok(RewardOutcome {
        xp_awarded: 0,
        coins_awarded: amount,
        level_before: state.level,
        level_after: state.level,
    })
}

/// Record a completed quest: credit its rewards, then count the
/// completion exactly once.
///
/// Either reward side may be zero. The ledger does not deduplicate by
/// `quest_id` — it has no visibility into which quests are active. The
/// caller (see [`crate::quest::QuestBoard`]) must ensure a given quest id
/// is applied at most once.
pub fn apply_complete_quest(
    state: &mut ProgressionState,
    quest_id: &str,
    rewards: QuestRewards,
) -> RewardOutcome {
    let level_before = state.level;
    credit_xp(state, rewards.xp);
    credit_coins(state, rewards.coins);
    state.quests_completed_count = state.quests_completed_count.saturating_add(1);
    debug!(
        "quest {quest_id} completed (+{} xp, +{} coins, {} total quests)",
        rewards.xp, rewards.coins, state.quests_completed_count
    );
    RewardOutcome {
        xp_awarded: rewards.xp,
        coins_awarded: rewards.coins,
        level_before,
        level_after: state.level,
    }
}

/// Record a daily check-in, raising the best streak if the current one
/// passes it.
pub fn apply_increment_streak(state: &mut ProgressionState) -> RewardOutcome {
    state.streak_current = state.streak_current.saturating_add(1);
    state.streak_best = state.streak_best.max(state.streak_current);
    debug!(
        "streak at {} (best {})",
        state.streak_current, state.streak_best
    );
    RewardOutcome {
        xp_awarded: 0,
        coins_awarded: 0,
        level_before: state.level,
        level_after: state.level,
    }
}

/// Dispatch one event to its transition.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAmount`] when a gain event carries a
/// non-positive amount; the state is left untouched.
pub fn apply_event(
    state: &mut ProgressionState,
    event: &RewardEvent,
) -> Result<RewardOutcome, LedgerError> {
    match event {
        RewardEvent::GainXp { amount } => apply_gain_xp(state, *amount),
        RewardEvent::GainCoins { amount } => apply_gain_coins(state, *amount),
        RewardEvent::CompleteQuest { quest_id, rewards } => {
            Ok(apply_complete_quest(state, quest_id, *rewards))
        }
        RewardEvent::IncrementStreak => Ok(apply_increment_streak(state)),
    }
}
