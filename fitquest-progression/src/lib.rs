//! FitQuest Progression Ledger
//!
//! Platform-agnostic gamification core for the FitQuest fitness app.
//! This crate owns the rules for XP, levels, coins, quest completions,
//! and streaks without any UI or storage-technology dependencies.

pub mod applier;
pub mod constants;
pub mod event;
pub mod numbers;
pub mod quest;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use applier::{
    LedgerError, RewardOutcome, apply_complete_quest, apply_event, apply_gain_coins,
    apply_gain_xp, apply_increment_streak,
};
pub use event::{QuestRewards, RewardEvent};
pub use quest::{QuestBoard, QuestCatalog, QuestDef};
pub use session::{LedgerSession, MemoryStore, SessionError};
pub use state::{ProgressSnapshot, ProgressionState, level_for_xp, xp_to_next_level};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use session::lock_or_recover;

/// Trait for abstracting snapshot persistence
/// Platform-specific implementations should provide this
pub trait SnapshotStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the stored ledger snapshot for an account, `None` on first
    /// use.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded.
    fn load(&self, account_id: &str) -> Result<Option<ProgressionState>, Self::Error>;

    /// Save the ledger snapshot for an account. Callers treat saves as
    /// at-least-once durable and retry on failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    fn save(&self, account_id: &str, state: &ProgressionState) -> Result<(), Self::Error>;

    /// Delete the stored snapshot for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be deleted.
    fn delete(&self, account_id: &str) -> Result<(), Self::Error>;
}

/// Multi-account entry point over one snapshot store.
///
/// Keeps at most one [`LedgerSession`] per account behind a mutex, so
/// concurrent callers (retried requests included) are serialized per
/// account while ledgers of different accounts stay fully independent.
pub struct ProgressionEngine<S: SnapshotStore> {
    store: S,
    sessions: Mutex<HashMap<String, Arc<Mutex<LedgerSession<S>>>>>,
}

impl<S> ProgressionEngine<S>
where
    S: SnapshotStore + Clone,
{
    /// Create an engine over the provided snapshot store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch or open the session for an account.
    ///
    /// # Errors
    ///
    /// Returns the store's error if a first-time load fails.
    pub fn session(&self, account_id: &str) -> Result<Arc<Mutex<LedgerSession<S>>>, S::Error> {
        let mut sessions = lock_or_recover(&self.sessions);
        if let Some(existing) = sessions.get(account_id) {
            return Ok(Arc::clone(existing));
        }
        let opened = LedgerSession::open(self.store.clone(), account_id)?;
        let handle = Arc::new(Mutex::new(opened));
        sessions.insert(account_id.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Apply one event to an account's ledger, serialized against other
    /// mutations of the same account.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the session cannot be opened,
    /// or [`SessionError::Ledger`] for a malformed amount.
    pub fn apply(
        &self,
        account_id: &str,
        event: &RewardEvent,
    ) -> Result<RewardOutcome, SessionError<S::Error>> {
        let handle = self.session(account_id).map_err(SessionError::Store)?;
        let mut session = lock_or_recover(&handle);
        session.apply(event).map_err(SessionError::Ledger)
    }

    /// Current outbound snapshot for an account.
    ///
    /// # Errors
    ///
    /// Returns the store's error if a first-time load fails.
    pub fn snapshot(&self, account_id: &str) -> Result<ProgressSnapshot, S::Error> {
        let handle = self.session(account_id)?;
        let session = lock_or_recover(&handle);
        Ok(session.snapshot())
    }

    /// Administrative reset for one account: restore defaults and drop
    /// the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the stored snapshot cannot be
    /// deleted.
    pub fn reset(&self, account_id: &str) -> Result<(), S::Error> {
        let existing = {
            let sessions = lock_or_recover(&self.sessions);
            sessions.get(account_id).cloned()
        };
        match existing {
            Some(handle) => lock_or_recover(&handle).reset(),
            None => self.store.delete(account_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_roundtrips_state_through_the_store() {
        let store = MemoryStore::new();
        let engine = ProgressionEngine::new(store.clone());
        engine
            .apply("acct-1", &RewardEvent::GainXp { amount: 1_200 })
            .unwrap();
        engine
            .apply("acct-1", &RewardEvent::GainCoins { amount: 30 })
            .unwrap();

        let snapshot = engine.snapshot("acct-1").unwrap();
        assert_eq!(snapshot.level, 2);
        assert_eq!(snapshot.xp_total, 1_200);
        assert_eq!(snapshot.coins_balance, 30);

        // A second engine over the same store sees the persisted ledger.
        let reloaded = ProgressionEngine::new(store);
        assert_eq!(reloaded.snapshot("acct-1").unwrap(), snapshot);
    }

    #[test]
    fn accounts_are_independent() {
        let engine = ProgressionEngine::new(MemoryStore::new());
        engine
            .apply("alice", &RewardEvent::GainXp { amount: 2_000 })
            .unwrap();
        engine.apply("bob", &RewardEvent::IncrementStreak).unwrap();

        assert_eq!(engine.snapshot("alice").unwrap().level, 3);
        assert_eq!(engine.snapshot("bob").unwrap().level, 1);
        assert_eq!(engine.snapshot("bob").unwrap().streak_current, 1);
        assert_eq!(engine.snapshot("alice").unwrap().streak_current, 0);
    }

    #[test]
    fn reset_clears_account_even_without_open_session() {
        let store = MemoryStore::new();
        let seeded = ProgressionState {
            xp_total: 5_000,
            level: 6,
            ..ProgressionState::default()
        };
        let _ = store.save("acct-1", &seeded);

        let engine = ProgressionEngine::new(store.clone());
        engine.reset("acct-1").unwrap();
        assert!(store.stored("acct-1").is_none());
        assert_eq!(engine.snapshot("acct-1").unwrap().xp_total, 0);
    }

    #[test]
    fn invalid_amount_surfaces_as_ledger_error() {
        let engine = ProgressionEngine::new(MemoryStore::new());
        let err = engine
            .apply("acct-1", &RewardEvent::GainXp { amount: 0 })
            .unwrap_err();
        assert!(matches!(err, SessionError::Ledger(LedgerError::InvalidAmount { .. })));
        assert_eq!(engine.snapshot("acct-1").unwrap().xp_total, 0);
    }
}
