//! Single-account ledger session: load on open, apply through the
//! applier, save after every successful transition.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::warn;
use thiserror::Error;

use crate::SnapshotStore;
use crate::applier::{self, LedgerError, RewardOutcome};
use crate::event::RewardEvent;
use crate::state::{ProgressSnapshot, ProgressionState};

pub(crate) fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Errors surfaced by session-level operations that touch both the
/// ledger and the snapshot store.
#[derive(Debug, Error)]
pub enum SessionError<E> {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("snapshot store failed: {0}")]
    Store(E),
}

/// One account's ledger plus its persistence handle.
///
/// The session is the only writer for its account. Every applied event
/// triggers a save; a failed save leaves the advanced in-memory state as
/// the source of truth and marks the session dirty so the caller can
/// retry with [`LedgerSession::flush`] (at-least-once durability, no
/// rollback).
#[derive(Debug)]
pub struct LedgerSession<S: SnapshotStore> {
    account_id: String,
    state: ProgressionState,
    store: S,
    dirty: bool,
}

impl<S: SnapshotStore> LedgerSession<S> {
    /// Open the session, loading the stored snapshot or starting from
    /// defaults on first use. A loaded snapshot is normalized so a stale
    /// stored level can never desynchronize from the XP total.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the load fails.
    pub fn open(store: S, account_id: &str) -> Result<Self, S::Error> {
        let state = match store.load(account_id)? {
            Some(mut loaded) => {
                loaded.normalize();
                loaded
            }
            None => ProgressionState::default(),
        };
        Ok(Self {
            account_id: account_id.to_string(),
            state,
            store,
            dirty: false,
        })
    }

    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    #[must_use]
    pub const fn state(&self) -> &ProgressionState {
        &self.state
    }

    #[must_use]
    pub const fn snapshot(&self) -> ProgressSnapshot {
        self.state.snapshot()
    }

    /// Whether the in-memory state has advanced past the last successful
    /// save.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Apply one event and save the new snapshot.
    ///
    /// A save failure does not fail the call: the transition has already
    /// happened, so the session logs the failure, stays dirty, and the
    /// caller retries via [`LedgerSession::flush`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] when the event carries a
    /// malformed amount; the state is left untouched and nothing is
    /// saved.
    pub fn apply(&mut self, event: &RewardEvent) -> Result<RewardOutcome, LedgerError> {
        let outcome = applier::apply_event(&mut self.state, event)?;
        self.dirty = true;
        if let Err(err) = self.store.save(&self.account_id, &self.state) {
            warn!(
                "snapshot save failed for account {}: {err}; will retry on flush",
                self.account_id
            );
        } else {
            self.dirty = false;
        }
        Ok(outcome)
    }

    /// Retry saving the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the save fails again; the session
    /// stays dirty.
    pub fn flush(&mut self) -> Result<(), S::Error> {
        if !self.dirty {
            return Ok(());
        }
        self.store.save(&self.account_id, &self.state)?;
        self.dirty = false;
        Ok(())
    }

    /// Administrative reset: restore the initial ledger and drop the
    /// stored snapshot. The only sanctioned way any total decreases.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the stored snapshot cannot be
    /// deleted; the in-memory reset still happens.
    pub fn reset(&mut self) -> Result<(), S::Error> {
        self.state = ProgressionState::default();
        self.dirty = false;
        self.store.delete(&self.account_id)
    }
}

/// In-memory snapshot store, keyed by account id.
///
/// The reference adapter for tests and single-process use; clones share
/// the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    saves: Arc<Mutex<HashMap<String, ProgressionState>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Peek at a stored snapshot without going through a session.
    #[must_use]
    pub fn stored(&self, account_id: &str) -> Option<ProgressionState> {
        lock_or_recover(&self.saves).get(account_id).cloned()
    }
}

impl SnapshotStore for MemoryStore {
    type Error = Infallible;

    fn load(&self, account_id: &str) -> Result<Option<ProgressionState>, Self::Error> {
        Ok(self.stored(account_id))
    }

    fn save(&self, account_id: &str, state: &ProgressionState) -> Result<(), Self::Error> {
        lock_or_recover(&self.saves).insert(account_id.to_string(), state.clone());
        Ok(())
    }

    fn delete(&self, account_id: &str) -> Result<(), Self::Error> {
        lock_or_recover(&self.saves).remove(account_id);
        Ok(())
    }
}
