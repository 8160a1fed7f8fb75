//! Confirm-then-commit changes to entry status and star flag.
//!
//! Nothing here touches the view's state slices: each operation talks to the
//! remote, adjusts the unread aggregates once the remote confirmed, and hands
//! back the new value of the entry for the caller to propagate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::app::MutationError;
use crate::counters::UnreadCounters;
use crate::domain::{Entry, EntryStatus, Scope};
use crate::remote::EntryMutations;

/// Per-entry locks so two changes to the same entry never overlap.
#[derive(Default)]
pub struct EntryGates {
    gates: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl EntryGates {
    pub async fn acquire(&self, entry_id: i64) -> OwnedMutexGuard<()> {
        let gate = {
            let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
            // Drop gates nobody is holding or waiting on.
            gates.retain(|_, gate| Arc::strong_count(gate) > 1);
            gates.entry(entry_id).or_default().clone()
        };
        gate.lock_owned().await
    }
}

pub struct Mutator {
    remote: Arc<dyn EntryMutations>,
    counters: Arc<dyn UnreadCounters>,
    gates: EntryGates,
}

impl Mutator {
    pub fn new(remote: Arc<dyn EntryMutations>, counters: Arc<dyn UnreadCounters>) -> Self {
        Self {
            remote,
            counters,
            gates: EntryGates::default(),
        }
    }

    /// Serialize work on one entry. Hold the guard across read-mutate-commit.
    pub async fn gate(&self, entry_id: i64) -> OwnedMutexGuard<()> {
        self.gates.acquire(entry_id).await
    }

    pub async fn toggle_read_status(&self, entry: &Entry) -> Result<Entry, MutationError> {
        let status = entry.status.toggled();
        if !self.remote.update_entry_status(entry).await? {
            return Err(MutationError::Rejected(entry.id));
        }
        self.shift_aggregates(entry, status);
        tracing::info!("Entry {} marked {}", entry.id, status.as_str());
        Ok(entry.with_status(status))
    }

    pub async fn toggle_starred(&self, entry: &Entry) -> Result<Entry, MutationError> {
        if !self.remote.update_entry_starred(entry).await? {
            return Err(MutationError::Rejected(entry.id));
        }
        Ok(entry.with_starred(!entry.starred))
    }

    /// Mark an entry read because it was opened. Already-read entries are
    /// returned as they are without contacting the remote.
    pub async fn mark_read(&self, entry: &Entry) -> Result<Entry, MutationError> {
        if !entry.is_unread() {
            return Ok(entry.clone());
        }
        if !self.remote.record_entry_opened(entry).await? {
            return Err(MutationError::Rejected(entry.id));
        }
        self.shift_aggregates(entry, EntryStatus::Read);
        Ok(entry.with_status(EntryStatus::Read))
    }

    /// Only the remote call; reloading aggregates and entries is up to the caller.
    pub async fn mark_all_read(&self, scope: &Scope) -> Result<(), MutationError> {
        if !self.remote.mark_all_read(scope).await? {
            return Err(MutationError::MarkAllRejected(scope.to_string()));
        }
        tracing::info!("Marked all entries read in {}", scope);
        Ok(())
    }

    fn shift_aggregates(&self, entry: &Entry, new_status: EntryStatus) {
        if entry.status == new_status {
            return;
        }
        let delta = new_status.unread_delta();
        self.counters.adjust_feed_unread(entry.feed_id(), delta);
        self.counters.adjust_group_unread(entry.group_id(), delta);
    }
}
