//! Boundary with the remote source of truth.
//!
//! The view core only talks to these traits; [`MinifluxClient`] is the
//! reqwest-backed implementation used by the binary.

pub mod http_client;

use async_trait::async_trait;

use crate::app::{FetchError, MutationError};
use crate::domain::{Entry, EntryPage, Scope};

pub use http_client::MinifluxClient;

/// Paginated read of the entries in a scope.
#[async_trait]
pub trait EntrySource: Send + Sync {
    async fn fetch_entries(
        &self,
        scope: &Scope,
        offset: u64,
        limit: u64,
    ) -> Result<EntryPage, FetchError>;
}

/// Write side of the remote API.
///
/// Every method receives the entry as currently known locally. A returned
/// `false` means the remote did not apply the change.
#[async_trait]
pub trait EntryMutations: Send + Sync {
    /// Persist the opposite of `entry.status`.
    async fn update_entry_status(&self, entry: &Entry) -> Result<bool, MutationError>;

    /// Persist the opposite of `entry.starred`.
    async fn update_entry_starred(&self, entry: &Entry) -> Result<bool, MutationError>;

    /// Tell the remote the entry was opened, which marks it read there.
    async fn record_entry_opened(&self, entry: &Entry) -> Result<bool, MutationError>;

    async fn mark_all_read(&self, scope: &Scope) -> Result<bool, MutationError>;
}

/// Unread count of one feed together with the group it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedUnread {
    pub feed_id: i64,
    pub group_id: i64,
    pub unread: u64,
}

/// Source of a full snapshot of the unread aggregates.
#[async_trait]
pub trait CounterSource: Send + Sync {
    async fn fetch_unread_counts(&self) -> Result<Vec<FeedUnread>, FetchError>;
}
