//! Unread aggregates shared with the rest of the reader.
//!
//! The view core never recomputes these by scanning entries; it only issues
//! deltas on confirmed status transitions and asks for a full reload after
//! mark-all-as-read.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::app::FetchError;
use crate::domain::Scope;
use crate::remote::CounterSource;

#[async_trait]
pub trait UnreadCounters: Send + Sync {
    /// Unread aggregate for a whole scope: the total, one feed, or one group.
    fn unread_in(&self, scope: &Scope) -> u64;

    fn adjust_feed_unread(&self, feed_id: i64, delta: i64);

    fn adjust_group_unread(&self, group_id: i64, delta: i64);

    async fn reload_aggregates(&self) -> Result<(), FetchError>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TallySnapshot {
    pub total: u64,
    pub feeds: HashMap<i64, u64>,
    pub groups: HashMap<i64, u64>,
}

/// In-memory unread counters refreshed from a [`CounterSource`].
///
/// A feed adjustment moves the global total as well, since every entry
/// belongs to exactly one feed. Counts never drop below zero.
pub struct UnreadTally {
    source: Arc<dyn CounterSource>,
    inner: Mutex<TallySnapshot>,
}

impl UnreadTally {
    pub fn new(source: Arc<dyn CounterSource>) -> Self {
        Self {
            source,
            inner: Mutex::new(TallySnapshot::default()),
        }
    }

    pub fn snapshot(&self) -> TallySnapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, TallySnapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn apply_delta(count: &mut u64, delta: i64) {
    *count = count.saturating_add_signed(delta);
}

#[async_trait]
impl UnreadCounters for UnreadTally {
    fn unread_in(&self, scope: &Scope) -> u64 {
        let tally = self.lock();
        match scope {
            Scope::All => tally.total,
            Scope::Feed(id) => tally.feeds.get(id).copied().unwrap_or(0),
            Scope::Group(id) => tally.groups.get(id).copied().unwrap_or(0),
        }
    }

    fn adjust_feed_unread(&self, feed_id: i64, delta: i64) {
        let mut tally = self.lock();
        apply_delta(tally.feeds.entry(feed_id).or_default(), delta);
        apply_delta(&mut tally.total, delta);
    }

    fn adjust_group_unread(&self, group_id: i64, delta: i64) {
        let mut tally = self.lock();
        apply_delta(tally.groups.entry(group_id).or_default(), delta);
    }

    async fn reload_aggregates(&self) -> Result<(), FetchError> {
        let counts = self.source.fetch_unread_counts().await?;

        let mut snapshot = TallySnapshot::default();
        for feed in counts {
            snapshot.total += feed.unread;
            *snapshot.feeds.entry(feed.feed_id).or_default() += feed.unread;
            *snapshot.groups.entry(feed.group_id).or_default() += feed.unread;
        }

        tracing::debug!(
            "Reloaded unread aggregates: {} total across {} feeds",
            snapshot.total,
            snapshot.feeds.len()
        );
        *self.lock() = snapshot;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::FeedUnread;
    use crate::testing::StaticCounts;

    fn tally(counts: Vec<FeedUnread>) -> UnreadTally {
        UnreadTally::new(Arc::new(StaticCounts::new(counts)))
    }

    fn counts() -> Vec<FeedUnread> {
        vec![
            FeedUnread { feed_id: 1, group_id: 10, unread: 5 },
            FeedUnread { feed_id: 2, group_id: 10, unread: 2 },
            FeedUnread { feed_id: 3, group_id: 20, unread: 1 },
        ]
    }

    #[tokio::test]
    async fn test_reload_builds_feed_group_and_total() {
        let t = tally(counts());
        t.reload_aggregates().await.unwrap();

        assert_eq!(t.unread_in(&Scope::All), 8);
        assert_eq!(t.unread_in(&Scope::Feed(1)), 5);
        assert_eq!(t.unread_in(&Scope::Group(10)), 7);
        assert_eq!(t.unread_in(&Scope::Group(20)), 1);
        assert_eq!(t.unread_in(&Scope::Feed(99)), 0);
    }

    #[tokio::test]
    async fn test_deltas_move_feed_total_and_group() {
        let t = tally(counts());
        t.reload_aggregates().await.unwrap();

        t.adjust_feed_unread(1, -1);
        t.adjust_group_unread(10, -1);
        assert_eq!(t.unread_in(&Scope::Feed(1)), 4);
        assert_eq!(t.unread_in(&Scope::Group(10)), 6);
        assert_eq!(t.unread_in(&Scope::All), 7);

        t.adjust_feed_unread(1, 1);
        assert_eq!(t.unread_in(&Scope::Feed(1)), 5);
        assert_eq!(t.unread_in(&Scope::All), 8);
    }

    #[test]
    fn test_counts_clamp_at_zero() {
        let t = tally(Vec::new());
        t.adjust_feed_unread(4, -3);
        t.adjust_group_unread(40, -1);
        assert_eq!(t.unread_in(&Scope::Feed(4)), 0);
        assert_eq!(t.unread_in(&Scope::Group(40)), 0);
        assert_eq!(t.unread_in(&Scope::All), 0);
    }

    #[tokio::test]
    async fn test_reload_replaces_local_drift() {
        let t = tally(counts());
        t.adjust_feed_unread(1, 50);
        t.reload_aggregates().await.unwrap();
        assert_eq!(t.unread_in(&Scope::Feed(1)), 5);
        assert_eq!(t.snapshot().total, 8);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_counts() {
        let source = Arc::new(StaticCounts::new(counts()));
        let t = UnreadTally::new(source.clone());
        t.reload_aggregates().await.unwrap();

        source.fail_next();
        assert!(t.reload_aggregates().await.is_err());
        assert_eq!(t.unread_in(&Scope::All), 8);
    }
}
