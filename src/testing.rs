//! In-memory collaborators for exercising the view core without a server.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::oneshot;

use crate::app::{FetchError, MutationError};
use crate::counters::UnreadCounters;
use crate::domain::{Entry, EntryPage, EntryStatus, FeedRef, GroupRef, Scope};
use crate::remote::{CounterSource, EntryMutations, EntrySource, FeedUnread};

pub const FEED_ID: i64 = 10;
pub const GROUP_ID: i64 = 100;

/// A read entry in feed [`FEED_ID`], group [`GROUP_ID`].
pub fn entry(id: i64) -> Entry {
    Entry {
        id,
        title: format!("Entry {}", id),
        content: format!("<p>Body of entry {}</p>", id),
        url: format!("https://example.com/{}", id),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        status: EntryStatus::Read,
        starred: false,
        preview_image: None,
        feed: FeedRef {
            id: FEED_ID,
            title: "Example Feed".into(),
            group: GroupRef {
                id: GROUP_ID,
                title: "Example Group".into(),
            },
        },
    }
}

pub fn unread_entry(id: i64) -> Entry {
    entry(id).with_status(EntryStatus::Unread)
}

pub fn page(total: u64, entries: Vec<Entry>) -> EntryPage {
    EntryPage { total, entries }
}

type Scripted = (Result<EntryPage, FetchError>, Option<oneshot::Receiver<()>>);

/// Entry source answering from a queue of scripted responses.
///
/// A response pushed with [`ScriptedSource::push_held`] is only delivered
/// once its release handle fires (or is dropped).
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<(Scope, u64, u64)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<EntryPage, FetchError>) {
        self.responses.lock().unwrap().push_back((response, None));
    }

    pub fn push_held(&self, response: Result<EntryPage, FetchError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.responses.lock().unwrap().push_back((response, Some(rx)));
        tx
    }

    pub fn calls(&self) -> Vec<(Scope, u64, u64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EntrySource for ScriptedSource {
    async fn fetch_entries(
        &self,
        scope: &Scope,
        offset: u64,
        limit: u64,
    ) -> Result<EntryPage, FetchError> {
        self.calls.lock().unwrap().push((*scope, offset, limit));
        let next = self.responses.lock().unwrap().pop_front();
        let Some((response, hold)) = next else {
            return Err(FetchError::Other("no scripted response".into()));
        };
        if let Some(hold) = hold {
            let _ = hold.await;
        }
        response
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Status(i64, EntryStatus),
    Starred(i64, bool),
    Opened(i64),
    MarkAll(Scope),
}

/// Mutation endpoint recording every call, with switches for failure modes.
#[derive(Default)]
pub struct FakeRemote {
    calls: Mutex<Vec<Call>>,
    holds: Mutex<VecDeque<oneshot::Receiver<()>>>,
    fail: AtomicBool,
    reject: AtomicBool,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every following call errors out.
    pub fn fail(&self, on: bool) {
        self.fail.store(on, Ordering::SeqCst);
    }

    /// Every following call answers `false`.
    pub fn reject(&self, on: bool) {
        self.reject.store(on, Ordering::SeqCst);
    }

    /// Hold the next call until the returned handle fires.
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds.lock().unwrap().push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(&self, call: Call) -> Result<bool, MutationError> {
        self.calls.lock().unwrap().push(call);
        let hold = self.holds.lock().unwrap().pop_front();
        if let Some(hold) = hold {
            let _ = hold.await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(MutationError::Other("remote unavailable".into()));
        }
        Ok(!self.reject.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl EntryMutations for FakeRemote {
    async fn update_entry_status(&self, entry: &Entry) -> Result<bool, MutationError> {
        self.answer(Call::Status(entry.id, entry.status.toggled()))
            .await
    }

    async fn update_entry_starred(&self, entry: &Entry) -> Result<bool, MutationError> {
        self.answer(Call::Starred(entry.id, !entry.starred)).await
    }

    async fn record_entry_opened(&self, entry: &Entry) -> Result<bool, MutationError> {
        self.answer(Call::Opened(entry.id)).await
    }

    async fn mark_all_read(&self, scope: &Scope) -> Result<bool, MutationError> {
        self.answer(Call::MarkAll(*scope)).await
    }
}

/// Counters keyed directly by scope. Feed deltas also move the total.
#[derive(Default)]
pub struct FakeCounters {
    counts: Mutex<HashMap<Scope, u64>>,
    on_reload: Mutex<Option<HashMap<Scope, u64>>>,
    reloads: AtomicUsize,
    fail_reload: AtomicBool,
}

impl FakeCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, scope: &Scope, count: u64) {
        self.counts.lock().unwrap().insert(*scope, count);
    }

    /// Counts a later reload will install.
    pub fn reload_to(&self, counts: &[(Scope, u64)]) {
        *self.on_reload.lock().unwrap() = Some(counts.iter().copied().collect());
    }

    pub fn fail_reload(&self, on: bool) {
        self.fail_reload.store(on, Ordering::SeqCst);
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    fn shift(&self, scope: Scope, delta: i64) {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(scope).or_default();
        *count = count.saturating_add_signed(delta);
    }
}

#[async_trait]
impl UnreadCounters for FakeCounters {
    fn unread_in(&self, scope: &Scope) -> u64 {
        self.counts.lock().unwrap().get(scope).copied().unwrap_or(0)
    }

    fn adjust_feed_unread(&self, feed_id: i64, delta: i64) {
        self.shift(Scope::Feed(feed_id), delta);
        self.shift(Scope::All, delta);
    }

    fn adjust_group_unread(&self, group_id: i64, delta: i64) {
        self.shift(Scope::Group(group_id), delta);
    }

    async fn reload_aggregates(&self) -> Result<(), FetchError> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reload.load(Ordering::SeqCst) {
            return Err(FetchError::Other("counters unavailable".into()));
        }
        if let Some(counts) = self.on_reload.lock().unwrap().clone() {
            *self.counts.lock().unwrap() = counts;
        }
        Ok(())
    }
}

/// Counter source returning a fixed snapshot.
pub struct StaticCounts {
    counts: Vec<FeedUnread>,
    fail_next: AtomicBool,
}

impl StaticCounts {
    pub fn new(counts: Vec<FeedUnread>) -> Self {
        Self {
            counts,
            fail_next: AtomicBool::new(false),
        }
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CounterSource for StaticCounts {
    async fn fetch_unread_counts(&self) -> Result<Vec<FeedUnread>, FetchError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(FetchError::Other("counters unavailable".into()));
        }
        Ok(self.counts.clone())
    }
}
