use std::collections::HashMap;
use std::sync::Arc;

use crate::app::FetchError;
use crate::domain::{Entry, EntryPage, Scope};
use crate::filter::StatusFilter;
use crate::normalizer::Normalizer;
use crate::remote::EntrySource;

pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Accumulated entries of one scope plus the bookkeeping to page further.
#[derive(Debug, Clone, Default)]
pub struct PageState {
    entries: Vec<Entry>,
    positions: HashMap<i64, usize>,
    total: u64,
    offset: u64,
    more_available: bool,
    more_unread_available: bool,
}

impl PageState {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn more_available(&self) -> bool {
        self.more_available
    }

    pub fn more_unread_available(&self) -> bool {
        self.more_unread_available
    }

    /// Whether another page could grow the set seen through `status`.
    pub fn has_more(&self, status: StatusFilter) -> bool {
        match status {
            StatusFilter::All => self.more_available,
            StatusFilter::Unread => self.more_available && self.more_unread_available,
        }
    }

    pub fn get(&self, id: i64) -> Option<&Entry> {
        self.positions.get(&id).map(|&i| &self.entries[i])
    }

    /// Start over from a first page.
    pub fn replace(&mut self, page: EntryPage, scope_unread: u64) {
        self.entries.clear();
        self.positions.clear();
        self.offset = 0;
        self.absorb(page.entries);
        self.total = page.total;
        self.recompute_flags(scope_unread);
    }

    /// Fold a later page in. Returns how many ids were new.
    ///
    /// Known ids keep their position but take the freshly fetched value.
    pub fn merge(&mut self, page: EntryPage, page_size: u64, scope_unread: u64) -> usize {
        let before = self.entries.len();
        self.absorb(page.entries);
        self.total = page.total;
        self.offset += page_size;
        self.recompute_flags(scope_unread);
        self.entries.len() - before
    }

    /// Swap in a new value for an entry already held. Returns false if unknown.
    pub fn update(&mut self, entry: &Entry) -> bool {
        match self.positions.get(&entry.id) {
            Some(&i) => {
                self.entries[i] = entry.clone();
                true
            }
            None => false,
        }
    }

    pub fn unread_len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_unread()).count()
    }

    fn absorb(&mut self, entries: Vec<Entry>) {
        for entry in entries {
            match self.positions.get(&entry.id) {
                Some(&i) => self.entries[i] = entry,
                None => {
                    self.positions.insert(entry.id, self.entries.len());
                    self.entries.push(entry);
                }
            }
        }
    }

    fn recompute_flags(&mut self, scope_unread: u64) {
        self.more_available = (self.entries.len() as u64) < self.total;
        self.more_unread_available = (self.unread_len() as u64) < scope_unread;
    }
}

/// Fetches normalized pages from an [`EntrySource`].
#[derive(Clone)]
pub struct Paginator {
    source: Arc<dyn EntrySource>,
    normalizer: Normalizer,
    page_size: u64,
}

impl Paginator {
    pub fn new(source: Arc<dyn EntrySource>, page_size: u64) -> Self {
        Self {
            source,
            normalizer: Normalizer::new(),
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub async fn load_first_page(&self, scope: &Scope) -> Result<EntryPage, FetchError> {
        self.fetch(scope, 0).await
    }

    pub async fn load_next_page(
        &self,
        scope: &Scope,
        current_offset: u64,
    ) -> Result<EntryPage, FetchError> {
        self.fetch(scope, current_offset + self.page_size).await
    }

    async fn fetch(&self, scope: &Scope, offset: u64) -> Result<EntryPage, FetchError> {
        let page = self
            .source
            .fetch_entries(scope, offset, self.page_size)
            .await?;
        tracing::debug!(
            "Fetched {} entries of {} for {} at offset {}",
            page.entries.len(),
            page.total,
            scope,
            offset
        );
        Ok(EntryPage {
            total: page.total,
            entries: self.normalizer.normalize_all(page.entries),
        })
    }
}
