//! The view coordinator: one scope's list, detail selection and counters,
//! kept consistent while page loads and mutations overlap.
//!
//! All state lives behind one lock that is never held across an await. Page
//! loads carry the generation they started in and are dropped on return if a
//! scope change (or a reload) happened meanwhile. Changes to a single entry
//! run one at a time through the mutator's per-entry gates.

mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::app::{Result, TributaryError};
use crate::counters::UnreadCounters;
use crate::domain::{Entry, Scope};
use crate::filter::FilterSpec;
use crate::mutation::Mutator;
use crate::pagination::Paginator;
use crate::remote::{EntryMutations, EntrySource};
use crate::selection::{self, Command, DetailTransition, Focus, Intent};

use self::state::ViewState;

/// Outcome of a page load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLoad {
    /// Applied; `entries` is the size of the full set afterwards.
    Loaded { added: usize, entries: usize },
    /// Another load is still running.
    Busy,
    /// Nothing left to fetch for the current filter.
    Exhausted,
    /// The scope changed while fetching; the result was thrown away.
    Superseded,
}

/// Whether a keyboard command's precondition held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    Ignored,
}

pub struct ViewCoordinator {
    paginator: Paginator,
    mutator: Mutator,
    counters: Arc<dyn UnreadCounters>,
    state: Mutex<ViewState>,
}

impl ViewCoordinator {
    pub fn new(
        source: Arc<dyn EntrySource>,
        remote: Arc<dyn EntryMutations>,
        counters: Arc<dyn UnreadCounters>,
        page_size: u64,
    ) -> Self {
        Self {
            paginator: Paginator::new(source, page_size),
            mutator: Mutator::new(remote, counters.clone()),
            counters,
            state: Mutex::new(ViewState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch scope: forget everything about the previous one and load its first page.
    pub async fn set_scope(&self, scope: Scope) -> Result<PageLoad> {
        let generation = self.state().reset(scope);
        info!("Loading {}", scope);

        let fetched = self.paginator.load_first_page(&scope).await;
        let scope_unread = self.counters.unread_in(&scope);

        let mut state = self.state();
        if state.generation != generation {
            debug!("Discarding first page of {}: superseded", scope);
            return Ok(PageLoad::Superseded);
        }
        state.loading = false;
        let page = fetched.inspect_err(|e| warn!("Failed to load {}: {}", scope, e))?;
        state.pages.replace(page, scope_unread);
        state.refilter();

        let entries = state.pages.entries().len();
        Ok(PageLoad::Loaded {
            added: entries,
            entries,
        })
    }

    /// Recompute the visible set from what is already loaded.
    pub fn set_filter(&self, spec: FilterSpec) {
        let mut state = self.state();
        state.filter = spec;
        state.refilter();
    }

    pub async fn load_more(&self) -> Result<PageLoad> {
        let (scope, generation, offset) = {
            let mut state = self.state();
            if state.loading || state.loading_more {
                return Ok(PageLoad::Busy);
            }
            if !state.has_more() {
                return Ok(PageLoad::Exhausted);
            }
            state.loading_more = true;
            (state.scope, state.generation, state.pages.offset())
        };

        let fetched = self.paginator.load_next_page(&scope, offset).await;
        let scope_unread = self.counters.unread_in(&scope);

        let mut state = self.state();
        if state.generation != generation {
            debug!("Discarding page after offset {} of {}: superseded", offset, scope);
            return Ok(PageLoad::Superseded);
        }
        state.loading_more = false;
        let page = fetched.inspect_err(|e| warn!("Failed to load more of {}: {}", scope, e))?;
        let added = state
            .pages
            .merge(page, self.paginator.page_size(), scope_unread);
        state.refilter();
        state.refresh_active();

        Ok(PageLoad::Loaded {
            added,
            entries: state.pages.entries().len(),
        })
    }

    /// Open an entry in the detail view, marking it read first.
    ///
    /// Returns the newly active entry, or `None` when the selection was
    /// cleared or overtaken by a later selection or scope change.
    pub async fn select(&self, entry_id: Option<i64>) -> Result<Option<Entry>> {
        let Some(entry_id) = entry_id else {
            self.deselect();
            return Ok(None);
        };

        let (generation, ticket) = {
            let mut state = self.state();
            if state.find(entry_id).is_none() {
                return Err(TributaryError::EntryNotFound(entry_id));
            }
            state.transition = DetailTransition::Idle;
            state.selection_ticket += 1;
            (state.generation, state.selection_ticket)
        };

        let _gate = self.mutator.gate(entry_id).await;
        let entry = self.snapshot(entry_id)?;
        let marked = self.mutator.mark_read(&entry).await;

        let mut state = self.state();
        // The detail pane resets even when opening failed.
        state.detail_scroll_resets += 1;
        let read = marked.inspect_err(|e| warn!("Could not open entry {}: {}", entry_id, e))?;
        state.commit(&read);

        if state.generation != generation || state.selection_ticket != ticket {
            debug!("Selection of entry {} overtaken", entry_id);
            return Ok(None);
        }
        state.active = Some(read.clone());
        state.focus = Focus::Detail;
        state.transition = DetailTransition::Entering;
        Ok(Some(read))
    }

    pub fn deselect(&self) {
        let mut state = self.state();
        state.clear_selection();
        state.transition = DetailTransition::Idle;
    }

    pub async fn select_previous(&self) -> Result<Option<Entry>> {
        self.step(Command::Previous).await
    }

    pub async fn select_next(&self) -> Result<Option<Entry>> {
        self.step(Command::Next).await
    }

    async fn step(&self, command: Command) -> Result<Option<Entry>> {
        match self.resolve(command) {
            Some(Intent::Open(id)) => self.select(Some(id)).await,
            _ => Ok(None),
        }
    }

    pub async fn toggle_read(&self, entry_id: i64) -> Result<Entry> {
        let _gate = self.mutator.gate(entry_id).await;
        let entry = self.snapshot(entry_id)?;
        let updated = self
            .mutator
            .toggle_read_status(&entry)
            .await
            .inspect_err(|e| warn!("Could not toggle read on entry {}: {}", entry_id, e))?;
        self.state().commit(&updated);
        Ok(updated)
    }

    pub async fn toggle_star(&self, entry_id: i64) -> Result<Entry> {
        let _gate = self.mutator.gate(entry_id).await;
        let entry = self.snapshot(entry_id)?;
        let updated = self
            .mutator
            .toggle_starred(&entry)
            .await
            .inspect_err(|e| warn!("Could not toggle star on entry {}: {}", entry_id, e))?;
        self.state().commit(&updated);
        Ok(updated)
    }

    /// Mark the whole scope read remotely, then reload counters and entries.
    pub async fn mark_all_read(&self) -> Result<PageLoad> {
        let scope = self.state().scope;
        self.mutator.mark_all_read(&scope).await?;

        let generation = {
            let mut state = self.state();
            (state.scope == scope).then(|| state.begin_reload())
        };
        let Some(generation) = generation else {
            // Scope moved on; its own load is already running.
            self.counters.reload_aggregates().await?;
            return Ok(PageLoad::Superseded);
        };

        let (aggregates, fetched) = futures::join!(
            self.counters.reload_aggregates(),
            self.paginator.load_first_page(&scope)
        );
        let scope_unread = self.counters.unread_in(&scope);

        let mut state = self.state();
        if state.generation != generation {
            aggregates?;
            return Ok(PageLoad::Superseded);
        }
        state.loading = false;
        let page = fetched.inspect_err(|e| warn!("Failed to reload {}: {}", scope, e))?;
        state.pages.replace(page, scope_unread);
        state.refilter();
        state.settle_active_after_mark_all();
        aggregates?;

        let entries = state.pages.entries().len();
        Ok(PageLoad::Loaded {
            added: entries,
            entries,
        })
    }

    /// Route a keyboard command. Commands whose precondition fails are ignored.
    pub async fn dispatch_key(&self, command: Command) -> Result<Dispatch> {
        let Some(intent) = self.resolve(command) else {
            debug!("Ignoring {:?}: precondition not met", command);
            return Ok(Dispatch::Ignored);
        };

        match intent {
            Intent::Deselect => self.deselect(),
            Intent::Open(id) => {
                self.select(Some(id)).await?;
            }
            Intent::ToggleRead(id) => {
                self.toggle_read(id).await?;
            }
            Intent::ToggleStar(id) => {
                self.toggle_star(id).await?;
            }
        }
        Ok(Dispatch::Handled)
    }

    fn resolve(&self, command: Command) -> Option<Intent> {
        let state = self.state();
        selection::resolve(command, &state.visible, state.active.as_ref())
    }

    fn snapshot(&self, entry_id: i64) -> Result<Entry> {
        self.state()
            .find(entry_id)
            .cloned()
            .ok_or(TributaryError::EntryNotFound(entry_id))
    }

    pub fn visible_entries(&self) -> Vec<Entry> {
        self.state().visible.clone()
    }

    pub fn active_entry(&self) -> Option<Entry> {
        self.state().active.clone()
    }

    pub fn entry(&self, entry_id: i64) -> Option<Entry> {
        self.state().find(entry_id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.state().loading_more
    }

    pub fn has_more(&self) -> bool {
        self.state().has_more()
    }

    pub fn scope(&self) -> Scope {
        self.state().scope
    }

    pub fn filter(&self) -> FilterSpec {
        self.state().filter.clone()
    }

    /// Size of the full set, before filtering.
    pub fn loaded_len(&self) -> usize {
        self.state().pages.entries().len()
    }

    pub fn total(&self) -> u64 {
        self.state().pages.total()
    }

    /// Unread aggregate of the current scope.
    pub fn unread_count(&self) -> u64 {
        let scope = self.scope();
        self.counters.unread_in(&scope)
    }

    pub fn focus(&self) -> Focus {
        self.state().focus
    }

    pub fn detail_transition(&self) -> DetailTransition {
        self.state().transition
    }

    pub fn list_scroll_resets(&self) -> u64 {
        self.state().list_scroll_resets
    }

    pub fn detail_scroll_resets(&self) -> u64 {
        self.state().detail_scroll_resets
    }
}
