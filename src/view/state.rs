use crate::domain::{Entry, EntryStatus, Scope};
use crate::filter::{self, FilterSpec};
use crate::pagination::PageState;
use crate::selection::{DetailTransition, Focus};

/// Every slice the view coordinator owns. Only ever touched under its lock,
/// so a reader never sees one slice updated and another not.
#[derive(Debug, Default)]
pub(crate) struct ViewState {
    pub scope: Scope,
    /// Bumped whenever in-flight page loads must stop counting.
    pub generation: u64,
    pub filter: FilterSpec,
    pub pages: PageState,
    pub visible: Vec<Entry>,
    pub active: Option<Entry>,
    /// Bumped on every select/deselect request; only the latest may land.
    pub selection_ticket: u64,
    pub loading: bool,
    pub loading_more: bool,
    pub focus: Focus,
    pub transition: DetailTransition,
    pub list_scroll_resets: u64,
    pub detail_scroll_resets: u64,
}

impl ViewState {
    /// Drop everything derived from the previous scope and start a first-page load.
    pub fn reset(&mut self, scope: Scope) -> u64 {
        self.scope = scope;
        self.pages = PageState::default();
        self.visible.clear();
        self.clear_selection();
        self.transition = DetailTransition::Idle;
        self.list_scroll_resets += 1;
        self.detail_scroll_resets += 1;
        self.begin_reload()
    }

    /// Supersede in-flight loads and mark a first-page load as running.
    pub fn begin_reload(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.loading_more = false;
        self.generation
    }

    pub fn clear_selection(&mut self) {
        self.selection_ticket += 1;
        self.active = None;
        self.focus = Focus::List;
    }

    pub fn refilter(&mut self) {
        self.visible = filter::apply(self.pages.entries(), &self.filter);
    }

    pub fn has_more(&self) -> bool {
        self.pages.has_more(self.filter.status)
    }

    pub fn find(&self, id: i64) -> Option<&Entry> {
        self.pages
            .get(id)
            .or_else(|| self.active.as_ref().filter(|e| e.id == id))
    }

    /// Put a confirmed new value of an entry into every slice holding it.
    ///
    /// The visible set is patched in place rather than re-filtered, so an
    /// entry just read stays listed under the unread filter until the next
    /// filter change or page load.
    pub fn commit(&mut self, entry: &Entry) {
        self.pages.update(entry);
        for visible in self.visible.iter_mut().filter(|e| e.id == entry.id) {
            *visible = entry.clone();
        }
        if let Some(active) = self.active.as_mut().filter(|e| e.id == entry.id) {
            *active = entry.clone();
        }
    }

    /// After the full set took fresher values, make the selection follow.
    pub fn refresh_active(&mut self) {
        let fresh = self
            .active
            .as_ref()
            .and_then(|active| self.pages.get(active.id))
            .cloned();
        if let Some(fresh) = fresh {
            self.active = Some(fresh);
        }
    }

    /// After a confirmed mark-all-as-read and first-page reload. An active
    /// entry beyond the reloaded page is not refreshed by the page, but the
    /// server just marked it read along with the rest of the scope.
    pub fn settle_active_after_mark_all(&mut self) {
        self.refresh_active();
        let pages = &self.pages;
        if let Some(active) = self.active.as_mut().filter(|a| pages.get(a.id).is_none()) {
            active.status = EntryStatus::Read;
            tracing::debug!("Entry {} outside the reloaded page marked read", active.id);
        }
    }
}
