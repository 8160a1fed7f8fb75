use serde::Deserialize;

use crate::domain::{Entry, EntryStatus};

/// Field the search text is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTarget {
    #[default]
    Title,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Unread,
}

impl StatusFilter {
    pub fn admits(self, status: EntryStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Unread => status == EntryStatus::Unread,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    pub target: SearchTarget,
    pub status: StatusFilter,
    pub text: String,
}

impl FilterSpec {
    pub fn new(target: SearchTarget, status: StatusFilter, text: impl Into<String>) -> Self {
        Self {
            target,
            status,
            text: text.into(),
        }
    }

    pub fn unread() -> Self {
        Self {
            status: StatusFilter::Unread,
            ..Default::default()
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        self.status.admits(entry.status) && self.matches_text(entry)
    }

    fn matches_text(&self, entry: &Entry) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let haystack = match self.target {
            SearchTarget::Title => &entry.title,
            SearchTarget::Content => &entry.content,
        };
        haystack.contains(self.text.as_str())
    }
}

/// Derive the visible set from the full set. Order is preserved.
pub fn apply(entries: &[Entry], spec: &FilterSpec) -> Vec<Entry> {
    entries.iter().filter(|e| spec.matches(e)).cloned().collect()
}
