use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read state of an entry. Miniflux only ever reports these two for listed entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Read,
    Unread,
}

impl EntryStatus {
    pub fn toggled(self) -> Self {
        match self {
            EntryStatus::Read => EntryStatus::Unread,
            EntryStatus::Unread => EntryStatus::Read,
        }
    }

    /// Change applied to the unread aggregates when an entry moves into this status.
    pub fn unread_delta(self) -> i64 {
        match self {
            EntryStatus::Read => -1,
            EntryStatus::Unread => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Read => "read",
            EntryStatus::Unread => "unread",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: i64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRef {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "category")]
    pub group: GroupRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub status: EntryStatus,
    #[serde(default)]
    pub starred: bool,
    /// First image found in `content`, filled in by the normalizer.
    #[serde(default, skip_deserializing)]
    pub preview_image: Option<String>,
    pub feed: FeedRef,
}

impl Entry {
    pub fn is_unread(&self) -> bool {
        self.status == EntryStatus::Unread
    }

    pub fn feed_id(&self) -> i64 {
        self.feed.id
    }

    pub fn group_id(&self) -> i64 {
        self.feed.group.id
    }

    pub fn with_status(&self, status: EntryStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    pub fn with_starred(&self, starred: bool) -> Self {
        Self {
            starred,
            ..self.clone()
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }
}

/// One page of entries as returned by the remote source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryPage {
    pub total: u64,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIFLUX_ENTRY: &str = r#"{
        "id": 888,
        "user_id": 123,
        "feed_id": 42,
        "title": "Entry Title",
        "url": "http://example.org/article.html",
        "author": "Foobar",
        "content": "<p>HTML contents</p>",
        "published_at": "2016-12-12T16:15:19Z",
        "created_at": "2016-12-12T16:15:19.129361Z",
        "status": "unread",
        "starred": false,
        "feed": {
            "id": 42,
            "title": "New Feed Title",
            "category": { "id": 22, "title": "Category Title" }
        }
    }"#;

    #[test]
    fn test_deserialize_miniflux_entry() {
        let entry: Entry = serde_json::from_str(MINIFLUX_ENTRY).unwrap();
        assert_eq!(entry.id, 888);
        assert_eq!(entry.status, EntryStatus::Unread);
        assert_eq!(entry.feed_id(), 42);
        assert_eq!(entry.group_id(), 22);
        assert_eq!(entry.preview_image, None);
    }

    #[test]
    fn test_preview_image_is_never_read_from_payload() {
        let json = MINIFLUX_ENTRY.replace(
            "\"starred\": false,",
            "\"starred\": true, \"preview_image\": \"http://evil/x.png\",",
        );
        let entry: Entry = serde_json::from_str(&json).unwrap();
        assert!(entry.starred);
        assert_eq!(entry.preview_image, None);
    }

    #[test]
    fn test_status_toggle_and_delta() {
        assert_eq!(EntryStatus::Read.toggled(), EntryStatus::Unread);
        assert_eq!(EntryStatus::Unread.toggled(), EntryStatus::Read);
        assert_eq!(EntryStatus::Read.unread_delta(), -1);
        assert_eq!(EntryStatus::Unread.unread_delta(), 1);
    }

    #[test]
    fn test_with_status_keeps_other_fields() {
        let entry: Entry = serde_json::from_str(MINIFLUX_ENTRY).unwrap();
        let read = entry.with_status(EntryStatus::Read);
        assert_eq!(read.status, EntryStatus::Read);
        assert_eq!(read.title, entry.title);
        assert_eq!(read.feed, entry.feed);
    }

    #[test]
    fn test_display_title_without_title() {
        let mut entry: Entry = serde_json::from_str(MINIFLUX_ENTRY).unwrap();
        entry.title.clear();
        assert_eq!(entry.display_title(), "(Untitled)");
    }
}
