pub mod browse;
pub mod commands;

use clap::{Args, Parser, Subcommand};

use crate::domain::Scope;
use crate::filter::{FilterSpec, SearchTarget, StatusFilter};

#[derive(Parser)]
#[command(name = "tributary")]
#[command(about = "A terminal client for Miniflux", long_about = None)]
pub struct Cli {
    /// Miniflux server URL (overrides the config file)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Miniflux API token (overrides the config file)
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which entries a command works on. Neither flag means all entries.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ScopeArgs {
    /// Restrict to one feed
    #[arg(long, conflicts_with = "group")]
    pub feed: Option<i64>,

    /// Restrict to one category
    #[arg(long)]
    pub group: Option<i64>,
}

impl ScopeArgs {
    pub fn scope(&self) -> Scope {
        match (self.feed, self.group) {
            (Some(id), _) => Scope::Feed(id),
            (None, Some(id)) => Scope::Group(id),
            (None, None) => Scope::All,
        }
    }
}

/// Filter flags shared by the listing commands.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only unread entries
    #[arg(long)]
    pub unread: bool,

    /// Only entries containing this text
    #[arg(long)]
    pub search: Option<String>,

    /// Search entry content instead of titles
    #[arg(long, requires = "search")]
    pub in_content: bool,
}

impl FilterArgs {
    /// Layer the flags over the configured default filter.
    pub fn apply_to(&self, mut spec: FilterSpec) -> FilterSpec {
        if self.unread {
            spec.status = StatusFilter::Unread;
        }
        if self.in_content {
            spec.target = SearchTarget::Content;
        }
        if let Some(text) = &self.search {
            spec.text = text.clone();
        }
        spec
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List entries
    Entries {
        #[command(flatten)]
        scope: ScopeArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Flip an entry between read and unread
    ToggleRead {
        /// Entry ID
        id: i64,

        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Star or unstar an entry
    ToggleStar {
        /// Entry ID
        id: i64,

        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Mark every entry in scope as read
    MarkAllRead {
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Show unread counts
    Counters,
    /// Step through entries with the keyboard
    Browse {
        #[command(flatten)]
        scope: ScopeArgs,

        #[command(flatten)]
        filter: FilterArgs,
    },
}
