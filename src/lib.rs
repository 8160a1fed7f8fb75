//! # Tributary
//!
//! A terminal client for the Miniflux feed reader.
//!
//! ## Architecture
//!
//! The server is the source of truth. The client keeps one scope's entries in
//! memory and keeps them consistent while page loads and mutations overlap:
//!
//! ```text
//! Remote → Paginator → PageState → Filter → visible set → Selection
//!             ↑                                   ↓
//!          Counters  ←  Mutator (per-entry gates) ←  commands
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # List the newest unread entries of feed 4
//! tributary --url https://reader.example.com --token $TOKEN entries --feed 4 --unread
//!
//! # Step through entries with the arrow keys
//! tributary browse --group 2
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: TOML configuration and keybindings
//! - [`counters`]: Unread aggregates
//! - [`domain`]: Entries and scopes
//! - [`filter`]: Visible-set derivation
//! - [`mutation`]: Read/star changes
//! - [`normalizer`]: Entry cleanup after fetching
//! - [`pagination`]: Page accumulation
//! - [`remote`]: Remote API traits and the Miniflux client
//! - [`selection`]: Active entry and keyboard grammar
//! - [`view`]: The coordinator tying it all together

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires the Miniflux client,
/// unread counters and view coordinator together from a [`Config`](config::Config).
pub mod app;

/// Command-line interface using clap.
///
/// - `entries` - List entries of a scope
/// - `toggle-read <id>` / `toggle-star <id>` - Flip one entry
/// - `mark-all-read` - Mark a scope read
/// - `counters` - Show unread counts
/// - `browse` - Keyboard-driven browsing
pub mod cli;

/// Configuration loaded from `~/.config/tributary/config.toml`.
pub mod config;

/// Unread aggregates per feed, per group and in total.
pub mod counters;

/// Core domain models.
///
/// - [`Entry`](domain::Entry): One article with its feed and group
/// - [`Scope`](domain::Scope): All entries, one feed or one group
pub mod domain;

/// Filtering of the loaded entries into the visible set.
pub mod filter;

/// Confirm-then-commit entry mutations, serialized per entry.
pub mod mutation;

/// Entry cleanup: comment stripping and preview image extraction.
pub mod normalizer;

/// Page accumulation, deduplication and "more available" flags.
pub mod pagination;

/// Remote API boundary.
///
/// - [`EntrySource`](remote::EntrySource), [`EntryMutations`](remote::EntryMutations)
///   and [`CounterSource`](remote::CounterSource): collaborator traits
/// - [`MinifluxClient`](remote::MinifluxClient): reqwest-based implementation
pub mod remote;

/// Active entry, focus and the keyboard command grammar.
pub mod selection;

/// The view coordinator.
pub mod view;

#[cfg(test)]
mod testing;
