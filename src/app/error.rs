use thiserror::Error;

/// Failure to load a page of entries or the unread aggregates.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded with status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

/// Failure of a read/star/mark-all change on the remote side.
#[derive(Error, Debug)]
pub enum MutationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded with status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Remote rejected the change to entry {0}")]
    Rejected(i64),

    #[error("Remote rejected mark-all-as-read for {0}")]
    MarkAllRejected(String),

    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum TributaryError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Update failed: {0}")]
    Mutation(#[from] MutationError),

    #[error("Entry not found: {0}")]
    EntryNotFound(i64),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TributaryError>;
