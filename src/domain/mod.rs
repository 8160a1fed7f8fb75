pub mod entry;
pub mod scope;

pub use entry::{Entry, EntryPage, EntryStatus, FeedRef, GroupRef};
pub use scope::Scope;
