use std::fmt;

/// Viewing context bounding which entries are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    #[default]
    All,
    Feed(i64),
    Group(i64),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => write!(f, "all entries"),
            Scope::Feed(id) => write!(f, "feed {}", id),
            Scope::Group(id) => write!(f, "group {}", id),
        }
    }
}
