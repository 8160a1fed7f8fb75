//! Active entry tracking and the keyboard command grammar.
//!
//! `resolve` decides what a command means against the current visible set
//! and selection; the view coordinator carries the resulting intent out.

use crate::domain::Entry;

/// Commands a key listener may hand to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Escape,
    Previous,
    Next,
    ToggleRead,
    ToggleStar,
}

/// What a command turned into once its precondition held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Deselect,
    Open(i64),
    ToggleRead(i64),
    ToggleStar(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    List,
    Detail,
}

/// Transition state of the detail pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailTransition {
    #[default]
    Idle,
    Entering,
}

/// Which way to step through the visible set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Neighbour of the active entry in `visible`, if there is one.
///
/// An active entry that is not part of the visible set has no neighbours.
pub fn neighbor(visible: &[Entry], active_id: i64, direction: Direction) -> Option<&Entry> {
    let index = visible.iter().position(|e| e.id == active_id)?;
    match direction {
        Direction::Previous => index.checked_sub(1).and_then(|i| visible.get(i)),
        Direction::Next => visible.get(index + 1),
    }
}

pub fn resolve(command: Command, visible: &[Entry], active: Option<&Entry>) -> Option<Intent> {
    let active = active?;
    match command {
        Command::Escape => Some(Intent::Deselect),
        Command::Previous => {
            neighbor(visible, active.id, Direction::Previous).map(|e| Intent::Open(e.id))
        }
        Command::Next => neighbor(visible, active.id, Direction::Next).map(|e| Intent::Open(e.id)),
        Command::ToggleRead => Some(Intent::ToggleRead(active.id)),
        Command::ToggleStar => Some(Intent::ToggleStar(active.id)),
    }
}
