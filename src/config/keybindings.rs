//! Translation of terminal key events into view commands.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::selection::Command;

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Command(Command),
}

/// Key strings bound to each action. The first matching action wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub escape: Vec<String>,
    pub previous: Vec<String>,
    pub next: Vec<String>,
    pub toggle_read: Vec<String>,
    pub toggle_star: Vec<String>,
    pub quit: Vec<String>,
}

fn keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            escape: keys(&["Esc"]),
            previous: keys(&["Left"]),
            next: keys(&["Right"]),
            toggle_read: keys(&["m"]),
            toggle_star: keys(&["s"]),
            quit: keys(&["q", "Ctrl+c"]),
        }
    }
}

impl KeybindingConfig {
    pub fn command_for(&self, key: &KeyEvent) -> Option<KeyAction> {
        let table = [
            (&self.quit, KeyAction::Quit),
            (&self.escape, KeyAction::Command(Command::Escape)),
            (&self.previous, KeyAction::Command(Command::Previous)),
            (&self.next, KeyAction::Command(Command::Next)),
            (&self.toggle_read, KeyAction::Command(Command::ToggleRead)),
            (&self.toggle_star, KeyAction::Command(Command::ToggleStar)),
        ];
        table
            .into_iter()
            .find(|(bindings, _)| any_matches(bindings, key))
            .map(|(_, action)| action)
    }

    /// Key strings that do not parse. They never match anything.
    pub fn invalid_bindings(&self) -> Vec<String> {
        [
            &self.escape,
            &self.previous,
            &self.next,
            &self.toggle_read,
            &self.toggle_star,
            &self.quit,
        ]
        .into_iter()
        .flatten()
        .filter(|s| parse_key_string(s).is_err())
        .cloned()
        .collect()
    }
}

fn any_matches(bindings: &[String], key: &KeyEvent) -> bool {
    bindings
        .iter()
        .filter_map(|s| parse_key_string(s).ok())
        .any(|binding| binding.matches(key))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Shift is ignored when the binding doesn't ask for it, so "R" matches
    /// the Shift+R terminals report.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code
            && (self.modifiers == key.modifiers
                || self.modifiers == key.modifiers.difference(KeyModifiers::SHIFT))
    }
}

/// Parse "Ctrl+c", "Left", "m" and the like.
pub fn parse_key_string(s: &str) -> Result<KeyBinding, String> {
    let s = s.trim();
    // A lone "+" is the plus key, not a separator.
    let (prefix, key) = match s.rsplit_once('+') {
        Some((prefix, key)) if !key.is_empty() => (Some(prefix), key),
        _ => (None, s),
    };

    let mut modifiers = KeyModifiers::NONE;
    for part in prefix.into_iter().flat_map(|p| p.split('+')) {
        modifiers |= match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "shift" => KeyModifiers::SHIFT,
            "alt" => KeyModifiers::ALT,
            _ => return Err(format!("Unknown modifier: {}", part)),
        };
    }

    Ok(KeyBinding {
        code: parse_key_code(key)?,
        modifiers,
    })
}

fn parse_key_code(s: &str) -> Result<KeyCode, String> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let code = match s.to_ascii_lowercase().as_str() {
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "esc" | "escape" => KeyCode::Esc,
        "space" => KeyCode::Char(' '),
        other => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            Some(n @ 1..=12) => KeyCode::F(n),
            _ => return Err(format!("Unknown key: {}", s)),
        },
    };
    Ok(code)
}
