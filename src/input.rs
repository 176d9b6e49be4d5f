use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::HashSet;

/// Bridges raw key events to input-buffer values.
///
/// The session's buffer is the single source of truth; the adapter only
/// derives the next full buffer value from a key event and the current
/// buffer. It additionally tracks which keys are held down for the
/// on-screen keyboard, which is purely presentational.
pub struct InputAdapter {
    pub active_keys: HashSet<String>,
    track_releases: bool,
}

impl InputAdapter {
    /// `track_releases` says whether the terminal reports key release
    /// events. Without them the active set degrades to the most recent
    /// key only, so highlights don't stick forever.
    pub fn new(track_releases: bool) -> Self {
        Self {
            active_keys: HashSet::new(),
            track_releases,
        }
    }

    /// Display label for a key, shared with the keyboard widget.
    pub fn key_label(code: &KeyCode) -> Option<String> {
        match code {
            KeyCode::Char(' ') => Some("Space".to_string()),
            KeyCode::Char(c) => Some(c.to_uppercase().to_string()),
            KeyCode::Backspace => Some("Backspace".to_string()),
            _ => None,
        }
    }

    /// Process one key event against the current buffer value.
    ///
    /// Returns the full proposed buffer value for the session, or `None`
    /// when the key carries no buffer meaning (releases, navigation keys,
    /// control chords, backspace on an empty buffer).
    pub fn handle_key(&mut self, key: &KeyEvent, current: &str) -> Option<String> {
        if let Some(label) = Self::key_label(&key.code) {
            match key.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    if !self.track_releases {
                        self.active_keys.clear();
                    }
                    self.active_keys.insert(label);
                }
                KeyEventKind::Release => {
                    self.active_keys.remove(&label);
                }
            }
        }

        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }

        match key.code {
            KeyCode::Char(c) => Some(format!("{current}{c}")),
            KeyCode::Backspace => {
                if current.is_empty() {
                    None
                } else {
                    let mut value = current.to_string();
                    value.pop();
                    Some(value)
                }
            }
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.active_keys.clear();
    }
}
