//! Declarative key bindings.
//!
//! [`KeyMap`] maps a display backend's raw key codes onto the fixed set of
//! logical [`BrowserAction`]s, resolved once at startup. The state machine
//! only ever sees actions, so swapping the display backend means swapping
//! the map, not the browser.

use std::{collections::HashMap, hash::Hash};

use crossterm::event::KeyCode;

use crate::browser::BrowserAction;

/// A table of raw key codes to logical browser actions.
///
/// Generic over the backend's key code type; any `Eq + Hash` code works.
#[derive(Debug, Clone, Default)]
pub struct KeyMap<K: Eq + Hash> {
    bindings: HashMap<K, BrowserAction>,
}

impl<K: Eq + Hash> KeyMap<K> {
    /// An empty map.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind `code` to `action`, replacing any previous binding.
    pub fn bind(&mut self, code: K, action: BrowserAction) -> &mut Self {
        self.bindings.insert(code, action);
        self
    }

    /// Look up the action bound to `code`.
    pub fn resolve(&self, code: &K) -> Option<BrowserAction> {
        self.bindings.get(code).copied()
    }
}

/// The default bindings for the terminal backend.
///
/// Mirrors the tool's traditional layout: `q` quit, arrow keys navigate,
/// `s` grab a frame, `[`/`]` mark start/end, `c` clip, `t` fixed-length
/// clip, `o` mark walk, `d` delete crop, space for a nested high-rate
/// split.
pub fn terminal_default_keymap() -> KeyMap<KeyCode> {
    let mut map = KeyMap::new();
    map.bind(KeyCode::Char('q'), BrowserAction::Quit)
        .bind(KeyCode::Left, BrowserAction::PrevFrame)
        .bind(KeyCode::Right, BrowserAction::NextFrame)
        .bind(KeyCode::Char('s'), BrowserAction::GrabFrame)
        .bind(KeyCode::Char('['), BrowserAction::MarkStart)
        .bind(KeyCode::Char(']'), BrowserAction::MarkEnd)
        .bind(KeyCode::Char('c'), BrowserAction::ExtractClip)
        .bind(KeyCode::Char('t'), BrowserAction::ExtractClipFrames)
        .bind(KeyCode::Char('o'), BrowserAction::MarkWalk)
        .bind(KeyCode::Char('d'), BrowserAction::DeleteCrop)
        .bind(KeyCode::Char(' '), BrowserAction::ZoomSplit);
    map
}
