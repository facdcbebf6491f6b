//! Key binding table tests.

use crossterm::event::KeyCode;
use fripper::{
    KeyMap,
    browser::BrowserAction,
    keymap::terminal_default_keymap,
};

#[test]
fn default_map_covers_every_action() {
    let map = terminal_default_keymap();
    let expectations = [
        (KeyCode::Char('q'), BrowserAction::Quit),
        (KeyCode::Left, BrowserAction::PrevFrame),
        (KeyCode::Right, BrowserAction::NextFrame),
        (KeyCode::Char('s'), BrowserAction::GrabFrame),
        (KeyCode::Char('['), BrowserAction::MarkStart),
        (KeyCode::Char(']'), BrowserAction::MarkEnd),
        (KeyCode::Char('c'), BrowserAction::ExtractClip),
        (KeyCode::Char('t'), BrowserAction::ExtractClipFrames),
        (KeyCode::Char('o'), BrowserAction::MarkWalk),
        (KeyCode::Char('d'), BrowserAction::DeleteCrop),
        (KeyCode::Char(' '), BrowserAction::ZoomSplit),
    ];
    for (code, action) in expectations {
        assert_eq!(map.resolve(&code), Some(action), "{code:?}");
    }
}

#[test]
fn unbound_codes_resolve_to_nothing() {
    let map = terminal_default_keymap();
    assert_eq!(map.resolve(&KeyCode::Char('x')), None);
    assert_eq!(map.resolve(&KeyCode::Enter), None);
}

#[test]
fn rebinding_replaces_the_previous_action() {
    let mut map: KeyMap<char> = KeyMap::new();
    map.bind('j', BrowserAction::PrevFrame);
    map.bind('j', BrowserAction::NextFrame);
    assert_eq!(map.resolve(&'j'), Some(BrowserAction::NextFrame));
}
