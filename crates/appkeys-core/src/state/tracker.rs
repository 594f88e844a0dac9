// Appkeys Modifier State Tracker
// Currently held modifiers plus the most recent key/button press

use crate::hotkey::{Button, Hotkey, HotkeyCode};
use crate::modifier::Modifier;
use crate::Key;

/// Instantaneous input state, overwritten in place by every press/release.
///
/// The state is a `Hotkey` so its code can be looked up directly in the
/// remap table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    current: Hotkey,
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press_modifier(&mut self, modifier: Modifier) {
        self.current.set(modifier, true);
    }

    pub fn release_modifier(&mut self, modifier: Modifier) {
        self.current.set(modifier, false);
    }

    /// Record a non-modifier key press as the current primary action
    pub fn press_key(&mut self, key: Key) {
        self.current.key = key;
    }

    /// Any non-modifier release clears the primary key
    pub fn release_key(&mut self) {
        self.current.key = Key::NONE;
    }

    pub fn press_button(&mut self, button: Button) {
        self.current.button = Some(button);
    }

    pub fn release_button(&mut self) {
        self.current.button = None;
    }

    /// Whether a modifier is held
    pub fn is_held(&self, modifier: Modifier) -> bool {
        self.current.has(modifier)
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> Hotkey {
        self.current
    }

    /// Remap table code for the current state
    pub fn code(&self) -> HotkeyCode {
        self.current.code()
    }

    /// The current primary key (NONE if no key is down)
    pub fn key(&self) -> Key {
        self.current.key
    }

    pub fn button(&self) -> Option<Button> {
        self.current.button
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_press_release() {
        let mut state = ModifierState::new();
        state.press_modifier(Modifier::Control);
        state.press_modifier(Modifier::Alt);
        assert!(state.is_held(Modifier::Control));
        assert!(state.is_held(Modifier::Alt));
        assert!(!state.is_held(Modifier::Shift));

        state.release_modifier(Modifier::Control);
        assert!(!state.is_held(Modifier::Control));
        assert!(state.is_held(Modifier::Alt));
    }

    #[test]
    fn test_key_press_release() {
        let mut state = ModifierState::new();
        state.press_key(Key::from(28u8));
        assert_eq!(state.key(), Key::from(28u8));

        state.press_key(Key::from(53u8));
        assert_eq!(state.key(), Key::from(53u8));

        state.release_key();
        assert!(state.key().is_none());
    }

    #[test]
    fn test_button_press_release() {
        let mut state = ModifierState::new();
        state.press_button(Button::Button3);
        assert_eq!(state.button(), Some(Button::Button3));
        state.release_button();
        assert_eq!(state.button(), None);
    }

    #[test]
    fn test_code_tracks_state() {
        let mut state = ModifierState::new();
        state.press_modifier(Modifier::Control);
        state.press_modifier(Modifier::Alt);
        state.press_key(Key::from(28u8));
        assert_eq!(state.code(), HotkeyCode(0x061c));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut state = ModifierState::new();
        state.press_modifier(Modifier::Shift);
        let snapshot = state.snapshot();
        state.release_modifier(Modifier::Shift);
        assert!(snapshot.shift);
        assert!(!state.is_held(Modifier::Shift));
    }
}
