// Appkeys Config API - Hotkey String Parser
// Parses hyphen-delimited hotkey strings like "ctrl-alt-t" into a Hotkey

use crate::hotkey::{Button, Hotkey};
use crate::keysym::{keysym_from_name, Keysym};
use crate::layout::KeyboardLayout;
use crate::modifier::Modifier;

/// Errors that can occur during hotkey parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyParseError {
    /// Empty input string
    Empty,
    /// Token is neither a modifier, a button, nor a known keysym name
    UnknownToken(String),
    /// Keysym exists but no key on the current layout produces it
    NoKeycode { name: String, keysym: Keysym },
}

impl std::fmt::Display for HotkeyParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HotkeyParseError::Empty => write!(f, "hotkey string cannot be empty"),
            HotkeyParseError::UnknownToken(token) => write!(f, "invalid key: '{}'", token),
            HotkeyParseError::NoKeycode { name, keysym } => write!(
                f,
                "no keycode found for keysym {} (0x{:x})",
                name, keysym
            ),
        }
    }
}

impl std::error::Error for HotkeyParseError {}

/// Parse a hotkey string like "ctrl-alt-t" or "b1".
///
/// Tokens are applied left to right; a later key or button token replaces
/// an earlier one. Modifier and button tokens are lowercase. Anything else
/// is looked up as a keysym name (case-sensitive) and mapped to a keycode
/// through `layout`.
///
/// # Examples
/// ```
/// use appkeys_core::config::parse_hotkey;
/// use appkeys_core::keysym::Keysym;
/// use appkeys_core::layout::KeyboardLayout;
///
/// const T: &[Keysym] = &[0x74, 0x54];
/// let layout = KeyboardLayout::from_rows(&[(28, T)]);
/// let hotkey = parse_hotkey("ctrl-alt-t", &layout).unwrap();
/// assert!(hotkey.control && hotkey.alt);
/// assert_eq!(hotkey.key.code(), 28);
/// ```
pub fn parse_hotkey(text: &str, layout: &KeyboardLayout) -> Result<Hotkey, HotkeyParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(HotkeyParseError::Empty);
    }

    let mut hotkey = Hotkey::new();
    for token in trimmed.split('-') {
        apply_token(&mut hotkey, token, layout)?;
    }
    Ok(hotkey)
}

fn apply_token(
    hotkey: &mut Hotkey,
    token: &str,
    layout: &KeyboardLayout,
) -> Result<(), HotkeyParseError> {
    if let Some(modifier) = Modifier::from_token(token) {
        hotkey.set(modifier, true);
        return Ok(());
    }

    match token {
        "b1" => hotkey.button = Some(Button::Button1),
        "b2" => hotkey.button = Some(Button::Button2),
        "b3" => hotkey.button = Some(Button::Button3),
        _ => {
            let keysym = keysym_from_name(token)
                .ok_or_else(|| HotkeyParseError::UnknownToken(token.to_string()))?;
            hotkey.key = layout
                .keycode_for(keysym)
                .ok_or_else(|| HotkeyParseError::NoKeycode {
                    name: token.to_string(),
                    keysym,
                })?;
        }
    }
    Ok(())
}
