// Appkeys Key Type
// A physical key code as reported by the X server

use std::fmt;

/// Represents a single physical key code.
///
/// This is a newtype wrapper around u16 for type safety. X11 keycodes fit in
/// 8 bits, the wider storage keeps the hotkey code truncation observable.
/// Code 0 means "no key".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Key(pub u16);

impl Key {
    /// The "no key" value
    pub const NONE: Key = Key(0);

    /// Get the raw numeric code value
    pub fn code(self) -> u16 {
        self.0
    }

    /// True for the "no key" value
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// The code as sent on the wire, truncated to the X11 keycode width
    pub fn wire_code(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

impl From<u16> for Key {
    fn from(code: u16) -> Self {
        Key(code)
    }
}

impl From<u8> for Key {
    fn from(code: u8) -> Self {
        Key(u16::from(code))
    }
}

impl From<Key> for u16 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "keycode {}", self.0)
    }
}
