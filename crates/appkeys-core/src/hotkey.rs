// Appkeys Hotkey Type
// A modifier chord plus one key or mouse button, and its compact code

use std::fmt;

use crate::modifier::Modifier;
use crate::Key;

/// One of the three mouse buttons a hotkey can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Button {
    Button1 = 1,
    Button2 = 2,
    Button3 = 3,
}

impl Button {
    /// Map an X11 button detail to a button slot
    pub fn from_detail(detail: u8) -> Option<Self> {
        match detail {
            1 => Some(Button::Button1),
            2 => Some(Button::Button2),
            3 => Some(Button::Button3),
            _ => None,
        }
    }

    /// The X11 button detail
    pub fn detail(self) -> u8 {
        self as u8
    }

    fn code_bit(self) -> u8 {
        match self {
            Button::Button1 => 0b1000_0000,
            Button::Button2 => 0b0100_0000,
            Button::Button3 => 0b0010_0000,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.detail())
    }
}

/// A hotkey: four modifier flags plus a key and/or a mouse button.
///
/// When both `key` and `button` are set, the key is the primary action at
/// synthesis time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hotkey {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub super_: bool,
    pub key: Key,
    pub button: Option<Button>,
}

/// The action a hotkey synthesizes between its modifier presses and releases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Key(Key),
    Button(Button),
}

impl Hotkey {
    /// Create an empty hotkey (no modifiers, no key, no button)
    pub fn new() -> Self {
        Self::default()
    }

    /// Hotkey for a bare key
    pub fn from_key(key: Key) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    /// Builder-style modifier setter
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.set(modifier, true);
        self
    }

    /// Builder-style button setter
    pub fn with_button(mut self, button: Button) -> Self {
        self.button = Some(button);
        self
    }

    /// Check a modifier flag
    pub fn has(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Shift => self.shift,
            Modifier::Control => self.control,
            Modifier::Alt => self.alt,
            Modifier::Super => self.super_,
        }
    }

    /// Set a modifier flag
    pub fn set(&mut self, modifier: Modifier, down: bool) {
        match modifier {
            Modifier::Shift => self.shift = down,
            Modifier::Control => self.control = down,
            Modifier::Alt => self.alt = down,
            Modifier::Super => self.super_ = down,
        }
    }

    /// Modifiers set on this hotkey, in press order
    pub fn modifiers(&self) -> impl Iterator<Item = Modifier> + '_ {
        Modifier::ALL.into_iter().filter(move |m| self.has(*m))
    }

    /// Key takes priority over button
    pub fn primary(&self) -> Option<PrimaryAction> {
        if !self.key.is_none() {
            Some(PrimaryAction::Key(self.key))
        } else {
            self.button.map(PrimaryAction::Button)
        }
    }

    /// Core protocol modifier mask for grabbing this chord
    pub fn grab_modifiers(&self) -> u16 {
        self.modifiers().fold(0, |mask, m| mask | m.grab_mask())
    }

    /// Compact code of this hotkey
    pub fn code(&self) -> HotkeyCode {
        HotkeyCode::encode(self)
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.modifiers().map(|m| m.to_string()).collect();
        if !self.key.is_none() {
            parts.push(self.key.code().to_string());
        }
        if let Some(button) = self.button {
            parts.push(button.to_string());
        }
        write!(f, "{}", parts.join("-"))
    }
}

/// Compact 16-bit hotkey encoding used as the remap table key.
///
/// High byte holds the modifier and button flag bits, low byte holds the
/// key code truncated to 8 bits. Key codes above 255 collide with their low
/// byte; existing configuration files depend on this layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct HotkeyCode(pub u16);

impl HotkeyCode {
    /// Encode a hotkey
    pub fn encode(hotkey: &Hotkey) -> Self {
        let mut flags = hotkey.modifiers().fold(0u8, |acc, m| acc | m.code_bit());
        if let Some(button) = hotkey.button {
            flags |= button.code_bit();
        }
        HotkeyCode(u16::from(flags) << 8 | (hotkey.key.code() & 0xFF))
    }

    /// Decode back into a hotkey.
    ///
    /// If more than one button bit is set the highest-numbered button wins.
    pub fn decode(self) -> Hotkey {
        let flags = (self.0 >> 8) as u8;
        let mut hotkey = Hotkey::from_key(Key::from(self.0 & 0xFF));
        for modifier in Modifier::ALL {
            hotkey.set(modifier, flags & modifier.code_bit() != 0);
        }
        hotkey.button = [Button::Button3, Button::Button2, Button::Button1]
            .into_iter()
            .find(|b| flags & b.code_bit() != 0);
        hotkey
    }

    /// Raw code value
    pub fn value(self) -> u16 {
        self.0
    }
}

impl From<&Hotkey> for HotkeyCode {
    fn from(hotkey: &Hotkey) -> Self {
        HotkeyCode::encode(hotkey)
    }
}

impl fmt::Display for HotkeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}
