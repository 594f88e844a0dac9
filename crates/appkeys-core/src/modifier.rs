// Appkeys Modifier System
// The four modifiers a hotkey can carry (Shift, Control, Alt, Super)

use std::fmt;

use crate::keysym::{
    Keysym, XK_ALT_L, XK_ALT_R, XK_CONTROL_L, XK_CONTROL_R, XK_SHIFT_L, XK_SHIFT_R, XK_SUPER_L,
    XK_SUPER_R,
};
use crate::layout::KeyboardLayout;
use crate::Key;

/// A hotkey modifier.
///
/// Declaration order is the press order used everywhere synthetic modifier
/// events are emitted; releases of a target hotkey's modifiers use the
/// reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Shift,
    Control,
    Alt,
    Super,
}

impl Modifier {
    /// Press order: shift, control, alt, super
    pub const ALL: [Modifier; 4] = [
        Modifier::Shift,
        Modifier::Control,
        Modifier::Alt,
        Modifier::Super,
    ];

    /// Parse a hotkey token naming a modifier
    pub fn from_token(token: &str) -> Option<Modifier> {
        match token {
            "shift" => Some(Modifier::Shift),
            "control" | "ctrl" => Some(Modifier::Control),
            "alt" | "mod1" => Some(Modifier::Alt),
            "super" | "mod4" => Some(Modifier::Super),
            _ => None,
        }
    }

    /// Which modifier a keysym belongs to, if any (left and right variants)
    pub fn from_keysym(keysym: Keysym) -> Option<Modifier> {
        match keysym {
            XK_SHIFT_L | XK_SHIFT_R => Some(Modifier::Shift),
            XK_CONTROL_L | XK_CONTROL_R => Some(Modifier::Control),
            XK_ALT_L | XK_ALT_R => Some(Modifier::Alt),
            XK_SUPER_L | XK_SUPER_R => Some(Modifier::Super),
            _ => None,
        }
    }

    /// Keysym used when synthesizing this modifier (always the left key)
    pub fn keysym(self) -> Keysym {
        match self {
            Modifier::Shift => XK_SHIFT_L,
            Modifier::Control => XK_CONTROL_L,
            Modifier::Alt => XK_ALT_L,
            Modifier::Super => XK_SUPER_L,
        }
    }

    /// Flag bit in the high byte of a hotkey code
    pub fn code_bit(self) -> u8 {
        match self {
            Modifier::Shift => 0b0000_1000,
            Modifier::Control => 0b0000_0100,
            Modifier::Alt => 0b0000_0010,
            Modifier::Super => 0b0000_0001,
        }
    }

    /// X11 core protocol modifier mask (ShiftMask, ControlMask, Mod1Mask, Mod4Mask)
    pub fn grab_mask(self) -> u16 {
        match self {
            Modifier::Shift => 1 << 0,
            Modifier::Control => 1 << 2,
            Modifier::Alt => 1 << 3,
            Modifier::Super => 1 << 6,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Shift => write!(f, "shift"),
            Modifier::Control => write!(f, "ctrl"),
            Modifier::Alt => write!(f, "alt"),
            Modifier::Super => write!(f, "super"),
        }
    }
}

/// Keycodes used to synthesize each modifier on the current layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierKeys {
    shift: Key,
    control: Key,
    alt: Key,
    super_: Key,
}

impl ModifierKeys {
    /// Resolve the left modifier keys through the keyboard layout.
    ///
    /// A modifier without a keycode resolves to `Key::NONE` and is never
    /// synthesized.
    pub fn from_layout(layout: &KeyboardLayout) -> Self {
        let lookup = |m: Modifier| layout.keycode_for(m.keysym()).unwrap_or(Key::NONE);
        Self {
            shift: lookup(Modifier::Shift),
            control: lookup(Modifier::Control),
            alt: lookup(Modifier::Alt),
            super_: lookup(Modifier::Super),
        }
    }

    /// Keycode for a modifier
    pub fn key(&self, modifier: Modifier) -> Key {
        match modifier {
            Modifier::Shift => self.shift,
            Modifier::Control => self.control,
            Modifier::Alt => self.alt,
            Modifier::Super => self.super_,
        }
    }
}
