// Appkeys Keysym Table
// Symbolic key names to X11 keysym values (keysymdef.h / XF86keysym.h)

use std::collections::HashMap;
use std::sync::OnceLock;

/// An X11 keysym value
pub type Keysym = u32;

pub const XK_SHIFT_L: Keysym = 0xffe1;
pub const XK_SHIFT_R: Keysym = 0xffe2;
pub const XK_CONTROL_L: Keysym = 0xffe3;
pub const XK_CONTROL_R: Keysym = 0xffe4;
pub const XK_ALT_L: Keysym = 0xffe9;
pub const XK_ALT_R: Keysym = 0xffea;
pub const XK_SUPER_L: Keysym = 0xffeb;
pub const XK_SUPER_R: Keysym = 0xffec;

const XK_F1: Keysym = 0xffbe;
const XK_KP_0: Keysym = 0xffb0;

/// Named keysyms outside the printable Latin-1 range
const NAMED_KEYSYMS: &[(&str, Keysym)] = &[
    ("BackSpace", 0xff08),
    ("Tab", 0xff09),
    ("Linefeed", 0xff0a),
    ("Clear", 0xff0b),
    ("Return", 0xff0d),
    ("Pause", 0xff13),
    ("Scroll_Lock", 0xff14),
    ("Sys_Req", 0xff15),
    ("Escape", 0xff1b),
    ("Delete", 0xffff),
    ("Home", 0xff50),
    ("Left", 0xff51),
    ("Up", 0xff52),
    ("Right", 0xff53),
    ("Down", 0xff54),
    ("Prior", 0xff55),
    ("Page_Up", 0xff55),
    ("Next", 0xff56),
    ("Page_Down", 0xff56),
    ("End", 0xff57),
    ("Begin", 0xff58),
    ("Select", 0xff60),
    ("Print", 0xff61),
    ("Execute", 0xff62),
    ("Insert", 0xff63),
    ("Undo", 0xff65),
    ("Redo", 0xff66),
    ("Menu", 0xff67),
    ("Find", 0xff68),
    ("Cancel", 0xff69),
    ("Help", 0xff6a),
    ("Break", 0xff6b),
    ("Mode_switch", 0xff7e),
    ("Num_Lock", 0xff7f),
    ("KP_Space", 0xff80),
    ("KP_Tab", 0xff89),
    ("KP_Enter", 0xff8d),
    ("KP_Home", 0xff95),
    ("KP_Left", 0xff96),
    ("KP_Up", 0xff97),
    ("KP_Right", 0xff98),
    ("KP_Down", 0xff99),
    ("KP_Prior", 0xff9a),
    ("KP_Page_Up", 0xff9a),
    ("KP_Next", 0xff9b),
    ("KP_Page_Down", 0xff9b),
    ("KP_End", 0xff9c),
    ("KP_Begin", 0xff9d),
    ("KP_Insert", 0xff9e),
    ("KP_Delete", 0xff9f),
    ("KP_Equal", 0xffbd),
    ("KP_Multiply", 0xffaa),
    ("KP_Add", 0xffab),
    ("KP_Separator", 0xffac),
    ("KP_Subtract", 0xffad),
    ("KP_Decimal", 0xffae),
    ("KP_Divide", 0xffaf),
    ("Shift_L", XK_SHIFT_L),
    ("Shift_R", XK_SHIFT_R),
    ("Control_L", XK_CONTROL_L),
    ("Control_R", XK_CONTROL_R),
    ("Caps_Lock", 0xffe5),
    ("Shift_Lock", 0xffe6),
    ("Meta_L", 0xffe7),
    ("Meta_R", 0xffe8),
    ("Alt_L", XK_ALT_L),
    ("Alt_R", XK_ALT_R),
    ("Super_L", XK_SUPER_L),
    ("Super_R", XK_SUPER_R),
    ("Hyper_L", 0xffed),
    ("Hyper_R", 0xffee),
    ("ISO_Level3_Shift", 0xfe03),
    ("space", 0x0020),
    ("exclam", 0x0021),
    ("quotedbl", 0x0022),
    ("numbersign", 0x0023),
    ("dollar", 0x0024),
    ("percent", 0x0025),
    ("ampersand", 0x0026),
    ("apostrophe", 0x0027),
    ("quoteright", 0x0027),
    ("parenleft", 0x0028),
    ("parenright", 0x0029),
    ("asterisk", 0x002a),
    ("plus", 0x002b),
    ("comma", 0x002c),
    ("minus", 0x002d),
    ("period", 0x002e),
    ("slash", 0x002f),
    ("colon", 0x003a),
    ("semicolon", 0x003b),
    ("less", 0x003c),
    ("equal", 0x003d),
    ("greater", 0x003e),
    ("question", 0x003f),
    ("at", 0x0040),
    ("bracketleft", 0x005b),
    ("backslash", 0x005c),
    ("bracketright", 0x005d),
    ("asciicircum", 0x005e),
    ("underscore", 0x005f),
    ("grave", 0x0060),
    ("quoteleft", 0x0060),
    ("braceleft", 0x007b),
    ("bar", 0x007c),
    ("braceright", 0x007d),
    ("asciitilde", 0x007e),
    ("XF86MonBrightnessUp", 0x1008ff02),
    ("XF86MonBrightnessDown", 0x1008ff03),
    ("XF86AudioLowerVolume", 0x1008ff11),
    ("XF86AudioMute", 0x1008ff12),
    ("XF86AudioRaiseVolume", 0x1008ff13),
    ("XF86AudioPlay", 0x1008ff14),
    ("XF86AudioStop", 0x1008ff15),
    ("XF86AudioPrev", 0x1008ff16),
    ("XF86AudioNext", 0x1008ff17),
    ("XF86HomePage", 0x1008ff18),
    ("XF86Mail", 0x1008ff19),
    ("XF86Search", 0x1008ff1b),
    ("XF86Calculator", 0x1008ff1d),
    ("XF86Back", 0x1008ff26),
    ("XF86Forward", 0x1008ff27),
    ("XF86Refresh", 0x1008ff29),
    ("XF86Copy", 0x1008ff57),
    ("XF86Cut", 0x1008ff58),
    ("XF86Paste", 0x1008ff6d),
];

fn keysym_table() -> &'static HashMap<String, Keysym> {
    static TABLE: OnceLock<HashMap<String, Keysym>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table: HashMap<String, Keysym> = NAMED_KEYSYMS
            .iter()
            .map(|&(name, sym)| (name.to_string(), sym))
            .collect();
        // Latin letters and digits are their own keysym values
        for c in ('a'..='z').chain('A'..='Z').chain('0'..='9') {
            table.insert(c.to_string(), c as Keysym);
        }
        for n in 1..=35u32 {
            table.insert(format!("F{}", n), XK_F1 + n - 1);
        }
        for n in 0..=9u32 {
            table.insert(format!("KP_{}", n), XK_KP_0 + n);
        }
        table
    })
}

/// Resolve a symbolic key name to its keysym.
///
/// Names are case-sensitive as in `XStringToKeysym`: `a` and `A` are distinct
/// keysyms. Besides names, two numeric forms are accepted: `0x1008ff12`
/// (raw keysym) and `U20AC` (Unicode code point).
pub fn keysym_from_name(name: &str) -> Option<Keysym> {
    if let Some(sym) = keysym_table().get(name) {
        return Some(*sym);
    }

    if let Some(hex) = name.strip_prefix("0x") {
        return Keysym::from_str_radix(hex, 16).ok().filter(|&sym| sym != 0);
    }

    if let Some(hex) = name.strip_prefix('U') {
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let codepoint = u32::from_str_radix(hex, 16).ok()?;
        return match codepoint {
            0x20..=0x7e | 0xa0..=0xff => Some(codepoint),
            0x100..=0x10ffff => Some(0x0100_0000 + codepoint),
            _ => None,
        };
    }

    None
}
