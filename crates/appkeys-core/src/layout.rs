// Appkeys Keyboard Layout
// Snapshot of the server's keycode -> keysym mapping

use crate::keysym::Keysym;
use crate::modifier::Modifier;
use crate::Key;

/// The keyboard mapping as returned by `GetKeyboardMapping`.
///
/// Keysyms are stored row-major: `keysyms_per_keycode` columns for every
/// keycode starting at `min_keycode`. A keysym of 0 is `NoSymbol`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyboardLayout {
    min_keycode: u8,
    keysyms_per_keycode: usize,
    keysyms: Vec<Keysym>,
}

impl KeyboardLayout {
    /// Create a layout from a raw keyboard mapping reply
    pub fn new(min_keycode: u8, keysyms_per_keycode: usize, keysyms: Vec<Keysym>) -> Self {
        Self {
            min_keycode,
            keysyms_per_keycode,
            keysyms,
        }
    }

    /// A layout with no keys at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a layout from `(keycode, [column keysyms])` rows.
    ///
    /// Unlisted keycodes between the lowest and highest listed ones map to
    /// `NoSymbol`.
    pub fn from_rows(rows: &[(u8, &[Keysym])]) -> Self {
        let Some(min) = rows.iter().map(|(code, _)| *code).min() else {
            return Self::empty();
        };
        let max = rows.iter().map(|(code, _)| *code).max().unwrap_or(min);
        let per = rows.iter().map(|(_, syms)| syms.len()).max().unwrap_or(1).max(1);

        let mut keysyms = vec![0; (usize::from(max - min) + 1) * per];
        for (code, syms) in rows {
            let start = usize::from(code - min) * per;
            keysyms[start..start + syms.len()].copy_from_slice(syms);
        }
        Self::new(min, per, keysyms)
    }

    /// Number of keycodes covered by the mapping
    pub fn len(&self) -> usize {
        if self.keysyms_per_keycode == 0 {
            0
        } else {
            self.keysyms.len() / self.keysyms_per_keycode
        }
    }

    /// Check if the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn row(&self, key: Key) -> Option<&[Keysym]> {
        let code = key.code();
        let min = u16::from(self.min_keycode);
        if self.keysyms_per_keycode == 0 || code < min {
            return None;
        }
        let start = usize::from(code - min) * self.keysyms_per_keycode;
        self.keysyms.get(start..start + self.keysyms_per_keycode)
    }

    /// Keysym in the first column (group 0, level 0) for a keycode
    pub fn keysym_at(&self, key: Key) -> Option<Keysym> {
        self.row(key)
            .and_then(|row| row.first().copied())
            .filter(|&sym| sym != 0)
    }

    /// Keycode producing `keysym`, like `XKeysymToKeycode`: every keycode's
    /// first column is searched before any keycode's second column
    pub fn keycode_for(&self, keysym: Keysym) -> Option<Key> {
        let per = self.keysyms_per_keycode;
        if keysym == 0 || per == 0 {
            return None;
        }
        (0..per)
            .find_map(|column| {
                self.keysyms
                    .chunks(per)
                    .position(|row| row.get(column) == Some(&keysym))
            })
            .map(|index| Key::from(u16::from(self.min_keycode) + index as u16))
    }

    /// The modifier a physical key acts as, judged by its unshifted keysym
    pub fn modifier_of(&self, key: Key) -> Option<Modifier> {
        self.keysym_at(key).and_then(Modifier::from_keysym)
    }
}
