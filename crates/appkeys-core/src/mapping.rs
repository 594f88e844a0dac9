// Appkeys Remap Table
// Hotkey code -> (window class -> target hotkey)

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::config::{parse_hotkey, ConfigRecord, HotkeyParseError};
use crate::hotkey::{Hotkey, HotkeyCode};
use crate::layout::KeyboardLayout;

/// Class name that matches every window
pub const WILDCARD_CLASS: &str = "*";

/// Targets for one source hotkey, keyed by window class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMap {
    targets: IndexMap<String, Hotkey>,
}

impl ClassMap {
    /// Create an empty class map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a target unless the class already has one.
    ///
    /// Returns false when the class was already present; the first target
    /// registered for a class is kept.
    pub fn insert(&mut self, class: &str, target: Hotkey) -> bool {
        match self.targets.entry(class.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(target);
                true
            }
        }
    }

    /// Target for an exact class (no wildcard fallback)
    pub fn get(&self, class: &str) -> Option<&Hotkey> {
        self.targets.get(class)
    }

    /// Target of the wildcard entry
    pub fn wildcard(&self) -> Option<&Hotkey> {
        self.targets.get(WILDCARD_CLASS)
    }

    /// Exact class first, then wildcard
    pub fn lookup(&self, class: &str) -> Option<&Hotkey> {
        self.get(class).or_else(|| self.wildcard())
    }

    /// True if any entry names a specific class
    pub fn has_class_specific(&self) -> bool {
        self.targets.keys().any(|class| class != WILDCARD_CLASS)
    }

    /// True if a window of `class` (or any window, for `None`) is covered
    pub fn applies_to(&self, class: Option<&str>) -> bool {
        self.wildcard().is_some() || class.is_some_and(|c| self.targets.contains_key(c))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Why a config record did not make it into the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordRejection {
    /// Source hotkey failed to parse
    From(HotkeyParseError),
    /// Target hotkey failed to parse
    To(HotkeyParseError),
    /// Same (hotkey code, class) pair already registered
    Duplicate,
}

/// The full remap configuration.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapTable {
    entries: IndexMap<HotkeyCode, ClassMap>,
}

impl RemapTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from config records.
    ///
    /// Records whose hotkeys fail to parse are skipped with a warning; the
    /// remaining records are still loaded.
    pub fn load<'a>(
        records: impl IntoIterator<Item = &'a ConfigRecord>,
        layout: &KeyboardLayout,
    ) -> Self {
        let mut table = Self::new();
        for record in records {
            match table.add_record(record, layout) {
                Ok(()) => log::debug!(
                    "Adding config key {} - {} for app {}",
                    record.from,
                    record.to,
                    record.class
                ),
                Err(RecordRejection::From(e)) => log::warn!(
                    "Could not parse from hotkey '{}' (line {}): {}",
                    record.from,
                    record.line,
                    e
                ),
                Err(RecordRejection::To(e)) => log::warn!(
                    "Could not parse to hotkey '{}' (line {}): {}",
                    record.to,
                    record.line,
                    e
                ),
                Err(RecordRejection::Duplicate) => log::warn!(
                    "Ignoring duplicate remap {} for app {} (line {})",
                    record.from,
                    record.class,
                    record.line
                ),
            }
        }
        log::info!("Loaded {} remapped hotkey(s)", table.len());
        table
    }

    /// Parse and insert one record
    pub fn add_record(
        &mut self,
        record: &ConfigRecord,
        layout: &KeyboardLayout,
    ) -> Result<(), RecordRejection> {
        let from = parse_hotkey(&record.from, layout).map_err(RecordRejection::From)?;
        let to = parse_hotkey(&record.to, layout).map_err(RecordRejection::To)?;
        if self.insert(from.code(), &record.class, to) {
            Ok(())
        } else {
            Err(RecordRejection::Duplicate)
        }
    }

    /// Insert a target; first write wins for an existing (code, class) pair
    pub fn insert(&mut self, code: HotkeyCode, class: &str, target: Hotkey) -> bool {
        self.entries.entry(code).or_default().insert(class, target)
    }

    /// Class map for a hotkey code
    pub fn get(&self, code: HotkeyCode) -> Option<&ClassMap> {
        self.entries.get(&code)
    }

    /// Target for (code, class): exact class first, then wildcard
    pub fn lookup(&self, code: HotkeyCode, class: &str) -> Option<&Hotkey> {
        self.get(code).and_then(|classes| classes.lookup(class))
    }

    /// Iterate (code, class map) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (HotkeyCode, &ClassMap)> {
        self.entries.iter().map(|(code, classes)| (*code, classes))
    }

    /// Number of distinct source hotkey codes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
