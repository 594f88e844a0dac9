// Appkeys Config API
// Remap record files and hotkey string parsing

pub mod hotkey_parser;
pub mod parser;

pub use hotkey_parser::{parse_hotkey, HotkeyParseError};
pub use parser::{parse_line, parse_records, read_records, ConfigError, ConfigRecord};
