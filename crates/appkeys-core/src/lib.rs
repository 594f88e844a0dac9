// Appkeys Core Library
// Per-application hotkey remapping: config, state, engine and X11 plumbing

pub mod config;
pub mod event;
pub mod grab;
pub mod hotkey;
pub mod key;
pub mod keysym;
pub mod layout;
pub mod mapping;
pub mod modifier;
pub mod output;
pub mod remapper;
pub mod settings;
pub mod state;
pub mod transform;
pub mod window;

// In-memory window system, sink and source used by the unit and
// integration tests
#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(feature = "x11-backend")]
pub mod x11;

pub use config::{
    parse_hotkey, parse_records, read_records, ConfigError, ConfigRecord, HotkeyParseError,
};
pub use event::{
    shutdown, CancellationToken, EventLoop, EventLoopError, EventLoopResult, EventSource,
    InputEvent, SourceControl, SourceError,
};
pub use grab::GrabCoordinator;
pub use hotkey::{Button, Hotkey, HotkeyCode, PrimaryAction};
pub use key::Key;
pub use layout::KeyboardLayout;
pub use mapping::{ClassMap, RecordRejection, RemapTable, WILDCARD_CLASS};
pub use modifier::{Modifier, ModifierKeys};
pub use output::{remap_sequence, EventSink, OutputError, RemapSequence, SyntheticEvent};
pub use remapper::Remapper;
pub use settings::{Settings, SettingsError};
pub use state::ModifierState;
pub use transform::{EngineState, Evaluation, RemapEngine};
pub use window::{resolve_class, WindowError, WindowId, WindowSystem};

#[cfg(feature = "x11-backend")]
pub use x11::{BackendError, RecordControl, RecordSource, X11Backend};
