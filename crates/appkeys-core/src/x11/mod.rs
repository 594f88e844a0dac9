// Appkeys X11 Backend
// Window queries and grabs, XTEST output and the RECORD input source
//
// Two connections are opened: the control connection carries every request
// (queries, grabs, synthetic input, RECORD context management) and the data
// connection is dedicated to the blocking RECORD stream.

mod record;

use std::sync::Arc;

use x11rb::connection::{Connection, RequestConnection};
use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};
use x11rb::protocol::record as xrecord;
use x11rb::protocol::record::ConnectionExt as _;
use x11rb::protocol::xproto::{self, AtomEnum, ConnectionExt as _, GrabMode, ModMask};
use x11rb::protocol::xtest;
use x11rb::protocol::xtest::ConnectionExt as _;
use x11rb::rust_connection::RustConnection;

use crate::hotkey::Button;
use crate::layout::KeyboardLayout;
use crate::output::{EventSink, OutputError};
use crate::window::{descendants, WindowError, WindowId, WindowSystem};
use crate::Key;

pub use record::{decode_event, RecordControl, RecordSource};

const CAPS_LOCK_MASK: u16 = 1 << 1;
const NUM_LOCK_MASK: u16 = 1 << 4;

/// Lock modifiers a grab is repeated with, so hotkeys still fire with
/// CapsLock and/or NumLock (Mod2) on
const LOCK_VARIANTS: [u16; 4] = [
    0,
    CAPS_LOCK_MASK,
    NUM_LOCK_MASK,
    CAPS_LOCK_MASK | NUM_LOCK_MASK,
];

/// Errors raised while setting up the X11 backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Cannot open display: {0}")]
    Connect(#[from] ConnectError),

    #[error("X11 connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("X11 request failed: {0}")]
    Reply(#[from] ReplyError),

    #[error("X11 id allocation failed: {0}")]
    ReplyOrId(#[from] ReplyOrIdError),

    #[error("{0} extension is not available")]
    CapabilityUnavailable(&'static str),

    #[error("Screen {0} does not exist")]
    InvalidScreen(usize),
}

#[derive(Debug, Clone, Copy)]
struct Atoms {
    net_active_window: xproto::Atom,
    net_client_list: xproto::Atom,
}

/// Handle on the X server.
///
/// Clones share the same connections; one clone is typically boxed as the
/// remapper's `WindowSystem` and another as its `EventSink`.
#[derive(Clone)]
pub struct X11Backend {
    conn: Arc<RustConnection>,
    data: Arc<RustConnection>,
    root: WindowId,
    atoms: Atoms,
    layout: KeyboardLayout,
}

impl X11Backend {
    /// Connect to `$DISPLAY`.
    ///
    /// Fails with `CapabilityUnavailable` when the server lacks XTEST or
    /// RECORD.
    pub fn connect() -> Result<Self, BackendError> {
        let (conn, screen_num) = RustConnection::connect(None)?;
        let (data, _) = RustConnection::connect(None)?;

        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .ok_or(BackendError::InvalidScreen(screen_num))?
            .root;

        require_extension(&conn, xtest::X11_EXTENSION_NAME, "XTEST")?;
        require_extension(&conn, xrecord::X11_EXTENSION_NAME, "RECORD")?;
        let xtest_version = conn.xtest_get_version(2, 2)?.reply()?;
        let record_version = conn.record_query_version(1, 13)?.reply()?;
        log::debug!(
            "XTEST {}.{}, RECORD {}.{}",
            xtest_version.major_version,
            xtest_version.minor_version,
            record_version.major_version,
            record_version.minor_version
        );

        let atoms = Atoms {
            net_active_window: conn.intern_atom(false, b"_NET_ACTIVE_WINDOW")?.reply()?.atom,
            net_client_list: conn.intern_atom(false, b"_NET_CLIENT_LIST")?.reply()?.atom,
        };

        let layout = fetch_layout(&conn)?;
        log::debug!("Keyboard mapping covers {} keycodes", layout.len());

        Ok(Self {
            conn: Arc::new(conn),
            data: Arc::new(data),
            root,
            atoms,
            layout,
        })
    }

    /// The keyboard mapping read at connect time
    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    /// Create a RECORD context for key/button device events and window
    /// creation/destruction, returning the source and its stop handle
    pub fn record(&self) -> Result<(RecordSource, RecordControl), BackendError> {
        let context = self.conn.generate_id()?;
        let empty = xrecord::Range8 { first: 0, last: 0 };
        let empty_ext = xrecord::ExtRange {
            major: empty,
            minor: xrecord::Range16 { first: 0, last: 0 },
        };
        let range = xrecord::Range {
            core_requests: empty,
            core_replies: empty,
            ext_requests: empty_ext,
            ext_replies: empty_ext,
            delivered_events: xrecord::Range8 {
                first: xproto::CREATE_NOTIFY_EVENT,
                last: xproto::DESTROY_NOTIFY_EVENT,
            },
            device_events: xrecord::Range8 {
                first: xproto::KEY_PRESS_EVENT,
                last: xproto::BUTTON_RELEASE_EVENT,
            },
            errors: empty,
            client_started: false,
            client_died: false,
        };

        self.conn
            .record_create_context(context, 0, &[xrecord::CS::ALL_CLIENTS.into()], &[range])?
            .check()?;

        Ok((
            RecordSource::new(Arc::clone(&self.data), context),
            RecordControl::new(Arc::clone(&self.conn), context),
        ))
    }

    /// Discard events delivered to the control connection.
    ///
    /// Grabbed key events and asynchronous request errors land here; nothing
    /// reads them, so they are dropped instead of queueing up.
    fn drain_events(&self) {
        loop {
            match self.conn.poll_for_event() {
                Ok(Some(event)) => log::trace!("Discarding {:?}", event),
                Ok(None) => break,
                Err(e) => {
                    log::debug!("Could not poll control connection: {}", e);
                    break;
                }
            }
        }
    }

    fn fake_input(&self, kind: u8, detail: u8) -> Result<(), OutputError> {
        self.conn
            .xtest_fake_input(kind, detail, x11rb::CURRENT_TIME, x11rb::NONE, 0, 0, 0)
            .map_err(|e| OutputError::Send(e.to_string()))?
            .ignore_error();
        Ok(())
    }
}

fn require_extension(
    conn: &RustConnection,
    name: &'static str,
    label: &'static str,
) -> Result<(), BackendError> {
    match conn.extension_information(name)? {
        Some(_) => Ok(()),
        None => Err(BackendError::CapabilityUnavailable(label)),
    }
}

fn fetch_layout(conn: &RustConnection) -> Result<KeyboardLayout, BackendError> {
    let setup = conn.setup();
    let min = setup.min_keycode;
    let count = setup.max_keycode.saturating_sub(min).saturating_add(1);
    let reply = conn.get_keyboard_mapping(min, count)?.reply()?;
    Ok(KeyboardLayout::new(
        min,
        usize::from(reply.keysyms_per_keycode),
        reply.keysyms,
    ))
}

fn query_failed(e: impl std::fmt::Display) -> WindowError {
    WindowError::QueryFailed(e.to_string())
}

fn grab_failed(e: impl std::fmt::Display) -> WindowError {
    WindowError::GrabFailed(e.to_string())
}

/// Class part of a `WM_CLASS` value ("instance\0class\0")
fn parse_wm_class(value: &[u8]) -> Option<String> {
    let class = value.split(|&b| b == 0).nth(1)?;
    if class.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(class).into_owned())
    }
}

impl WindowSystem for X11Backend {
    fn root(&self) -> WindowId {
        self.root
    }

    fn class_hint(&self, window: WindowId) -> Result<Option<String>, WindowError> {
        let reply = self
            .conn
            .get_property(false, window, AtomEnum::WM_CLASS, AtomEnum::STRING, 0, 1024)
            .map_err(query_failed)?
            .reply()
            .map_err(query_failed)?;
        Ok(parse_wm_class(&reply.value))
    }

    fn parent(&self, window: WindowId) -> Result<Option<WindowId>, WindowError> {
        let reply = self
            .conn
            .query_tree(window)
            .map_err(query_failed)?
            .reply()
            .map_err(query_failed)?;
        Ok((reply.parent != x11rb::NONE).then_some(reply.parent))
    }

    fn children(&self, window: WindowId) -> Result<Vec<WindowId>, WindowError> {
        let reply = self
            .conn
            .query_tree(window)
            .map_err(query_failed)?
            .reply()
            .map_err(query_failed)?;
        Ok(reply.children)
    }

    fn focused_window(&self) -> Result<Option<WindowId>, WindowError> {
        let active = self
            .conn
            .get_property(
                false,
                self.root,
                self.atoms.net_active_window,
                AtomEnum::WINDOW,
                0,
                1,
            )
            .map_err(query_failed)?
            .reply()
            .map_err(query_failed)?;
        let active = active
            .value32()
            .and_then(|mut windows| windows.next())
            .filter(|&window| window != x11rb::NONE);
        if active.is_some() {
            return Ok(active);
        }

        // No EWMH window manager: ask the server directly
        let focus = self
            .conn
            .get_input_focus()
            .map_err(query_failed)?
            .reply()
            .map_err(query_failed)?
            .focus;
        // 0 is None, 1 is PointerRoot
        Ok((focus > 1).then_some(focus))
    }

    fn top_level_windows(&self) -> Result<Vec<WindowId>, WindowError> {
        let reply = self
            .conn
            .get_property(
                false,
                self.root,
                self.atoms.net_client_list,
                AtomEnum::WINDOW,
                0,
                u32::MAX,
            )
            .map_err(query_failed)?
            .reply()
            .map_err(query_failed)?;
        let clients: Vec<WindowId> = reply
            .value32()
            .map(|windows| windows.collect())
            .unwrap_or_default();

        if clients.is_empty() {
            log::debug!("No _NET_CLIENT_LIST, walking the window tree");
            descendants(self, self.root)
        } else {
            Ok(clients)
        }
    }

    fn grab_key(&self, window: WindowId, key: Key, modifiers: u16) -> Result<(), WindowError> {
        for (i, lock) in LOCK_VARIANTS.iter().enumerate() {
            let mask = ModMask::from(modifiers | lock);
            let cookie = self
                .conn
                .grab_key(
                    false,
                    window,
                    mask,
                    key.wire_code(),
                    GrabMode::ASYNC,
                    GrabMode::ASYNC,
                )
                .map_err(grab_failed)?;
            if i == 0 {
                cookie.check().map_err(grab_failed)?;
            } else {
                cookie.ignore_error();
            }
        }
        Ok(())
    }
}

impl EventSink for X11Backend {
    fn key(&mut self, key: Key, pressed: bool) -> Result<(), OutputError> {
        let kind = if pressed {
            xproto::KEY_PRESS_EVENT
        } else {
            xproto::KEY_RELEASE_EVENT
        };
        self.fake_input(kind, key.wire_code())
    }

    fn button(&mut self, button: Button, pressed: bool) -> Result<(), OutputError> {
        let kind = if pressed {
            xproto::BUTTON_PRESS_EVENT
        } else {
            xproto::BUTTON_RELEASE_EVENT
        };
        self.fake_input(kind, button.detail())
    }

    fn set_passthrough_suspended(&mut self, suspended: bool) -> Result<(), OutputError> {
        self.conn
            .xtest_grab_control(suspended)
            .map_err(|e| OutputError::Send(e.to_string()))?
            .ignore_error();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.conn
            .flush()
            .map_err(|e| OutputError::Flush(e.to_string()))?;
        self.drain_events();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wm_class() {
        assert_eq!(parse_wm_class(b"Navigator\0firefox\0"), Some("firefox".to_string()));
        assert_eq!(parse_wm_class(b"xterm\0XTerm\0"), Some("XTerm".to_string()));
        assert_eq!(parse_wm_class(b"xterm\0XTerm"), Some("XTerm".to_string()));
    }

    #[test]
    fn test_parse_wm_class_missing() {
        assert_eq!(parse_wm_class(b""), None);
        assert_eq!(parse_wm_class(b"instance-only"), None);
        assert_eq!(parse_wm_class(b"instance\0\0"), None);
    }

    #[test]
    fn test_lock_variants() {
        assert_eq!(LOCK_VARIANTS, [0, 2, 16, 18]);
        assert_eq!(CAPS_LOCK_MASK, u16::from(ModMask::LOCK));
        assert_eq!(NUM_LOCK_MASK, u16::from(ModMask::M2));
    }
}
