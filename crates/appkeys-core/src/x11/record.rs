// Appkeys RECORD Source
// Streams intercepted key, button and window lifecycle events

use std::ops::ControlFlow;
use std::sync::Arc;

use x11rb::connection::Connection;
use x11rb::protocol::record::{Context, ConnectionExt as _};
use x11rb::protocol::xproto;
use x11rb::rust_connection::RustConnection;

use crate::event::{EventSource, InputEvent, SourceControl, SourceError};
use crate::Key;

/// Intercepted data came from the server (events)
const CATEGORY_FROM_SERVER: u8 = 0;
/// The context was disabled; no more data follows
const CATEGORY_END_OF_DATA: u8 = 5;

/// Size of one wire event
const EVENT_SIZE: usize = 32;

/// Decode one 32-byte wire event.
///
/// `swapped` is set when the intercepted data is in the opposite byte order
/// to ours. Events other than key/button press/release and window
/// create/destroy yield `None`.
pub fn decode_event(raw: &[u8], swapped: bool) -> Option<InputEvent> {
    let kind = raw.first()? & 0x7f;
    let detail = *raw.get(1)?;
    let window = || {
        let bytes: [u8; 4] = raw.get(8..12)?.try_into().ok()?;
        let value = u32::from_ne_bytes(bytes);
        Some(if swapped { value.swap_bytes() } else { value })
    };

    match kind {
        xproto::KEY_PRESS_EVENT => Some(InputEvent::KeyPress(Key::from(detail))),
        xproto::KEY_RELEASE_EVENT => Some(InputEvent::KeyRelease(Key::from(detail))),
        xproto::BUTTON_PRESS_EVENT => Some(InputEvent::ButtonPress(detail)),
        xproto::BUTTON_RELEASE_EVENT => Some(InputEvent::ButtonRelease(detail)),
        xproto::CREATE_NOTIFY_EVENT => window().map(InputEvent::WindowCreated),
        xproto::DESTROY_NOTIFY_EVENT => window().map(InputEvent::WindowDestroyed),
        _ => None,
    }
}

fn source_failed(e: impl std::fmt::Display) -> SourceError {
    SourceError::Failed(e.to_string())
}

fn stop_failed(e: impl std::fmt::Display) -> SourceError {
    SourceError::Stop(e.to_string())
}

/// Blocking reader of an enabled RECORD context on the data connection
pub struct RecordSource {
    data: Arc<RustConnection>,
    context: Context,
}

impl RecordSource {
    pub(super) fn new(data: Arc<RustConnection>, context: Context) -> Self {
        Self { data, context }
    }
}

impl EventSource for RecordSource {
    fn run(
        &mut self,
        handler: &mut dyn FnMut(InputEvent) -> ControlFlow<()>,
    ) -> Result<(), SourceError> {
        let replies = self
            .data
            .record_enable_context(self.context)
            .map_err(source_failed)?;

        for reply in replies {
            let reply = reply.map_err(source_failed)?;
            match reply.category {
                CATEGORY_FROM_SERVER => {}
                CATEGORY_END_OF_DATA => {
                    log::debug!("RECORD context {} disabled", self.context);
                    break;
                }
                _ => continue,
            }

            for raw in reply.data.chunks_exact(EVENT_SIZE) {
                let Some(event) = decode_event(raw, reply.client_swapped) else {
                    continue;
                };
                if handler(event).is_break() {
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

/// Stops and frees a RECORD context through the control connection
#[derive(Clone)]
pub struct RecordControl {
    conn: Arc<RustConnection>,
    context: Context,
}

impl RecordControl {
    pub(super) fn new(conn: Arc<RustConnection>, context: Context) -> Self {
        Self { conn, context }
    }

    /// Release the context once the source has returned
    pub fn free(&self) -> Result<(), SourceError> {
        self.conn
            .record_free_context(self.context)
            .map_err(stop_failed)?
            .check()
            .map_err(stop_failed)
    }
}

impl SourceControl for RecordControl {
    fn stop(&self) -> Result<(), SourceError> {
        self.conn
            .record_disable_context(self.context)
            .map_err(stop_failed)?
            .check()
            .map_err(stop_failed)?;
        self.conn.flush().map_err(stop_failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(kind: u8, detail: u8, window: u32) -> [u8; EVENT_SIZE] {
        let mut raw = [0u8; EVENT_SIZE];
        raw[0] = kind;
        raw[1] = detail;
        raw[4..8].copy_from_slice(&1u32.to_ne_bytes());
        raw[8..12].copy_from_slice(&window.to_ne_bytes());
        raw
    }

    #[test]
    fn test_decode_device_events() {
        assert_eq!(
            decode_event(&raw(2, 28, 0), false),
            Some(InputEvent::KeyPress(Key::from(28u8)))
        );
        assert_eq!(
            decode_event(&raw(3, 28, 0), false),
            Some(InputEvent::KeyRelease(Key::from(28u8)))
        );
        assert_eq!(decode_event(&raw(4, 1, 0), false), Some(InputEvent::ButtonPress(1)));
        assert_eq!(decode_event(&raw(5, 3, 0), false), Some(InputEvent::ButtonRelease(3)));
    }

    #[test]
    fn test_decode_window_events() {
        assert_eq!(
            decode_event(&raw(16, 0, 0x0240_0007), false),
            Some(InputEvent::WindowCreated(0x0240_0007))
        );
        assert_eq!(
            decode_event(&raw(17, 0, 0x0240_0007), false),
            Some(InputEvent::WindowDestroyed(0x0240_0007))
        );
    }

    #[test]
    fn test_decode_swapped_window() {
        let event = raw(16, 0, 0x0240_0007u32.swap_bytes());
        assert_eq!(
            decode_event(&event, true),
            Some(InputEvent::WindowCreated(0x0240_0007))
        );
    }

    #[test]
    fn test_decode_strips_send_event_bit() {
        assert_eq!(
            decode_event(&raw(0x80 | 2, 38, 0), false),
            Some(InputEvent::KeyPress(Key::from(38u8)))
        );
    }

    #[test]
    fn test_decode_ignores_other_events() {
        assert_eq!(decode_event(&raw(6, 0, 0), false), None); // MotionNotify
        assert_eq!(decode_event(&raw(19, 0, 0), false), None); // MapNotify
        assert_eq!(decode_event(&[], false), None);
        assert_eq!(decode_event(&[16, 0, 0, 0], false), None);
    }
}
