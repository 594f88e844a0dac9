// Appkeys Test Support
// In-memory window system, output sink and event source

use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::event::{EventSource, InputEvent, SourceControl, SourceError};
use crate::hotkey::Button;
use crate::keysym::{
    Keysym, XK_ALT_L, XK_ALT_R, XK_CONTROL_L, XK_CONTROL_R, XK_SHIFT_L, XK_SHIFT_R, XK_SUPER_L,
    XK_SUPER_R,
};
use crate::layout::KeyboardLayout;
use crate::output::{EventSink, OutputError, SyntheticEvent};
use crate::window::{WindowError, WindowId, WindowSystem};
use crate::Key;

const US_ROWS: &[(u8, &[Keysym])] = &[
    (9, &[0xff1b, 0]),            // Escape
    (20, &[0x2d, 0x5f]),          // minus
    (23, &[0xff09, 0xfe20]),      // Tab
    (24, &[0x71, 0x51]),          // q
    (25, &[0x77, 0x57]),          // w
    (28, &[0x74, 0x54]),          // t
    (36, &[0xff0d, 0]),           // Return
    (37, &[XK_CONTROL_L, 0]),
    (38, &[0x61, 0x41]),          // a
    (50, &[XK_SHIFT_L, 0]),
    (53, &[0x78, 0x58]),          // x
    (54, &[0x63, 0x43]),          // c
    (55, &[0x76, 0x56]),          // v
    (62, &[XK_SHIFT_R, 0]),
    (64, &[XK_ALT_L, 0xffe7]),
    (65, &[0x20, 0]),             // space
    (67, &[0xffbe, 0]),           // F1
    (105, &[XK_CONTROL_R, 0]),
    (108, &[XK_ALT_R, 0xffe8]),
    (133, &[XK_SUPER_L, 0]),
    (134, &[XK_SUPER_R, 0]),
];

/// A small US QWERTY mapping with the usual evdev keycodes
pub fn us_layout() -> KeyboardLayout {
    KeyboardLayout::from_rows(US_ROWS)
}

#[derive(Debug, Clone)]
struct FakeWindow {
    parent: WindowId,
    class: Option<String>,
    class_fails: bool,
}

/// Window tree held in memory.
///
/// Windows are listed in insertion order; querying a window that was never
/// added fails like a destroyed X window would.
#[derive(Debug, Default)]
pub struct FakeWindowSystem {
    root: WindowId,
    windows: IndexMap<WindowId, FakeWindow>,
    focus: Option<WindowId>,
    top_level: Option<Vec<WindowId>>,
    rejected_grabs: Vec<WindowId>,
    grabs: Mutex<Vec<(WindowId, Key, u16)>>,
    focus_queries: AtomicUsize,
}

impl FakeWindowSystem {
    pub fn new(root: WindowId) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    /// Add a window below `parent` with an optional class hint
    pub fn with_window(mut self, id: WindowId, parent: WindowId, class: Option<&str>) -> Self {
        self.add_window(id, parent, class);
        self
    }

    /// Class hint queries for `id` fail
    pub fn with_failing_class_hint(mut self, id: WindowId) -> Self {
        if let Some(window) = self.windows.get_mut(&id) {
            window.class_fails = true;
        }
        self
    }

    pub fn with_focus(mut self, id: WindowId) -> Self {
        self.focus = Some(id);
        self
    }

    /// Report exactly these windows as top-level instead of walking the tree
    pub fn with_top_level(mut self, windows: Vec<WindowId>) -> Self {
        self.top_level = Some(windows);
        self
    }

    /// Grabs on `id` are rejected
    pub fn with_rejected_grabs(mut self, id: WindowId) -> Self {
        self.rejected_grabs.push(id);
        self
    }

    pub fn add_window(&mut self, id: WindowId, parent: WindowId, class: Option<&str>) {
        self.windows.insert(
            id,
            FakeWindow {
                parent,
                class: class.map(str::to_string),
                class_fails: false,
            },
        );
    }

    pub fn remove_window(&mut self, id: WindowId) {
        self.windows.shift_remove(&id);
    }

    pub fn set_focus(&mut self, id: Option<WindowId>) {
        self.focus = id;
    }

    /// Grabs registered so far as (window, key, modifiers)
    pub fn grabs(&self) -> Vec<(WindowId, Key, u16)> {
        self.grabs.lock().clone()
    }

    /// How many times the focused window was asked for
    pub fn focus_queries(&self) -> usize {
        self.focus_queries.load(Ordering::Relaxed)
    }

    fn window(&self, id: WindowId) -> Result<&FakeWindow, WindowError> {
        self.windows
            .get(&id)
            .ok_or_else(|| WindowError::QueryFailed(format!("BadWindow {}", id)))
    }

    fn known(&self, id: WindowId) -> Result<(), WindowError> {
        if id == self.root {
            Ok(())
        } else {
            self.window(id).map(|_| ())
        }
    }
}

impl WindowSystem for FakeWindowSystem {
    fn root(&self) -> WindowId {
        self.root
    }

    fn class_hint(&self, window: WindowId) -> Result<Option<String>, WindowError> {
        if window == self.root {
            return Ok(None);
        }
        let window = self.window(window)?;
        if window.class_fails {
            return Err(WindowError::QueryFailed("GetProperty".to_string()));
        }
        Ok(window.class.clone())
    }

    fn parent(&self, window: WindowId) -> Result<Option<WindowId>, WindowError> {
        if window == self.root {
            return Ok(None);
        }
        Ok(Some(self.window(window)?.parent))
    }

    fn children(&self, window: WindowId) -> Result<Vec<WindowId>, WindowError> {
        self.known(window)?;
        Ok(self
            .windows
            .iter()
            .filter(|(_, w)| w.parent == window)
            .map(|(id, _)| *id)
            .collect())
    }

    fn focused_window(&self) -> Result<Option<WindowId>, WindowError> {
        self.focus_queries.fetch_add(1, Ordering::Relaxed);
        Ok(self.focus)
    }

    fn top_level_windows(&self) -> Result<Vec<WindowId>, WindowError> {
        match &self.top_level {
            Some(windows) => Ok(windows.clone()),
            None => crate::window::descendants(self, self.root),
        }
    }

    fn grab_key(&self, window: WindowId, key: Key, modifiers: u16) -> Result<(), WindowError> {
        if self.rejected_grabs.contains(&window) {
            return Err(WindowError::GrabFailed("BadAccess".to_string()));
        }
        self.known(window)?;
        self.grabs.lock().push((window, key, modifiers));
        Ok(())
    }
}

/// Every call an `EventSink` received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkCall {
    Event(SyntheticEvent),
    Passthrough(bool),
    Flush,
}

/// Sink that records calls into a shared log.
///
/// Clones share the log, so a test can keep one handle while the other is
/// boxed into a `Remapper`.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    calls: Arc<Mutex<Vec<SinkCall>>>,
    fail_after: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `count` calls, then fail every call after them
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// All calls that succeeded, in order
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().clone()
    }

    /// Only the synthetic events, in order
    pub fn events(&self) -> Vec<SyntheticEvent> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                SinkCall::Event(event) => Some(*event),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&mut self, call: SinkCall) -> Result<(), OutputError> {
        let mut calls = self.calls.lock();
        if self.fail_after.is_some_and(|limit| calls.len() >= limit) {
            return Err(OutputError::Send("connection closed".to_string()));
        }
        calls.push(call);
        Ok(())
    }
}

impl EventSink for RecordingSink {
    fn key(&mut self, key: Key, pressed: bool) -> Result<(), OutputError> {
        self.record(SinkCall::Event(SyntheticEvent::Key { key, pressed }))
    }

    fn button(&mut self, button: Button, pressed: bool) -> Result<(), OutputError> {
        self.record(SinkCall::Event(SyntheticEvent::Button { button, pressed }))
    }

    fn set_passthrough_suspended(&mut self, suspended: bool) -> Result<(), OutputError> {
        self.record(SinkCall::Passthrough(suspended))
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.record(SinkCall::Flush)
    }
}

/// Event source replaying a fixed list of events
#[derive(Debug, Default)]
pub struct ScriptedSource {
    events: VecDeque<InputEvent>,
    stopped: Arc<AtomicBool>,
    fail_with: Option<String>,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Fail with `message` once the script is exhausted
    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    /// Handle that stops delivery from another thread
    pub fn control(&self) -> ScriptedControl {
        ScriptedControl {
            stopped: Arc::clone(&self.stopped),
            stop_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Events not delivered yet
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventSource for ScriptedSource {
    fn run(
        &mut self,
        handler: &mut dyn FnMut(InputEvent) -> ControlFlow<()>,
    ) -> Result<(), SourceError> {
        while !self.stopped.load(Ordering::SeqCst) {
            let Some(event) = self.events.pop_front() else {
                break;
            };
            if handler(event).is_break() {
                return Ok(());
            }
        }
        match self.fail_with.take() {
            Some(message) => Err(SourceError::Failed(message)),
            None => Ok(()),
        }
    }
}

/// Stop handle for a `ScriptedSource`
#[derive(Debug, Clone)]
pub struct ScriptedControl {
    stopped: Arc<AtomicBool>,
    stop_calls: Arc<AtomicUsize>,
}

impl ScriptedControl {
    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

impl SourceControl for ScriptedControl {
    fn stop(&self) -> Result<(), SourceError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }
}
