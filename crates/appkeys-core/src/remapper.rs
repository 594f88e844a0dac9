// Appkeys Remapper
// The shared context every input notification is dispatched against

use crate::event::InputEvent;
use crate::grab::GrabCoordinator;
use crate::hotkey::Button;
use crate::layout::KeyboardLayout;
use crate::mapping::RemapTable;
use crate::modifier::ModifierKeys;
use crate::output::{EventSink, OutputError};
use crate::state::ModifierState;
use crate::transform::{Evaluation, RemapEngine};
use crate::window::WindowSystem;

/// Everything the event loop needs to process one notification: the
/// read-only table and layout, the live modifier state, the engine, and the
/// window system and sink it talks to.
pub struct Remapper {
    table: RemapTable,
    layout: KeyboardLayout,
    tracker: ModifierState,
    engine: RemapEngine,
    grabs: GrabCoordinator,
    windows: Box<dyn WindowSystem>,
    sink: Box<dyn EventSink>,
}

impl Remapper {
    pub fn new(
        table: RemapTable,
        layout: KeyboardLayout,
        windows: Box<dyn WindowSystem>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        let engine = RemapEngine::new(ModifierKeys::from_layout(&layout));
        Self {
            table,
            layout,
            tracker: ModifierState::new(),
            engine,
            grabs: GrabCoordinator::new(),
            windows,
            sink,
        }
    }

    /// Register grabs on all windows that exist right now
    pub fn register_existing_windows(&mut self) -> usize {
        let count = self
            .grabs
            .register_all(self.windows.as_ref(), &self.table);
        if self.grabs.failed() > 0 {
            log::warn!("{} grab(s) rejected by the window system", self.grabs.failed());
        }
        if let Err(e) = self.sink.flush() {
            log::warn!("Could not flush grab requests: {}", e);
        }
        count
    }

    /// Apply one notification.
    ///
    /// Returns the engine's verdict when the event was a non-modifier key
    /// press, `None` otherwise.
    pub fn dispatch(&mut self, event: InputEvent) -> Option<Evaluation> {
        match event {
            InputEvent::KeyPress(key) => match self.layout.modifier_of(key) {
                Some(modifier) => {
                    self.tracker.press_modifier(modifier);
                    None
                }
                None => {
                    self.tracker.press_key(key);
                    let evaluation = self.engine.evaluate(
                        &self.table,
                        &mut self.tracker,
                        self.windows.as_ref(),
                        self.sink.as_mut(),
                    );
                    Some(evaluation)
                }
            },
            InputEvent::KeyRelease(key) => {
                match self.layout.modifier_of(key) {
                    Some(modifier) => self.tracker.release_modifier(modifier),
                    None => self.tracker.release_key(),
                }
                None
            }
            InputEvent::ButtonPress(detail) => {
                // Buttons take part in the chord but never trigger a remap
                if let Some(button) = Button::from_detail(detail) {
                    self.tracker.press_button(button);
                }
                None
            }
            InputEvent::ButtonRelease(detail) => {
                if Button::from_detail(detail).is_some() {
                    self.tracker.release_button();
                }
                None
            }
            InputEvent::WindowCreated(window) => {
                self.grabs
                    .register_one(self.windows.as_ref(), &self.table, window);
                if let Err(e) = self.sink.flush() {
                    log::warn!("Could not flush grab requests: {}", e);
                }
                None
            }
            InputEvent::WindowDestroyed(window) => {
                log::debug!("Window {} destroyed", window);
                None
            }
        }
    }

    /// Push any queued output to the server
    pub fn flush_output(&mut self) -> Result<(), OutputError> {
        self.sink.flush()
    }

    pub fn table(&self) -> &RemapTable {
        &self.table
    }

    pub fn tracker(&self) -> &ModifierState {
        &self.tracker
    }

    pub fn grabs(&self) -> &GrabCoordinator {
        &self.grabs
    }
}

impl std::fmt::Debug for Remapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Remapper")
            .field("table", &self.table.len())
            .field("tracker", &self.tracker)
            .field("engine", &self.engine.state())
            .finish()
    }
}
