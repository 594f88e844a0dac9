// Appkeys Remap Engine
// Decides whether the current chord is remapped and drives the substitution
//
// On a qualifying key press the engine looks the tracker's hotkey code up in
// the remap table, resolving the focused window's class only when a
// class-specific rule could apply, then replaces the chord with the target:
// held modifiers up, target chord, held modifiers down again.

use crate::hotkey::Hotkey;
use crate::mapping::RemapTable;
use crate::modifier::ModifierKeys;
use crate::output::{remap_sequence, EventSink, OutputError, RemapSequence};
use crate::state::ModifierState;
use crate::window::{resolve_class, WindowSystem};

/// Reentrancy guard state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Idle,
    /// A remap sequence is being emitted; evaluation is inert
    Handling,
}

/// Outcome of evaluating one key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// Evaluation requested while a remap was already in flight
    Inert,
    /// No remap configured for this chord and window
    Miss,
    /// The chord was replaced by `target`
    Remapped {
        /// Class the rule was selected for (`None` for the wildcard fast path
        /// or when the focused window's class could not be resolved)
        class: Option<String>,
        target: Hotkey,
    },
}

impl Evaluation {
    pub fn is_remapped(&self) -> bool {
        matches!(self, Evaluation::Remapped { .. })
    }
}

/// The remap decision and execution state machine
#[derive(Debug, Clone, Default)]
pub struct RemapEngine {
    state: EngineState,
    modifier_keys: ModifierKeys,
}

impl RemapEngine {
    /// Create an engine that synthesizes modifiers with `modifier_keys`
    pub fn new(modifier_keys: ModifierKeys) -> Self {
        Self {
            state: EngineState::Idle,
            modifier_keys,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Evaluate the tracker's current chord and remap it if configured.
    ///
    /// Called right after a non-modifier key press was recorded.
    pub fn evaluate<W, S>(
        &mut self,
        table: &RemapTable,
        tracker: &mut ModifierState,
        windows: &W,
        sink: &mut S,
    ) -> Evaluation
    where
        W: WindowSystem + ?Sized,
        S: EventSink + ?Sized,
    {
        if self.state == EngineState::Handling {
            log::trace!("Ignoring evaluation while a remap is in flight");
            return Evaluation::Inert;
        }

        let code = tracker.code();
        let Some((class, target)) = select_target(table, code, windows) else {
            return Evaluation::Miss;
        };

        match &class {
            Some(class) => log::debug!("Found remapping for app {}", class),
            None => log::debug!("Found remapping for ANY"),
        }
        self.execute(&target, tracker, sink);
        Evaluation::Remapped { class, target }
    }

    /// Replace the current chord with `target`.
    ///
    /// Output failures abort the remaining synthetic events; the tracker is
    /// still updated and the engine always returns to Idle.
    fn execute<S: EventSink + ?Sized>(
        &mut self,
        target: &Hotkey,
        tracker: &mut ModifierState,
        sink: &mut S,
    ) {
        self.state = EngineState::Handling;

        let held = tracker.snapshot();
        let sequence = remap_sequence(&held, target, &self.modifier_keys);
        log::debug!(
            "Remapping {} -> {} ({} synthetic events)",
            held,
            target,
            sequence.len()
        );
        if let Err(e) = emit_sequence(&sequence, sink) {
            log::error!("Remap output failed: {}", e);
        }

        // The physical key that triggered the remap is consumed
        tracker.release_key();

        if let Err(e) = sink.set_passthrough_suspended(false) {
            log::warn!("Could not resume passthrough: {}", e);
        }
        self.state = EngineState::Idle;
    }
}

fn select_target<W: WindowSystem + ?Sized>(
    table: &RemapTable,
    code: crate::hotkey::HotkeyCode,
    windows: &W,
) -> Option<(Option<String>, Hotkey)> {
    let classes = table.get(code)?;

    // Only a global rule exists: no need to ask the window system anything
    if !classes.has_class_specific() {
        return classes.wildcard().map(|target| (None, *target));
    }

    match focused_class(windows) {
        Some(class) => {
            let target = *classes.lookup(&class)?;
            Some((Some(class), target))
        }
        None => classes.wildcard().map(|target| (None, *target)),
    }
}

fn focused_class<W: WindowSystem + ?Sized>(windows: &W) -> Option<String> {
    let window = match windows.focused_window() {
        Ok(Some(window)) => window,
        Ok(None) => {
            log::warn!("Could not get focused window");
            return None;
        }
        Err(e) => {
            log::warn!("Could not get focused window: {}", e);
            return None;
        }
    };

    let class = resolve_class(windows, window);
    if class.is_none() {
        log::warn!("Could not get class of focused window {}", window);
    }
    class
}

fn emit_sequence<S: EventSink + ?Sized>(
    sequence: &RemapSequence,
    sink: &mut S,
) -> Result<(), OutputError> {
    sink.set_passthrough_suspended(true)?;
    sink.emit_all(&sequence.release)?;
    sink.emit_all(&sequence.action)?;
    sink.emit_all(&sequence.restore)
}
