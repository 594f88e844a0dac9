// Appkeys Grab Coordinator
// Registers the remapped source hotkeys as key grabs on application windows

use crate::mapping::RemapTable;
use crate::window::{resolve_class, WindowId, WindowSystem};

/// Registers grabs for every source hotkey that applies to a window.
///
/// A hotkey applies when it has a wildcard rule or a rule for the window's
/// resolved class. Hotkeys without a key (button-only sources) are never
/// grabbed: a keycode of zero would grab every key.
#[derive(Debug, Clone, Default)]
pub struct GrabCoordinator {
    registered: usize,
    failed: usize,
}

impl GrabCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grabs registered over the coordinator's lifetime
    pub fn registered(&self) -> usize {
        self.registered
    }

    /// Grabs the window system rejected
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Register grabs on every top-level window. Returns the number of
    /// grabs registered by this call.
    pub fn register_all<W: WindowSystem + ?Sized>(
        &mut self,
        windows: &W,
        table: &RemapTable,
    ) -> usize {
        let targets = match windows.top_level_windows() {
            Ok(targets) => targets,
            Err(e) => {
                log::warn!("Could not list windows for grabs: {}", e);
                return 0;
            }
        };

        let count: usize = targets
            .into_iter()
            .map(|window| self.register_one(windows, table, window))
            .sum();
        log::info!("Registered {} grab(s) on existing windows", count);
        count
    }

    /// Register grabs on one window. Returns the number registered.
    pub fn register_one<W: WindowSystem + ?Sized>(
        &mut self,
        windows: &W,
        table: &RemapTable,
        window: WindowId,
    ) -> usize {
        let class = resolve_class(windows, window);
        log::debug!(
            "Grab all keys for window {} ({})",
            window,
            class.as_deref().unwrap_or("no class")
        );

        let mut count = 0;
        for (code, classes) in table.iter() {
            if !classes.applies_to(class.as_deref()) {
                continue;
            }
            let hotkey = code.decode();
            if hotkey.key.is_none() {
                log::trace!("Not grabbing button hotkey {}", hotkey);
                continue;
            }

            match windows.grab_key(window, hotkey.key, hotkey.grab_modifiers()) {
                Ok(()) => {
                    log::trace!("Grabbed {} on window {}", hotkey, window);
                    count += 1;
                }
                Err(e) => {
                    log::debug!("Could not grab {} on window {}: {}", hotkey, window, e);
                    self.failed += 1;
                }
            }
        }

        self.registered += count;
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigRecord;
    use crate::testing::{us_layout, FakeWindowSystem};
    use crate::Key;

    const CONTROL_ALT: u16 = 4 | 8;

    fn table(records: &[(&str, &str, &str)]) -> RemapTable {
        let records: Vec<ConfigRecord> = records
            .iter()
            .map(|(from, class, to)| ConfigRecord::new(from, class, to))
            .collect();
        RemapTable::load(&records, &us_layout())
    }

    fn windows() -> FakeWindowSystem {
        FakeWindowSystem::new(1)
            .with_window(10, 1, Some("xterm"))
            .with_window(20, 1, Some("firefox"))
            .with_window(21, 20, None)
    }

    #[test]
    fn test_wildcard_grabs_every_window() {
        let table = table(&[("ctrl-alt-t", "*", "ctrl-alt-x")]);
        let ws = windows();
        let mut grabs = GrabCoordinator::new();

        assert_eq!(grabs.register_all(&ws, &table), 3);
        assert_eq!(
            ws.grabs(),
            vec![
                (10, Key::from(28u8), CONTROL_ALT),
                (20, Key::from(28u8), CONTROL_ALT),
                (21, Key::from(28u8), CONTROL_ALT),
            ]
        );
        assert_eq!(grabs.registered(), 3);
    }

    #[test]
    fn test_class_rule_grabs_matching_windows_only() {
        let table = table(&[("ctrl-w", "firefox", "ctrl-q")]);
        let ws = windows();
        let mut grabs = GrabCoordinator::new();

        assert_eq!(grabs.register_one(&ws, &table, 10), 0);
        assert_eq!(grabs.register_one(&ws, &table, 20), 1);
        // Inherits the class from its parent
        assert_eq!(grabs.register_one(&ws, &table, 21), 1);
        assert_eq!(ws.grabs(), vec![(20, Key::from(25u8), 4), (21, Key::from(25u8), 4)]);
    }

    #[test]
    fn test_button_sources_are_not_grabbed() {
        let table = table(&[("b1", "*", "b2"), ("alt-b3", "*", "q")]);
        let ws = windows();
        assert_eq!(GrabCoordinator::new().register_all(&ws, &table), 0);
        assert!(ws.grabs().is_empty());
    }

    #[test]
    fn test_rejected_grab_is_counted() {
        let table = table(&[("ctrl-alt-t", "*", "ctrl-alt-x")]);
        let ws = windows().with_rejected_grabs(20);
        let mut grabs = GrabCoordinator::new();

        assert_eq!(grabs.register_all(&ws, &table), 2);
        assert_eq!(grabs.failed(), 1);
    }

    #[test]
    fn test_top_level_override() {
        let table = table(&[("ctrl-alt-t", "*", "ctrl-alt-x")]);
        let ws = windows().with_top_level(vec![20]);
        assert_eq!(GrabCoordinator::new().register_all(&ws, &table), 1);
        assert_eq!(ws.grabs()[0].0, 20);
    }

    #[test]
    fn test_window_without_class_gets_wildcard_only() {
        let table = table(&[("ctrl-alt-t", "*", "ctrl-alt-x"), ("ctrl-w", "firefox", "ctrl-q")]);
        let ws = FakeWindowSystem::new(1).with_window(5, 1, None);
        assert_eq!(GrabCoordinator::new().register_one(&ws, &table, 5), 1);
        assert_eq!(ws.grabs(), vec![(5, Key::from(28u8), CONTROL_ALT)]);
    }
}
