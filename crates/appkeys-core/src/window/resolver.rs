// Window Class Resolver
//
// Finds the class of a window by walking up its ancestor chain. Transient
// and override-redirect windows often carry no class hint of their own.

use super::provider::{WindowId, WindowSystem};

/// Upper bound on ancestor hops, in case the server reports a cycle
const MAX_DEPTH: usize = 64;

/// Class of the nearest ancestor (inclusive) that has a class hint.
///
/// The walk stops at the root window, which is never consulted itself.
/// A failed class query counts as "no hint" and the walk continues upward;
/// a failed parent query ends it.
pub fn resolve_class<W: WindowSystem + ?Sized>(ws: &W, window: WindowId) -> Option<String> {
    let root = ws.root();
    let mut current = window;

    for _ in 0..MAX_DEPTH {
        if current == root {
            return None;
        }

        match ws.class_hint(current) {
            Ok(Some(class)) => {
                log::trace!("Window {} resolved to class {} via {}", window, class, current);
                return Some(class);
            }
            Ok(None) => {}
            Err(e) => log::debug!("Class hint query on window {} failed: {}", current, e),
        }

        match ws.parent(current) {
            Ok(Some(parent)) if parent != current => current = parent,
            Ok(_) => return None,
            Err(e) => {
                log::debug!("Parent query on window {} failed: {}", current, e);
                return None;
            }
        }
    }

    log::warn!("Gave up resolving class of window {} after {} ancestors", window, MAX_DEPTH);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWindowSystem;

    fn tree() -> FakeWindowSystem {
        FakeWindowSystem::new(1)
            .with_window(10, 1, Some("xterm"))
            .with_window(11, 10, None)
            .with_window(12, 11, None)
            .with_window(20, 1, None)
            .with_window(21, 20, Some("firefox"))
    }

    #[test]
    fn test_resolve_own_hint() {
        assert_eq!(resolve_class(&tree(), 10), Some("xterm".to_string()));
        assert_eq!(resolve_class(&tree(), 21), Some("firefox".to_string()));
    }

    #[test]
    fn test_resolve_walks_to_parent() {
        assert_eq!(resolve_class(&tree(), 11), Some("xterm".to_string()));
        assert_eq!(resolve_class(&tree(), 12), Some("xterm".to_string()));
    }

    #[test]
    fn test_resolve_stops_at_root() {
        assert_eq!(resolve_class(&tree(), 20), None);
        assert_eq!(resolve_class(&tree(), 1), None);
    }

    #[test]
    fn test_resolve_unknown_window() {
        assert_eq!(resolve_class(&tree(), 99), None);
    }

    #[test]
    fn test_resolve_skips_failing_class_query() {
        let ws = tree().with_failing_class_hint(11);
        assert_eq!(resolve_class(&ws, 11), Some("xterm".to_string()));
    }

    #[test]
    fn test_resolve_survives_parent_cycle() {
        let ws = FakeWindowSystem::new(1)
            .with_window(30, 31, None)
            .with_window(31, 30, None);
        assert_eq!(resolve_class(&ws, 30), None);
    }
}
