// Window tree traversal

use super::provider::{WindowError, WindowId, WindowSystem};

/// Every window below `start` in depth-first pre-order, excluding `start`.
///
/// Windows whose children cannot be queried (typically destroyed while we
/// walk) are kept but not descended into.
pub fn descendants<W: WindowSystem + ?Sized>(
    ws: &W,
    start: WindowId,
) -> Result<Vec<WindowId>, WindowError> {
    let mut found = Vec::new();
    let mut stack: Vec<WindowId> = ws.children(start)?.into_iter().rev().collect();

    while let Some(window) = stack.pop() {
        found.push(window);
        match ws.children(window) {
            Ok(children) => stack.extend(children.into_iter().rev()),
            Err(e) => log::debug!("Skipping children of window {}: {}", window, e),
        }
    }
    Ok(found)
}
