// Appkeys Remap Sequence Calculation
// Which synthetic events replace a matched hotkey, and in what order

use smallvec::SmallVec;

use crate::hotkey::{Hotkey, PrimaryAction};
use crate::modifier::{Modifier, ModifierKeys};
use crate::output::SyntheticEvent;

/// Ordered synthetic events for one remap, split at the points where the
/// sink is flushed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemapSequence {
    /// Releases of the modifiers held when the source hotkey fired
    pub release: SmallVec<[SyntheticEvent; 4]>,
    /// Target modifiers down, primary action tap, target modifiers up
    pub action: SmallVec<[SyntheticEvent; 10]>,
    /// Re-presses of the released modifiers
    pub restore: SmallVec<[SyntheticEvent; 4]>,
}

impl RemapSequence {
    /// All events in emission order
    pub fn events(&self) -> impl Iterator<Item = SyntheticEvent> + '_ {
        self.release
            .iter()
            .chain(self.action.iter())
            .chain(self.restore.iter())
            .copied()
    }

    /// Total number of synthetic events
    pub fn len(&self) -> usize {
        self.release.len() + self.action.len() + self.restore.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Calculate the synthetic events that replace `held` with `target`.
///
/// # Algorithm
/// 1. Release every modifier held in `held` (shift, control, alt, super)
/// 2. Press the target's modifiers (shift, control, alt, super)
/// 3. Press and release the target's key, or its button if it has no key
/// 4. Release the target's modifiers (super, alt, control, shift)
/// 5. Press the modifiers from step 1 again (shift, control, alt, super)
///
/// Modifiers without a keycode on the current layout are left out.
pub fn remap_sequence(held: &Hotkey, target: &Hotkey, keys: &ModifierKeys) -> RemapSequence {
    let modifier_event = |modifier: Modifier, pressed: bool| {
        let key = keys.key(modifier);
        (!key.is_none()).then_some(SyntheticEvent::Key { key, pressed })
    };

    let release = held
        .modifiers()
        .filter_map(|m| modifier_event(m, false))
        .collect();

    let mut action: SmallVec<[SyntheticEvent; 10]> = target
        .modifiers()
        .filter_map(|m| modifier_event(m, true))
        .collect();
    match target.primary() {
        Some(PrimaryAction::Key(key)) => {
            action.push(SyntheticEvent::Key { key, pressed: true });
            action.push(SyntheticEvent::Key { key, pressed: false });
        }
        Some(PrimaryAction::Button(button)) => {
            action.push(SyntheticEvent::Button { button, pressed: true });
            action.push(SyntheticEvent::Button { button, pressed: false });
        }
        None => {}
    }
    let target_modifiers: SmallVec<[Modifier; 4]> = target.modifiers().collect();
    action.extend(
        target_modifiers
            .into_iter()
            .rev()
            .filter_map(|m| modifier_event(m, false)),
    );

    let restore = held
        .modifiers()
        .filter_map(|m| modifier_event(m, true))
        .collect();

    RemapSequence {
        release,
        action,
        restore,
    }
}
