// Appkeys Output Layer
// Synthetic event sink and remap sequence calculation

mod sequence;
mod sink;

pub use sequence::{remap_sequence, RemapSequence};
pub use sink::{EventSink, OutputError, SyntheticEvent};
