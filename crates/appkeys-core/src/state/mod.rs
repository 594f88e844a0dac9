// Appkeys State
// Per-process input state

pub mod tracker;

pub use tracker::ModifierState;
