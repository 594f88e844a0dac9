// Appkeys Transform Module
// Remap decision and execution

pub mod engine;

pub use engine::{EngineState, Evaluation, RemapEngine};
