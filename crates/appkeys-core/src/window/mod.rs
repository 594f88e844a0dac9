//! Window context module
//!
//! Window system queries, class resolution and tree traversal.

mod provider;
mod resolver;
mod tree;

pub use provider::{WindowError, WindowId, WindowSystem};
pub use resolver::resolve_class;
pub use tree::descendants;
