//! CLI-specific utilities for transit-graph
//!
//! Terminal output helpers kept out of the library.

pub mod progress;
pub mod report;

pub use progress::ProgressManager;
