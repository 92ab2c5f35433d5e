//! Error types
//!
//! Validation, fetch and persistence failures are absorbed by the component
//! that produces them. Only [`ConfigError`] reaches the embedder, and only while
//! a grid is being constructed.

mod config;
mod fetch;
mod persistence;
mod validation;

pub use config::*;
pub use fetch::*;
pub use persistence::*;
pub use validation::*;
