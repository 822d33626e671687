//! Configuration module
//!
//! Handles user configuration (`config.toml` in the platform config dir),
//! layered with `WSM_`-prefixed environment variables.

mod settings;

pub use settings::*;
