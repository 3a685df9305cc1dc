//! Configuration and constants
//!
//! - [`defaults`] - Process-wide default values for settings and project config

pub mod defaults;
