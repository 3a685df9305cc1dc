//! Infrastructure layer
//!
//! Handles all I/O operations: filesystem, VCS checkouts and storage.
//! This module is the only place where side effects occur.

pub mod dirs;
pub mod git;
pub mod jobfile;
pub mod memory_store;
pub mod vcs;
