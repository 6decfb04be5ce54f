//! Infrastructure layer
//!
//! Handles filesystem access and external processes.

pub mod filesystem;
pub mod toolchain;
