//! CLI command implementations
//!
//! This module re-exports all CLI command functions.

mod capture;
mod config_gen;
mod logs;

pub use capture::*;
pub use config_gen::*;
pub use logs::*;
