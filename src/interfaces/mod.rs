//! User-facing interfaces

pub mod cli;
