//! Mode routing
//!
//! - Server mode (HTTP server), the default when no subcommand is given
//! - CLI mode (storage commands, capture and the polling dashboard)

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "server")]
pub use server::run_server;

#[cfg(feature = "cli")]
pub use cli::run_cli;
