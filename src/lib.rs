//! utmlogger - UTM campaign attribution logger
//!
//! Captures the UTM query parameters of landing-page visits, stores them
//! through a pluggable backend and serves them back for review.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface (default)
//!
//! # Architecture
//! - `storage`: the `UtmLogStore` trait and its file / blob / relational backends
//! - `api`: HTTP services and middleware
//! - `client`: landing-page capture hook and the polling dashboard
//! - `interfaces`: CLI commands
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging setup

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod storage;
pub mod system;
