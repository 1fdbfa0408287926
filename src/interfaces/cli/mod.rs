//! CLI interface module
//!
//! Storage commands open the configured backend directly; `capture` and
//! `watch` talk to a running server over HTTP.

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};
use crate::config::get_config;
use crate::storage::StorageFactory;
use commands::{capture_page, config_generate, export_logs, init_db, list_logs, watch_logs};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::UtmLoggerError> for CliError {
    fn from(err: crate::errors::UtmLoggerError) -> Self {
        CliError::StorageError(err.to_string())
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => config_generate(output_path, force).await,

        Commands::Capture {
            page_url,
            endpoint,
            store,
        } => capture_page(page_url, endpoint, store).await,

        Commands::Watch {
            endpoint,
            filter,
            interval,
            store,
            export_dir,
        } => watch_logs(endpoint, filter, interval, store, export_dir).await,

        storage_cmd => {
            let config = get_config();
            let storage = StorageFactory::create_with(&config.storage).await?;

            match storage_cmd {
                Commands::List { filter, json } => list_logs(storage, filter, json).await,
                Commands::Export { file_path } => export_logs(storage, file_path).await,
                Commands::InitDb => init_db(storage).await,
                Commands::Config { .. } | Commands::Capture { .. } | Commands::Watch { .. } => {
                    unreachable!("handled above")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UtmLoggerError;

    #[test]
    fn test_storage_errors_keep_their_code() {
        let err: CliError = UtmLoggerError::file_operation("disk full").into();
        assert!(matches!(err, CliError::StorageError(_)));
        assert!(err.format_simple().contains("disk full"));
    }
}
