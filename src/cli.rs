//! Command-line interface definitions using clap
//!
//! Running without a subcommand starts the HTTP server.

use clap::{Parser, Subcommand};

/// utmlogger - UTM campaign attribution logger
#[derive(Parser)]
#[command(name = "utmlogger")]
#[command(version)]
#[command(about = "Capture and review UTM campaign visits", long_about = None)]
pub struct Cli {
    /// Configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print stored UTM logs, newest first
    List {
        /// Case-insensitive match on source, medium, campaign or url
        #[arg(long)]
        filter: Option<String>,

        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Export stored UTM logs to a JSON file
    Export {
        /// Output file path (default: utm-logs-<timestamp>.json)
        file_path: Option<String>,
    },

    /// Create the utm_logs table (relational backend only)
    InitDb,

    /// Capture the UTM parameters of a landing page URL and send them
    Capture {
        /// Full page URL including the query string
        page_url: String,

        /// Server base URL
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        endpoint: String,

        /// Local store file for the utm_logs / utm_params mirror
        #[arg(long)]
        store: Option<String>,
    },

    /// Poll the server and print the dashboard until Ctrl+C
    Watch {
        /// Server base URL
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        endpoint: String,

        /// Case-insensitive match on source, medium, campaign or url
        #[arg(long)]
        filter: Option<String>,

        /// Refresh interval in seconds
        #[arg(long, default_value_t = 5)]
        interval: u64,

        /// Local store file used when the server is unreachable
        #[arg(long)]
        store: Option<String>,

        /// Write utm-logs-<timestamp>.json into DIR once and exit
        #[arg(long, value_name = "DIR")]
        export_dir: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_server() {
        let cli = Cli::try_parse_from(["utmlogger"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_list_with_filter() {
        let cli = Cli::try_parse_from(["utmlogger", "-c", "x.toml", "list", "--filter", "cpc"])
            .unwrap();
        assert_eq!(cli.config.as_deref(), Some("x.toml"));
        match cli.command {
            Some(Commands::List { filter, json }) => {
                assert_eq!(filter.as_deref(), Some("cpc"));
                assert!(!json);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_watch_defaults() {
        let cli = Cli::try_parse_from(["utmlogger", "watch"]).unwrap();
        match cli.command {
            Some(Commands::Watch {
                endpoint, interval, ..
            }) => {
                assert_eq!(endpoint, "http://127.0.0.1:8080");
                assert_eq!(interval, 5);
            }
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn test_watch_export_dir() {
        let cli = Cli::try_parse_from(["utmlogger", "watch", "--export-dir", "/tmp/out"]).unwrap();
        match cli.command {
            Some(Commands::Watch { export_dir, .. }) => {
                assert_eq!(export_dir.as_deref(), Some("/tmp/out"));
            }
            _ => panic!("expected watch"),
        }
    }
}
