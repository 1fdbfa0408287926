//! Commands that read or initialize the configured storage backend

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use colored::Colorize;

use crate::client::Dashboard;
use crate::config::BackendKind;
use crate::interfaces::cli::CliError;
use crate::storage::{UtmLog, UtmLogStore};

pub async fn list_logs(
    storage: Arc<dyn UtmLogStore>,
    filter: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let logs = storage
        .try_load()
        .await
        .map_err(|e| CliError::CommandError(format!("Failed to load logs: {}", e)))?;

    let filter = filter.unwrap_or_default();
    let logs: Vec<&UtmLog> = logs
        .iter()
        .filter(|log| Dashboard::matches_filter(log, &filter))
        .collect();

    if json {
        let out = serde_json::to_string_pretty(&logs)
            .map_err(|e| CliError::ParseError(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    if logs.is_empty() {
        println!("{} No UTM logs found", "ℹ".bold().blue());
        return Ok(());
    }

    println!("{}", "UTM logs:".bold().green());
    println!();
    for log in &logs {
        let mut parts = vec![log
            .timestamp
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .dimmed()
            .to_string()];
        for (key, value) in log.params.iter() {
            let label = key.trim_start_matches("utm_");
            parts.push(format!("{}={}", label.cyan(), value));
        }
        parts.push(log.url.blue().underline().to_string());
        println!("  {}", parts.join(" "));
    }
    println!();
    println!(
        "{} Total {} UTM logs",
        "ℹ".bold().blue(),
        logs.len().to_string().green()
    );
    Ok(())
}

pub async fn export_logs(
    storage: Arc<dyn UtmLogStore>,
    file_path: Option<String>,
) -> Result<(), CliError> {
    let logs = storage
        .try_load()
        .await
        .map_err(|e| CliError::CommandError(format!("Failed to load logs: {}", e)))?;

    let path = file_path.unwrap_or_else(|| Dashboard::export_file_name(Utc::now()));
    let json =
        serde_json::to_string_pretty(&logs).map_err(|e| CliError::ParseError(e.to_string()))?;

    if let Some(parent) = Path::new(&path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| CliError::CommandError(format!("Failed to create directory: {}", e)))?;
    }
    std::fs::write(&path, json)
        .map_err(|e| CliError::CommandError(format!("Failed to write {}: {}", path, e)))?;

    println!(
        "{} Exported {} UTM logs to {}",
        "✓".bold().green(),
        logs.len().to_string().green(),
        path.blue()
    );
    Ok(())
}

pub async fn init_db(storage: Arc<dyn UtmLogStore>) -> Result<(), CliError> {
    if storage.backend_config().backend != BackendKind::Relational {
        return Err(CliError::CommandError(
            "init-db is only available for the relational backend".to_string(),
        ));
    }

    storage.initialize().await?;
    println!("{} Database initialized successfully", "✓".bold().green());
    Ok(())
}
