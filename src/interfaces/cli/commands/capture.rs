//! Client-side commands: one-shot capture and the polling dashboard

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;

use crate::client::{
    CaptureOutcome, Dashboard, FileKeyValueStore, HttpTransport, KeyValueStore, LogsOrigin,
    TracingAnalytics, UtmCapture,
};
use crate::interfaces::cli::CliError;
use crate::runtime::lifetime::shutdown::shutdown_channel;

const CLI_USER_AGENT: &str = concat!("utmlogger-cli/", env!("CARGO_PKG_VERSION"));

fn open_store(path: Option<String>) -> Result<Option<Arc<dyn KeyValueStore>>, CliError> {
    match path {
        Some(path) => {
            let store = FileKeyValueStore::open(path)?;
            Ok(Some(Arc::new(store)))
        }
        None => Ok(None),
    }
}

pub async fn capture_page(
    page_url: String,
    endpoint: String,
    store: Option<String>,
) -> Result<(), CliError> {
    let transport = Arc::new(HttpTransport::new(&endpoint).with_user_agent(CLI_USER_AGENT));
    let mut capture = UtmCapture::new(transport)
        .with_analytics(Arc::new(TracingAnalytics))
        .with_user_agent(CLI_USER_AGENT);
    if let Some(store) = open_store(store)? {
        capture = capture.with_store(store);
    }

    match capture.capture(&page_url).await {
        CaptureOutcome::NoParams => {
            println!("{} No UTM parameters in {}", "ℹ".bold().blue(), page_url);
        }
        CaptureOutcome::Sent(params) => {
            println!("{} Captured UTM visit", "✓".bold().green());
            for (key, value) in params.iter() {
                println!("  {} {}", format!("{}:", key).cyan(), value);
            }
        }
        CaptureOutcome::SendFailed(_) => {
            // 失败只记录日志，命令本身不报错
            println!(
                "{} Could not reach {}; see log output",
                "⚠".bold().yellow(),
                endpoint.blue()
            );
        }
        CaptureOutcome::AlreadyRan => {}
    }
    Ok(())
}

pub async fn watch_logs(
    endpoint: String,
    filter: Option<String>,
    interval: u64,
    store: Option<String>,
    export_dir: Option<String>,
) -> Result<(), CliError> {
    if interval == 0 {
        return Err(CliError::ParseError(
            "--interval must be at least 1 second".to_string(),
        ));
    }

    let transport = Arc::new(HttpTransport::new(&endpoint).with_user_agent(CLI_USER_AGENT));
    let mut dashboard = Dashboard::new(transport);
    if let Some(store) = open_store(store)? {
        dashboard = dashboard.with_store(store);
    }
    if let Some(filter) = filter {
        dashboard.set_filter(filter);
    }

    if let Some(dir) = export_dir {
        // 导出全部记录，忽略 --filter
        let origin = dashboard.refresh().await;
        let path = dashboard.export_to(Path::new(&dir))?;
        println!(
            "{} Exported {} logs ({:?}) to {}",
            "✓".bold().green(),
            dashboard.logs().len(),
            origin,
            path.display().to_string().cyan()
        );
        return Ok(());
    }

    let shutdown = shutdown_channel();
    dashboard
        .run(Duration::from_secs(interval), shutdown, |view| {
            // 清屏后重绘
            print!("\x1B[2J\x1B[H");
            let source = match view.origin() {
                LogsOrigin::Server => endpoint.as_str().green(),
                LogsOrigin::LocalMirror => "local mirror".yellow(),
            };
            println!(
                "{} {} ({} shown, source: {})",
                "UTM Logs Dashboard".bold(),
                chrono::Utc::now().format("%H:%M:%S").to_string().dimmed(),
                view.filtered().len(),
                source
            );
            println!();
            println!("{}", view.render());
            let _ = std::io::stdout().flush();
        })
        .await;

    Ok(())
}
