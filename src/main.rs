use clap::Parser;

use utmlogger::cli::Cli;
use utmlogger::config::{DEFAULT_CONFIG_PATH, get_config, init_config_from};
use utmlogger::runtime::modes;
use utmlogger::system::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));

    let config = get_config();
    // guard 必须存活到进程结束，否则异步日志会丢失
    let _log_guard = init_logging(&config.logging)?;

    match cli.command {
        #[cfg(feature = "server")]
        None => {
            if let Err(e) = modes::run_server().await {
                if let Some(err) = e.downcast_ref::<utmlogger::errors::UtmLoggerError>() {
                    eprintln!("{}", err.format_colored());
                } else {
                    eprintln!("{:#}", e);
                }
                std::process::exit(1);
            }
        }
        #[cfg(feature = "cli")]
        Some(cmd) => {
            if let Err(e) = modes::run_cli(cmd).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }
        #[allow(unreachable_patterns)]
        _ => {
            eprintln!("This mode is not available in this build");
            std::process::exit(2);
        }
    }

    Ok(())
}
