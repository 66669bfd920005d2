mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

use arctic_guide::{
    app::{AppConfig, AppState},
    platform::{ApiKey, AppPaths},
    tui,
};
use cli::{Cli, Commands};

/// Installs the global subscriber. With `log_dir` set, logs go to a daily
/// rolling file and the returned guard must outlive the app.
fn init_logging(debug: bool, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let default_level = if debug { "arctic_guide=debug" } else { "arctic_guide=info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("invalid log filter")?;

    let (writer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "arctic-guide.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(log_dir.is_none())
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set subscriber: {e}"))?;

    Ok(guard)
}

async fn load_config(cli: &Cli, paths: &AppPaths) -> Result<(AppConfig, std::path::PathBuf)> {
    match &cli.config {
        Some(path) => {
            let config = AppConfig::load(path)
                .await
                .with_context(|| format!("failed to load config {}", path.display()))?;
            Ok((config, path.clone()))
        }
        None => {
            let path = paths.config_file();
            let config = AppConfig::load_or_create(&path)
                .await
                .with_context(|| format!("failed to load config {}", path.display()))?;
            Ok((config, path))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let paths = AppPaths::new().context("failed to resolve application directories")?;
    paths
        .ensure_dirs_exist()
        .context("failed to create application directories")?;

    let interactive = cli.command() == &Commands::Chat;
    let logs_dir = paths.logs_dir();
    let _log_guard = init_logging(cli.debug, interactive.then_some(logs_dir.as_path()))?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Arctic Guide");

    let (config, config_path) = load_config(&cli, &paths).await?;

    let credential = if cli.offline {
        info!("Offline mode forced from the command line");
        None
    } else {
        ApiKey::from_env(&config.gemini.api_key_env)
    };

    let state = AppState::new(config, config_path, credential);

    match cli.command() {
        Commands::Chat => {
            tui::run(state).await.context("terminal UI failed")?;
        }
        Commands::Ask { text } => {
            let manager = state
                .build_chat_manager()
                .context("failed to set up the chat session")?;
            let reply = manager.send_message(&text.join(" ")).await;
            println!("{}", reply);
        }
        Commands::Config { path } => {
            if *path {
                println!("{}", state.get_config_path().display());
            } else {
                print!("{}", state.get_config().to_toml()?);
            }
        }
    }

    Ok(())
}
