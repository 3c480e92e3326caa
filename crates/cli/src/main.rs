//! Autores console - log in, register and manage authors from the terminal

mod commands;
mod config;
mod logging;
mod session_file;

use anyhow::{Context, Result};
use autores_client::{ApiGateway, SessionEvent};
use clap::{Parser, ValueEnum};
use crate::commands::Commands;
use crate::config::Settings;
use crate::session_file::FileSessionStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, debug, error};

#[derive(Debug, Parser)]
#[command(name = "autores")]
#[command(about = "Console for the authors API")]
#[command(version)]
struct Cli {
    /// Set logging level (overrides the configured level)
    #[arg(short = 'l', long, global = true)]
    log_level: Option<LogLevel>,

    /// Configuration file (defaults to autores.toml or the platform config directory)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// API origin, e.g. http://localhost:3000/api
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        settings.api.base_url = base_url;
    }

    logging::init_logging(cli.log_level.map(Into::into), &settings.log_level)?;
    debug!(?settings, "Loaded configuration");

    let gateway = build_gateway(&settings)?;

    match cli.command.execute(&gateway, &settings).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Command failed: {e:#}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Gateway over the file-backed session, announcing rejected sessions
fn build_gateway(settings: &Settings) -> Result<ApiGateway> {
    let store = FileSessionStore::new(settings.session_path());
    debug!(path = %store.path().display(), "Using session file");

    let mut builder = ApiGateway::builder()
        .base_url(settings.api.base_url.clone())
        .token_header(settings.api.token_header.clone())
        .session_store(Arc::new(store));
    if let Some(timeout) = settings.api.timeout() {
        builder = builder.timeout(timeout);
    }
    let gateway = builder.build().context("Invalid API settings")?;

    gateway.events().subscribe(|event| {
        if event == SessionEvent::Invalidated {
            eprintln!(
                "Your session was rejected by the server. Log in again with `autores login`."
            );
        }
    });

    Ok(gateway)
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::AuthorCommands;
    use autores_client::SessionStore;

    #[test]
    fn test_parse_delete_with_global_flags() {
        let cli = Cli::try_parse_from([
            "autores",
            "authors",
            "delete",
            "42",
            "--yes",
            "--base-url",
            "http://api.example.com",
            "-l",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.base_url.as_deref(), Some("http://api.example.com"));
        assert!(matches!(cli.log_level, Some(LogLevel::Debug)));
        match cli.command {
            Commands::Authors {
                command: AuthorCommands::Delete { id, yes },
            } => {
                assert_eq!(id, "42");
                assert!(yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_login() {
        let cli = Cli::try_parse_from([
            "autores",
            "login",
            "--email",
            "a@b.com",
            "--password",
            "x",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Login { ref email, ref password } if email == "a@b.com" && password == "x"
        ));
    }

    #[test]
    fn test_show_requires_id() {
        assert!(Cli::try_parse_from(["autores", "authors", "show"]).is_err());
    }

    #[test]
    fn test_build_gateway_uses_settings() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.api.base_url = "http://api.example.com/api/".into();
        settings.session.path = Some(temp_dir.path().join("session.json"));

        let gateway = build_gateway(&settings).unwrap();
        assert_eq!(gateway.base_url(), "http://api.example.com/api");

        gateway.session().set("abc123").unwrap();
        assert!(temp_dir.path().join("session.json").exists());
    }

    #[test]
    fn test_build_gateway_rejects_bad_origin() {
        let mut settings = Settings::default();
        settings.api.base_url = "localhost without scheme".into();
        assert!(build_gateway(&settings).is_err());
    }
}
