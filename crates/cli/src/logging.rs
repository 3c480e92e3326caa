use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the console. Logs go to stderr so command output
/// on stdout stays clean.
pub fn init_logging(level: Option<Level>, configured: &str) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(level, configured)?,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}

/// Filter from the `--log-level` flag, else the configured directive
fn build_filter(level: Option<Level>, configured: &str) -> Result<EnvFilter> {
    let filter = match level {
        Some(level) => {
            let level_str = level.as_str().to_lowercase();
            EnvFilter::try_new(format!("autores={level_str},autores_client={level_str}"))?
        }
        None => EnvFilter::try_new(configured)?,
    };
    Ok(filter)
}
