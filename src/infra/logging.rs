//! Structured logging setup.

use crate::infra::config::Env;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber for the given environment.
///
/// `local` logs human-readable output at debug level, `dev` logs JSON at
/// debug level and `prod` logs JSON at info level. `RUST_LOG`, when set,
/// replaces the default filter.
pub fn init_logging(env: Env) -> anyhow::Result<()> {
    let default_filter = match env {
        Env::Local | Env::Dev => "debug,sqlx=info,hyper=info,reqwest=info",
        Env::Prod => "info",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    match env {
        Env::Local => subscriber
            .pretty()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize pretty logger: {}", e))?,
        Env::Dev | Env::Prod => subscriber
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize JSON logger: {}", e))?,
    }

    tracing::debug!(env = ?env, "logging initialized");
    Ok(())
}
