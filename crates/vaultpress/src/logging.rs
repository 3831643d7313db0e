//! Subscriber setup for applications embedding the pipeline.
//!
//! Library crates only emit through the `log` facade; installing a
//! subscriber here also bridges those records into `tracing`.

use tracing_subscriber::EnvFilter;
use vaultpress_core::{Error, Result};

/// Install a global subscriber at `level`.
///
/// `RUST_LOG` overrides `level` when set. `json` switches to one JSON
/// object per line. Fails when a subscriber is already installed or the
/// level does not parse.
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| Error::config_error(format!("invalid log level '{}': {}", level, e)))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| Error::config_error(format!("failed to install logger: {}", e)))?;

    tracing::debug!(log_level = level, json, "logging initialised");
    Ok(())
}

/// [`init_logging`] with the level from a site config
pub fn init_from_config(config: &vaultpress_core::SiteConfig) -> Result<()> {
    init_logging(&config.log_level, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        // RUST_LOG takes precedence over the level argument
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = init_logging("vaultpress=loud", false).unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }
}
