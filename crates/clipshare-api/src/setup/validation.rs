//! Configuration validation
//!
//! Checks the combinations the config loader cannot see on its own.

use anyhow::Result;
use clipshare_core::Config;

/// Validate critical configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.max_file_size_bytes() == 0 {
        return Err(anyhow::anyhow!("Max file size cannot be 0"));
    }

    if config.is_production() && config.sweep_token().is_none() {
        tracing::warn!(
            "SWEEP_TOKEN not set in production - anyone who can reach the server can trigger sweeps"
        );
    }

    if config.public_base_url().is_none() {
        tracing::warn!("PUBLIC_BASE_URL not set - upload responses will carry no share link");
    }

    if config.sweep_interval().is_none() {
        tracing::info!(
            path = crate::constants::SWEEP_PATH,
            "No in-process sweep ticker; expired uploads are removed only when the sweep endpoint is called"
        );
    }

    Ok(())
}
