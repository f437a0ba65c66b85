//! pulse: samples host resource usage and serves a health dashboard.
//!
//! Run with:  `RUST_LOG=info PORT=8080 pulse`

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("pulse v{} starting", env!("CARGO_PKG_VERSION"));

    let path = pulse_config::default_path();
    let mut config = pulse_config::load(&path)
        .with_context(|| format!("loading config from '{}'", path.display()))?;
    config.apply_env().context("reading HOST/PORT")?;
    config.validate().context("invalid configuration")?;

    pulse_server::serve(config).await?;
    Ok(())
}
