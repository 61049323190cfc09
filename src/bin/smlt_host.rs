//! Headless similarity bridge for stdin/stdout JSON communication.
//!
//! This binary reads `SimilarityRequest` messages as newline-delimited JSON
//! from stdin, runs each lookup against the configured search cores, and
//! writes one `SimilarityResult` per request to stdout.
//!
//! Configuration is read from `$SMLT_CONFIG`, or from
//! `~/.config/similar-content/config.toml` when unset. All tracing output
//! goes to stderr so that stdout remains a clean JSON protocol channel.

use similar_content::AppConfig;
use similar_content::host::stdio::run_stdio_bridge;
use smlt_client::SimilarityService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise tracing to stderr only (stdout is reserved for the JSON
    // protocol).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = AppConfig::config_path();
    let config = AppConfig::from_file(&path)
        .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", path.display()))?;
    config.validate()?;

    tracing::info!(
        config = %path.display(),
        connections = config.connections.len(),
        "smlt-host starting"
    );

    let service = SimilarityService::new(config.connection_table(), &config.http)?;

    run_stdio_bridge(&service).await.map_err(|e| {
        tracing::error!(error = %e, "smlt-host exited with error");
        anyhow::anyhow!("smlt-host failed: {e}")
    })?;

    tracing::info!("smlt-host shut down cleanly");
    Ok(())
}
