use tracing::{debug, info, instrument, warn};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    // `R2DASH_LOG_JSON=1 cargo run --example simple` for json lines
    let json = std::env::var_os("R2DASH_LOG_JSON").is_some();
    let telemetry = r2dash_telemetry::TelemetryConfig::new()
        .with_json(json)
        .init();

    debug!("hidden unless RUST_LOG=debug");
    info!(bucket = "media", "listing bucket");
    list_remote_page("photos/").await;
    warn!("remote page failed, serving partial listing");

    telemetry.flush().await;
    Ok(())
}

#[instrument]
async fn list_remote_page(prefix: &str) {
    info!("fetched page");
}
