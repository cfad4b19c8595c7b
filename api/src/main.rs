use clap::Parser as _;
use color_eyre::{eyre::WrapErr as _, Result};
use r2dash_api::{cfg::Cfg, program, SYSLOG_IDENTIFIER};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cfg = Cfg::parse();

    let mut telemetry =
        r2dash_telemetry::TelemetryConfig::new().with_json(cfg.log_json);
    if cfg.journald {
        telemetry = telemetry.with_journald(SYSLOG_IDENTIFIER);
    }
    let tel_flusher = telemetry.init();

    let result = run(cfg).await;

    tel_flusher.flush().await;
    result
}

async fn run(cfg: Cfg) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", cfg.port))
        .await
        .wrap_err_with(|| format!("failed to bind port {}", cfg.port))?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("ctrl-c detected, shutting down");
                signal_token.cancel();
            }
            Err(err) => warn!("failed to listen for ctrl-c: {err}"),
        }
    });

    program::run(cfg, listener, shutdown).await
}
