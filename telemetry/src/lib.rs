//! Standardized logging for r2dash binaries.
//!
//! Start with [`TelemetryConfig::new()`], see the `examples` dir.

use std::io::{IsTerminal as _, Write as _};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter,
};

/// The toplevel config for r2dash-telemetry.
#[derive(Debug)]
pub struct TelemetryConfig {
    syslog_identifier: Option<String>,
    global_filter: EnvFilter,
    json: bool,
}

impl TelemetryConfig {
    /// Logs at `INFO` unless `RUST_LOG` says otherwise.
    #[expect(clippy::new_without_default, reason = "may add required args later")]
    #[must_use]
    pub fn new() -> Self {
        Self {
            syslog_identifier: None,
            global_filter: EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
            json: false,
        }
    }

    /// Logs to journald under `syslog_identifier`.
    ///
    /// Ignored when running in a tty, stderr is used instead.
    #[must_use]
    pub fn with_journald(self, syslog_identifier: &str) -> Self {
        Self {
            syslog_identifier: Some(syslog_identifier.to_owned()),
            ..self
        }
    }

    /// Replaces the `RUST_LOG`-derived filter.
    #[must_use]
    pub fn with_global_filter(self, filter: EnvFilter) -> Self {
        Self {
            global_filter: filter,
            ..self
        }
    }

    /// Writes one json object per line to stderr instead of human readable text.
    #[must_use]
    pub fn with_json(self, json: bool) -> Self {
        Self { json, ..self }
    }

    pub fn try_init(
        self,
    ) -> Result<TelemetryFlusher, tracing_subscriber::util::TryInitError> {
        // no tty usually means systemd
        let journald_layer = if std::io::stderr().is_terminal() {
            None
        } else {
            self.syslog_identifier.and_then(|syslog_identifier| {
                tracing_journald::layer()
                    .inspect_err(|err| {
                        eprintln!(
                            "failed connecting to journald socket. \
                            will write to stderr: {err}"
                        );
                    })
                    .map(|layer| layer.with_syslog_identifier(syslog_identifier))
                    .ok()
            })
        };
        let use_stderr = journald_layer.is_none();
        let text_layer = (use_stderr && !self.json)
            .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
        let json_layer = (use_stderr && self.json).then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(std::io::stderr)
        });

        tracing_subscriber::registry()
            .with(journald_layer)
            .with(text_layer)
            .with(json_layer)
            .with(self.global_filter)
            .try_init()?;

        Ok(TelemetryFlusher { _priv: () })
    }

    /// Call this once, at the start of the program.
    ///
    /// Panics if a global subscriber is already registered.
    pub fn init(self) -> TelemetryFlusher {
        self.try_init().expect("failed to initialize r2dash-telemetry")
    }
}

/// Proof that logging was initialized, and the place to end it.
///
/// The stderr layers write through `std::io::stderr()` and the process may exit
/// right after the last event, e.g. from a shutdown signal. Flushing the std
/// handles here makes sure the final lines, like the shutdown reason, reach the
/// terminal or the journal's stdout capture. Journald events are sent one
/// datagram each and need no flushing.
#[must_use = "call .flush at the end of the program, otherwise logs may get lost"]
pub struct TelemetryFlusher {
    _priv: (),
}

impl TelemetryFlusher {
    /// Call this at the end of the program.
    pub async fn flush(self) {
        self.flush_blocking();
    }

    /// Call this at the end of the program.
    pub fn flush_blocking(self) {
        // tracing can't report this, stderr is where it would go
        std::io::stderr().flush().ok();
        std::io::stdout().flush().ok();
    }
}
