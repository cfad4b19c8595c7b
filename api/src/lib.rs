pub mod cfg;
pub mod error;
pub mod handlers;
pub mod program;

/// Identifier used when logging to journald.
pub const SYSLOG_IDENTIFIER: &str = "r2dash-api";
