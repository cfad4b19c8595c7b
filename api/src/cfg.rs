use clap::{
    builder::{styling::AnsiColor, Styles},
    Parser, ValueEnum,
};
use r2dash_listing::{DEFAULT_API_BASE_URL, DEFAULT_REMOTE_PAGE_SIZE};

/// Which api the object listings come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// S3-compatible `ListObjectsV2` (R2's S3 endpoint, MinIO, ...).
    S3,
    /// Cloudflare v4 REST api.
    Cloudflare,
}

#[derive(Debug, Clone, Parser)]
#[clap(version, about, styles = clap_v3_styles())]
pub struct Cfg {
    /// Port to listen on.
    #[clap(long, env = "R2DASH_PORT", default_value_t = 8080)]
    pub port: u16,
    /// Where object listings come from.
    #[clap(long, env = "R2DASH_BACKEND", value_enum, default_value_t = Backend::S3)]
    pub backend: Backend,
    /// Cloudflare account id owning the buckets.
    #[clap(long, env = "CLOUDFLARE_ACCOUNT_ID")]
    pub account_id: Option<String>,
    /// S3 endpoint. Defaults to the account's R2 endpoint.
    #[clap(long, env = "R2DASH_S3_ENDPOINT")]
    pub endpoint_url: Option<String>,
    /// S3 access key id. Without it the default aws credential chain is used.
    #[clap(long, env = "R2_ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,
    /// S3 secret access key.
    #[clap(long, env = "R2_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: Option<String>,
    /// Cloudflare api token with R2 read access.
    #[clap(long, env = "CLOUDFLARE_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,
    /// Cloudflare api base url.
    #[clap(long, env = "CLOUDFLARE_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,
    /// How many entries to ask the backend for per remote call.
    #[clap(
        long,
        env = "R2DASH_REMOTE_PAGE_SIZE",
        default_value_t = DEFAULT_REMOTE_PAGE_SIZE
    )]
    pub remote_page_size: u32,
    /// Timeout for calls to the Cloudflare api, in seconds.
    #[clap(long, env = "R2DASH_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
    /// Log to journald when not attached to a tty.
    #[clap(long, env = "R2DASH_JOURNALD")]
    pub journald: bool,
    /// Log json lines to stderr.
    #[clap(long, env = "R2DASH_LOG_JSON")]
    pub log_json: bool,
}

fn clap_v3_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default())
        .usage(AnsiColor::Green.on_default())
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Cfg::try_parse_from(["r2dash-api"]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.backend, Backend::S3);
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.remote_page_size, 1000);
        assert!(!cfg.journald);
    }

    #[test]
    fn test_cloudflare_backend() {
        let cfg = Cfg::try_parse_from([
            "r2dash-api",
            "--backend",
            "cloudflare",
            "--account-id",
            "abc",
            "--api-token",
            "t0k3n",
            "--port",
            "9000",
        ])
        .unwrap();
        assert_eq!(cfg.backend, Backend::Cloudflare);
        assert_eq!(cfg.account_id.as_deref(), Some("abc"));
        assert_eq!(cfg.api_token.as_deref(), Some("t0k3n"));
        assert_eq!(cfg.port, 9000);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(Cfg::try_parse_from(["r2dash-api", "--backend", "ftp"]).is_err());
    }
}
