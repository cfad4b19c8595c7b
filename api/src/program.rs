use std::{sync::Arc, time::Duration};

use aws_config::{
    meta::credentials::CredentialsProviderChain, retry::RetryConfig, BehaviorVersion,
    Region,
};
use aws_sdk_s3::config::{Credentials, ProvideCredentials as _};
use axum::{routing::get, Router};
use color_eyre::{
    eyre::{bail, OptionExt as _, WrapErr as _},
    Result, Section as _,
};
use r2dash_listing::{
    r2_endpoint, CloudflarePageLister, PageLister, S3PageLister, R2_REGION,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    cfg::{Backend, Cfg},
    handlers::{health, objects},
};

const S3_RETRY_ATTEMPTS: u32 = 5;

pub async fn run(
    cfg: Cfg,
    listener: TcpListener,
    shutdown: CancellationToken,
) -> Result<()> {
    let deps = Deps::new(&cfg).await?;
    let app = router(deps);

    info!(
        "listening on {}",
        listener.local_addr().wrap_err("listener has no address")?
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .wrap_err("http server failed")
}

pub fn router(deps: Deps) -> Router {
    Router::new()
        .route("/health", get(health::handler))
        .route("/buckets/{bucket}/objects", get(objects::list))
        .route("/buckets/{bucket}/objects/page", get(objects::single_page))
        .layer(TraceLayer::new_for_http())
        .with_state(deps)
}

#[derive(Clone)]
pub struct Deps {
    pub lister: Arc<dyn PageLister>,
}

impl Deps {
    pub fn from_lister(lister: impl PageLister + 'static) -> Self {
        Self {
            lister: Arc::new(lister),
        }
    }

    /// Builds the configured backend. Missing credentials fail here, not on the
    /// first request.
    pub async fn new(cfg: &Cfg) -> Result<Self> {
        let deps = match cfg.backend {
            Backend::S3 => Self::from_lister(S3PageLister::new(
                s3_client(cfg).await?,
                cfg.remote_page_size,
            )),
            Backend::Cloudflare => Self::from_lister(cloudflare_lister(cfg)?),
        };
        info!(backend = ?cfg.backend, "listing backend ready");

        Ok(deps)
    }
}

async fn s3_client(cfg: &Cfg) -> Result<aws_sdk_s3::Client> {
    let endpoint_url = cfg
        .endpoint_url
        .clone()
        .or_else(|| cfg.account_id.as_deref().map(r2_endpoint))
        .ok_or_eyre("no s3 endpoint configured")
        .with_suggestion(|| "set CLOUDFLARE_ACCOUNT_ID or R2DASH_S3_ENDPOINT")?;
    info!("using s3 endpoint: {endpoint_url}");

    let loader = aws_config::defaults(BehaviorVersion::v2025_08_07())
        .region(Region::new(R2_REGION))
        .endpoint_url(endpoint_url)
        .retry_config(RetryConfig::standard().with_max_attempts(S3_RETRY_ATTEMPTS));
    let loader = match (&cfg.access_key_id, &cfg.secret_access_key) {
        (Some(id), Some(secret)) => loader.credentials_provider(Credentials::new(
            id, secret, None, None, "r2dash",
        )),
        (None, None) => {
            let chain = CredentialsProviderChain::default_provider().await;
            chain
                .provide_credentials()
                .await
                .wrap_err("failed to get s3 credentials")
                .with_suggestion(|| {
                    "set R2_ACCESS_KEY_ID and R2_SECRET_ACCESS_KEY, or configure \
                    the default aws credential chain"
                })?;
            loader.credentials_provider(chain)
        }
        _ => bail!("R2_ACCESS_KEY_ID and R2_SECRET_ACCESS_KEY must be set together"),
    };
    let sdk_config = loader.load().await;
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(true)
        .build();

    Ok(aws_sdk_s3::Client::from_conf(s3_config))
}

fn cloudflare_lister(cfg: &Cfg) -> Result<CloudflarePageLister> {
    let account_id = cfg
        .account_id
        .as_deref()
        .ok_or_eyre("the cloudflare backend needs an account id")
        .with_suggestion(|| "set CLOUDFLARE_ACCOUNT_ID")?;
    let api_token = cfg
        .api_token
        .as_deref()
        .ok_or_eyre("the cloudflare backend needs an api token")
        .with_suggestion(|| "set CLOUDFLARE_API_TOKEN")?;
    let base_url = cfg
        .api_base_url
        .parse::<reqwest::Url>()
        .wrap_err_with(|| format!("invalid api base url {:?}", cfg.api_base_url))?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        .user_agent("r2dash-api")
        .build()
        .wrap_err("failed to build reqwest client")?;

    Ok(CloudflarePageLister::new(
        http,
        base_url,
        account_id,
        api_token,
        cfg.remote_page_size,
    ))
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use super::*;

    #[tokio::test]
    async fn test_cloudflare_needs_credentials() {
        let cfg =
            Cfg::try_parse_from(["r2dash-api", "--backend", "cloudflare"]).unwrap();
        let err = Deps::new(&cfg).await.err().expect("no account id");
        assert!(err.to_string().contains("account id"), "{err}");

        let cfg = Cfg::try_parse_from([
            "r2dash-api",
            "--backend",
            "cloudflare",
            "--account-id",
            "acc",
        ])
        .unwrap();
        let err = Deps::new(&cfg).await.err().expect("no api token");
        assert!(err.to_string().contains("api token"), "{err}");
    }

    #[tokio::test]
    async fn test_cloudflare_backend_builds() {
        let cfg = Cfg::try_parse_from([
            "r2dash-api",
            "--backend",
            "cloudflare",
            "--account-id",
            "acc",
            "--api-token",
            "token",
        ])
        .unwrap();
        assert!(Deps::new(&cfg).await.is_ok());
    }

    #[tokio::test]
    async fn test_s3_needs_an_endpoint() {
        let cfg = Cfg::try_parse_from(["r2dash-api"]).unwrap();
        let err = Deps::new(&cfg).await.err().expect("no endpoint");
        assert!(err.to_string().contains("endpoint"), "{err}");
    }

    #[tokio::test]
    async fn test_s3_half_credentials_are_rejected() {
        let cfg = Cfg::try_parse_from([
            "r2dash-api",
            "--account-id",
            "acc",
            "--access-key-id",
            "key",
        ])
        .unwrap();
        let err = Deps::new(&cfg).await.err().expect("secret missing");
        assert!(err.to_string().contains("together"), "{err}");
    }

    #[tokio::test]
    async fn test_s3_static_credentials_build() {
        let cfg = Cfg::try_parse_from([
            "r2dash-api",
            "--endpoint-url",
            "http://127.0.0.1:9000",
            "--access-key-id",
            "minioadmin",
            "--secret-access-key",
            "minioadmin",
        ])
        .unwrap();
        assert!(Deps::new(&cfg).await.is_ok());
    }
}
