use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::{ListError, ListResponse, PageLister, PageRequest};

pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Lists through the Cloudflare v4 REST api
/// (`/accounts/{account}/r2/buckets/{bucket}/objects`).
#[derive(Debug, Clone)]
pub struct CloudflarePageLister {
    http: reqwest::Client,
    base_url: Url,
    account_id: String,
    api_token: String,
    per_page: u32,
}

impl CloudflarePageLister {
    pub fn new(
        http: reqwest::Client,
        base_url: Url,
        account_id: impl Into<String>,
        api_token: impl Into<String>,
        per_page: u32,
    ) -> Self {
        Self {
            http,
            base_url,
            account_id: account_id.into(),
            api_token: api_token.into(),
            per_page,
        }
    }

    fn objects_url(&self, bucket: &str) -> Result<Url, ListError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ListError::InvalidBaseUrl)?
            .pop_if_empty()
            .extend([
                "accounts",
                self.account_id.as_str(),
                "r2",
                "buckets",
                bucket,
                "objects",
            ]);

        Ok(url)
    }
}

#[async_trait]
impl PageLister for CloudflarePageLister {
    async fn list(&self, req: PageRequest<'_>) -> Result<ListResponse, ListError> {
        let url = self.objects_url(req.bucket)?;
        let mut params = vec![("per_page", self.per_page.to_string())];
        if !req.prefix.is_empty() {
            params.push(("prefix", req.prefix.to_owned()));
        }
        if !req.delimiter.is_empty() {
            params.push(("delimiter", req.delimiter.to_owned()));
        }
        if let Some(cursor) = req.cursor {
            params.push(("cursor", cursor.to_owned()));
        }

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.api_token)
            .query(&params)
            .send()
            .await
            .map_err(ListError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ListError::Status { status, body });
        }
        let body: serde_json::Value = response.json().await.map_err(ListError::Body)?;
        debug!(bucket = req.bucket, %status, "listed cloudflare page");

        ListResponse::decode(body)
    }
}
