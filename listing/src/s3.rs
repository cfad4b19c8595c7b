use async_trait::async_trait;
use aws_sdk_s3::{
    operation::list_objects_v2::ListObjectsV2Output,
    primitives::DateTimeFormat,
    types::Object,
    Client,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{ListError, ListPage, ListResponse, PageLister, PageRequest, RemoteEntry};

/// R2 ignores the region, but the sdk insists on one.
pub const R2_REGION: &str = "auto";

/// The S3-compatible endpoint of an R2 account.
pub fn r2_endpoint(account_id: &str) -> String {
    format!("https://{account_id}.r2.cloudflarestorage.com")
}

/// Lists through the S3 `ListObjectsV2` api. Works for R2, MinIO, S3 itself...
#[derive(Debug, Clone)]
pub struct S3PageLister {
    client: Client,
    max_keys: i32,
}

impl S3PageLister {
    pub fn new(client: Client, max_keys: u32) -> Self {
        Self {
            client,
            max_keys: i32::try_from(max_keys).unwrap_or(i32::MAX),
        }
    }
}

#[async_trait]
impl PageLister for S3PageLister {
    async fn list(&self, req: PageRequest<'_>) -> Result<ListResponse, ListError> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(req.bucket)
            .max_keys(self.max_keys);
        if !req.prefix.is_empty() {
            request = request.prefix(req.prefix);
        }
        if !req.delimiter.is_empty() {
            request = request.delimiter(req.delimiter);
        }
        if let Some(cursor) = req.cursor {
            request = request.continuation_token(cursor);
        }

        let output = request
            .send()
            .await
            .map_err(|err| ListError::S3(Box::new(err)))?;
        debug!(
            bucket = req.bucket,
            key_count = ?output.key_count(),
            "listed s3 page"
        );

        Ok(ListResponse::StandardPage(page_from_output(&output)))
    }
}

fn page_from_output(output: &ListObjectsV2Output) -> ListPage {
    ListPage {
        objects: output.contents().iter().filter_map(entry_from_object).collect(),
        delimited_prefixes: output
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(ToOwned::to_owned))
            .collect(),
        truncated: output.is_truncated().unwrap_or(false),
        cursor: output.next_continuation_token().map(ToOwned::to_owned),
    }
}

/// Objects without a key can't be addressed and are dropped.
fn entry_from_object(obj: &Object) -> Option<RemoteEntry> {
    let key = obj.key()?;
    let mut extra = Map::new();
    if let Some(etag) = obj.e_tag() {
        extra.insert("etag".to_owned(), Value::from(etag));
    }
    if let Some(class) = obj.storage_class() {
        extra.insert("storage_class".to_owned(), Value::from(class.as_str()));
    }
    if let Some(modified) = obj
        .last_modified()
        .and_then(|dt| dt.fmt(DateTimeFormat::DateTime).ok())
    {
        extra.insert("last_modified".to_owned(), Value::from(modified));
    }

    Some(RemoteEntry {
        key: key.to_owned(),
        size: obj.size().map_or(0, |s| u64::try_from(s).unwrap_or(0)),
        extra,
    })
}
