use std::sync::Arc;

use async_trait::async_trait;

use crate::{ListError, ListResponse};

/// Arguments for one remote list call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<'a> {
    pub bucket: &'a str,
    pub prefix: &'a str,
    /// Empty means no delimiter, i.e. a flat listing.
    pub delimiter: &'a str,
    /// `None` on the first call.
    pub cursor: Option<&'a str>,
}

/// Something that can fetch one page of a cursor-paginated object listing.
#[async_trait]
pub trait PageLister: Send + Sync {
    /// Fetches the page that `req.cursor` points at.
    async fn list(&self, req: PageRequest<'_>) -> Result<ListResponse, ListError>;
}

#[async_trait]
impl<T: PageLister + ?Sized> PageLister for Arc<T> {
    async fn list(&self, req: PageRequest<'_>) -> Result<ListResponse, ListError> {
        (**self).list(req).await
    }
}
