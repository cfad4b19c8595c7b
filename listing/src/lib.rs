//! Object listings for the dashboard's bucket browser.
//!
//! Remote object stores hand out listings one cursor-linked page at a time. This
//! crate drains such a listing through a [`PageLister`], merges files and folders,
//! sorts them and cuts out a numbered page. Start with [`list_page`].

mod aggregate;
mod cloudflare;
mod entry;
mod error;
mod lister;
mod query;
mod response;
mod s3;
mod single;

pub use crate::aggregate::{list_page, ObjectListing, PageInfo};
pub use crate::cloudflare::{CloudflarePageLister, DEFAULT_API_BASE_URL};
pub use crate::entry::RemoteEntry;
pub use crate::error::{ListError, QueryError};
pub use crate::lister::{PageLister, PageRequest};
pub use crate::query::{
    Direction, ListQuery, OrderBy, DEFAULT_DELIMITER, DEFAULT_PER_PAGE,
};
pub use crate::response::{ListPage, ListResponse};
pub use crate::s3::{r2_endpoint, S3PageLister, R2_REGION};
pub use crate::single::{
    fetch_single_page, CursorInfo, SinglePage, SinglePageError,
};

/// How many entries a backend is asked for per remote call, unless configured
/// otherwise.
pub const DEFAULT_REMOTE_PAGE_SIZE: u32 = 1000;
