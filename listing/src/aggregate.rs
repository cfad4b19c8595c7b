//! Page-number listings on top of cursor-paginated backends.
//!
//! A request goes through these steps, with nothing kept between requests:
//!
//! 1. drain every remote page for the prefix (see [`fetch_all`]),
//! 2. merge files and folders into one list of [`CombinedItem`]s,
//! 3. sort by the requested key,
//! 4. cut out the requested page and split it back into files and folders.
//!
//! A remote page that fails to load ends the listing early; whatever was fetched
//! until then is served as if it were complete.

use std::{cmp::Ordering, sync::LazyLock};

use icu_collator::{
    options::{CollatorOptions, Strength},
    Collator, CollatorBorrowed, CollatorPreferences,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{
    Direction, ListQuery, ListResponse, OrderBy, PageLister, PageRequest, QueryError,
    RemoteEntry,
};

/// One page of a merged, sorted listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectListing {
    pub objects: Vec<RemoteEntry>,
    pub common_prefixes: Vec<String>,
    pub result_info: PageInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: usize,
    pub per_page: usize,
    /// Items on this page, files and folders.
    pub count: usize,
    /// Items under the prefix across all remote pages, files and folders.
    pub total_count: usize,
}

/// Lists one numbered page of `query.bucket` under `query.prefix`.
///
/// Only an invalid query is an error. Failing remote calls shorten the listing
/// instead.
#[instrument(skip(lister), fields(bucket = %query.bucket, prefix = %query.prefix))]
pub async fn list_page<L>(
    lister: &L,
    query: &ListQuery,
) -> Result<ObjectListing, QueryError>
where
    L: PageLister + ?Sized,
{
    query.validate()?;

    let fetched = fetch_all(lister, query).await;
    let mut items = fetched.combine(&query.prefix);
    sort_items(&mut items, query.order_by, query.direction);

    let total_count = items.len();
    let start = (query.page - 1).saturating_mul(query.per_page);
    let mut objects = Vec::new();
    let mut common_prefixes = Vec::new();
    for item in items.iter().skip(start).take(query.per_page) {
        match item.source {
            Source::Folder => common_prefixes.push(item.key.to_owned()),
            Source::File(idx) => objects.push(fetched.objects[idx].clone()),
        }
    }

    Ok(ObjectListing {
        result_info: PageInfo {
            page: query.page,
            per_page: query.per_page,
            count: objects.len() + common_prefixes.len(),
            total_count,
        },
        objects,
        common_prefixes,
    })
}

/// Everything the remote listing produced for one request.
#[derive(Debug, Default)]
struct Fetched {
    objects: Vec<RemoteEntry>,
    prefixes: Vec<String>,
}

/// Follows cursors until the backend says there is nothing left.
///
/// Stops early, keeping what it has, when a call fails, when a truncated page has
/// no cursor, or when the body isn't a page at all.
async fn fetch_all<L>(lister: &L, query: &ListQuery) -> Fetched
where
    L: PageLister + ?Sized,
{
    let mut fetched = Fetched::default();
    let mut cursor: Option<String> = None;
    let mut remote_page = 0usize;

    loop {
        remote_page += 1;
        let req = PageRequest {
            bucket: &query.bucket,
            prefix: &query.prefix,
            delimiter: &query.delimiter,
            cursor: cursor.as_deref(),
        };
        let response = match lister.list(req).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    remote_page,
                    "failed to fetch remote page, serving partial listing: {err}"
                );
                break;
            }
        };

        match response {
            ListResponse::StandardPage(page) => {
                fetched.objects.extend(page.objects);
                fetched.prefixes.extend(page.delimited_prefixes);
                match (page.truncated, page.cursor) {
                    (true, Some(next)) => cursor = Some(next),
                    (true, None) => {
                        warn!(remote_page, "truncated page without a cursor");
                        break;
                    }
                    (false, _) => break,
                }
            }
            ListResponse::BareArrayFallback(entries) => {
                debug!(remote_page, "unpaginated list response, taking it as final");
                fetched.objects.extend(entries);
                break;
            }
            ListResponse::Unrecognized => {
                warn!(remote_page, "unrecognized list response, ending listing");
                break;
            }
        }
    }

    debug!(
        remote_pages = remote_page,
        objects = fetched.objects.len(),
        prefixes = fetched.prefixes.len(),
        "finished fetching"
    );
    fetched
}

/// Where a [`CombinedItem`] came from. Files point back at their original entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    File(usize),
    Folder,
}

/// Files and folders in one sortable shape.
#[derive(Debug, Clone, PartialEq)]
struct CombinedItem<'a> {
    /// The full key, or the full prefix for folders.
    key: &'a str,
    /// `key` relative to the listed prefix, without a folder's trailing slash.
    name: &'a str,
    source: Source,
    /// 0 for folders.
    size: u64,
    /// Epoch millis, 0 for folders and unknown dates.
    last_modified: i64,
}

impl Fetched {
    fn combine<'a>(&'a self, prefix: &str) -> Vec<CombinedItem<'a>> {
        let folders = self.prefixes.iter().map(|p| {
            let relative = p.strip_prefix(prefix).unwrap_or(p);
            CombinedItem {
                key: p,
                name: relative.strip_suffix('/').unwrap_or(relative),
                source: Source::Folder,
                size: 0,
                last_modified: 0,
            }
        });
        let files = self.objects.iter().enumerate().map(|(idx, obj)| CombinedItem {
            key: &obj.key,
            name: obj.key.strip_prefix(prefix).unwrap_or(&obj.key),
            source: Source::File(idx),
            size: obj.size,
            last_modified: obj.last_modified_millis(),
        });

        folders.chain(files).collect()
    }
}

/// Stable, so ties keep the order the backend returned them in.
fn sort_items(items: &mut [CombinedItem<'_>], order_by: OrderBy, direction: Direction) {
    items.sort_by(|a, b| {
        let ordering = match order_by {
            OrderBy::Name => compare_names(a.name, b.name),
            OrderBy::Size => a.size.cmp(&b.size),
            OrderBy::LastModified => a.last_modified.cmp(&b.last_modified),
        };
        direction.apply(ordering)
    });
}

/// Root-locale collation at tertiary strength, the order a browser's
/// `localeCompare` gives: accents and case only break ties, punctuation sorts
/// before digits, lowercase before uppercase.
static NAME_COLLATOR: LazyLock<CollatorBorrowed<'static>> = LazyLock::new(|| {
    let mut options = CollatorOptions::default();
    options.strength = Some(Strength::Tertiary);
    Collator::try_new(CollatorPreferences::default(), options)
        .expect("root collation data is compiled in")
});

fn compare_names(a: &str, b: &str) -> Ordering {
    NAME_COLLATOR.compare(a, b).then_with(|| b.cmp(a))
}
