use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    query::validate_bucket, ListError, ListResponse, PageLister, PageRequest,
    RemoteEntry,
};

/// One remote page, served as-is together with its cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinglePage {
    pub objects: Vec<RemoteEntry>,
    pub common_prefixes: Vec<String>,
    pub result_info: CursorInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorInfo {
    pub count: usize,
    pub cursor: Option<String>,
    pub is_truncated: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SinglePageError {
    #[error(transparent)]
    Query(#[from] crate::QueryError),
    #[error(transparent)]
    List(#[from] ListError),
}

/// Fetches exactly one remote page, without sorting or merging.
///
/// There is nothing to fall back to here, so unlike [`crate::list_page`] a
/// failing remote call is returned as an error.
#[instrument(skip(lister))]
pub async fn fetch_single_page<L>(
    lister: &L,
    bucket: &str,
    prefix: &str,
    delimiter: &str,
    cursor: Option<&str>,
) -> Result<SinglePage, SinglePageError>
where
    L: PageLister + ?Sized,
{
    validate_bucket(bucket)?;
    let req = PageRequest {
        bucket,
        prefix,
        delimiter,
        cursor,
    };
    let (objects, common_prefixes, cursor, is_truncated) =
        match lister.list(req).await? {
            ListResponse::StandardPage(page) => {
                (page.objects, page.delimited_prefixes, page.cursor, page.truncated)
            }
            ListResponse::BareArrayFallback(objects) => {
                (objects, Vec::new(), None, false)
            }
            ListResponse::Unrecognized => (Vec::new(), Vec::new(), None, false),
        };

    Ok(SinglePage {
        result_info: CursorInfo {
            count: objects.len() + common_prefixes.len(),
            cursor,
            is_truncated,
        },
        objects,
        common_prefixes,
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::{ListPage, QueryError};

    struct OnePage(Result<ListResponse, String>);

    #[async_trait]
    impl PageLister for OnePage {
        async fn list(&self, req: PageRequest<'_>) -> Result<ListResponse, ListError> {
            assert_eq!(req.cursor, Some("c0"));
            self.0.clone().map_err(ListError::Api)
        }
    }

    #[tokio::test]
    async fn test_cursor_is_exposed() {
        let lister = OnePage(Ok(ListResponse::StandardPage(ListPage {
            objects: vec![RemoteEntry::new("z", 1), RemoteEntry::new("a", 1)],
            delimited_prefixes: vec!["dir/".to_owned()],
            truncated: true,
            cursor: Some("c1".to_owned()),
        })));

        let page = fetch_single_page(&lister, "media", "", "/", Some("c0"))
            .await
            .unwrap();
        assert_eq!(page.objects[0].key, "z", "remote order is kept");
        assert_eq!(page.common_prefixes, vec!["dir/".to_owned()]);
        assert_eq!(
            page.result_info,
            CursorInfo {
                count: 3,
                cursor: Some("c1".to_owned()),
                is_truncated: true,
            }
        );
    }

    #[tokio::test]
    async fn test_remote_failure_is_an_error() {
        let lister = OnePage(Err("boom".to_owned()));
        let err = fetch_single_page(&lister, "media", "", "/", Some("c0"))
            .await
            .unwrap_err();
        assert!(matches!(err, SinglePageError::List(ListError::Api(_))));
    }

    #[tokio::test]
    async fn test_bad_bucket_is_an_error() {
        let lister = OnePage(Err("unreachable".to_owned()));
        let err = fetch_single_page(&lister, "Bad_Bucket", "", "/", Some("c0"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SinglePageError::Query(QueryError::InvalidBucket(_))
        ));
    }
}
