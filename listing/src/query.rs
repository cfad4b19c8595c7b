use std::cmp::Ordering;

use crate::QueryError;

pub const DEFAULT_DELIMITER: &str = "/";
pub const DEFAULT_PER_PAGE: usize = 10;

/// Sort key for a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderBy {
    #[default]
    Name,
    Size,
    LastModified,
}

impl OrderBy {
    /// Parses a query parameter. Unknown keys sort by name.
    pub fn from_param(s: &str) -> Self {
        match s {
            "size" => Self::Size,
            "lastModified" | "last_modified" => Self::LastModified,
            _ => Self::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Parses a query parameter. Anything but `desc` is ascending.
    pub fn from_param(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub(crate) fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Everything [`crate::list_page`] needs to know about a request.
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
#[builder(on(String, into))]
pub struct ListQuery {
    pub bucket: String,
    #[builder(default)]
    pub prefix: String,
    #[builder(default = DEFAULT_DELIMITER.to_owned())]
    pub delimiter: String,
    /// 1-based.
    #[builder(default = 1)]
    pub page: usize,
    #[builder(default = DEFAULT_PER_PAGE)]
    pub per_page: usize,
    #[builder(default)]
    pub order_by: OrderBy,
    #[builder(default)]
    pub direction: Direction,
}

impl ListQuery {
    pub fn validate(&self) -> Result<(), QueryError> {
        validate_bucket(&self.bucket)?;
        if self.page == 0 {
            return Err(QueryError::ZeroPage);
        }
        if self.per_page == 0 {
            return Err(QueryError::ZeroPerPage);
        }

        Ok(())
    }
}

/// R2 bucket names: 3-63 chars of lowercase ascii, digits and `-`, not starting or
/// ending with `-`.
pub(crate) fn validate_bucket(bucket: &str) -> Result<(), QueryError> {
    if bucket.is_empty() {
        return Err(QueryError::EmptyBucket);
    }
    let valid_chars = bucket
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if !valid_chars
        || !(3..=63).contains(&bucket.len())
        || bucket.starts_with('-')
        || bucket.ends_with('-')
    {
        return Err(QueryError::InvalidBucket(bucket.to_owned()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let query = ListQuery::builder().bucket("media").build();
        assert_eq!(
            query,
            ListQuery {
                bucket: "media".to_owned(),
                prefix: String::new(),
                delimiter: "/".to_owned(),
                page: 1,
                per_page: 10,
                order_by: OrderBy::Name,
                direction: Direction::Asc,
            }
        );
        assert_eq!(query.validate(), Ok(()));
    }

    #[test]
    fn test_order_by_param() {
        assert_eq!(OrderBy::from_param("name"), OrderBy::Name);
        assert_eq!(OrderBy::from_param("size"), OrderBy::Size);
        assert_eq!(OrderBy::from_param("lastModified"), OrderBy::LastModified);
        assert_eq!(OrderBy::from_param("last_modified"), OrderBy::LastModified);
        assert_eq!(OrderBy::from_param("colour"), OrderBy::Name);
        assert_eq!(OrderBy::from_param(""), OrderBy::Name);
    }

    #[test]
    fn test_direction_param() {
        assert_eq!(Direction::from_param("asc"), Direction::Asc);
        assert_eq!(Direction::from_param("DESC"), Direction::Desc);
        assert_eq!(Direction::from_param("sideways"), Direction::Asc);
    }

    #[test]
    fn test_bucket_names() {
        let longest = "a".repeat(63);
        for ok in ["abc", "my-bucket", "bucket-2024", longest.as_str()] {
            assert_eq!(validate_bucket(ok), Ok(()), "{ok}");
        }
        assert_eq!(validate_bucket(""), Err(QueryError::EmptyBucket));
        let too_long = "a".repeat(64);
        let bad_names = [
            "ab",
            "-abc",
            "abc-",
            "My-Bucket",
            "a_b_c",
            "a/b/c",
            too_long.as_str(),
        ];
        for bad in bad_names {
            assert_eq!(
                validate_bucket(bad),
                Err(QueryError::InvalidBucket(bad.to_owned())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_zero_paging_is_rejected() {
        let query = ListQuery::builder().bucket("media").page(0).build();
        assert_eq!(query.validate(), Err(QueryError::ZeroPage));
        let query = ListQuery::builder().bucket("media").per_page(0).build();
        assert_eq!(query.validate(), Err(QueryError::ZeroPerPage));
    }
}
