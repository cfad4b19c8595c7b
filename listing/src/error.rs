/// A single remote list call failed.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("failed to send list request")]
    Transport(#[source] reqwest::Error),
    #[error("listing backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to read list response body")]
    Body(#[source] reqwest::Error),
    #[error("listing api reported failure: {0}")]
    Api(String),
    #[error("s3 list_objects_v2 failed")]
    S3(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("api base url can't have path segments appended")]
    InvalidBaseUrl,
}

/// The caller handed us something we can't list.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("bucket name must not be empty")]
    EmptyBucket,
    #[error("invalid bucket name {0:?}")]
    InvalidBucket(String),
    #[error("page must be at least 1")]
    ZeroPage,
    #[error("per_page must be at least 1")]
    ZeroPerPage,
}
