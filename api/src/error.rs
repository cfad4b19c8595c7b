use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use r2dash_listing::{QueryError, SinglePageError};
use serde_json::json;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    BadQuery(#[from] QueryError),
    #[error("listing backend failed: {0}")]
    Upstream(String),
}

impl From<SinglePageError> for ApiError {
    fn from(err: SinglePageError) -> Self {
        match err {
            SinglePageError::Query(err) => Self::BadQuery(err),
            SinglePageError::List(err) => Self::Upstream(error_chain(&err)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::BadQuery(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => {
                warn!("{self}");
                StatusCode::BAD_GATEWAY
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// `err` and all of its sources, `: ` separated.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(err) = source {
        msg.push_str(": ");
        msg.push_str(&err.to_string());
        source = err.source();
    }

    msg
}
