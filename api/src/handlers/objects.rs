use axum::{
    extract::{Path, Query, State},
    Json,
};
use r2dash_listing::{
    fetch_single_page, list_page, Direction, ListQuery, ObjectListing, OrderBy,
    SinglePage, DEFAULT_DELIMITER,
};
use serde::Deserialize;

use crate::{error::ApiError, program::Deps};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    prefix: Option<String>,
    delimiter: Option<String>,
    page: Option<usize>,
    per_page: Option<usize>,
    order: Option<String>,
    direction: Option<String>,
}

/// `GET /buckets/{bucket}/objects`
pub async fn list(
    State(deps): State<Deps>,
    Path(bucket): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<ObjectListing>, ApiError> {
    let query = ListQuery::builder()
        .bucket(bucket)
        .maybe_prefix(params.prefix)
        .maybe_delimiter(params.delimiter)
        .maybe_page(params.page)
        .maybe_per_page(params.per_page)
        .order_by(params.order.as_deref().map(OrderBy::from_param).unwrap_or_default())
        .direction(
            params
                .direction
                .as_deref()
                .map(Direction::from_param)
                .unwrap_or_default(),
        )
        .build();

    let listing = list_page(deps.lister.as_ref(), &query).await?;

    Ok(Json(listing))
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    prefix: Option<String>,
    delimiter: Option<String>,
    cursor: Option<String>,
}

/// `GET /buckets/{bucket}/objects/page`
pub async fn single_page(
    State(deps): State<Deps>,
    Path(bucket): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<SinglePage>, ApiError> {
    let page = fetch_single_page(
        deps.lister.as_ref(),
        &bucket,
        params.prefix.as_deref().unwrap_or_default(),
        params.delimiter.as_deref().unwrap_or(DEFAULT_DELIMITER),
        params.cursor.as_deref().filter(|c| !c.is_empty()),
    )
    .await?;

    Ok(Json(page))
}
