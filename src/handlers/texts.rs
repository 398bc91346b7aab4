// src/handlers/texts.rs

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::{AppError, ErrorBody},
    models::text::{CreateTextRequest, NewText, TextListParams, TextQueryParams, TextResponse},
    services::TextService,
};

/// Create a new text, optionally as a reply.
#[utoipa::path(
    post,
    path = "/texts",
    tag = "texts",
    request_body = CreateTextRequest,
    responses(
        (status = 201, description = "Text created", body = TextResponse),
        (status = 400, description = "Invalid body or unknown parent_id", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn create_text(
    State(service): State<TextService>,
    payload: Result<Json<CreateTextRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    let Json(payload) = payload?;
    let new_text = NewText::try_from(payload)?;

    // 2. Insert
    let text = service.create_text(new_text).await?;

    Ok((StatusCode::CREATED, Json(TextResponse::from(text))))
}

/// List texts, oldest first.
/// `offset` is a page number, so a page covers rows `[limit * offset, limit * (offset + 1))`.
#[utoipa::path(
    get,
    path = "/texts",
    tag = "texts",
    params(TextListParams),
    responses(
        (status = 200, description = "One page of texts", body = [TextResponse]),
        (status = 400, description = "Invalid parameters or end of texts", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn list_texts(
    State(service): State<TextService>,
    params: Result<Query<TextListParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;
    params.validate()?;

    let nodes = service
        .list_texts(
            params.parent_id,
            params.limit,
            params.offset,
            params.include_comments,
        )
        .await?;

    let texts: Vec<TextResponse> = nodes.into_iter().map(TextResponse::from).collect();
    Ok(Json(texts))
}

/// Get a single text by ID.
#[utoipa::path(
    get,
    path = "/texts/{id}",
    tag = "texts",
    params(
        ("id" = i64, Path, description = "Text id"),
        TextQueryParams
    ),
    responses(
        (status = 200, description = "The text", body = TextResponse),
        (status = 400, description = "Text not found", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn get_text(
    State(service): State<TextService>,
    id: Result<Path<i64>, PathRejection>,
    params: Result<Query<TextQueryParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let Query(params) = params?;

    let node = service.get_text(id, params.include_comments).await?;

    Ok(Json(TextResponse::from(node)))
}
