use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery, Caller};
use crate::features::comments::dtos::{
    CommentQueryParams, CommentResponseDto, CreateCommentDto, UpdateCommentDto,
};
use crate::features::comments::services::CommentService;
use crate::shared::types::ApiResponse;

/// List comments, newest first
#[utoipa::path(
    get,
    path = "/api/comments",
    params(CommentQueryParams),
    responses(
        (status = 200, description = "List of comments", body = ApiResponse<Vec<CommentResponseDto>>),
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(service): State<Arc<CommentService>>,
    AppQuery(query): AppQuery<CommentQueryParams>,
) -> Result<Json<ApiResponse<Vec<CommentResponseDto>>>> {
    let comments = service.list(&query).await?;
    Ok(Json(ApiResponse::list(comments)))
}

/// Comment on a dog report
///
/// Authenticated callers are recorded as the author; otherwise the comment is anonymous.
#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid access token"),
        (status = 404, description = "Dog report not found")
    ),
    tag = "comments",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn create_comment(
    caller: Caller,
    State(service): State<Arc<CommentService>>,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponseDto>>)> {
    dto.validate()?;

    let comment = service.create(&caller, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(comment), None, None)),
    ))
}

/// Get a comment by id
#[utoipa::path(
    get,
    path = "/api/comments/{id}",
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment found", body = ApiResponse<CommentResponseDto>),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments"
)]
pub async fn get_comment(
    State(service): State<Arc<CommentService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CommentResponseDto>>> {
    let comment = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(comment), None, None)))
}

/// Replace a comment's text
#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    params(("id" = i64, Path, description = "Comment id")),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Comment updated", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Comment belongs to another user"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn replace_comment(
    caller: Caller,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateCommentDto>,
) -> Result<Json<ApiResponse<CommentResponseDto>>> {
    let comment = service.update(&caller, id, dto, true).await?;
    Ok(Json(ApiResponse::success(Some(comment), None, None)))
}

/// Update a comment's text
#[utoipa::path(
    patch,
    path = "/api/comments/{id}",
    params(("id" = i64, Path, description = "Comment id")),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Comment updated", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Comment belongs to another user"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn update_comment(
    caller: Caller,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateCommentDto>,
) -> Result<Json<ApiResponse<CommentResponseDto>>> {
    dto.validate()?;

    let comment = service.update(&caller, id, dto, false).await?;
    Ok(Json(ApiResponse::success(Some(comment), None, None)))
}

/// Delete a comment
#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Comment belongs to another user"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn delete_comment(
    caller: Caller,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    service.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
