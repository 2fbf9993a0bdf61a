use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::statuses::dtos::{
    CreateStatusDto, DogStatusDto, StatusQueryParams, UpdateStatusDto,
};
use crate::features::statuses::services::StatusService;
use crate::shared::types::ApiResponse;

/// List statuses
#[utoipa::path(
    get,
    path = "/api/status",
    params(StatusQueryParams),
    responses(
        (status = 200, description = "List of statuses", body = ApiResponse<Vec<DogStatusDto>>),
    ),
    tag = "status"
)]
pub async fn list_statuses(
    State(service): State<Arc<StatusService>>,
    AppQuery(query): AppQuery<StatusQueryParams>,
) -> Result<Json<ApiResponse<Vec<DogStatusDto>>>> {
    let statuses = service.list(&query).await?;
    Ok(Json(ApiResponse::list(statuses)))
}

/// Create a status for a dog report
///
/// Every report already receives a status when it is created, so this only
/// succeeds after that status has been deleted.
#[utoipa::path(
    post,
    path = "/api/status",
    request_body = CreateStatusDto,
    responses(
        (status = 201, description = "Status created", body = ApiResponse<DogStatusDto>),
        (status = 400, description = "Validation error or status already exists"),
        (status = 404, description = "Dog report not found")
    ),
    tag = "status"
)]
pub async fn create_status(
    State(service): State<Arc<StatusService>>,
    AppJson(dto): AppJson<CreateStatusDto>,
) -> Result<(StatusCode, Json<ApiResponse<DogStatusDto>>)> {
    dto.validate()?;

    let status = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(status), None, None)),
    ))
}

/// Get a status by id
#[utoipa::path(
    get,
    path = "/api/status/{id}",
    params(("id" = i64, Path, description = "Status id")),
    responses(
        (status = 200, description = "Status found", body = ApiResponse<DogStatusDto>),
        (status = 404, description = "Status not found")
    ),
    tag = "status"
)]
pub async fn get_status(
    State(service): State<Arc<StatusService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DogStatusDto>>> {
    let status = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(status), None, None)))
}

/// Replace a status
#[utoipa::path(
    put,
    path = "/api/status/{id}",
    params(("id" = i64, Path, description = "Status id")),
    request_body = UpdateStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<DogStatusDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Status not found")
    ),
    tag = "status"
)]
pub async fn replace_status(
    State(service): State<Arc<StatusService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateStatusDto>,
) -> Result<Json<ApiResponse<DogStatusDto>>> {
    let status = service.update(id, dto, true).await?;
    Ok(Json(ApiResponse::success(Some(status), None, None)))
}

/// Partially update a status
#[utoipa::path(
    patch,
    path = "/api/status/{id}",
    params(("id" = i64, Path, description = "Status id")),
    request_body = UpdateStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<DogStatusDto>),
        (status = 404, description = "Status not found")
    ),
    tag = "status"
)]
pub async fn update_status(
    State(service): State<Arc<StatusService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateStatusDto>,
) -> Result<Json<ApiResponse<DogStatusDto>>> {
    let status = service.update(id, dto, false).await?;
    Ok(Json(ApiResponse::success(Some(status), None, None)))
}

/// Delete a status
#[utoipa::path(
    delete,
    path = "/api/status/{id}",
    params(("id" = i64, Path, description = "Status id")),
    responses(
        (status = 204, description = "Status deleted"),
        (status = 404, description = "Status not found")
    ),
    tag = "status"
)]
pub async fn delete_status(
    State(service): State<Arc<StatusService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
