use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::{AppQuery, Caller};
use crate::features::dogs::dtos::{
    DogReportForm, DogReportInput, DogReportPayload, DogReportQueryParams, DogReportResponseDto,
};
use crate::features::dogs::services::DogReportService;
use crate::shared::types::ApiResponse;

/// List dog reports, newest first
#[utoipa::path(
    get,
    path = "/api/dogs",
    params(DogReportQueryParams),
    responses(
        (status = 200, description = "List of dog reports", body = ApiResponse<Vec<DogReportResponseDto>>),
        (status = 400, description = "Invalid filter")
    ),
    tag = "dogs"
)]
pub async fn list_dog_reports(
    State(service): State<Arc<DogReportService>>,
    AppQuery(query): AppQuery<DogReportQueryParams>,
) -> Result<Json<ApiResponse<Vec<DogReportResponseDto>>>> {
    let reports = service.list(&query).await?;
    Ok(Json(ApiResponse::list(reports)))
}

/// Report a stray dog
///
/// Accepts `application/json` or `multipart/form-data` (the latter may carry an
/// `image`). Authenticated callers become the submitter; otherwise the report is
/// anonymous. A default status is created with the report.
#[utoipa::path(
    post,
    path = "/api/dogs",
    request_body(
        content(
            (DogReportPayload = "application/json"),
            (DogReportForm = "multipart/form-data")
        ),
        description = "Report fields; latitude, longitude and condition are required"
    ),
    responses(
        (status = 201, description = "Dog report created", body = ApiResponse<DogReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid access token")
    ),
    tag = "dogs",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn create_dog_report(
    caller: Caller,
    State(service): State<Arc<DogReportService>>,
    input: DogReportInput,
) -> Result<(StatusCode, Json<ApiResponse<DogReportResponseDto>>)> {
    let report = service.create(&caller, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(report), None, None)),
    ))
}

/// Get a dog report by id
#[utoipa::path(
    get,
    path = "/api/dogs/{id}",
    params(("id" = i64, Path, description = "Dog report id")),
    responses(
        (status = 200, description = "Dog report found", body = ApiResponse<DogReportResponseDto>),
        (status = 404, description = "Dog report not found")
    ),
    tag = "dogs"
)]
pub async fn get_dog_report(
    State(service): State<Arc<DogReportService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DogReportResponseDto>>> {
    let report = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Replace a dog report
#[utoipa::path(
    put,
    path = "/api/dogs/{id}",
    params(("id" = i64, Path, description = "Dog report id")),
    request_body(
        content(
            (DogReportPayload = "application/json"),
            (DogReportForm = "multipart/form-data")
        )
    ),
    responses(
        (status = 200, description = "Dog report updated", body = ApiResponse<DogReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Report belongs to another user"),
        (status = 404, description = "Dog report not found")
    ),
    tag = "dogs",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn replace_dog_report(
    caller: Caller,
    State(service): State<Arc<DogReportService>>,
    Path(id): Path<i64>,
    input: DogReportInput,
) -> Result<Json<ApiResponse<DogReportResponseDto>>> {
    let report = service.update(&caller, id, input, true).await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Partially update a dog report
#[utoipa::path(
    patch,
    path = "/api/dogs/{id}",
    params(("id" = i64, Path, description = "Dog report id")),
    request_body(
        content(
            (DogReportPayload = "application/json"),
            (DogReportForm = "multipart/form-data")
        )
    ),
    responses(
        (status = 200, description = "Dog report updated", body = ApiResponse<DogReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Report belongs to another user"),
        (status = 404, description = "Dog report not found")
    ),
    tag = "dogs",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn update_dog_report(
    caller: Caller,
    State(service): State<Arc<DogReportService>>,
    Path(id): Path<i64>,
    input: DogReportInput,
) -> Result<Json<ApiResponse<DogReportResponseDto>>> {
    let report = service.update(&caller, id, input, false).await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Delete a dog report along with its status and comments
#[utoipa::path(
    delete,
    path = "/api/dogs/{id}",
    params(("id" = i64, Path, description = "Dog report id")),
    responses(
        (status = 204, description = "Dog report deleted"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Report belongs to another user"),
        (status = 404, description = "Dog report not found")
    ),
    tag = "dogs",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn delete_dog_report(
    caller: Caller,
    State(service): State<Arc<DogReportService>>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    service.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
