use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use tracing::debug;

use crate::core::error::AppError;
use crate::core::extractor::AppJson;
use crate::features::dogs::dtos::{DogReportPayload, ImageUpload};

/// Body of a report create or update: JSON, or multipart form data carrying an optional photo
#[derive(Debug)]
pub struct DogReportInput {
    pub payload: DogReportPayload,
    pub image: Option<ImageUpload>,
}

impl<S> FromRequest<S> for DogReportInput
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid multipart request: {}", e)))?;
            return Self::from_multipart(multipart).await;
        }

        let AppJson(payload) = AppJson::<DogReportPayload>::from_request(req, state).await?;
        Ok(Self {
            payload,
            image: None,
        })
    }
}

impl DogReportInput {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut payload = DogReportPayload::default();
        let mut image = None;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            debug!("Failed to read multipart field: {}", e);
            AppError::BadRequest(format!("Failed to read multipart data: {}", e))
        })? {
            let field_name = field.name().unwrap_or("").to_string();

            match field_name.as_str() {
                "image" => {
                    let content_type = field
                        .content_type()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "application/octet-stream".to_string());
                    let has_file_name = field.file_name().is_some_and(|n| !n.is_empty());

                    let data = field.bytes().await.map_err(|e| {
                        debug!("Failed to read image bytes: {}", e);
                        AppError::BadRequest(format!("Failed to read image data: {}", e))
                    })?;

                    // Browsers send an empty part when no file was chosen
                    if data.is_empty() && !has_file_name {
                        continue;
                    }

                    image = Some(ImageUpload::new(data.to_vec(), &content_type)?);
                }
                "latitude" | "longitude" | "condition" | "location" => {
                    let text = field.text().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read {} field: {}", field_name, e))
                    })?;
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }

                    match field_name.as_str() {
                        "latitude" => payload.latitude = Some(parse_coordinate("latitude", text)?),
                        "longitude" => {
                            payload.longitude = Some(parse_coordinate("longitude", text)?)
                        }
                        "condition" => payload.condition = Some(text.to_string()),
                        _ => payload.location = Some(text.to_string()),
                    }
                }
                _ => {
                    // Ignore unknown fields, including any client-supplied `user`
                    debug!("Ignoring unknown field: {}", field_name);
                }
            }
        }

        Ok(Self { payload, image })
    }
}

fn parse_coordinate(field: &str, text: &str) -> Result<f64, AppError> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::invalid_field(field, "A valid number is required."))
}
