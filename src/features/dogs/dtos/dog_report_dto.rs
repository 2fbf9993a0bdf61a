use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::core::error::{AppError, Result};
use crate::features::dogs::models::{DogCondition, DogReport};
use crate::features::statuses::dtos::DogStatusDto;
use crate::features::statuses::models::DogStatus;
use crate::modules::storage::ObjectStorage;
use crate::shared::constants::{
    ALLOWED_IMAGE_TYPES, DOG_REPORT_IMAGE_DIR, MAX_IMAGE_SIZE, MAX_LOCATION_LENGTH,
};

const REQUIRED: &str = "This field is required.";

/// Report fields sent as JSON or as multipart form fields.
///
/// Every field is optional here so the same payload serves create, PUT and
/// PATCH; [`DogReportPayload::validate_full`] enforces the required ones.
/// A `user` key in the body is ignored: the submitter always comes from the token.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct DogReportPayload {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90."))]
    #[schema(example = -8.65)]
    pub latitude: Option<f64>,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180."
    ))]
    #[schema(example = 115.22)]
    pub longitude: Option<f64>,

    /// One of `Healthy`, `Injured`, `Lost`
    #[validate(custom(function = "validate_condition"))]
    #[schema(example = "Injured")]
    pub condition: Option<String>,

    /// Place name; reverse geocoded from the coordinates when omitted
    #[validate(length(max = MAX_LOCATION_LENGTH, message = "Ensure this field has no more than 255 characters."))]
    pub location: Option<String>,
}

fn validate_condition(value: &str) -> std::result::Result<(), ValidationError> {
    value.parse::<DogCondition>().map(|_| ()).map_err(|message| {
        let mut error = ValidationError::new("invalid_choice");
        error.message = Some(message.into());
        error
    })
}

impl DogReportPayload {
    /// Validation for create and PUT: coordinates and condition must be present
    pub fn validate_full(&self) -> Result<()> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => match AppError::from(e) {
                AppError::Validation(messages) => messages,
                other => return Err(other),
            },
        };

        for (field, missing) in [
            ("latitude", self.latitude.is_none()),
            ("longitude", self.longitude.is_none()),
            ("condition", self.condition.is_none()),
        ] {
            if missing {
                errors.push(format!("{}: {}", field, REQUIRED));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            errors.sort();
            Err(AppError::Validation(errors))
        }
    }

    /// Validation for PATCH: only the fields present are checked
    pub fn validate_partial(&self) -> Result<()> {
        self.validate()?;
        Ok(())
    }

    /// Parsed condition; call after validation
    pub fn parsed_condition(&self) -> Result<Option<DogCondition>> {
        self.condition
            .as_deref()
            .map(|c| c.parse::<DogCondition>())
            .transpose()
            .map_err(|e| AppError::invalid_field("condition", e))
    }
}

/// A validated report photo
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub content_type: String,
}

impl ImageUpload {
    pub fn new(data: Vec<u8>, content_type: &str) -> Result<Self> {
        if data.len() > MAX_IMAGE_SIZE {
            return Err(AppError::invalid_field(
                "image",
                format!(
                    "File too large. Maximum size is {} MB.",
                    MAX_IMAGE_SIZE / 1024 / 1024
                ),
            ));
        }

        if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
            return Err(AppError::invalid_field(
                "image",
                format!(
                    "File type '{}' is not allowed. Allowed types: {}",
                    content_type,
                    ALLOWED_IMAGE_TYPES.join(", ")
                ),
            ));
        }

        Ok(Self {
            data,
            content_type: content_type.to_string(),
        })
    }

    /// Fresh storage key `dog_reports/<uuid4-hex>.<ext>`
    pub fn storage_key(&self) -> String {
        format!(
            "{}/{}.{}",
            DOG_REPORT_IMAGE_DIR,
            Uuid::new_v4().simple(),
            get_extension_from_content_type(&self.content_type).unwrap_or("bin")
        )
    }
}

/// Get file extension from content type
pub fn get_extension_from_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Multipart form for creating or updating a report.
/// Note: This struct is for Swagger UI documentation only.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct DogReportForm {
    #[schema(example = -8.65)]
    pub latitude: Option<f64>,
    #[schema(example = 115.22)]
    pub longitude: Option<f64>,
    #[schema(example = "Injured")]
    pub condition: Option<String>,
    pub location: Option<String>,
    /// Photo of the dog (jpeg, png, gif or webp, at most 10 MB)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: Option<String>,
}

/// Query params for listing reports. All filters are combined with AND.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct DogReportQueryParams {
    /// Only reports with this condition
    pub condition: Option<DogCondition>,
    /// Only reports submitted by this user id
    pub user: Option<i64>,
    /// Only reports created at exactly this instant (RFC 3339)
    pub created_at: Option<DateTime<Utc>>,
    /// Only reports created at or after this instant (RFC 3339)
    pub created_after: Option<DateTime<Utc>>,
    /// Only reports created at or before this instant (RFC 3339)
    pub created_before: Option<DateTime<Utc>>,
}

/// Response DTO for a dog report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DogReportResponseDto {
    pub id: i64,
    /// Submitter's user id, null for anonymous reports
    pub user: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub location: Option<String>,
    pub condition: DogCondition,
    /// Public URL of the photo
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Welfare status; null only if it was deleted explicitly
    pub status: Option<DogStatusDto>,
}

impl DogReportResponseDto {
    pub fn new(report: DogReport, status: Option<DogStatus>, storage: &dyn ObjectStorage) -> Self {
        Self {
            id: report.id,
            user: report.user_id,
            latitude: report.latitude,
            longitude: report.longitude,
            location: report.location,
            condition: report.condition,
            image: report.image.as_deref().map(|key| storage.public_url(key)),
            created_at: report.created_at,
            status: status.map(DogStatusDto::from),
        }
    }
}
