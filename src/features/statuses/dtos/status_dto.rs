use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::statuses::models::DogStatus;

/// Request DTO for creating a status explicitly
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateStatusDto {
    /// Id of the dog report the status belongs to
    #[validate(required(message = "This field is required."))]
    pub dog_report: Option<i64>,
    pub vaccinated: Option<bool>,
    pub rescued: Option<bool>,
    pub additional_notes: Option<String>,
}

/// Request DTO for PUT and PATCH on a status
///
/// The owning report cannot be changed; a `dog_report` key in the body is ignored.
/// A blank `additional_notes` clears the notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusDto {
    pub vaccinated: Option<bool>,
    pub rescued: Option<bool>,
    pub additional_notes: Option<String>,
}

impl UpdateStatusDto {
    /// PUT requires both flags
    pub fn validate_full(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.vaccinated.is_none() {
            missing.push("vaccinated: This field is required.".to_string());
        }
        if self.rescued.is_none() {
            missing.push("rescued: This field is required.".to_string());
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(missing))
        }
    }
}

/// Notes are stored as NULL rather than an empty string
pub fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|n| !n.trim().is_empty())
}

/// Query params for listing statuses
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct StatusQueryParams {
    /// Only statuses of this dog report
    pub dog_report: Option<i64>,
}

/// Response DTO for a status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DogStatusDto {
    pub id: i64,
    /// Id of the dog report
    pub dog_report: i64,
    pub vaccinated: bool,
    pub rescued: bool,
    pub additional_notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<DogStatus> for DogStatusDto {
    fn from(s: DogStatus) -> Self {
        Self {
            id: s.id,
            dog_report: s.dog_report_id,
            vaccinated: s.vaccinated,
            rescued: s.rescued,
            additional_notes: s.additional_notes,
            updated_at: s.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_dog_report() {
        let err = CreateStatusDto::default().validate().unwrap_err();
        assert!(err.field_errors().contains_key("dog_report"));

        let dto = CreateStatusDto {
            dog_report: Some(7),
            ..Default::default()
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_full_update_requires_both_flags() {
        let partial = UpdateStatusDto {
            rescued: Some(true),
            ..Default::default()
        };
        match partial.validate_full() {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors, vec!["vaccinated: This field is required.".to_string()])
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let full = UpdateStatusDto {
            vaccinated: Some(false),
            rescued: Some(true),
            additional_notes: None,
        };
        assert!(full.validate_full().is_ok());
    }

    #[test]
    fn test_blank_notes_become_null() {
        assert_eq!(normalize_notes(Some("  ".to_string())), None);
        assert_eq!(normalize_notes(None), None);
        assert_eq!(
            normalize_notes(Some("fed twice a day".to_string())),
            Some("fed twice a day".to_string())
        );
    }

    #[test]
    fn test_dto_serializes_dog_report_key() {
        let dto = DogStatusDto::from(DogStatus {
            id: 1,
            dog_report_id: 9,
            vaccinated: false,
            rescued: false,
            additional_notes: None,
            updated_at: Utc::now(),
        });
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["dog_report"], 9);
        assert_eq!(json["vaccinated"], false);
        assert!(json.get("dog_report_id").is_none());
    }
}
