use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::features::statuses::models::DogStatus;

/// Observed condition of a reported dog, matching the `dog_condition` database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "dog_condition")]
pub enum DogCondition {
    Healthy,
    Injured,
    Lost,
}

impl DogCondition {
    pub const ALL: [DogCondition; 3] = [
        DogCondition::Healthy,
        DogCondition::Injured,
        DogCondition::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DogCondition::Healthy => "Healthy",
            DogCondition::Injured => "Injured",
            DogCondition::Lost => "Lost",
        }
    }
}

impl std::fmt::Display for DogCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DogCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DogCondition::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("\"{}\" is not a valid choice.", s))
    }
}

/// Database model for dog_reports
#[derive(Debug, Clone, FromRow)]
pub struct DogReport {
    pub id: i64,
    pub user_id: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub location: Option<String>,
    pub condition: DogCondition,
    /// Storage key of the photo, e.g. `dog_reports/<hex>.jpg`
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A report joined with its status, if the status still exists
#[derive(Debug, Clone, FromRow)]
pub struct DogReportWithStatus {
    #[sqlx(flatten)]
    pub report: DogReport,
    pub status_id: Option<i64>,
    pub vaccinated: Option<bool>,
    pub rescued: Option<bool>,
    pub additional_notes: Option<String>,
    pub status_updated_at: Option<DateTime<Utc>>,
}

impl DogReportWithStatus {
    pub fn into_parts(self) -> (DogReport, Option<DogStatus>) {
        let status = match (
            self.status_id,
            self.vaccinated,
            self.rescued,
            self.status_updated_at,
        ) {
            (Some(id), Some(vaccinated), Some(rescued), Some(updated_at)) => Some(DogStatus {
                id,
                dog_report_id: self.report.id,
                vaccinated,
                rescued,
                additional_notes: self.additional_notes,
                updated_at,
            }),
            _ => None,
        };
        (self.report, status)
    }
}
