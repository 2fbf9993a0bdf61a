use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for dog_statuses
#[derive(Debug, Clone, FromRow)]
pub struct DogStatus {
    pub id: i64,
    pub dog_report_id: i64,
    pub vaccinated: bool,
    pub rescued: bool,
    pub additional_notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}
