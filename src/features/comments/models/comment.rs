use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A comment row joined with its author's username
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: i64,
    pub dog_report_id: i64,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
