use sqlx::{PgConnection, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::statuses::dtos::{
    normalize_notes, CreateStatusDto, DogStatusDto, StatusQueryParams, UpdateStatusDto,
};
use crate::features::statuses::models::DogStatus;

const DUPLICATE_STATUS: &str = "Status already exists for this dog report.";

/// Insert the default (unvaccinated, unrescued) status for a freshly created report.
///
/// Runs on the caller's connection so it can share the report's transaction.
pub async fn insert_default_status(
    conn: &mut PgConnection,
    dog_report_id: i64,
) -> Result<DogStatus> {
    sqlx::query_as::<_, DogStatus>(
        r#"
        INSERT INTO dog_statuses (dog_report_id)
        VALUES ($1)
        RETURNING id, dog_report_id, vaccinated, rescued, additional_notes, updated_at
        "#,
    )
    .bind(dog_report_id)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create default status for report {}: {:?}", dog_report_id, e);
        AppError::Database(e)
    })
}

/// Service for dog report statuses
pub struct StatusService {
    pool: PgPool,
}

impl StatusService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a status for a report that has none.
    ///
    /// Uniqueness is decided by the `dog_report_id` UNIQUE constraint, so two
    /// concurrent requests for the same report cannot both succeed.
    pub async fn create(&self, dto: CreateStatusDto) -> Result<DogStatusDto> {
        let dog_report_id = dto
            .dog_report
            .ok_or_else(|| AppError::invalid_field("dog_report", "This field is required."))?;

        let status = sqlx::query_as::<_, DogStatus>(
            r#"
            INSERT INTO dog_statuses (dog_report_id, vaccinated, rescued, additional_notes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (dog_report_id) DO NOTHING
            RETURNING id, dog_report_id, vaccinated, rescued, additional_notes, updated_at
            "#,
        )
        .bind(dog_report_id)
        .bind(dto.vaccinated.unwrap_or(false))
        .bind(dto.rescued.unwrap_or(false))
        .bind(normalize_notes(dto.additional_notes))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AppError::NotFound(format!("Dog report {} not found", dog_report_id))
            }
            e => {
                tracing::error!("Failed to create status: {:?}", e);
                AppError::Database(e)
            }
        })?;

        let Some(status) = status else {
            tracing::debug!("Rejected duplicate status for report {}", dog_report_id);
            return Err(AppError::BadRequest(DUPLICATE_STATUS.to_string()));
        };

        tracing::info!("Status {} created for report {}", status.id, dog_report_id);
        Ok(status.into())
    }

    /// List statuses, most recently updated first
    pub async fn list(&self, query: &StatusQueryParams) -> Result<Vec<DogStatusDto>> {
        let statuses = sqlx::query_as::<_, DogStatus>(
            r#"
            SELECT id, dog_report_id, vaccinated, rescued, additional_notes, updated_at
            FROM dog_statuses
            WHERE ($1::BIGINT IS NULL OR dog_report_id = $1)
            ORDER BY updated_at DESC, id DESC
            "#,
        )
        .bind(query.dog_report)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list statuses: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(statuses.into_iter().map(DogStatusDto::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<DogStatusDto> {
        sqlx::query_as::<_, DogStatus>(
            r#"
            SELECT id, dog_report_id, vaccinated, rescued, additional_notes, updated_at
            FROM dog_statuses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(DogStatusDto::from)
        .ok_or_else(|| status_not_found(id))
    }

    /// Apply a PUT (`full`) or PATCH update. `updated_at` is refreshed either way.
    pub async fn update(&self, id: i64, dto: UpdateStatusDto, full: bool) -> Result<DogStatusDto> {
        if full {
            dto.validate_full()?;
        }

        // PUT replaces the notes even when omitted; PATCH only when present
        let set_notes = full || dto.additional_notes.is_some();

        sqlx::query_as::<_, DogStatus>(
            r#"
            UPDATE dog_statuses
            SET vaccinated = COALESCE($2, vaccinated),
                rescued = COALESCE($3, rescued),
                additional_notes = CASE WHEN $4 THEN $5 ELSE additional_notes END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, dog_report_id, vaccinated, rescued, additional_notes, updated_at
            "#,
        )
        .bind(id)
        .bind(dto.vaccinated)
        .bind(dto.rescued)
        .bind(set_notes)
        .bind(normalize_notes(dto.additional_notes))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update status {}: {:?}", id, e);
            AppError::Database(e)
        })?
        .map(DogStatusDto::from)
        .ok_or_else(|| status_not_found(id))
    }

    /// Delete a status; the report is left untouched
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM dog_statuses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(status_not_found(id));
        }

        tracing::info!("Status {} deleted", id);
        Ok(())
    }
}

fn status_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Status {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{insert_report, insert_user};

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_second_status_is_rejected(pool: PgPool) {
        let report_id = insert_report(&pool, None).await;
        let service = StatusService::new(pool.clone());

        let err = service
            .create(CreateStatusDto {
                dog_report: Some(report_id),
                vaccinated: Some(true),
                ..Default::default()
            })
            .await
            .unwrap_err();

        match err {
            AppError::BadRequest(message) => assert_eq!(message, DUPLICATE_STATUS),
            other => panic!("expected duplicate error, got {:?}", other),
        }

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM dog_statuses WHERE dog_report_id = $1")
                .bind(report_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_concurrent_creates_allow_exactly_one(pool: PgPool) {
        let report_id = insert_report(&pool, None).await;
        sqlx::query("DELETE FROM dog_statuses WHERE dog_report_id = $1")
            .bind(report_id)
            .execute(&pool)
            .await
            .unwrap();

        let service = std::sync::Arc::new(StatusService::new(pool.clone()));
        let attempts = (0..8).map(|_| {
            let service = std::sync::Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .create(CreateStatusDto {
                        dog_report: Some(report_id),
                        ..Default::default()
                    })
                    .await
            })
        });

        let mut created = 0;
        let mut rejected = 0;
        for attempt in attempts.collect::<Vec<_>>() {
            match attempt.await.unwrap() {
                Ok(_) => created += 1,
                Err(AppError::BadRequest(_)) => rejected += 1,
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(rejected, 7);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_create_for_missing_report_is_not_found(pool: PgPool) {
        let service = StatusService::new(pool);
        let err = service
            .create(CreateStatusDto {
                dog_report: Some(999_999),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_patch_keeps_unspecified_fields_and_bumps_updated_at(pool: PgPool) {
        let user_id = insert_user(&pool, "status_patcher").await;
        let report_id = insert_report(&pool, Some(user_id)).await;
        let service = StatusService::new(pool);

        let before = service
            .list(&StatusQueryParams {
                dog_report: Some(report_id),
            })
            .await
            .unwrap()
            .remove(0);

        let put = service
            .update(
                before.id,
                UpdateStatusDto {
                    vaccinated: Some(true),
                    rescued: Some(false),
                    additional_notes: Some("limping".to_string()),
                },
                true,
            )
            .await
            .unwrap();
        assert!(put.vaccinated);
        assert!(put.updated_at >= before.updated_at);

        let patched = service
            .update(
                before.id,
                UpdateStatusDto {
                    rescued: Some(true),
                    ..Default::default()
                },
                false,
            )
            .await
            .unwrap();
        assert!(patched.vaccinated);
        assert!(patched.rescued);
        assert_eq!(patched.additional_notes.as_deref(), Some("limping"));
        assert_eq!(patched.dog_report, report_id);
        assert!(patched.updated_at >= put.updated_at);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_delete_status_keeps_report(pool: PgPool) {
        let report_id = insert_report(&pool, None).await;
        let service = StatusService::new(pool.clone());
        let status = service
            .list(&StatusQueryParams {
                dog_report: Some(report_id),
            })
            .await
            .unwrap()
            .remove(0);

        service.delete(status.id).await.unwrap();
        assert!(matches!(service.get(status.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete(status.id).await, Err(AppError::NotFound(_))));

        let report_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM dog_reports WHERE id = $1)")
                .bind(report_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(report_exists);
    }
}
