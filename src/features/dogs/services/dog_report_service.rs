use sqlx::PgPool;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::core::extractor::Caller;
use crate::features::dogs::dtos::{
    DogReportInput, DogReportPayload, DogReportQueryParams, DogReportResponseDto, ImageUpload,
};
use crate::features::dogs::models::{DogCondition, DogReport, DogReportWithStatus};
use crate::features::dogs::services::GeocodingService;
use crate::features::statuses::models::DogStatus;
use crate::features::statuses::services::insert_default_status;
use crate::modules::storage::ObjectStorage;

const REPORT_COLUMNS: &str =
    "id, user_id, latitude, longitude, location, condition, image, created_at";

const SELECT_WITH_STATUS: &str = r#"
    SELECT r.id, r.user_id, r.latitude, r.longitude, r.location, r.condition, r.image,
           r.created_at,
           s.id AS status_id, s.vaccinated, s.rescued, s.additional_notes,
           s.updated_at AS status_updated_at
    FROM dog_reports r
    LEFT JOIN dog_statuses s ON s.dog_report_id = r.id
"#;

/// Service for dog reports
pub struct DogReportService {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
    geocoder: Arc<GeocodingService>,
}

impl DogReportService {
    pub fn new(
        pool: PgPool,
        storage: Arc<dyn ObjectStorage>,
        geocoder: Arc<GeocodingService>,
    ) -> Self {
        Self {
            pool,
            storage,
            geocoder,
        }
    }

    /// Create a report together with its default status.
    ///
    /// The submitter is the caller's identity, or none for anonymous callers.
    /// Geocoding and the photo upload happen before the transaction opens.
    pub async fn create(
        &self,
        caller: &Caller,
        input: DogReportInput,
    ) -> Result<DogReportResponseDto> {
        let DogReportInput { payload, image } = input;
        payload.validate_full()?;

        let latitude = required(payload.latitude, "latitude")?;
        let longitude = required(payload.longitude, "longitude")?;
        let condition = required(payload.parsed_condition()?, "condition")?;

        let location = self
            .geocoder
            .resolve_location(payload.location, latitude, longitude)
            .await;

        let image_key = match image {
            Some(image) => Some(self.store_image(image).await?),
            None => None,
        };

        let created = self
            .insert_with_status(
                caller.user_id(),
                latitude,
                longitude,
                location,
                condition,
                image_key.as_deref(),
            )
            .await;

        let (report, status) = match created {
            Ok(created) => created,
            Err(e) => {
                if let Some(key) = image_key {
                    self.discard_image(&key).await;
                }
                return Err(e);
            }
        };

        tracing::info!(
            "Dog report {} created (condition={}, user={:?})",
            report.id,
            report.condition,
            report.user_id
        );

        Ok(DogReportResponseDto::new(
            report,
            Some(status),
            self.storage.as_ref(),
        ))
    }

    async fn insert_with_status(
        &self,
        user_id: Option<i64>,
        latitude: f64,
        longitude: f64,
        location: Option<String>,
        condition: DogCondition,
        image: Option<&str>,
    ) -> Result<(DogReport, DogStatus)> {
        let mut tx = self.pool.begin().await?;

        let report = sqlx::query_as::<_, DogReport>(&format!(
            r#"
            INSERT INTO dog_reports (user_id, latitude, longitude, location, condition, image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(user_id)
        .bind(latitude)
        .bind(longitude)
        .bind(location)
        .bind(condition)
        .bind(image)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create dog report: {:?}", e);
            AppError::Database(e)
        })?;

        let status = insert_default_status(&mut *tx, report.id).await?;

        tx.commit().await?;

        Ok((report, status))
    }

    /// List reports newest first
    pub async fn list(&self, query: &DogReportQueryParams) -> Result<Vec<DogReportResponseDto>> {
        let rows = sqlx::query_as::<_, DogReportWithStatus>(&format!(
            r#"
            {}
            WHERE ($1::dog_condition IS NULL OR r.condition = $1)
              AND ($2::BIGINT IS NULL OR r.user_id = $2)
              AND ($3::TIMESTAMPTZ IS NULL OR r.created_at = $3)
              AND ($4::TIMESTAMPTZ IS NULL OR r.created_at >= $4)
              AND ($5::TIMESTAMPTZ IS NULL OR r.created_at <= $5)
            ORDER BY r.created_at DESC, r.id DESC
            "#,
            SELECT_WITH_STATUS
        ))
        .bind(query.condition)
        .bind(query.user)
        .bind(query.created_at)
        .bind(query.created_after)
        .bind(query.created_before)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list dog reports: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(|row| self.to_dto(row)).collect())
    }

    pub async fn get(&self, id: i64) -> Result<DogReportResponseDto> {
        self.find_with_status(id)
            .await?
            .map(|row| self.to_dto(row))
            .ok_or_else(|| report_not_found(id))
    }

    /// Apply a PUT (`full`) or PATCH update.
    ///
    /// `created_at` and the submitter never change. A new photo replaces the
    /// old one, which is then removed from storage.
    pub async fn update(
        &self,
        caller: &Caller,
        id: i64,
        input: DogReportInput,
        full: bool,
    ) -> Result<DogReportResponseDto> {
        let DogReportInput { payload, image } = input;
        if full {
            payload.validate_full()?;
        } else {
            payload.validate_partial()?;
        }

        let existing = self.find(id).await?.ok_or_else(|| report_not_found(id))?;
        caller.ensure_can_modify(existing.user_id)?;

        let condition = payload.parsed_condition()?;
        let (set_location, location) = self.updated_location(&payload, full).await;

        let image_key = match image {
            Some(image) => Some(self.store_image(image).await?),
            None => None,
        };

        let updated = sqlx::query_as::<_, DogReport>(&format!(
            r#"
            UPDATE dog_reports
            SET latitude = COALESCE($2, latitude),
                longitude = COALESCE($3, longitude),
                condition = COALESCE($4, condition),
                location = CASE WHEN $5 THEN $6 ELSE location END,
                image = COALESCE($7, image)
            WHERE id = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(id)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(condition)
        .bind(set_location)
        .bind(location)
        .bind(image_key.as_deref())
        .fetch_optional(&self.pool)
        .await;

        let updated = match updated {
            Ok(Some(report)) => report,
            Ok(None) => {
                if let Some(key) = image_key {
                    self.discard_image(&key).await;
                }
                return Err(report_not_found(id));
            }
            Err(e) => {
                tracing::error!("Failed to update dog report {}: {:?}", id, e);
                if let Some(key) = image_key {
                    self.discard_image(&key).await;
                }
                return Err(AppError::Database(e));
            }
        };

        if let (Some(_), Some(old_key)) = (&image_key, &existing.image) {
            self.discard_image(old_key).await;
        }

        tracing::info!("Dog report {} updated", updated.id);

        self.get(updated.id).await
    }

    /// Delete a report; its status and comments go with it
    pub async fn delete(&self, caller: &Caller, id: i64) -> Result<()> {
        let existing = self.find(id).await?.ok_or_else(|| report_not_found(id))?;
        caller.ensure_can_modify(existing.user_id)?;

        let result = sqlx::query("DELETE FROM dog_reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete dog report {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(report_not_found(id));
        }

        if let Some(key) = existing.image {
            self.discard_image(&key).await;
        }

        tracing::info!("Dog report {} deleted", id);
        Ok(())
    }

    /// Location column change for an update: `(set, value)`.
    ///
    /// PUT resolves the location like create does. PATCH only touches it when
    /// the field is present; a blank value clears it.
    async fn updated_location(
        &self,
        payload: &DogReportPayload,
        full: bool,
    ) -> (bool, Option<String>) {
        match (full, payload.latitude, payload.longitude) {
            (true, Some(latitude), Some(longitude)) => (
                true,
                self.geocoder
                    .resolve_location(payload.location.clone(), latitude, longitude)
                    .await,
            ),
            _ => match &payload.location {
                Some(location) => {
                    let location = location.trim();
                    (true, (!location.is_empty()).then(|| location.to_string()))
                }
                None => (false, None),
            },
        }
    }

    async fn find(&self, id: i64) -> Result<Option<DogReport>> {
        sqlx::query_as::<_, DogReport>(&format!(
            "SELECT {} FROM dog_reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get dog report {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    async fn find_with_status(&self, id: i64) -> Result<Option<DogReportWithStatus>> {
        sqlx::query_as::<_, DogReportWithStatus>(&format!(
            "{} WHERE r.id = $1",
            SELECT_WITH_STATUS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get dog report {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    async fn store_image(&self, image: ImageUpload) -> Result<String> {
        let key = image.storage_key();
        self.storage
            .upload(&key, image.data, &image.content_type)
            .await?;
        Ok(key)
    }

    /// Best-effort removal; a leftover object is only logged
    async fn discard_image(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!("Failed to delete image '{}': {}", key, e);
        }
    }

    fn to_dto(&self, row: DogReportWithStatus) -> DogReportResponseDto {
        let (report, status) = row.into_parts();
        DogReportResponseDto::new(report, status, self.storage.as_ref())
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| AppError::invalid_field(field, "This field is required."))
}

fn report_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Dog report {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::shared::test_helpers::{disabled_geocoder, insert_report, insert_user, MemoryStorage};

    fn service(pool: PgPool) -> (DogReportService, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::default());
        let service = DogReportService::new(
            pool,
            Arc::clone(&storage) as Arc<dyn ObjectStorage>,
            disabled_geocoder(),
        );
        (service, storage)
    }

    fn caller(user_id: i64) -> Caller {
        Caller(Some(AuthenticatedUser {
            user_id,
            username: format!("user{}", user_id),
        }))
    }

    fn input(condition: &str) -> DogReportInput {
        DogReportInput {
            payload: DogReportPayload {
                latitude: Some(-8.65),
                longitude: Some(115.22),
                condition: Some(condition.to_string()),
                location: None,
            },
            image: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_anonymous_create_gets_default_status(pool: PgPool) {
        let (service, _) = service(pool);

        let report = service.create(&Caller(None), input("Injured")).await.unwrap();

        assert_eq!(report.user, None);
        assert_eq!(report.condition, DogCondition::Injured);
        assert_eq!(report.location, None);
        assert_eq!(report.image, None);
        let status = report.status.expect("status created with the report");
        assert!(!status.vaccinated);
        assert!(!status.rescued);
        assert_eq!(status.dog_report, report.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_submitter_comes_from_token(pool: PgPool) {
        let user_id = insert_user(&pool, "reporter").await;
        let (service, _) = service(pool);

        let report = service.create(&caller(user_id), input("Lost")).await.unwrap();
        assert_eq!(report.user, Some(user_id));

        let fetched = service.get(report.id).await.unwrap();
        assert_eq!(fetched.user, Some(user_id));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_supplied_location_is_kept(pool: PgPool) {
        let (service, _) = service(pool);
        let mut input = input("Healthy");
        input.payload.location = Some("  Denpasar Market ".to_string());

        let report = service.create(&Caller(None), input).await.unwrap();
        assert_eq!(report.location.as_deref(), Some("Denpasar Market"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_list_is_newest_first_and_filters(pool: PgPool) {
        let user_id = insert_user(&pool, "filterer").await;
        let (service, _) = service(pool);

        let first = service.create(&Caller(None), input("Injured")).await.unwrap();
        let second = service.create(&caller(user_id), input("Lost")).await.unwrap();
        let third = service.create(&Caller(None), input("Injured")).await.unwrap();

        let all = service.list(&DogReportQueryParams::default()).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);

        let injured = service
            .list(&DogReportQueryParams {
                condition: Some(DogCondition::Injured),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(
            injured.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![third.id, first.id]
        );

        let mine = service
            .list(&DogReportQueryParams {
                user: Some(user_id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, second.id);

        let later = service
            .list(&DogReportQueryParams {
                created_after: Some(second.created_at),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(later.iter().all(|r| r.created_at >= second.created_at));
        assert!(later.iter().any(|r| r.id == third.id));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_delete_cascades_to_status_and_comments(pool: PgPool) {
        let report_id = insert_report(&pool, None).await;
        sqlx::query("INSERT INTO comments (dog_report_id, text) VALUES ($1, 'poor thing')")
            .bind(report_id)
            .execute(&pool)
            .await
            .unwrap();
        let (service, _) = service(pool.clone());

        service.delete(&Caller(None), report_id).await.unwrap();

        let statuses: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM dog_statuses WHERE dog_report_id = $1")
                .bind(report_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        let comments: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE dog_report_id = $1")
                .bind(report_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(statuses, 0);
        assert_eq!(comments, 0);
        assert!(matches!(
            service.get(report_id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_replacing_image_removes_old_object(pool: PgPool) {
        let (service, storage) = service(pool);

        let mut create = input("Injured");
        create.image = Some(ImageUpload::new(vec![1, 2, 3], "image/png").unwrap());
        let report = service.create(&Caller(None), create).await.unwrap();

        let first_url = report.image.clone().expect("image url");
        assert!(first_url.starts_with("http://storage.test/public/dog_reports/"));
        assert!(first_url.ends_with(".png"));
        assert_eq!(storage.object_count(), 1);

        let update = DogReportInput {
            payload: DogReportPayload::default(),
            image: Some(ImageUpload::new(vec![4, 5, 6], "image/jpeg").unwrap()),
        };
        let updated = service
            .update(&Caller(None), report.id, update, false)
            .await
            .unwrap();

        let second_url = updated.image.expect("image url");
        assert_ne!(first_url, second_url);
        assert!(second_url.ends_with(".jpg"));
        assert_eq!(storage.object_count(), 1);
        let old_key = first_url.trim_start_matches("http://storage.test/public/");
        assert!(!storage.contains(old_key));

        service.delete(&Caller(None), report.id).await.unwrap();
        assert_eq!(storage.object_count(), 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_patch_keeps_untouched_fields(pool: PgPool) {
        let (service, _) = service(pool);
        let mut create = input("Injured");
        create.payload.location = Some("Ubud".to_string());
        let report = service.create(&Caller(None), create).await.unwrap();

        let patch = DogReportInput {
            payload: DogReportPayload {
                condition: Some("Healthy".to_string()),
                ..Default::default()
            },
            image: None,
        };
        let updated = service
            .update(&Caller(None), report.id, patch, false)
            .await
            .unwrap();

        assert_eq!(updated.condition, DogCondition::Healthy);
        assert_eq!(updated.latitude, -8.65);
        assert_eq!(updated.location.as_deref(), Some("Ubud"));
        assert_eq!(updated.created_at, report.created_at);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_owned_report_is_guarded(pool: PgPool) {
        let owner = insert_user(&pool, "owner").await;
        let stranger = insert_user(&pool, "stranger").await;
        let report_id = insert_report(&pool, Some(owner)).await;
        let (service, _) = service(pool);

        assert!(matches!(
            service.delete(&Caller(None), report_id).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            service.delete(&caller(stranger), report_id).await,
            Err(AppError::Forbidden(_))
        ));
        service.delete(&caller(owner), report_id).await.unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_missing_report_is_not_found(pool: PgPool) {
        let (service, _) = service(pool);
        assert!(matches!(
            service.get(424_242).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service
                .update(&Caller(None), 424_242, input("Lost"), true)
                .await,
            Err(AppError::NotFound(_))
        ));
    }
}
