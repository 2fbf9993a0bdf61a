use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::core::extractor::Caller;
use crate::features::comments::dtos::{
    CommentQueryParams, CommentResponseDto, CreateCommentDto, UpdateCommentDto,
};
use crate::features::comments::models::Comment;

const SELECT_COMMENTS: &str = r#"
    SELECT c.id, c.dog_report_id, c.user_id, u.username, c.text, c.created_at
    FROM comments c
    LEFT JOIN users u ON u.id = c.user_id
"#;

/// Service for comments on dog reports
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a comment; the author is the caller, or nobody for anonymous callers
    pub async fn create(
        &self,
        caller: &Caller,
        dto: CreateCommentDto,
    ) -> Result<CommentResponseDto> {
        let dog_report_id = dto
            .dog_report
            .ok_or_else(|| AppError::invalid_field("dog_report", "This field is required."))?;
        let text = dto
            .text
            .map(|t| t.trim().to_string())
            .ok_or_else(|| AppError::invalid_field("text", "This field is required."))?;

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (dog_report_id, user_id, text)
                VALUES ($1, $2, $3)
                RETURNING id, dog_report_id, user_id, text, created_at
            )
            SELECT i.id, i.dog_report_id, i.user_id, u.username, i.text, i.created_at
            FROM inserted i
            LEFT JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(dog_report_id)
        .bind(caller.user_id())
        .bind(&text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AppError::NotFound(format!("Dog report {} not found", dog_report_id))
            }
            e => {
                tracing::error!("Failed to create comment: {:?}", e);
                AppError::Database(e)
            }
        })?;

        tracing::info!(
            "Comment {} added to report {} (user={:?})",
            comment.id,
            dog_report_id,
            comment.user_id
        );

        Ok(comment.into())
    }

    /// List comments newest first
    pub async fn list(&self, query: &CommentQueryParams) -> Result<Vec<CommentResponseDto>> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            r#"
            {}
            WHERE ($1::BIGINT IS NULL OR c.dog_report_id = $1)
            ORDER BY c.created_at DESC, c.id DESC
            "#,
            SELECT_COMMENTS
        ))
        .bind(query.dog_report)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list comments: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(comments.into_iter().map(CommentResponseDto::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<CommentResponseDto> {
        self.find(id)
            .await?
            .map(CommentResponseDto::from)
            .ok_or_else(|| comment_not_found(id))
    }

    /// Change a comment's text (PUT when `full`, otherwise PATCH)
    pub async fn update(
        &self,
        caller: &Caller,
        id: i64,
        dto: UpdateCommentDto,
        full: bool,
    ) -> Result<CommentResponseDto> {
        if full {
            dto.validate_full()?;
        }

        let existing = self.find(id).await?.ok_or_else(|| comment_not_found(id))?;
        caller.ensure_can_modify(existing.user_id)?;

        let Some(text) = dto.text.map(|t| t.trim().to_string()) else {
            return Ok(existing.into());
        };

        let result = sqlx::query("UPDATE comments SET text = $2 WHERE id = $1")
            .bind(id)
            .bind(&text)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update comment {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(comment_not_found(id));
        }

        tracing::info!("Comment {} updated", id);
        self.get(id).await
    }

    pub async fn delete(&self, caller: &Caller, id: i64) -> Result<()> {
        let existing = self.find(id).await?.ok_or_else(|| comment_not_found(id))?;
        caller.ensure_can_modify(existing.user_id)?;

        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(comment_not_found(id));
        }

        tracing::info!("Comment {} deleted", id);
        Ok(())
    }

    async fn find(&self, id: i64) -> Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(&format!("{} WHERE c.id = $1", SELECT_COMMENTS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get comment {}: {:?}", id, e);
                AppError::Database(e)
            })
    }
}

fn comment_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Comment {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::shared::test_helpers::{insert_report, insert_user};

    fn comment_on(report_id: i64, text: &str) -> CreateCommentDto {
        CreateCommentDto {
            dog_report: Some(report_id),
            text: Some(text.to_string()),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_list_filters_by_report_newest_first(pool: PgPool) {
        let first_report = insert_report(&pool, None).await;
        let other_report = insert_report(&pool, None).await;
        let service = CommentService::new(pool);
        let anonymous = Caller(None);

        let older = service
            .create(&anonymous, comment_on(first_report, "first"))
            .await
            .unwrap();
        service
            .create(&anonymous, comment_on(other_report, "elsewhere"))
            .await
            .unwrap();
        let newer = service
            .create(&anonymous, comment_on(first_report, "second"))
            .await
            .unwrap();

        let listed = service
            .list(&CommentQueryParams {
                dog_report: Some(first_report),
            })
            .await
            .unwrap();

        let ids: Vec<i64> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert!(listed.iter().all(|c| c.dog_report == first_report));
        assert!(listed
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_author_comes_from_caller(pool: PgPool) {
        let user_id = insert_user(&pool, "commenter").await;
        let report_id = insert_report(&pool, None).await;
        let service = CommentService::new(pool);

        let signed_in = Caller(Some(AuthenticatedUser {
            user_id,
            username: "commenter".to_string(),
        }));
        let comment = service
            .create(&signed_in, comment_on(report_id, "  on it  "))
            .await
            .unwrap();
        assert_eq!(comment.user, Some(user_id));
        assert_eq!(comment.username, "commenter");
        assert_eq!(comment.text, "on it");

        let anonymous = service
            .create(&Caller(None), comment_on(report_id, "me too"))
            .await
            .unwrap();
        assert_eq!(anonymous.user, None);
        assert_eq!(anonymous.username, "Anonymous");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_only_author_may_edit_owned_comment(pool: PgPool) {
        let author = insert_user(&pool, "author").await;
        let stranger = insert_user(&pool, "stranger").await;
        let report_id = insert_report(&pool, None).await;
        let service = CommentService::new(pool);

        let author_caller = Caller(Some(AuthenticatedUser {
            user_id: author,
            username: "author".to_string(),
        }));
        let stranger_caller = Caller(Some(AuthenticatedUser {
            user_id: stranger,
            username: "stranger".to_string(),
        }));

        let comment = service
            .create(&author_caller, comment_on(report_id, "draft"))
            .await
            .unwrap();

        let edit = UpdateCommentDto {
            text: Some("edited".to_string()),
        };
        assert!(matches!(
            service
                .update(&stranger_caller, comment.id, edit.clone(), false)
                .await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.delete(&Caller(None), comment.id).await,
            Err(AppError::Unauthorized(_))
        ));

        let updated = service
            .update(&author_caller, comment.id, edit, true)
            .await
            .unwrap();
        assert_eq!(updated.text, "edited");
        assert_eq!(updated.created_at, comment.created_at);

        service.delete(&author_caller, comment.id).await.unwrap();
        assert!(matches!(
            service.get(comment.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn test_comment_on_missing_report_is_not_found(pool: PgPool) {
        let service = CommentService::new(pool);
        let err = service
            .create(&Caller(None), comment_on(424_242, "hello?"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
