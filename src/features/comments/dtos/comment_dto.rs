use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::comments::models::Comment;
use crate::shared::constants::{ANONYMOUS_USERNAME, MAX_COMMENT_LENGTH};
use crate::shared::validation::validate_not_blank;

/// Request DTO for creating a comment. The author is taken from the access token.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCommentDto {
    /// Id of the dog report being commented on
    #[validate(required(message = "This field is required."))]
    pub dog_report: Option<i64>,

    #[validate(
        required(message = "This field is required."),
        custom(function = "validate_not_blank"),
        length(max = MAX_COMMENT_LENGTH, message = "Ensure this field has no more than 5000 characters.")
    )]
    pub text: Option<String>,
}

/// Request DTO for PUT and PATCH on a comment; only the text can change
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCommentDto {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = MAX_COMMENT_LENGTH, message = "Ensure this field has no more than 5000 characters.")
    )]
    pub text: Option<String>,
}

impl UpdateCommentDto {
    /// PUT requires the text
    pub fn validate_full(&self) -> Result<()> {
        self.validate()?;
        if self.text.is_none() {
            return Err(AppError::invalid_field("text", "This field is required."));
        }
        Ok(())
    }
}

/// Query params for listing comments
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CommentQueryParams {
    /// Only comments on this dog report
    pub dog_report: Option<i64>,
}

/// Response DTO for a comment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponseDto {
    pub id: i64,
    /// Id of the dog report
    pub dog_report: i64,
    /// Author's user id, null for anonymous comments
    pub user: Option<i64>,
    /// Author's username, or "Anonymous"
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponseDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            dog_report: c.dog_report_id,
            user: c.user_id,
            username: c
                .username
                .unwrap_or_else(|| ANONYMOUS_USERNAME.to_string()),
            text: c.text,
            created_at: c.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    #[test]
    fn test_create_requires_report_and_text() {
        let err = CreateCommentDto::default().validate().unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("dog_report"));
        assert!(fields.contains_key("text"));
    }

    #[test]
    fn test_blank_or_oversized_text_is_rejected() {
        let blank = CreateCommentDto {
            dog_report: Some(1),
            text: Some("   ".to_string()),
        };
        assert!(blank.validate().is_err());

        let oversized = CreateCommentDto {
            dog_report: Some(1),
            text: Some("w".repeat(MAX_COMMENT_LENGTH as usize + 1)),
        };
        assert!(oversized.validate().is_err());

        let text: String = Sentence(3..12).fake();
        let ok = CreateCommentDto {
            dog_report: Some(1),
            text: Some(text),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_put_requires_text_but_patch_does_not() {
        let empty = UpdateCommentDto::default();
        assert!(empty.validate().is_ok());
        assert!(matches!(empty.validate_full(), Err(AppError::Validation(_))));

        let text = UpdateCommentDto {
            text: Some("Found him a home".to_string()),
        };
        assert!(text.validate_full().is_ok());
    }

    #[test]
    fn test_anonymous_comment_shows_placeholder_username() {
        let dto = CommentResponseDto::from(Comment {
            id: 1,
            dog_report_id: 2,
            user_id: None,
            username: None,
            text: "Seen near the market".to_string(),
            created_at: Utc::now(),
        });
        assert_eq!(dto.username, ANONYMOUS_USERNAME);
        assert_eq!(dto.user, None);
        assert_eq!(dto.dog_report, 2);
    }
}
