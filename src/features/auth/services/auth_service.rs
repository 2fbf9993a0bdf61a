use sqlx::PgPool;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    AuthResponseDto, LoginRequestDto, LogoutRequestDto, LogoutResponseDto,
    RefreshTokenRequestDto, RefreshTokenResponseDto, RegisterRequestDto, UserDto,
};
use crate::features::auth::model::{AuthenticatedUser, User};
use crate::features::auth::services::password::{hash_password, verify_password};
use crate::features::auth::services::token_service::TokenService;

const TOKEN_TYPE: &str = "Bearer";

/// Service for account operations (register, login, refresh, logout)
pub struct AuthService {
    pool: PgPool,
    token_service: Arc<TokenService>,
}

impl AuthService {
    pub fn new(pool: PgPool, token_service: Arc<TokenService>) -> Self {
        Self {
            pool,
            token_service,
        }
    }

    /// Register a new user and sign them in
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<AuthResponseDto> {
        // Argon2 is deliberately slow; keep it off the async workers
        let password = dto.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))??;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("A user with that username already exists.".to_string())
            }
            e => {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::Database(e)
            }
        })?;

        tracing::info!("Registered user: {} ({})", user.username, user.id);

        self.sign_in(user)
    }

    /// Login with username and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let user = self.find_by_username(&dto.username).await?;

        let Some(user) = user else {
            return Err(AppError::BadRequest("Invalid credentials".to_string()));
        };

        let password = dto.password;
        let stored_hash = user.password_hash.clone();
        let password_valid =
            tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
                .await
                .map_err(|e| {
                    AppError::Internal(format!("Password verification task failed: {}", e))
                })??;

        if !password_valid {
            return Err(AppError::BadRequest("Invalid credentials".to_string()));
        }

        tracing::debug!("User logged in: {}", user.id);
        self.sign_in(user)
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh_token(
        &self,
        dto: RefreshTokenRequestDto,
    ) -> Result<RefreshTokenResponseDto> {
        let claims = self
            .token_service
            .validate_refresh_token(&dto.refresh_token)?;

        if self.is_revoked(claims.jti).await? {
            return Err(AppError::Unauthorized(
                "Refresh token has been revoked".to_string(),
            ));
        }

        // The account may have been removed since the token was issued
        let user = self
            .get_user(claims.user.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

        let access_token = self
            .token_service
            .issue_access_token(&AuthenticatedUser::from(&user))?;

        Ok(RefreshTokenResponseDto {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.token_service.access_token_ttl_secs(),
        })
    }

    /// Forget the session. Access tokens are stateless and simply expire; a refresh
    /// token passed in the body is revoked so it can no longer mint access tokens.
    pub async fn logout(
        &self,
        user: &AuthenticatedUser,
        dto: LogoutRequestDto,
    ) -> Result<LogoutResponseDto> {
        let Some(refresh_token) = dto.refresh_token.filter(|t| !t.trim().is_empty()) else {
            return Ok(LogoutResponseDto {
                refresh_token_revoked: false,
            });
        };

        let claims = self.token_service.validate_refresh_token(&refresh_token)?;
        if claims.user.user_id != user.user_id {
            return Err(AppError::Forbidden(
                "Refresh token belongs to another user".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(claims.jti)
        .bind(claims.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to revoke refresh token: {:?}", e);
            AppError::Database(e)
        })?;

        // Rows past their expiry can never match a valid token again
        let purged = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?
            .rows_affected();
        if purged > 0 {
            tracing::debug!("Purged {} expired revoked tokens", purged);
        }

        tracing::info!("User {} logged out", user.user_id);

        Ok(LogoutResponseDto {
            refresh_token_revoked: true,
        })
    }

    /// Get current user info (for /me endpoint)
    pub async fn get_current_user(&self, user: &AuthenticatedUser) -> Result<UserDto> {
        self.get_user(user.user_id)
            .await?
            .map(UserDto::from)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))
    }

    fn sign_in(&self, user: User) -> Result<AuthResponseDto> {
        let tokens = self.token_service.issue(&AuthenticatedUser::from(&user))?;

        Ok(AuthResponseDto {
            user: user.into(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: tokens.expires_in,
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn is_revoked(&self, jti: uuid::Uuid) -> Result<bool> {
        let revoked: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await?;
        Ok(revoked)
    }
}
