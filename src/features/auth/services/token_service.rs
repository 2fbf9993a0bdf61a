use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    token_type: TokenKind,
    jti: Uuid,
    iss: String,
    iat: i64,
    exp: i64,
}

/// Access/refresh pair handed out on register and login
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// What a verified refresh token tells us
#[derive(Debug, Clone)]
pub struct RefreshTokenClaims {
    pub user: AuthenticatedUser,
    pub jti: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies HS256 JWTs
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    leeway_secs: u64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer.clone(),
            access_ttl_secs: config.access_token_ttl.as_secs() as i64,
            refresh_ttl_secs: config.refresh_token_ttl.as_secs() as i64,
            leeway_secs: config.jwt_leeway.as_secs(),
        }
    }

    pub fn issue(&self, user: &AuthenticatedUser) -> Result<IssuedTokens> {
        Ok(IssuedTokens {
            access_token: self.sign(user, TokenKind::Access, self.access_ttl_secs)?,
            refresh_token: self.sign(user, TokenKind::Refresh, self.refresh_ttl_secs)?,
            expires_in: self.access_ttl_secs,
        })
    }

    pub fn issue_access_token(&self, user: &AuthenticatedUser) -> Result<String> {
        self.sign(user, TokenKind::Access, self.access_ttl_secs)
    }

    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    pub fn validate_access_token(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = self.verify(token, TokenKind::Access)?;
        Self::to_user(&claims)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims> {
        let claims = self.verify(token, TokenKind::Refresh)?;
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AppError::Auth("Token expiry is out of range".to_string()))?;

        Ok(RefreshTokenClaims {
            user: Self::to_user(&claims)?,
            jti: claims.jti,
            expires_at,
        })
    }

    fn sign(&self, user: &AuthenticatedUser, kind: TokenKind, ttl_secs: i64) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.user_id.to_string(),
            username: user.username.clone(),
            token_type: kind,
            jti: Uuid::new_v4(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now + ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.leeway = self.leeway_secs;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Auth(format!("Invalid token: {}", e)))?
            .claims;

        if claims.token_type != expected {
            return Err(AppError::Auth(format!(
                "Expected an {} token",
                match expected {
                    TokenKind::Access => "access",
                    TokenKind::Refresh => "refresh",
                }
            )));
        }

        Ok(claims)
    }

    fn to_user(claims: &Claims) -> Result<AuthenticatedUser> {
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Auth("Token subject is not a user id".to_string()))?;

        Ok(AuthenticatedUser {
            user_id,
            username: claims.username.clone(),
        })
    }
}
