use std::convert::Infallible;

use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;

/// Custom JSON extractor that provides consistent error responses
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppJsonRejection(rejection)),
        }
    }
}

pub struct AppJsonRejection(JsonRejection);

impl From<AppJsonRejection> for AppError {
    fn from(rejection: AppJsonRejection) -> Self {
        let message = match rejection.0 {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
            JsonRejection::MissingJsonContentType(err) => {
                format!("Missing JSON content type: {}", err)
            }
            _ => "Failed to parse JSON body".to_string(),
        };

        AppError::BadRequest(message)
    }
}

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// Query string extractor that reports bad filters in the standard error envelope
pub struct AppQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(QueryRejection::FailedToDeserializeQueryString(err)) => Err(
                AppError::BadRequest(format!("Invalid query string: {}", err.body_text())),
            ),
            Err(_) => Err(AppError::BadRequest(
                "Failed to parse query string".to_string(),
            )),
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// The caller as resolved by the optional auth layer: a known user or anonymous.
///
/// Never fails; handlers that accept anonymous callers take this instead of
/// [`AuthenticatedUser`].
#[derive(Debug, Clone)]
pub struct Caller(pub Option<AuthenticatedUser>);

impl Caller {
    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|u| u.user_id)
    }

    /// Records without a submitter are open to every caller; owned records
    /// only to their submitter.
    pub fn ensure_can_modify(&self, owner: Option<i64>) -> Result<(), AppError> {
        match (owner, &self.0) {
            (None, _) => Ok(()),
            (Some(_), None) => Err(AppError::Unauthorized(
                "Authentication required".to_string(),
            )),
            (Some(owner), Some(user)) if owner == user.user_id => Ok(()),
            (Some(_), Some(_)) => Err(AppError::Forbidden(
                "You do not have permission to perform this action.".to_string(),
            )),
        }
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(user_id: i64) -> Caller {
        Caller(Some(AuthenticatedUser {
            user_id,
            username: format!("user{}", user_id),
        }))
    }

    #[test]
    fn test_anonymous_records_are_open() {
        assert!(Caller(None).ensure_can_modify(None).is_ok());
        assert!(caller(1).ensure_can_modify(None).is_ok());
    }

    #[test]
    fn test_owned_records_need_their_owner() {
        assert!(caller(1).ensure_can_modify(Some(1)).is_ok());
        assert!(matches!(
            Caller(None).ensure_can_modify(Some(1)),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            caller(2).ensure_can_modify(Some(1)),
            Err(AppError::Forbidden(_))
        ));
    }
}
