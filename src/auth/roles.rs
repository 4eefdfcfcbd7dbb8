//! Role extractors.
//!
//! Each wraps the [`AuthUser`] injected by `require_auth` and rejects the
//! request with 403 when the caller's role does not match, before the
//! handler touches the database.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::middleware::AuthUser;
use crate::error::AppError;
use crate::models::user::Role;

fn authenticated(parts: &Parts) -> Result<AuthUser, AppError> {
    parts
        .extensions
        .get::<AuthUser>()
        .cloned()
        .ok_or(AppError::Unauthorized)
}

/// Requires the `doctor` role.
///
/// ```ignore
/// async fn handler(RequireDoctor(doctor): RequireDoctor) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireDoctor(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireDoctor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;
        if user.role != Role::Doctor {
            return Err(AppError::Forbidden(
                "This endpoint is only available to doctors".into(),
            ));
        }
        Ok(RequireDoctor(user))
    }
}

/// Requires the `patient` role.
pub struct RequirePatient(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequirePatient
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;
        if user.role != Role::Patient {
            return Err(AppError::Forbidden(
                "This endpoint is only available to patients".into(),
            ));
        }
        Ok(RequirePatient(user))
    }
}
