use axum::{async_trait, extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::Role;
use crate::state::AppState;

/// Caller identity taken from a `Bearer` token. Adding it to a handler's
/// arguments makes the route require authentication.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require_recruiter(&self) -> Result<Uuid, AppError> {
        match self.role {
            Role::Recruiter => Ok(self.id),
            Role::JobSeeker => Err(AppError::Forbidden),
        }
    }

    pub fn require_job_seeker(&self) -> Result<Uuid, AppError> {
        match self.role {
            Role::JobSeeker => Ok(self.id),
            Role::Recruiter => Err(AppError::Forbidden),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Expected a Bearer token"))?;

        let claims = state.tokens.verify(token)?;
        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}
