use axum::extract::State;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::Json;
use crate::models::user::{JobSeeker, JobSeekerProfile};
use crate::profile::completeness::{compute_completeness_report, CompletenessReport};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: JobSeeker,
    pub completeness: CompletenessReport,
}

/// GET /api/v1/job-seekers/me/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let id = user.require_job_seeker()?;
    let seeker = state
        .store
        .get_job_seeker(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job seeker not found".to_string()))?;
    let completeness = compute_completeness_report(&seeker.profile);
    Ok(Json(ProfileResponse {
        user: seeker,
        completeness,
    }))
}

/// PUT /api/v1/job-seekers/me/profile
///
/// Replaces the whole profile; omitted fields are cleared.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(profile): Json<JobSeekerProfile>,
) -> Result<Json<ProfileResponse>, AppError> {
    let id = user.require_job_seeker()?;
    let profile = profile.normalized();
    let completeness = compute_completeness_report(&profile);

    let seeker = state
        .store
        .update_job_seeker_profile(id, &profile, completeness.is_complete())
        .await?
        .ok_or_else(|| AppError::NotFound("Job seeker not found".to_string()))?;

    tracing::info!(user_id = %id, score = completeness.overall_score, "Profile updated");
    Ok(Json(ProfileResponse {
        user: seeker,
        completeness,
    }))
}
