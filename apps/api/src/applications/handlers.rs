use axum::{body::Bytes, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::applications::apply::{
    apply_activities, apply_mode, build_application, resolve_resume, ApplyMode,
};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{Json, Path};
use crate::models::activity::Activity;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::Job;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ApplyRequest {
    pub resume_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Serialize)]
pub struct ResumeChoice {
    pub id: Uuid,
    pub name: String,
    pub template: String,
    pub last_modified: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ApplyOptionsResponse {
    pub mode: ApplyMode,
    pub resumes: Vec<ResumeChoice>,
    pub already_applied: bool,
    pub deadline_passed: bool,
}

async fn load_job(state: &AppState, id: Uuid) -> Result<Job, AppError> {
    state
        .store
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// GET /api/v1/jobs/:id/apply-options
pub async fn handle_apply_options(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApplyOptionsResponse>, AppError> {
    let seeker_id = user.require_job_seeker()?;
    let job = load_job(&state, job_id).await?;

    let resumes = state.store.list_resumes(seeker_id).await?;
    let already_applied = state
        .store
        .applications_for_seeker(seeker_id)
        .await?
        .iter()
        .any(|a| a.job_id == job.id);

    Ok(Json(ApplyOptionsResponse {
        mode: apply_mode(resumes.len()),
        resumes: resumes
            .into_iter()
            .map(|r| ResumeChoice {
                id: r.id,
                name: r.name,
                template: r.template,
                last_modified: r.last_modified,
            })
            .collect(),
        already_applied,
        deadline_passed: job.deadline_passed(Utc::now().date_naive()),
    }))
}

/// An empty body means no explicit selection. Anything else must be a valid
/// `ApplyRequest`.
fn parse_apply_body(body: &[u8]) -> Result<ApplyRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApplyRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid apply request: {e}")))
}

/// POST /api/v1/jobs/:id/apply
///
/// The body is optional; without a `resume_id` the seeker's only resume is
/// used.
pub async fn handle_apply(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    user: AuthUser,
    body: Bytes,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let seeker_id = user.require_job_seeker()?;
    let requested = parse_apply_body(&body)?.resume_id;

    let job = load_job(&state, job_id).await?;
    let now = Utc::now();
    if job.deadline_passed(now.date_naive()) {
        return Err(AppError::UnprocessableEntity(
            "The application deadline for this job has passed".to_string(),
        ));
    }

    let resumes = state.store.list_resumes(seeker_id).await?;
    let resume = resolve_resume(&resumes, requested)?;

    let seeker = state
        .store
        .get_job_seeker(seeker_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("Account no longer exists"))?;

    let application = build_application(&job, seeker_id, resume, now);
    let activities = apply_activities(&job, seeker_id, &seeker.full_name);
    state
        .store
        .record_application(&application, &activities)
        .await?;

    info!(
        application_id = %application.id,
        job_id = %job.id,
        resume_id = %resume.id,
        "Application submitted"
    );
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/v1/applications
pub async fn handle_my_applications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Application>>, AppError> {
    let seeker_id = user.require_job_seeker()?;
    Ok(Json(state.store.applications_for_seeker(seeker_id).await?))
}

/// GET /api/v1/jobs/:id/applications
pub async fn handle_job_applications(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<Vec<Application>>, AppError> {
    let recruiter_id = user.require_recruiter()?;
    let job = load_job(&state, job_id).await?;
    if job.posted_by != recruiter_id {
        return Err(AppError::Forbidden);
    }
    Ok(Json(state.store.applications_for_job(job.id).await?))
}

/// PATCH /api/v1/applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<Application>, AppError> {
    let recruiter_id = user.require_recruiter()?;
    let status: ApplicationStatus = req.status.parse().map_err(AppError::Validation)?;

    let application = state
        .store
        .get_application(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;
    let job = load_job(&state, application.job_id).await?;
    if job.posted_by != recruiter_id {
        return Err(AppError::Forbidden);
    }

    let activity = Activity::by(
        application.job_seeker_id,
        job.company.clone(),
        format!("Your application for {} is now {}", job.title, status),
    );
    let updated = state
        .store
        .set_application_status(id, status, &activity)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;

    info!(application_id = %id, status = %status, "Application status changed");
    Ok(Json(updated))
}
