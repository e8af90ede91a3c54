use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::jobs::posting::{build_job, PostJobRequest};
use crate::jobs::search::{filter_jobs, JobFilter, JobQuery};
use crate::models::activity::Activity;
use crate::models::job::Job;
use crate::state::AppState;

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<Json<Vec<Job>>, AppError> {
    let filter = JobFilter::from_query(&query)?;
    let jobs = state.store.list_jobs().await?;
    Ok(Json(filter_jobs(jobs, &filter)))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    let job = state
        .store
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(job))
}

/// POST /api/v1/jobs
pub async fn handle_post_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<PostJobRequest>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let recruiter_id = user.require_recruiter()?;
    let recruiter = state
        .store
        .get_recruiter(recruiter_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("Account no longer exists"))?;

    let company = match recruiter.company_id {
        Some(company_id) => state.store.get_company(company_id).await?,
        None => None,
    };

    let job = build_job(req, &recruiter, company.as_ref(), Utc::now())?;
    let activity = Activity::own(
        recruiter.id,
        format!("Job listing '{}' published", job.title),
    );
    state.store.post_job(&job, &activity).await?;

    info!(job_id = %job.id, company_id = ?job.company_id, "Job posted");
    Ok((StatusCode::CREATED, Json(job)))
}
