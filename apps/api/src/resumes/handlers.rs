use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::credentials::non_blank;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::resume::{Resume, ResumeData};
use crate::resumes::library::{
    copy_name, default_resume_name, resolve_template, sort_resumes, ResumeSort,
};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateResumeRequest {
    pub name: Option<String>,
    pub template: Option<String>,
    pub data: ResumeData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateResumeRequest {
    pub name: Option<String>,
    pub template: Option<String>,
    pub data: Option<ResumeData>,
}

#[derive(Debug, Deserialize)]
pub struct ResumeListQuery {
    pub sort: Option<String>,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Resume {id} not found"))
}

async fn load_own(state: &AppState, owner_id: Uuid, id: Uuid) -> Result<Resume, AppError> {
    state
        .store
        .get_resume(owner_id, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<Resume>), AppError> {
    let owner_id = user.require_job_seeker()?;
    let data = req.data.normalized();
    let now = Utc::now();

    let resume = Resume {
        id: Uuid::new_v4(),
        owner_id,
        name: non_blank(req.name).unwrap_or_else(|| default_resume_name(&data.personal)),
        template: resolve_template(req.template.as_deref())?,
        data,
        last_modified: now,
        created_at: now,
        job_applications: 0,
    };
    state.store.insert_resumes(std::slice::from_ref(&resume)).await?;

    info!(resume_id = %resume.id, "Resume saved");
    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /api/v1/resumes?sort=recent
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ResumeListQuery>,
) -> Result<Json<Vec<Resume>>, AppError> {
    let owner_id = user.require_job_seeker()?;
    let sort = match non_blank(params.sort) {
        Some(raw) => raw.parse::<ResumeSort>().map_err(AppError::Validation)?,
        None => ResumeSort::Recent,
    };

    let mut resumes = state.store.list_resumes(owner_id).await?;
    sort_resumes(&mut resumes, sort);
    Ok(Json(resumes))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<Resume>, AppError> {
    let owner_id = user.require_job_seeker()?;
    Ok(Json(load_own(&state, owner_id, id).await?))
}

/// PUT /api/v1/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(req): Json<UpdateResumeRequest>,
) -> Result<Json<Resume>, AppError> {
    let owner_id = user.require_job_seeker()?;
    let mut resume = load_own(&state, owner_id, id).await?;

    if let Some(name) = non_blank(req.name) {
        resume.name = name;
    }
    if req.template.is_some() {
        resume.template = resolve_template(req.template.as_deref())?;
    }
    if let Some(data) = req.data {
        resume.data = data.normalized();
    }
    resume.last_modified = Utc::now();

    let updated = state
        .store
        .update_resume(&resume)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(updated))
}

/// DELETE /api/v1/resumes/:id
///
/// Applications made with the resume keep its name and lose the link.
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<StatusCode, AppError> {
    let owner_id = user.require_job_seeker()?;
    if !state.store.delete_resume(owner_id, id).await? {
        return Err(not_found(id));
    }
    info!(resume_id = %id, "Resume deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/:id/duplicate
pub async fn handle_duplicate_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<(StatusCode, Json<Resume>), AppError> {
    let owner_id = user.require_job_seeker()?;
    let original = load_own(&state, owner_id, id).await?;
    let now = Utc::now();

    let copy = Resume {
        id: Uuid::new_v4(),
        name: copy_name(&original.name),
        last_modified: now,
        created_at: now,
        job_applications: 0,
        ..original
    };
    state.store.insert_resumes(std::slice::from_ref(&copy)).await?;

    info!(resume_id = %copy.id, source_id = %id, "Resume duplicated");
    Ok((StatusCode::CREATED, Json(copy)))
}
