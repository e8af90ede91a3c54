use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::companies::directory::{
    build_company, search_companies, CompanyQuery, CreateCompanyRequest,
};
use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::company::Company;
use crate::models::job::Job;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

/// POST /api/v1/companies
pub async fn handle_create_company(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<Company>), AppError> {
    let recruiter_id = user.require_recruiter()?;
    let company = build_company(req, recruiter_id, Utc::now())?;
    state.store.create_company_for(recruiter_id, &company).await?;

    info!(company_id = %company.id, "Company created");
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /api/v1/companies?q=&industry=
pub async fn handle_list_companies(
    State(state): State<AppState>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<Vec<Company>>, AppError> {
    let companies = state.store.list_companies().await?;
    Ok(Json(search_companies(companies, &query)))
}

/// GET /api/v1/companies/:id
pub async fn handle_get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompanyDetail>, AppError> {
    let company = state
        .store
        .get_company(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {id} not found")))?;
    let jobs = state.store.jobs_for_company(id).await?;
    Ok(Json(CompanyDetail { company, jobs }))
}
