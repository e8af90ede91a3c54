use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::credentials::{
    is_valid_email, is_valid_full_name, non_blank, normalize_email, password_problem, split_skills,
};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::Json;
use crate::models::company::Company;
use crate::models::user::{JobSeeker, JobSeekerProfile, Recruiter, Role};
use crate::profile::completeness::compute_completeness_report;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobSeekerRegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub current_job_title: Option<String>,
    pub years_of_experience: Option<String>,
    pub education: Option<String>,
    /// Comma-separated.
    pub skills: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecruiterRegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse<U> {
    pub message: &'static str,
    pub user: U,
}

#[derive(Serialize)]
pub struct LoginResponse<U> {
    pub message: &'static str,
    pub user: U,
    pub token: String,
}

#[derive(Serialize)]
#[serde(tag = "role", content = "user", rename_all = "lowercase")]
pub enum MeResponse {
    #[serde(rename = "jobseeker")]
    JobSeeker(JobSeeker),
    Recruiter(Recruiter),
}

struct Credentials {
    email: String,
    password: String,
    full_name: String,
}

/// Checks shared by both registration routes.
fn validate_registration(
    email: Option<String>,
    password: Option<String>,
    full_name: Option<String>,
) -> Result<Credentials, AppError> {
    let (Some(email), Some(password), Some(full_name)) =
        (non_blank(email), password.filter(|p| !p.is_empty()), non_blank(full_name))
    else {
        return Err(AppError::Validation("Missing required fields".to_string()));
    };

    let email = normalize_email(&email);
    if !is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    if let Some(problem) = password_problem(&password) {
        return Err(AppError::Validation(problem.to_string()));
    }
    if !is_valid_full_name(&full_name) {
        return Err(AppError::Validation(
            "Full name must be at least 2 characters".to_string(),
        ));
    }
    Ok(Credentials {
        email,
        password,
        full_name,
    })
}

fn validate_login(req: LoginRequest) -> Result<(String, String), AppError> {
    match (non_blank(req.email), req.password.filter(|p| !p.is_empty())) {
        (Some(email), Some(password)) => Ok((normalize_email(&email), password)),
        _ => Err(AppError::Validation(
            "Email and password are required".to_string(),
        )),
    }
}

fn invalid_login() -> AppError {
    AppError::unauthorized("Invalid email or password")
}

/// The store reports a taken email as a conflict; registration answers 400.
fn email_taken(err: AppError) -> AppError {
    match err {
        AppError::Conflict(_) => AppError::Validation("Email already registered".to_string()),
        other => other,
    }
}

/// POST /api/auth/jobseeker/register
pub async fn handle_register_job_seeker(
    State(state): State<AppState>,
    Json(req): Json<JobSeekerRegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse<JobSeeker>>), AppError> {
    let creds = validate_registration(req.email, req.password, req.full_name)?;

    let profile = JobSeekerProfile {
        phone: req.phone,
        current_job_title: req.current_job_title,
        years_of_experience: req.years_of_experience,
        education: req.education,
        skills: req.skills.as_deref().map(split_skills).unwrap_or_default(),
        city: req.city,
        state: req.state,
        country: req.country,
        ..Default::default()
    }
    .normalized();
    let profile_complete = compute_completeness_report(&profile).is_complete();

    let seeker = JobSeeker {
        id: Uuid::new_v4(),
        email: creds.email,
        password_hash: hash_password(creds.password).await?,
        full_name: creds.full_name.trim().to_string(),
        profile,
        profile_complete,
        email_verified: false,
        phone_verified: false,
        created_at: Utc::now(),
    };
    state
        .store
        .insert_job_seeker(&seeker)
        .await
        .map_err(email_taken)?;

    info!(user_id = %seeker.id, "Job seeker registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful",
            user: seeker,
        }),
    ))
}

/// POST /api/auth/recruiter/register
pub async fn handle_register_recruiter(
    State(state): State<AppState>,
    Json(req): Json<RecruiterRegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse<Recruiter>>), AppError> {
    let creds = validate_registration(req.email, req.password, req.full_name)?;

    let recruiter_id = Uuid::new_v4();
    let now = Utc::now();
    let company = non_blank(req.company_name).map(|name| Company {
        id: Uuid::new_v4(),
        name,
        industry: None,
        location: None,
        description: None,
        website: None,
        logo: None,
        created_by: Some(recruiter_id),
        created_at: now,
        job_count: 0,
    });

    let recruiter = Recruiter {
        id: recruiter_id,
        email: creds.email,
        password_hash: hash_password(creds.password).await?,
        full_name: creds.full_name.trim().to_string(),
        company_id: company.as_ref().map(|c| c.id),
        created_at: now,
    };
    state
        .store
        .insert_recruiter(&recruiter, company.as_ref())
        .await
        .map_err(email_taken)?;

    info!(
        user_id = %recruiter.id,
        with_company = company.is_some(),
        "Recruiter registered"
    );
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful",
            user: recruiter,
        }),
    ))
}

/// POST /api/auth/jobseeker/login
pub async fn handle_login_job_seeker(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse<JobSeeker>>, AppError> {
    let (email, password) = validate_login(req)?;

    let account = state.store.find_job_seeker_by_email(&email).await?;
    let stored = account.as_ref().map(|a| a.password_hash.clone());
    let verified = verify_password(password, stored).await?;
    let Some(seeker) = account else {
        warn!("Job seeker login for unknown email");
        return Err(invalid_login());
    };
    if !verified {
        warn!(user_id = %seeker.id, "Job seeker login with wrong password");
        return Err(invalid_login());
    }

    let token = state.tokens.issue(seeker.id, &seeker.email, Role::JobSeeker)?;
    info!(user_id = %seeker.id, "Job seeker logged in");
    Ok(Json(LoginResponse {
        message: "Login successful",
        user: seeker,
        token,
    }))
}

/// POST /api/auth/recruiter/login
pub async fn handle_login_recruiter(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse<Recruiter>>, AppError> {
    let (email, password) = validate_login(req)?;

    let account = state.store.find_recruiter_by_email(&email).await?;
    let stored = account.as_ref().map(|a| a.password_hash.clone());
    let verified = verify_password(password, stored).await?;
    let Some(recruiter) = account else {
        warn!("Recruiter login for unknown email");
        return Err(invalid_login());
    };
    if !verified {
        warn!(user_id = %recruiter.id, "Recruiter login with wrong password");
        return Err(invalid_login());
    }

    let token = state
        .tokens
        .issue(recruiter.id, &recruiter.email, Role::Recruiter)?;
    info!(user_id = %recruiter.id, "Recruiter logged in");
    Ok(Json(LoginResponse {
        message: "Login successful",
        user: recruiter,
        token,
    }))
}

/// GET /api/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    // A valid token for a since-removed account is treated as unauthenticated.
    let gone = || {
        warn!(email = %user.email, "Token names an account that no longer exists");
        AppError::unauthorized("Account no longer exists")
    };
    let me = match user.role {
        Role::JobSeeker => MeResponse::JobSeeker(
            state.store.get_job_seeker(user.id).await?.ok_or_else(gone)?,
        ),
        Role::Recruiter => MeResponse::Recruiter(
            state.store.get_recruiter(user.id).await?.ok_or_else(gone)?,
        ),
    };
    Ok(Json(me))
}
