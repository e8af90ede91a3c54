pub mod health;

#[cfg(test)]
mod tests;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::state::AppState;
use crate::{applications, auth, companies, dashboard, jobs, legacy, profile, resumes};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route(
            "/api/auth/jobseeker/register",
            post(auth::handlers::handle_register_job_seeker),
        )
        .route(
            "/api/auth/jobseeker/login",
            post(auth::handlers::handle_login_job_seeker),
        )
        .route(
            "/api/auth/recruiter/register",
            post(auth::handlers::handle_register_recruiter),
        )
        .route(
            "/api/auth/recruiter/login",
            post(auth::handlers::handle_login_recruiter),
        )
        .route("/api/auth/me", get(auth::handlers::handle_me))
        .route(
            "/api/v1/job-seekers/me/profile",
            get(profile::handlers::handle_get_profile).put(profile::handlers::handle_update_profile),
        )
        // Jobs and applications
        .route(
            "/api/v1/jobs",
            get(jobs::handlers::handle_list_jobs).post(jobs::handlers::handle_post_job),
        )
        .route("/api/v1/jobs/:id", get(jobs::handlers::handle_get_job))
        .route(
            "/api/v1/jobs/:id/apply-options",
            get(applications::handlers::handle_apply_options),
        )
        .route(
            "/api/v1/jobs/:id/apply",
            post(applications::handlers::handle_apply),
        )
        .route(
            "/api/v1/jobs/:id/applications",
            get(applications::handlers::handle_job_applications),
        )
        .route(
            "/api/v1/applications",
            get(applications::handlers::handle_my_applications),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(applications::handlers::handle_update_status),
        )
        // Companies
        .route(
            "/api/v1/companies",
            get(companies::handlers::handle_list_companies)
                .post(companies::handlers::handle_create_company),
        )
        .route(
            "/api/v1/companies/:id",
            get(companies::handlers::handle_get_company),
        )
        // Resumes
        .route(
            "/api/v1/resumes",
            get(resumes::handlers::handle_list_resumes).post(resumes::handlers::handle_create_resume),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handlers::handle_get_resume)
                .put(resumes::handlers::handle_update_resume)
                .delete(resumes::handlers::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/duplicate",
            post(resumes::handlers::handle_duplicate_resume),
        )
        // Dashboards
        .route(
            "/api/v1/dashboard/recruiter",
            get(dashboard::handlers::handle_recruiter_dashboard),
        )
        .route(
            "/api/v1/dashboard/job-seeker",
            get(dashboard::handlers::handle_job_seeker_dashboard),
        )
        // Legacy browser-store snapshots
        .route("/api/v1/legacy/audit", post(legacy::handlers::handle_audit))
        .route(
            "/api/v1/legacy/import-resumes",
            post(legacy::handlers::handle_import_resumes),
        )
        .with_state(state)
}
