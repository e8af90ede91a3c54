use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::dashboard::feed::{to_feed, FeedItem, FEED_LIMIT};
use crate::dashboard::stats::{
    recruiter_stats, seeker_stats, JobPostingSummary, RecruiterStats, SeekerStats,
};
use crate::errors::AppError;
use crate::models::application::Application;
use crate::models::company::Company;
use crate::profile::completeness::{compute_completeness_report, CompletenessReport};
use crate::state::AppState;

const RECENT_APPLICATIONS: usize = 5;

#[derive(Serialize)]
pub struct RecruiterDashboard {
    pub stats: RecruiterStats,
    pub company: Option<Company>,
    pub job_postings: Vec<JobPostingSummary>,
    pub activities: Vec<FeedItem>,
}

#[derive(Serialize)]
pub struct JobSeekerDashboard {
    pub stats: SeekerStats,
    pub recent_applications: Vec<Application>,
    pub activities: Vec<FeedItem>,
    pub profile: CompletenessReport,
}

/// GET /api/v1/dashboard/recruiter
pub async fn handle_recruiter_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<RecruiterDashboard>, AppError> {
    let recruiter_id = user.require_recruiter()?;
    let recruiter = state
        .store
        .get_recruiter(recruiter_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("Account no longer exists"))?;

    let company = match recruiter.company_id {
        Some(id) => state.store.get_company(id).await?,
        None => None,
    };
    let jobs = state.store.jobs_posted_by(recruiter_id).await?;
    let applications = state.store.applications_for_recruiter(recruiter_id).await?;
    let activities = state
        .store
        .recent_activities(recruiter_id, FEED_LIMIT)
        .await?;

    let now = Utc::now();
    Ok(Json(RecruiterDashboard {
        stats: recruiter_stats(&jobs, &applications, now.date_naive()),
        company,
        job_postings: jobs.iter().map(JobPostingSummary::from).collect(),
        activities: to_feed(activities, now),
    }))
}

/// GET /api/v1/dashboard/job-seeker
pub async fn handle_job_seeker_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<JobSeekerDashboard>, AppError> {
    let seeker_id = user.require_job_seeker()?;
    let seeker = state
        .store
        .get_job_seeker(seeker_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("Account no longer exists"))?;

    let applications = state.store.applications_for_seeker(seeker_id).await?;
    let resumes = state.store.list_resumes(seeker_id).await?;
    let activities = state.store.recent_activities(seeker_id, FEED_LIMIT).await?;

    let stats = seeker_stats(&applications, resumes.len());
    let mut recent_applications = applications;
    recent_applications.truncate(RECENT_APPLICATIONS);

    Ok(Json(JobSeekerDashboard {
        stats,
        recent_applications,
        activities: to_feed(activities, Utc::now()),
        profile: compute_completeness_report(&seeker.profile),
    }))
}
