use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

text_enum! {
    ApplicationStatus {
        Applied => "Applied",
        Interview => "Interview",
        Rejected => "Rejected",
        Offer => "Offer",
    }
}

/// A job seeker's application to one job with one of their resumes.
///
/// `job_title`, `company`, `location` and `resume_name` are snapshots taken at
/// apply time so the record stays readable after the resume is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub job_seeker_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub resume_name: String,
    pub application_date: DateTime<Utc>,
    pub status: ApplicationStatus,
}
