use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum! {
    Role {
        JobSeeker => "jobseeker",
        Recruiter => "recruiter",
    }
}

/// Optional profile fields a job seeker fills in at registration or later.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JobSeekerProfile {
    pub phone: Option<String>,
    pub current_job_title: Option<String>,
    pub years_of_experience: Option<String>,
    pub education: Option<String>,
    pub skills: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub bio: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub preferred_job_types: Vec<String>,
    pub expected_salary: Option<String>,
    pub notice_period: Option<String>,
    pub languages: Vec<String>,
    pub certifications: Vec<String>,
}

impl JobSeekerProfile {
    /// Trims every text field, turns blanks into `None` and drops blank list
    /// items.
    pub fn normalized(mut self) -> Self {
        for text in [
            &mut self.phone,
            &mut self.current_job_title,
            &mut self.years_of_experience,
            &mut self.education,
            &mut self.city,
            &mut self.state,
            &mut self.country,
            &mut self.bio,
            &mut self.linkedin_url,
            &mut self.github_url,
            &mut self.portfolio_url,
            &mut self.expected_salary,
            &mut self.notice_period,
        ] {
            *text = text
                .take()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
        }
        for list in [
            &mut self.skills,
            &mut self.preferred_job_types,
            &mut self.languages,
            &mut self.certifications,
        ] {
            list.retain(|item| !item.trim().is_empty());
            for item in list.iter_mut() {
                *item = item.trim().to_string();
            }
        }
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSeeker {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    #[serde(flatten)]
    pub profile: JobSeekerProfile,
    pub profile_complete: bool,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Recruiter {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
