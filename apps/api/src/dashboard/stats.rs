use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::Job;

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct RecruiterStats {
    /// Listings whose application deadline has not passed.
    pub active_listings: usize,
    pub total_applicants: i64,
    /// Applications still in `Applied`.
    pub pending_reviews: usize,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct SeekerStats {
    pub applied_jobs: usize,
    pub interviews: usize,
    pub offers: usize,
    pub saved_resumes: usize,
}

#[derive(Debug, Serialize)]
pub struct JobPostingSummary {
    pub id: Uuid,
    pub title: String,
    pub posted_date: DateTime<Utc>,
    pub applicants_count: i64,
}

impl From<&Job> for JobPostingSummary {
    fn from(job: &Job) -> Self {
        JobPostingSummary {
            id: job.id,
            title: job.title.clone(),
            posted_date: job.posted_date,
            applicants_count: job.applicants_count,
        }
    }
}

fn count_status(applications: &[Application], status: ApplicationStatus) -> usize {
    applications.iter().filter(|a| a.status == status).count()
}

pub fn recruiter_stats(jobs: &[Job], applications: &[Application], today: NaiveDate) -> RecruiterStats {
    RecruiterStats {
        active_listings: jobs.iter().filter(|j| !j.deadline_passed(today)).count(),
        total_applicants: jobs.iter().map(|j| j.applicants_count).sum(),
        pending_reviews: count_status(applications, ApplicationStatus::Applied),
    }
}

pub fn seeker_stats(applications: &[Application], saved_resumes: usize) -> SeekerStats {
    SeekerStats {
        applied_jobs: applications.len(),
        interviews: count_status(applications, ApplicationStatus::Interview),
        offers: count_status(applications, ApplicationStatus::Offer),
        saved_resumes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{EmploymentType, ExperienceLevel, LocationType, Salary};

    fn job(applicants: i64, deadline: Option<NaiveDate>) -> Job {
        Job {
            id: Uuid::new_v4(),
            title: "t".into(),
            department: None,
            company: "c".into(),
            company_id: None,
            location: "l".into(),
            location_type: LocationType::Onsite,
            employment_type: EmploymentType::FullTime,
            experience_level: ExperienceLevel::Entry,
            salary: Salary::default(),
            description: "d".into(),
            responsibilities: vec![],
            requirements: vec![],
            benefits: vec![],
            application_deadline: deadline,
            application_url: None,
            posted_date: Utc::now(),
            posted_by: Uuid::nil(),
            applicants_count: applicants,
        }
    }

    fn application(status: ApplicationStatus) -> Application {
        Application {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            job_title: "t".into(),
            company: "c".into(),
            location: "l".into(),
            job_seeker_id: Uuid::new_v4(),
            resume_id: None,
            resume_name: "r".into(),
            application_date: Utc::now(),
            status,
        }
    }

    #[test]
    fn test_recruiter_stats() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let jobs = vec![
            job(2, None),
            job(1, NaiveDate::from_ymd_opt(2025, 6, 15)),
            job(4, NaiveDate::from_ymd_opt(2025, 6, 1)),
        ];
        let apps = vec![
            application(ApplicationStatus::Applied),
            application(ApplicationStatus::Interview),
            application(ApplicationStatus::Applied),
        ];
        assert_eq!(
            recruiter_stats(&jobs, &apps, today),
            RecruiterStats {
                active_listings: 2,
                total_applicants: 7,
                pending_reviews: 2,
            }
        );
    }

    #[test]
    fn test_seeker_stats() {
        let apps = vec![
            application(ApplicationStatus::Applied),
            application(ApplicationStatus::Interview),
            application(ApplicationStatus::Offer),
            application(ApplicationStatus::Rejected),
        ];
        assert_eq!(
            seeker_stats(&apps, 3),
            SeekerStats {
                applied_jobs: 4,
                interviews: 1,
                offers: 1,
                saved_resumes: 3,
            }
        );
    }
}
