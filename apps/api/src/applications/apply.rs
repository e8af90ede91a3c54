//! One-click apply: which resume goes with the application, and the records
//! an application writes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::activity::Activity;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::Job;
use crate::models::resume::Resume;

/// What the client should do when the seeker presses "Apply".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    /// Exactly one resume: apply straight away.
    Direct,
    /// Several resumes: ask which one.
    Select,
    /// No resumes: send the seeker to the builder.
    CreateResume,
}

pub fn apply_mode(resume_count: usize) -> ApplyMode {
    match resume_count {
        0 => ApplyMode::CreateResume,
        1 => ApplyMode::Direct,
        _ => ApplyMode::Select,
    }
}

/// Picks the resume to attach. `resumes` are the applicant's own resumes.
pub fn resolve_resume(resumes: &[Resume], requested: Option<Uuid>) -> Result<&Resume, AppError> {
    match (resumes, requested) {
        ([], _) => Err(AppError::Rejected {
            code: "RESUME_REQUIRED",
            message: "Create a resume before applying".to_string(),
        }),
        (_, Some(id)) => resumes
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found"))),
        ([only], None) => Ok(only),
        (_, None) => Err(AppError::Rejected {
            code: "RESUME_SELECTION_REQUIRED",
            message: "Choose which resume to apply with".to_string(),
        }),
    }
}

pub fn build_application(
    job: &Job,
    applicant_id: Uuid,
    resume: &Resume,
    now: DateTime<Utc>,
) -> Application {
    Application {
        id: Uuid::new_v4(),
        job_id: job.id,
        job_title: job.title.clone(),
        company: job.company.clone(),
        location: job.location.clone(),
        job_seeker_id: applicant_id,
        resume_id: Some(resume.id),
        resume_name: resume.name.clone(),
        application_date: now,
        status: ApplicationStatus::Applied,
    }
}

/// Feed entries for the applicant and for the job's poster.
pub fn apply_activities(job: &Job, applicant_id: Uuid, applicant_name: &str) -> [Activity; 2] {
    [
        Activity::own(
            applicant_id,
            format!("Applied to '{}' at {}", job.title, job.company),
        ),
        Activity::by(
            job.posted_by,
            applicant_name,
            format!("New applicant for {}", job.title),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{EmploymentType, ExperienceLevel, LocationType, Salary};
    use crate::models::resume::ResumeData;

    fn resume(name: &str) -> Resume {
        Resume {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: name.into(),
            template: "Professional".into(),
            data: ResumeData::default(),
            last_modified: Utc::now(),
            created_at: Utc::now(),
            job_applications: 0,
        }
    }

    fn job() -> Job {
        Job {
            id: Uuid::new_v4(),
            title: "Backend Engineer".into(),
            department: None,
            company: "Acme".into(),
            company_id: None,
            location: "Pune".into(),
            location_type: LocationType::Hybrid,
            employment_type: EmploymentType::FullTime,
            experience_level: ExperienceLevel::Mid,
            salary: Salary::default(),
            description: "d".into(),
            responsibilities: vec![],
            requirements: vec![],
            benefits: vec![],
            application_deadline: None,
            application_url: None,
            posted_date: Utc::now(),
            posted_by: Uuid::new_v4(),
            applicants_count: 0,
        }
    }

    #[test]
    fn test_no_resumes_requires_builder() {
        assert_eq!(apply_mode(0), ApplyMode::CreateResume);
        let err = resolve_resume(&[], Some(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, AppError::Rejected { code: "RESUME_REQUIRED", .. }));
    }

    #[test]
    fn test_single_resume_used_directly() {
        let resumes = vec![resume("Main")];
        assert_eq!(apply_mode(resumes.len()), ApplyMode::Direct);
        assert_eq!(resolve_resume(&resumes, None).unwrap().id, resumes[0].id);
    }

    #[test]
    fn test_several_resumes_need_selection() {
        let resumes = vec![resume("A"), resume("B")];
        assert_eq!(apply_mode(resumes.len()), ApplyMode::Select);
        assert!(matches!(
            resolve_resume(&resumes, None).unwrap_err(),
            AppError::Rejected { code: "RESUME_SELECTION_REQUIRED", .. }
        ));
        assert_eq!(
            resolve_resume(&resumes, Some(resumes[1].id)).unwrap().name,
            "B"
        );
    }

    #[test]
    fn test_foreign_resume_not_found() {
        let resumes = vec![resume("A")];
        assert!(matches!(
            resolve_resume(&resumes, Some(Uuid::new_v4())).unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn test_application_snapshot_and_feed() {
        let job = job();
        let chosen = resume("Main");
        let seeker = Uuid::new_v4();
        let app = build_application(&job, seeker, &chosen, Utc::now());
        assert_eq!(app.resume_id, Some(chosen.id));
        assert_eq!(app.resume_name, "Main");
        assert_eq!(app.status, ApplicationStatus::Applied);

        let [mine, theirs] = apply_activities(&job, seeker, "Asha Verma");
        assert_eq!(mine.user_id, seeker);
        assert_eq!(mine.action, "Applied to 'Backend Engineer' at Acme");
        assert_eq!(theirs.user_id, job.posted_by);
        assert_eq!(theirs.actor, "Asha Verma");
        assert_eq!(theirs.action, "New applicant for Backend Engineer");
    }
}
