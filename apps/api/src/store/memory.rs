//! Process-local `PortalStore` used by tests and `STORAGE_BACKEND=memory`.
//!
//! All tables sit behind one `RwLock`; writers hold the guard for the whole
//! operation, so multi-record writes are atomic with respect to other requests.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::activity::Activity;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::company::Company;
use crate::models::job::Job;
use crate::models::resume::Resume;
use crate::models::user::{JobSeeker, JobSeekerProfile, Recruiter};
use crate::store::{PortalStore, StoreResult};

#[derive(Default)]
struct Tables {
    job_seekers: Vec<JobSeeker>,
    recruiters: Vec<Recruiter>,
    companies: Vec<Company>,
    jobs: Vec<Job>,
    applications: Vec<Application>,
    resumes: Vec<Resume>,
    activities: Vec<Activity>,
}

impl Tables {
    fn job_view(&self, job: &Job) -> Job {
        let mut job = job.clone();
        job.applicants_count = self
            .applications
            .iter()
            .filter(|a| a.job_id == job.id)
            .count() as i64;
        job
    }

    fn company_view(&self, company: &Company) -> Company {
        let mut company = company.clone();
        company.job_count = self
            .jobs
            .iter()
            .filter(|j| j.company_id == Some(company.id))
            .count() as i64;
        company
    }

    fn resume_view(&self, resume: &Resume) -> Resume {
        let mut resume = resume.clone();
        resume.job_applications = self
            .applications
            .iter()
            .filter(|a| a.resume_id == Some(resume.id))
            .count() as i64;
        resume
    }

    fn jobs_where(&self, pred: impl Fn(&Job) -> bool) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .jobs
            .iter()
            .filter(|j| pred(j))
            .map(|j| self.job_view(j))
            .collect();
        jobs.sort_by(|a, b| b.posted_date.cmp(&a.posted_date));
        jobs
    }

    fn applications_where(&self, pred: impl Fn(&Application) -> bool) -> Vec<Application> {
        let mut apps: Vec<Application> = self
            .applications
            .iter()
            .filter(|a| pred(a))
            .cloned()
            .collect();
        apps.sort_by(|a, b| b.application_date.cmp(&a.application_date));
        apps
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PortalStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert_job_seeker(&self, seeker: &JobSeeker) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if t
            .job_seekers
            .iter()
            .any(|s| s.email.eq_ignore_ascii_case(&seeker.email))
        {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        t.job_seekers.push(seeker.clone());
        Ok(())
    }

    async fn find_job_seeker_by_email(&self, email: &str) -> StoreResult<Option<JobSeeker>> {
        let t = self.tables.read().await;
        Ok(t.job_seekers
            .iter()
            .find(|s| s.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_job_seeker(&self, id: Uuid) -> StoreResult<Option<JobSeeker>> {
        let t = self.tables.read().await;
        Ok(t.job_seekers.iter().find(|s| s.id == id).cloned())
    }

    async fn update_job_seeker_profile(
        &self,
        id: Uuid,
        profile: &JobSeekerProfile,
        profile_complete: bool,
    ) -> StoreResult<Option<JobSeeker>> {
        let mut t = self.tables.write().await;
        Ok(t.job_seekers.iter_mut().find(|s| s.id == id).map(|s| {
            s.profile = profile.clone();
            s.profile_complete = profile_complete;
            s.clone()
        }))
    }

    async fn insert_recruiter(
        &self,
        recruiter: &Recruiter,
        company: Option<&Company>,
    ) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if t
            .recruiters
            .iter()
            .any(|r| r.email.eq_ignore_ascii_case(&recruiter.email))
        {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        if let Some(company) = company {
            t.companies.push(company.clone());
        }
        t.recruiters.push(recruiter.clone());
        Ok(())
    }

    async fn find_recruiter_by_email(&self, email: &str) -> StoreResult<Option<Recruiter>> {
        let t = self.tables.read().await;
        Ok(t.recruiters
            .iter()
            .find(|r| r.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_recruiter(&self, id: Uuid) -> StoreResult<Option<Recruiter>> {
        let t = self.tables.read().await;
        Ok(t.recruiters.iter().find(|r| r.id == id).cloned())
    }

    async fn create_company_for(&self, recruiter_id: Uuid, company: &Company) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        let recruiter = t
            .recruiters
            .iter()
            .position(|r| r.id == recruiter_id)
            .ok_or_else(|| AppError::NotFound(format!("Recruiter {recruiter_id} not found")))?;
        if t.recruiters[recruiter].company_id.is_some() {
            return Err(AppError::Conflict(
                "Recruiter already belongs to a company".to_string(),
            ));
        }
        t.companies.push(company.clone());
        t.recruiters[recruiter].company_id = Some(company.id);
        Ok(())
    }

    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        let t = self.tables.read().await;
        let mut companies: Vec<Company> = t.companies.iter().map(|c| t.company_view(c)).collect();
        companies.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(companies)
    }

    async fn get_company(&self, id: Uuid) -> StoreResult<Option<Company>> {
        let t = self.tables.read().await;
        Ok(t.companies
            .iter()
            .find(|c| c.id == id)
            .map(|c| t.company_view(c)))
    }

    async fn post_job(&self, job: &Job, activity: &Activity) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if let Some(company_id) = job.company_id {
            if !t.companies.iter().any(|c| c.id == company_id) {
                return Err(AppError::NotFound(format!("Company {company_id} not found")));
            }
        }
        t.jobs.push(job.clone());
        t.activities.push(activity.clone());
        Ok(())
    }

    async fn list_jobs(&self) -> StoreResult<Vec<Job>> {
        let t = self.tables.read().await;
        Ok(t.jobs_where(|_| true))
    }

    async fn get_job(&self, id: Uuid) -> StoreResult<Option<Job>> {
        let t = self.tables.read().await;
        Ok(t.jobs.iter().find(|j| j.id == id).map(|j| t.job_view(j)))
    }

    async fn jobs_for_company(&self, company_id: Uuid) -> StoreResult<Vec<Job>> {
        let t = self.tables.read().await;
        Ok(t.jobs_where(|j| j.company_id == Some(company_id)))
    }

    async fn jobs_posted_by(&self, recruiter_id: Uuid) -> StoreResult<Vec<Job>> {
        let t = self.tables.read().await;
        Ok(t.jobs_where(|j| j.posted_by == recruiter_id))
    }

    async fn record_application(
        &self,
        application: &Application,
        activities: &[Activity],
    ) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if !t.jobs.iter().any(|j| j.id == application.job_id) {
            return Err(AppError::NotFound(format!(
                "Job {} not found",
                application.job_id
            )));
        }
        if let Some(resume_id) = application.resume_id {
            let owned = t
                .resumes
                .iter()
                .any(|r| r.id == resume_id && r.owner_id == application.job_seeker_id);
            if !owned {
                return Err(AppError::NotFound(format!("Resume {resume_id} not found")));
            }
        }
        if t.applications.iter().any(|a| {
            a.job_id == application.job_id && a.job_seeker_id == application.job_seeker_id
        }) {
            return Err(AppError::Conflict(
                "You have already applied to this job".to_string(),
            ));
        }
        t.applications.push(application.clone());
        t.activities.extend(activities.iter().cloned());
        Ok(())
    }

    async fn applications_for_seeker(&self, seeker_id: Uuid) -> StoreResult<Vec<Application>> {
        let t = self.tables.read().await;
        Ok(t.applications_where(|a| a.job_seeker_id == seeker_id))
    }

    async fn applications_for_job(&self, job_id: Uuid) -> StoreResult<Vec<Application>> {
        let t = self.tables.read().await;
        Ok(t.applications_where(|a| a.job_id == job_id))
    }

    async fn applications_for_recruiter(
        &self,
        recruiter_id: Uuid,
    ) -> StoreResult<Vec<Application>> {
        let t = self.tables.read().await;
        let posted: Vec<Uuid> = t
            .jobs
            .iter()
            .filter(|j| j.posted_by == recruiter_id)
            .map(|j| j.id)
            .collect();
        Ok(t.applications_where(|a| posted.contains(&a.job_id)))
    }

    async fn get_application(&self, id: Uuid) -> StoreResult<Option<Application>> {
        let t = self.tables.read().await;
        Ok(t.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        activity: &Activity,
    ) -> StoreResult<Option<Application>> {
        let mut t = self.tables.write().await;
        let Some(index) = t.applications.iter().position(|a| a.id == id) else {
            return Ok(None);
        };
        t.applications[index].status = status;
        let updated = t.applications[index].clone();
        t.activities.push(activity.clone());
        Ok(Some(updated))
    }

    async fn insert_resumes(&self, resumes: &[Resume]) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        for resume in resumes {
            if !t.job_seekers.iter().any(|s| s.id == resume.owner_id) {
                return Err(AppError::NotFound(format!(
                    "Job seeker {} not found",
                    resume.owner_id
                )));
            }
        }
        t.resumes.extend(resumes.iter().cloned());
        Ok(())
    }

    async fn list_resumes(&self, owner_id: Uuid) -> StoreResult<Vec<Resume>> {
        let t = self.tables.read().await;
        let mut resumes: Vec<Resume> = t
            .resumes
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .map(|r| t.resume_view(r))
            .collect();
        resumes.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(resumes)
    }

    async fn get_resume(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Resume>> {
        let t = self.tables.read().await;
        Ok(t.resumes
            .iter()
            .find(|r| r.id == id && r.owner_id == owner_id)
            .map(|r| t.resume_view(r)))
    }

    async fn update_resume(&self, resume: &Resume) -> StoreResult<Option<Resume>> {
        let mut t = self.tables.write().await;
        let Some(index) = t
            .resumes
            .iter()
            .position(|r| r.id == resume.id && r.owner_id == resume.owner_id)
        else {
            return Ok(None);
        };
        let stored = &mut t.resumes[index];
        stored.name = resume.name.clone();
        stored.template = resume.template.clone();
        stored.data = resume.data.clone();
        stored.last_modified = resume.last_modified;
        let stored = stored.clone();
        Ok(Some(t.resume_view(&stored)))
    }

    async fn delete_resume(&self, owner_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.resumes.len();
        t.resumes.retain(|r| !(r.id == id && r.owner_id == owner_id));
        let removed = t.resumes.len() < before;
        if removed {
            for application in t.applications.iter_mut() {
                if application.resume_id == Some(id) {
                    application.resume_id = None;
                }
            }
        }
        Ok(removed)
    }

    async fn recent_activities(&self, user_id: Uuid, limit: usize) -> StoreResult<Vec<Activity>> {
        let t = self.tables.read().await;
        let mut feed: Vec<Activity> = t
            .activities
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        feed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        feed.truncate(limit);
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    use crate::models::job::Salary;
    use crate::models::resume::ResumeData;
    use crate::models::user::JobSeekerProfile;

    fn seeker(email: &str) -> JobSeeker {
        JobSeeker {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            full_name: "Seeker".to_string(),
            profile: JobSeekerProfile::default(),
            profile_complete: false,
            email_verified: false,
            phone_verified: false,
            created_at: Utc::now(),
        }
    }

    fn recruiter_with_company() -> (Recruiter, Company) {
        let company = Company {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            industry: Some("IT".to_string()),
            location: None,
            description: None,
            website: None,
            logo: None,
            created_by: None,
            created_at: Utc::now(),
            job_count: 0,
        };
        let recruiter = Recruiter {
            id: Uuid::new_v4(),
            email: "hr@acme.test".to_string(),
            password_hash: "hash".to_string(),
            full_name: "Hiring Manager".to_string(),
            company_id: Some(company.id),
            created_at: Utc::now(),
        };
        (recruiter, company)
    }

    fn job(recruiter: &Recruiter, minutes_ago: i64) -> Job {
        Job {
            id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            department: None,
            company: "Acme".to_string(),
            company_id: recruiter.company_id,
            location: "Remote".to_string(),
            location_type: Default::default(),
            employment_type: Default::default(),
            experience_level: Default::default(),
            salary: Salary::default(),
            description: "Build things".to_string(),
            responsibilities: vec![],
            requirements: vec![],
            benefits: vec![],
            application_deadline: None,
            application_url: None,
            posted_date: Utc::now() - Duration::minutes(minutes_ago),
            posted_by: recruiter.id,
            applicants_count: 0,
        }
    }

    fn resume(owner: Uuid, name: &str) -> Resume {
        Resume {
            id: Uuid::new_v4(),
            owner_id: owner,
            name: name.to_string(),
            template: "Modern".to_string(),
            data: ResumeData::default(),
            last_modified: Utc::now(),
            created_at: Utc::now(),
            job_applications: 0,
        }
    }

    fn application(job: &Job, seeker: &JobSeeker, resume: &Resume) -> Application {
        Application {
            id: Uuid::new_v4(),
            job_id: job.id,
            job_title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            job_seeker_id: seeker.id,
            resume_id: Some(resume.id),
            resume_name: resume.name.clone(),
            application_date: Utc::now(),
            status: ApplicationStatus::Applied,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.insert_job_seeker(&seeker("a@x.test")).await.unwrap();
        let err = store.insert_job_seeker(&seeker("A@X.test")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_job_count_is_derived_per_post() {
        let store = MemoryStore::new();
        let (recruiter, company) = recruiter_with_company();
        store.insert_recruiter(&recruiter, Some(&company)).await.unwrap();

        for expected in 1..=3 {
            let j = job(&recruiter, 0);
            store
                .post_job(&j, &Activity::own(recruiter.id, "posted"))
                .await
                .unwrap();
            let company = store.get_company(company.id).await.unwrap().unwrap();
            assert_eq!(company.job_count, expected);
        }
    }

    #[tokio::test]
    async fn test_application_counters_and_duplicate() {
        let store = MemoryStore::new();
        let (recruiter, company) = recruiter_with_company();
        store.insert_recruiter(&recruiter, Some(&company)).await.unwrap();
        let s = seeker("s@x.test");
        store.insert_job_seeker(&s).await.unwrap();
        let r = resume(s.id, "Main");
        store.insert_resumes(&[r.clone()]).await.unwrap();
        let j = job(&recruiter, 0);
        store
            .post_job(&j, &Activity::own(recruiter.id, "posted"))
            .await
            .unwrap();

        let app = application(&j, &s, &r);
        store.record_application(&app, &[]).await.unwrap();

        let again = application(&j, &s, &r);
        let err = store.record_application(&again, &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let j = store.get_job(j.id).await.unwrap().unwrap();
        assert_eq!(j.applicants_count, 1);
        let r = store.get_resume(s.id, r.id).await.unwrap().unwrap();
        assert_eq!(r.job_applications, 1);
    }

    #[tokio::test]
    async fn test_application_rejects_foreign_resume() {
        let store = MemoryStore::new();
        let (recruiter, company) = recruiter_with_company();
        store.insert_recruiter(&recruiter, Some(&company)).await.unwrap();
        let owner = seeker("owner@x.test");
        let other = seeker("other@x.test");
        store.insert_job_seeker(&owner).await.unwrap();
        store.insert_job_seeker(&other).await.unwrap();
        let r = resume(owner.id, "Owner's");
        store.insert_resumes(&[r.clone()]).await.unwrap();
        let j = job(&recruiter, 0);
        store
            .post_job(&j, &Activity::own(recruiter.id, "posted"))
            .await
            .unwrap();

        let err = store
            .record_application(&application(&j, &other, &r), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.applications_for_job(j.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_resume_removes_exactly_one() {
        let store = MemoryStore::new();
        let s = seeker("s@x.test");
        store.insert_job_seeker(&s).await.unwrap();
        let keep_a = resume(s.id, "A");
        let gone = resume(s.id, "B");
        let keep_c = resume(s.id, "C");
        store
            .insert_resumes(&[keep_a.clone(), gone.clone(), keep_c.clone()])
            .await
            .unwrap();

        assert!(store.delete_resume(s.id, gone.id).await.unwrap());
        assert!(!store.delete_resume(s.id, gone.id).await.unwrap());

        let left: Vec<String> = store
            .list_resumes(s.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(left, vec!["A".to_string(), "C".to_string()]);
    }

    #[tokio::test]
    async fn test_jobs_newest_first() {
        let store = MemoryStore::new();
        let (recruiter, company) = recruiter_with_company();
        store.insert_recruiter(&recruiter, Some(&company)).await.unwrap();
        let older = job(&recruiter, 60);
        let newer = job(&recruiter, 1);
        for j in [&older, &newer] {
            store
                .post_job(j, &Activity::own(recruiter.id, "posted"))
                .await
                .unwrap();
        }
        let ids: Vec<Uuid> = store.list_jobs().await.unwrap().iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }
}
