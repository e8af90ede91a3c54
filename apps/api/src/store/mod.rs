//! Persistence seam for the portal.
//!
//! `AppState` carries an `Arc<dyn PortalStore>`. Every method that touches
//! more than one record is atomic: `PgStore` wraps it in a transaction and
//! `MemoryStore` holds its write lock for the whole call. Counters
//! (`applicants_count`, `job_count`, `job_applications`) are computed on read
//! from the referencing rows and are never stored.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::activity::Activity;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::company::Company;
use crate::models::job::Job;
use crate::models::resume::Resume;
use crate::models::user::{JobSeeker, JobSeekerProfile, Recruiter};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait PortalStore: Send + Sync {
    /// Short tag reported by `/health`.
    fn backend(&self) -> &'static str;

    // ── accounts ───────────────────────────────────────────────────────────

    /// Fails with `Conflict` when the email is already registered.
    async fn insert_job_seeker(&self, seeker: &JobSeeker) -> StoreResult<()>;
    async fn find_job_seeker_by_email(&self, email: &str) -> StoreResult<Option<JobSeeker>>;
    async fn get_job_seeker(&self, id: Uuid) -> StoreResult<Option<JobSeeker>>;
    async fn update_job_seeker_profile(
        &self,
        id: Uuid,
        profile: &JobSeekerProfile,
        profile_complete: bool,
    ) -> StoreResult<Option<JobSeeker>>;

    /// Inserts the recruiter and, when given, the company they registered
    /// with. `recruiter.company_id` must already point at that company.
    async fn insert_recruiter(
        &self,
        recruiter: &Recruiter,
        company: Option<&Company>,
    ) -> StoreResult<()>;
    async fn find_recruiter_by_email(&self, email: &str) -> StoreResult<Option<Recruiter>>;
    async fn get_recruiter(&self, id: Uuid) -> StoreResult<Option<Recruiter>>;

    // ── companies ──────────────────────────────────────────────────────────

    /// Inserts the company and links it to the recruiter. `Conflict` if the
    /// recruiter already has one.
    async fn create_company_for(&self, recruiter_id: Uuid, company: &Company) -> StoreResult<()>;
    async fn list_companies(&self) -> StoreResult<Vec<Company>>;
    async fn get_company(&self, id: Uuid) -> StoreResult<Option<Company>>;

    // ── jobs ───────────────────────────────────────────────────────────────

    /// Inserts the job and the poster's feed entry together.
    async fn post_job(&self, job: &Job, activity: &Activity) -> StoreResult<()>;
    /// Newest first.
    async fn list_jobs(&self) -> StoreResult<Vec<Job>>;
    async fn get_job(&self, id: Uuid) -> StoreResult<Option<Job>>;
    async fn jobs_for_company(&self, company_id: Uuid) -> StoreResult<Vec<Job>>;
    async fn jobs_posted_by(&self, recruiter_id: Uuid) -> StoreResult<Vec<Job>>;

    // ── applications ───────────────────────────────────────────────────────

    /// Inserts the application plus its feed entries. Re-checks inside the
    /// write that the job exists and that the resume belongs to the applicant;
    /// `Conflict` when the seeker already applied to this job.
    async fn record_application(
        &self,
        application: &Application,
        activities: &[Activity],
    ) -> StoreResult<()>;
    /// Newest first.
    async fn applications_for_seeker(&self, seeker_id: Uuid) -> StoreResult<Vec<Application>>;
    /// Newest first.
    async fn applications_for_job(&self, job_id: Uuid) -> StoreResult<Vec<Application>>;
    /// Applications to every job the recruiter posted, newest first.
    async fn applications_for_recruiter(&self, recruiter_id: Uuid)
        -> StoreResult<Vec<Application>>;
    async fn get_application(&self, id: Uuid) -> StoreResult<Option<Application>>;
    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        activity: &Activity,
    ) -> StoreResult<Option<Application>>;

    // ── resumes ────────────────────────────────────────────────────────────

    /// All-or-nothing batch insert.
    async fn insert_resumes(&self, resumes: &[Resume]) -> StoreResult<()>;
    /// Oldest first.
    async fn list_resumes(&self, owner_id: Uuid) -> StoreResult<Vec<Resume>>;
    async fn get_resume(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Resume>>;
    /// Writes name, template, data and last_modified of an owned resume.
    async fn update_resume(&self, resume: &Resume) -> StoreResult<Option<Resume>>;
    /// Returns false when no resume with that id belongs to the owner.
    async fn delete_resume(&self, owner_id: Uuid, id: Uuid) -> StoreResult<bool>;

    // ── activity feed ──────────────────────────────────────────────────────

    /// Newest first.
    async fn recent_activities(&self, user_id: Uuid, limit: usize) -> StoreResult<Vec<Activity>>;
}
