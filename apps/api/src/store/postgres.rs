//! PostgreSQL `PortalStore`. Multi-record writes run inside one transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::activity::Activity;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::company::Company;
use crate::models::job::{Job, Salary};
use crate::models::resume::{Resume, ResumeData};
use crate::models::user::{JobSeeker, JobSeekerProfile, Recruiter};
use crate::store::{PortalStore, StoreResult};

const JOB_SELECT: &str = r#"
    SELECT j.id, j.title, j.department, j.company, j.company_id, j.location,
           j.location_type, j.employment_type, j.experience_level,
           j.salary_min, j.salary_max, j.salary_currency, j.salary_period,
           j.description, j.responsibilities, j.requirements, j.benefits,
           j.application_deadline, j.application_url, j.posted_date, j.posted_by,
           (SELECT COUNT(*) FROM applications a WHERE a.job_id = j.id) AS applicants_count
    FROM jobs j
"#;

const COMPANY_SELECT: &str = r#"
    SELECT c.id, c.name, c.industry, c.location, c.description, c.website, c.logo,
           c.created_by, c.created_at,
           (SELECT COUNT(*) FROM jobs j WHERE j.company_id = c.id) AS job_count
    FROM companies c
"#;

const RESUME_SELECT: &str = r#"
    SELECT r.id, r.owner_id, r.name, r.template, r.data, r.last_modified, r.created_at,
           (SELECT COUNT(*) FROM applications a WHERE a.resume_id = r.id) AS job_applications
    FROM resumes r
"#;

const APPLICATION_SELECT: &str = r#"
    SELECT a.id, a.job_id, a.job_title, a.company, a.location, a.job_seeker_id,
           a.resume_id, a.resume_name, a.application_date, a.status
    FROM applications a
"#;

#[derive(Debug, FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    department: Option<String>,
    company: String,
    company_id: Option<Uuid>,
    location: String,
    location_type: String,
    employment_type: String,
    experience_level: String,
    salary_min: Option<i64>,
    salary_max: Option<i64>,
    salary_currency: String,
    salary_period: String,
    description: String,
    responsibilities: Vec<String>,
    requirements: Vec<String>,
    benefits: Vec<String>,
    application_deadline: Option<NaiveDate>,
    application_url: Option<String>,
    posted_date: DateTime<Utc>,
    posted_by: Uuid,
    applicants_count: i64,
}

impl TryFrom<JobRow> for Job {
    type Error = AppError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: row.id,
            title: row.title,
            department: row.department,
            company: row.company,
            company_id: row.company_id,
            location: row.location,
            location_type: parse_column("location_type", &row.location_type)?,
            employment_type: parse_column("employment_type", &row.employment_type)?,
            experience_level: parse_column("experience_level", &row.experience_level)?,
            salary: Salary {
                min: row.salary_min,
                max: row.salary_max,
                currency: row.salary_currency,
                period: parse_column("salary_period", &row.salary_period)?,
            },
            description: row.description,
            responsibilities: row.responsibilities,
            requirements: row.requirements,
            benefits: row.benefits,
            application_deadline: row.application_deadline,
            application_url: row.application_url,
            posted_date: row.posted_date,
            posted_by: row.posted_by,
            applicants_count: row.applicants_count,
        })
    }
}

#[derive(Debug, FromRow)]
struct JobSeekerRow {
    id: Uuid,
    email: String,
    password_hash: String,
    full_name: String,
    profile: Json<JobSeekerProfile>,
    profile_complete: bool,
    email_verified: bool,
    phone_verified: bool,
    created_at: DateTime<Utc>,
}

impl From<JobSeekerRow> for JobSeeker {
    fn from(row: JobSeekerRow) -> Self {
        JobSeeker {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            full_name: row.full_name,
            profile: row.profile.0,
            profile_complete: row.profile_complete,
            email_verified: row.email_verified,
            phone_verified: row.phone_verified,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ResumeRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    template: String,
    data: Json<ResumeData>,
    last_modified: DateTime<Utc>,
    created_at: DateTime<Utc>,
    job_applications: i64,
}

impl From<ResumeRow> for Resume {
    fn from(row: ResumeRow) -> Self {
        Resume {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            template: row.template,
            data: row.data.0,
            last_modified: row.last_modified,
            created_at: row.created_at,
            job_applications: row.job_applications,
        }
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    job_id: Uuid,
    job_title: String,
    company: String,
    location: String,
    job_seeker_id: Uuid,
    resume_id: Option<Uuid>,
    resume_name: String,
    application_date: DateTime<Utc>,
    status: String,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = AppError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(Application {
            id: row.id,
            job_id: row.job_id,
            job_title: row.job_title,
            company: row.company,
            location: row.location,
            job_seeker_id: row.job_seeker_id,
            resume_id: row.resume_id,
            resume_name: row.resume_name,
            application_date: row.application_date,
            status: parse_column("status", &row.status)?,
        })
    }
}

fn parse_column<T: FromStr<Err = String>>(column: &str, value: &str) -> Result<T, AppError> {
    value
        .parse::<T>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt column {column}: {e}")))
}

fn collect_jobs(rows: Vec<JobRow>) -> StoreResult<Vec<Job>> {
    rows.into_iter().map(Job::try_from).collect()
}

fn collect_applications(rows: Vec<ApplicationRow>) -> StoreResult<Vec<Application>> {
    rows.into_iter().map(Application::try_from).collect()
}

/// Maps a unique-constraint violation to `Conflict`, anything else to `Database`.
fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}

async fn insert_activity(conn: &mut PgConnection, activity: &Activity) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO activities (id, user_id, action, actor, created_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(activity.id)
    .bind(activity.user_id)
    .bind(&activity.action)
    .bind(&activity.actor)
    .bind(activity.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

async fn insert_company(conn: &mut PgConnection, company: &Company) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO companies
            (id, name, industry, location, description, website, logo, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(company.id)
    .bind(&company.name)
    .bind(&company.industry)
    .bind(&company.location)
    .bind(&company.description)
    .bind(&company.website)
    .bind(&company.logo)
    .bind(company.created_by)
    .bind(company.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PortalStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert_job_seeker(&self, seeker: &JobSeeker) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO job_seekers
                (id, email, password_hash, full_name, profile, profile_complete,
                 email_verified, phone_verified, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(seeker.id)
        .bind(&seeker.email)
        .bind(&seeker.password_hash)
        .bind(&seeker.full_name)
        .bind(Json(seeker.profile.clone()))
        .bind(seeker.profile_complete)
        .bind(seeker.email_verified)
        .bind(seeker.phone_verified)
        .bind(seeker.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Email already registered"))?;
        Ok(())
    }

    async fn find_job_seeker_by_email(&self, email: &str) -> StoreResult<Option<JobSeeker>> {
        let row = sqlx::query_as::<_, JobSeekerRow>(
            "SELECT * FROM job_seekers WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(JobSeeker::from))
    }

    async fn get_job_seeker(&self, id: Uuid) -> StoreResult<Option<JobSeeker>> {
        let row = sqlx::query_as::<_, JobSeekerRow>("SELECT * FROM job_seekers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(JobSeeker::from))
    }

    async fn update_job_seeker_profile(
        &self,
        id: Uuid,
        profile: &JobSeekerProfile,
        profile_complete: bool,
    ) -> StoreResult<Option<JobSeeker>> {
        let row = sqlx::query_as::<_, JobSeekerRow>(
            r#"
            UPDATE job_seekers SET profile = $2, profile_complete = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(profile.clone()))
        .bind(profile_complete)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(JobSeeker::from))
    }

    async fn insert_recruiter(
        &self,
        recruiter: &Recruiter,
        company: Option<&Company>,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        if let Some(company) = company {
            insert_company(&mut tx, company).await?;
        }
        sqlx::query(
            r#"
            INSERT INTO recruiters (id, email, password_hash, full_name, company_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(recruiter.id)
        .bind(&recruiter.email)
        .bind(&recruiter.password_hash)
        .bind(&recruiter.full_name)
        .bind(recruiter.company_id)
        .bind(recruiter.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "Email already registered"))?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_recruiter_by_email(&self, email: &str) -> StoreResult<Option<Recruiter>> {
        Ok(sqlx::query_as::<_, Recruiter>(
            "SELECT * FROM recruiters WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get_recruiter(&self, id: Uuid) -> StoreResult<Option<Recruiter>> {
        Ok(
            sqlx::query_as::<_, Recruiter>("SELECT * FROM recruiters WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_company_for(&self, recruiter_id: Uuid, company: &Company) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let current: Option<Option<Uuid>> =
            sqlx::query_scalar("SELECT company_id FROM recruiters WHERE id = $1 FOR UPDATE")
                .bind(recruiter_id)
                .fetch_optional(&mut *tx)
                .await?;
        match current {
            None => {
                return Err(AppError::NotFound(format!(
                    "Recruiter {recruiter_id} not found"
                )))
            }
            Some(Some(_)) => {
                return Err(AppError::Conflict(
                    "Recruiter already belongs to a company".to_string(),
                ))
            }
            Some(None) => {}
        }
        insert_company(&mut tx, company).await?;
        sqlx::query("UPDATE recruiters SET company_id = $2 WHERE id = $1")
            .bind(recruiter_id)
            .bind(company.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        Ok(
            sqlx::query_as::<_, Company>(&format!("{COMPANY_SELECT} ORDER BY lower(c.name)"))
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn get_company(&self, id: Uuid) -> StoreResult<Option<Company>> {
        Ok(
            sqlx::query_as::<_, Company>(&format!("{COMPANY_SELECT} WHERE c.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn post_job(&self, job: &Job, activity: &Activity) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO jobs
                (id, title, department, company, company_id, location, location_type,
                 employment_type, experience_level, salary_min, salary_max, salary_currency,
                 salary_period, description, responsibilities, requirements, benefits,
                 application_deadline, application_url, posted_date, posted_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21)
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.department)
        .bind(&job.company)
        .bind(job.company_id)
        .bind(&job.location)
        .bind(job.location_type.as_str())
        .bind(job.employment_type.as_str())
        .bind(job.experience_level.as_str())
        .bind(job.salary.min)
        .bind(job.salary.max)
        .bind(&job.salary.currency)
        .bind(job.salary.period.as_str())
        .bind(&job.description)
        .bind(job.responsibilities.as_slice())
        .bind(job.requirements.as_slice())
        .bind(job.benefits.as_slice())
        .bind(job.application_deadline)
        .bind(&job.application_url)
        .bind(job.posted_date)
        .bind(job.posted_by)
        .execute(&mut *tx)
        .await?;
        insert_activity(&mut tx, activity).await?;
        tx.commit().await?;
        debug!("Committed job {} with feed entry {}", job.id, activity.id);
        Ok(())
    }

    async fn list_jobs(&self) -> StoreResult<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!("{JOB_SELECT} ORDER BY j.posted_date DESC"))
            .fetch_all(&self.pool)
            .await?;
        collect_jobs(rows)
    }

    async fn get_job(&self, id: Uuid) -> StoreResult<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(&format!("{JOB_SELECT} WHERE j.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Job::try_from).transpose()
    }

    async fn jobs_for_company(&self, company_id: Uuid) -> StoreResult<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "{JOB_SELECT} WHERE j.company_id = $1 ORDER BY j.posted_date DESC"
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        collect_jobs(rows)
    }

    async fn jobs_posted_by(&self, recruiter_id: Uuid) -> StoreResult<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "{JOB_SELECT} WHERE j.posted_by = $1 ORDER BY j.posted_date DESC"
        ))
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await?;
        collect_jobs(rows)
    }

    async fn record_application(
        &self,
        application: &Application,
        activities: &[Activity],
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let job: Option<Uuid> = sqlx::query_scalar("SELECT id FROM jobs WHERE id = $1")
            .bind(application.job_id)
            .fetch_optional(&mut *tx)
            .await?;
        if job.is_none() {
            return Err(AppError::NotFound(format!(
                "Job {} not found",
                application.job_id
            )));
        }

        if let Some(resume_id) = application.resume_id {
            let owned: Option<Uuid> = sqlx::query_scalar(
                "SELECT id FROM resumes WHERE id = $1 AND owner_id = $2 FOR SHARE",
            )
            .bind(resume_id)
            .bind(application.job_seeker_id)
            .fetch_optional(&mut *tx)
            .await?;
            if owned.is_none() {
                return Err(AppError::NotFound(format!("Resume {resume_id} not found")));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO applications
                (id, job_id, job_title, company, location, job_seeker_id, resume_id,
                 resume_name, application_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(application.id)
        .bind(application.job_id)
        .bind(&application.job_title)
        .bind(&application.company)
        .bind(&application.location)
        .bind(application.job_seeker_id)
        .bind(application.resume_id)
        .bind(&application.resume_name)
        .bind(application.application_date)
        .bind(application.status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "You have already applied to this job"))?;

        for activity in activities {
            insert_activity(&mut tx, activity).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn applications_for_seeker(&self, seeker_id: Uuid) -> StoreResult<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "{APPLICATION_SELECT} WHERE a.job_seeker_id = $1 ORDER BY a.application_date DESC"
        ))
        .bind(seeker_id)
        .fetch_all(&self.pool)
        .await?;
        collect_applications(rows)
    }

    async fn applications_for_job(&self, job_id: Uuid) -> StoreResult<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "{APPLICATION_SELECT} WHERE a.job_id = $1 ORDER BY a.application_date DESC"
        ))
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        collect_applications(rows)
    }

    async fn applications_for_recruiter(
        &self,
        recruiter_id: Uuid,
    ) -> StoreResult<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"{APPLICATION_SELECT}
            JOIN jobs j ON j.id = a.job_id
            WHERE j.posted_by = $1
            ORDER BY a.application_date DESC"#
        ))
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await?;
        collect_applications(rows)
    }

    async fn get_application(&self, id: Uuid) -> StoreResult<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "{APPLICATION_SELECT} WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Application::try_from).transpose()
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        activity: &Activity,
    ) -> StoreResult<Option<Application>> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE applications SET status = $2
            WHERE id = $1
            RETURNING id, job_id, job_title, company, location, job_seeker_id,
                      resume_id, resume_name, application_date, status
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        insert_activity(&mut tx, activity).await?;
        tx.commit().await?;
        Ok(Some(Application::try_from(row)?))
    }

    async fn insert_resumes(&self, resumes: &[Resume]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for resume in resumes {
            sqlx::query(
                r#"
                INSERT INTO resumes (id, owner_id, name, template, data, last_modified, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(resume.id)
            .bind(resume.owner_id)
            .bind(&resume.name)
            .bind(&resume.template)
            .bind(Json(resume.data.clone()))
            .bind(resume.last_modified)
            .bind(resume.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    AppError::NotFound(format!("Job seeker {} not found", resume.owner_id))
                }
                _ => AppError::Database(e),
            })?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_resumes(&self, owner_id: Uuid) -> StoreResult<Vec<Resume>> {
        let rows = sqlx::query_as::<_, ResumeRow>(&format!(
            "{RESUME_SELECT} WHERE r.owner_id = $1 ORDER BY r.created_at ASC, r.id ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Resume::from).collect())
    }

    async fn get_resume(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Resume>> {
        let row = sqlx::query_as::<_, ResumeRow>(&format!(
            "{RESUME_SELECT} WHERE r.id = $1 AND r.owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Resume::from))
    }

    async fn update_resume(&self, resume: &Resume) -> StoreResult<Option<Resume>> {
        let result = sqlx::query(
            r#"
            UPDATE resumes SET name = $3, template = $4, data = $5, last_modified = $6
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(resume.id)
        .bind(resume.owner_id)
        .bind(&resume.name)
        .bind(&resume.template)
        .bind(Json(resume.data.clone()))
        .bind(resume.last_modified)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_resume(resume.owner_id, resume.id).await
    }

    async fn delete_resume(&self, owner_id: Uuid, id: Uuid) -> StoreResult<bool> {
        // applications.resume_id is ON DELETE SET NULL; their resume_name stays.
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn recent_activities(&self, user_id: Uuid, limit: usize) -> StoreResult<Vec<Activity>> {
        Ok(sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?)
    }
}
