use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::auth::credentials::non_blank;
use crate::legacy::snapshot::{LegacyResume, LegacyResumeData, SnapshotWarning};
use crate::models::resume::{
    EducationItem, ExperienceItem, PersonalInfo, Resume, ResumeData, DEFAULT_TEMPLATE,
};
use crate::resumes::library::{default_resume_name, resolve_template};

impl From<LegacyResumeData> for ResumeData {
    fn from(data: LegacyResumeData) -> Self {
        ResumeData {
            personal: PersonalInfo {
                first_name: data.personal.first_name,
                last_name: data.personal.last_name,
                email: data.personal.email,
                phone: data.personal.phone,
                title: data.personal.title,
                linkedin: data.personal.linkedin,
                summary: data.personal.summary,
            },
            education: data
                .education
                .into_iter()
                .map(|e| EducationItem {
                    institution: e.institution,
                    degree: e.degree,
                    field_of_study: e.field_of_study,
                    start_date: e.start_date,
                    end_date: e.end_date,
                    description: e.description,
                })
                .collect(),
            experience: data
                .experience
                .into_iter()
                .map(|e| ExperienceItem {
                    company: e.company,
                    position: e.position,
                    location: e.location,
                    start_date: e.start_date,
                    end_date: e.end_date,
                    description: e.description,
                })
                .collect(),
            skills: data.skills,
            languages: data.languages,
            achievements: data.achievements,
        }
    }
}

/// Browser timestamps were either ISO-8601 or a bare `YYYY-MM-DD`.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Converts stored resumes into fresh records owned by `owner_id`. Stored
/// counters are dropped; they are derived from applications. `created_at`
/// steps by one microsecond per resume so the snapshot order survives.
pub fn convert_resumes(
    legacy: Vec<LegacyResume>,
    owner_id: Uuid,
    now: DateTime<Utc>,
    warnings: &mut Vec<SnapshotWarning>,
) -> Vec<Resume> {
    legacy
        .into_iter()
        .enumerate()
        .map(|(index, old)| {
            let data = ResumeData::from(old.data).normalized();
            let template = resolve_template(old.template.as_deref()).unwrap_or_else(|_| {
                warnings.push(SnapshotWarning {
                    key: "savedResumes",
                    message: format!(
                        "resume {}: unknown template {:?}; using the default",
                        old.id,
                        old.template.as_deref().unwrap_or_default()
                    ),
                });
                DEFAULT_TEMPLATE.to_string()
            });
            let last_modified = old
                .last_modified
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(now);

            Resume {
                id: Uuid::new_v4(),
                owner_id,
                name: non_blank(old.name).unwrap_or_else(|| default_resume_name(&data.personal)),
                template,
                data,
                last_modified,
                created_at: now + Duration::microseconds(index as i64),
                job_applications: 0,
            }
        })
        .collect()
}
