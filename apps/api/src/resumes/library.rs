//! Naming, template and ordering rules for a seeker's saved resumes.

use crate::errors::AppError;
use crate::models::resume::{PersonalInfo, Resume, DEFAULT_TEMPLATE, RESUME_TEMPLATES};

text_enum! {
    ResumeSort {
        Recent => "recent",
        Oldest => "oldest",
        NameAz => "name-az",
        NameZa => "name-za",
        Applications => "applications",
    }
}

pub const UNTITLED_RESUME: &str = "Untitled Resume";

/// `"<first> <last>'s Resume"`, or `"Untitled Resume"` without a name.
pub fn default_resume_name(personal: &PersonalInfo) -> String {
    let full = format!("{} {}", personal.first_name.trim(), personal.last_name.trim());
    let full = full.trim();
    if full.is_empty() {
        UNTITLED_RESUME.to_string()
    } else {
        format!("{full}'s Resume")
    }
}

pub fn copy_name(name: &str) -> String {
    format!("{name} (Copy)")
}

/// Canonical spelling of a known template; `None` picks the default.
pub fn resolve_template(requested: Option<&str>) -> Result<String, AppError> {
    let Some(requested) = requested.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(DEFAULT_TEMPLATE.to_string());
    };
    RESUME_TEMPLATES
        .iter()
        .find(|t| t.eq_ignore_ascii_case(requested))
        .map(|t| t.to_string())
        .ok_or_else(|| {
            AppError::Validation(format!(
                "Unknown template '{requested}'. Expected one of: {}",
                RESUME_TEMPLATES.join(", ")
            ))
        })
}

/// Stable sort; ties keep their stored order.
pub fn sort_resumes(resumes: &mut [Resume], sort: ResumeSort) {
    match sort {
        ResumeSort::Recent => resumes.sort_by(|a, b| b.last_modified.cmp(&a.last_modified)),
        ResumeSort::Oldest => resumes.sort_by(|a, b| a.last_modified.cmp(&b.last_modified)),
        ResumeSort::NameAz => resumes.sort_by_key(|r| r.name.to_lowercase()),
        ResumeSort::NameZa => {
            resumes.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase()))
        }
        ResumeSort::Applications => {
            resumes.sort_by(|a, b| b.job_applications.cmp(&a.job_applications))
        }
    }
}
