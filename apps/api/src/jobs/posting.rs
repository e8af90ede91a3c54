//! Turns a recruiter's posting form into a `Job`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::credentials::non_blank;
use crate::errors::AppError;
use crate::models::company::Company;
use crate::models::job::{Job, Salary, DEFAULT_CURRENCY};
use crate::models::user::Recruiter;

#[derive(Debug, Default, Deserialize)]
pub struct SalaryInput {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub currency: Option<String>,
    pub period: Option<String>,
}

/// Enum-valued fields arrive as plain strings so a bad value is reported with
/// the field name and the offending value.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostJobRequest {
    pub title: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub location_type: Option<String>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
    pub salary: Option<SalaryInput>,
    pub description: Option<String>,
    pub responsibilities: Vec<String>,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
    pub application_deadline: Option<NaiveDate>,
    pub application_url: Option<String>,
}

fn parse_or_default<T>(raw: Option<String>, field: &str) -> Result<T, AppError>
where
    T: std::str::FromStr + Default,
{
    match non_blank(raw) {
        None => Ok(T::default()),
        Some(value) => value
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid {field} '{value}'"))),
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    non_blank(value).ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn build_salary(input: Option<SalaryInput>) -> Result<Salary, AppError> {
    let Some(input) = input else {
        return Ok(Salary::default());
    };
    for bound in [input.min, input.max].into_iter().flatten() {
        if bound < 0 {
            return Err(AppError::Validation(
                "Salary cannot be negative".to_string(),
            ));
        }
    }
    if let (Some(min), Some(max)) = (input.min, input.max) {
        if min > max {
            return Err(AppError::Validation(
                "Minimum salary cannot exceed maximum salary".to_string(),
            ));
        }
    }
    Ok(Salary {
        min: input.min,
        max: input.max,
        currency: non_blank(input.currency)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        period: parse_or_default(input.period, "salary period")?,
    })
}

/// Display name shown on the listing: the recruiter's company, or a
/// placeholder built from their name.
pub fn company_display_name(poster: &Recruiter, company: Option<&Company>) -> String {
    match company {
        Some(company) => company.name.clone(),
        None => format!("{}'s Company", poster.full_name),
    }
}

pub fn build_job(
    req: PostJobRequest,
    poster: &Recruiter,
    company: Option<&Company>,
    now: DateTime<Utc>,
) -> Result<Job, AppError> {
    let title = required(req.title, "Job title")?;
    let location = required(req.location, "Location")?;
    let description = required(req.description, "Job description")?;

    let application_url = non_blank(req.application_url);
    if let Some(url) = &application_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::Validation(
                "Application URL must start with http:// or https://".to_string(),
            ));
        }
    }

    Ok(Job {
        id: Uuid::new_v4(),
        title,
        department: non_blank(req.department),
        company: company_display_name(poster, company),
        company_id: company.map(|c| c.id),
        location,
        location_type: parse_or_default(req.location_type, "location type")?,
        employment_type: parse_or_default(req.employment_type, "employment type")?,
        experience_level: parse_or_default(req.experience_level, "experience level")?,
        salary: build_salary(req.salary)?,
        description,
        responsibilities: clean_list(req.responsibilities),
        requirements: clean_list(req.requirements),
        benefits: clean_list(req.benefits),
        application_deadline: req.application_deadline,
        application_url,
        posted_date: now,
        posted_by: poster.id,
        applicants_count: 0,
    })
}
