use std::collections::HashSet;
use std::str::FromStr;

use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{EmploymentType, ExperienceLevel, Job, LocationType};

/// Query string of `GET /api/v1/jobs`. Set-valued filters are comma-separated.
#[derive(Debug, Default, Deserialize)]
pub struct JobQuery {
    pub q: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
    pub location_type: Option<String>,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Default)]
pub struct JobFilter {
    text: Option<String>,
    location: Option<String>,
    employment_types: HashSet<EmploymentType>,
    experience_levels: HashSet<ExperienceLevel>,
    location_type: Option<LocationType>,
    company_id: Option<Uuid>,
}

fn lowered(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

fn parse_set<T>(raw: &Option<String>) -> Result<HashSet<T>, AppError>
where
    T: FromStr<Err = String> + Eq + std::hash::Hash,
{
    raw.as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().map_err(AppError::Validation))
        .collect()
}

impl JobFilter {
    pub fn from_query(query: &JobQuery) -> Result<Self, AppError> {
        Ok(JobFilter {
            text: lowered(&query.q),
            location: lowered(&query.location),
            employment_types: parse_set(&query.employment_type)?,
            experience_levels: parse_set(&query.experience_level)?,
            location_type: lowered(&query.location_type)
                .map(|s| s.parse::<LocationType>().map_err(AppError::Validation))
                .transpose()?,
            company_id: query.company_id,
        })
    }

    pub fn matches(&self, job: &Job) -> bool {
        if let Some(text) = &self.text {
            if !job.title.to_lowercase().contains(text)
                && !job.company.to_lowercase().contains(text)
            {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !job.location.to_lowercase().contains(location) {
                return false;
            }
        }
        if !self.employment_types.is_empty() && !self.employment_types.contains(&job.employment_type)
        {
            return false;
        }
        if !self.experience_levels.is_empty()
            && !self.experience_levels.contains(&job.experience_level)
        {
            return false;
        }
        if self.location_type.is_some_and(|lt| lt != job.location_type) {
            return false;
        }
        if self.company_id.is_some() && self.company_id != job.company_id {
            return false;
        }
        true
    }
}

/// Keeps the input order.
pub fn filter_jobs(jobs: Vec<Job>, filter: &JobFilter) -> Vec<Job> {
    jobs.into_iter().filter(|job| filter.matches(job)).collect()
}
