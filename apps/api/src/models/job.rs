use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

text_enum! {
    LocationType {
        Onsite => "onsite",
        Remote => "remote",
        Hybrid => "hybrid",
    }
}

text_enum! {
    EmploymentType {
        FullTime => "full-time",
        PartTime => "part-time",
        Contract => "contract",
        Temporary => "temporary",
        Freelance => "freelance",
        Internship => "internship",
    }
}

text_enum! {
    ExperienceLevel {
        Entry => "entry",
        Junior => "junior",
        Mid => "mid",
        Senior => "senior",
        Director => "director",
        Executive => "executive",
    }
}

text_enum! {
    SalaryPeriod {
        Hourly => "hourly",
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
        Annual => "annual",
    }
}

impl Default for LocationType {
    fn default() -> Self {
        LocationType::Onsite
    }
}

impl Default for EmploymentType {
    fn default() -> Self {
        EmploymentType::FullTime
    }
}

impl Default for ExperienceLevel {
    fn default() -> Self {
        ExperienceLevel::Entry
    }
}

impl Default for SalaryPeriod {
    fn default() -> Self {
        SalaryPeriod::Annual
    }
}

pub const DEFAULT_CURRENCY: &str = "INR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Salary {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub currency: String,
    pub period: SalaryPeriod,
}

impl Default for Salary {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            currency: DEFAULT_CURRENCY.to_string(),
            period: SalaryPeriod::Annual,
        }
    }
}

/// A job listing. `applicants_count` is derived from the applications that
/// reference the job; it is never written directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub department: Option<String>,
    pub company: String,
    pub company_id: Option<Uuid>,
    pub location: String,
    pub location_type: LocationType,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
    pub salary: Salary,
    pub description: String,
    pub responsibilities: Vec<String>,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
    pub application_deadline: Option<NaiveDate>,
    pub application_url: Option<String>,
    pub posted_date: DateTime<Utc>,
    pub posted_by: Uuid,
    pub applicants_count: i64,
}

impl Job {
    /// True once the deadline day has fully passed.
    pub fn deadline_passed(&self, today: NaiveDate) -> bool {
        self.application_deadline
            .map(|deadline| today > deadline)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_enum_round_trip() {
        assert_eq!("full-time".parse::<EmploymentType>().unwrap(), EmploymentType::FullTime);
        assert_eq!("REMOTE".parse::<LocationType>().unwrap(), LocationType::Remote);
        assert_eq!("weekly".parse::<SalaryPeriod>().unwrap(), SalaryPeriod::Weekly);
        assert_eq!("daily".parse::<SalaryPeriod>().unwrap(), SalaryPeriod::Daily);
        assert_eq!("temporary".parse::<EmploymentType>().unwrap(), EmploymentType::Temporary);
        assert_eq!("junior".parse::<ExperienceLevel>().unwrap(), ExperienceLevel::Junior);
        assert!("fortnightly".parse::<SalaryPeriod>().is_err());
        assert_eq!(
            serde_json::to_value(ExperienceLevel::Director).unwrap(),
            serde_json::json!("director")
        );
    }
}
