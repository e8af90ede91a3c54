use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body: each field holds the raw string the browser had stored
/// under that key.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SnapshotRequest {
    pub jobs: Option<String>,
    pub companies: Option<String>,
    pub applications: Option<String>,
    #[serde(alias = "savedResumes")]
    pub saved_resumes: Option<String>,
    #[serde(alias = "dashboardData")]
    pub dashboard_data: Option<String>,
}

/// Browser ids were `Date.now()` numbers, sometimes stringified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum LegacyId {
    Number(i64),
    Text(String),
}

impl fmt::Display for LegacyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegacyId::Number(n) => write!(f, "{n}"),
            LegacyId::Text(s) => f.write_str(s),
        }
    }
}

impl LegacyId {
    /// `7` and `"7"` name the same record.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyJob {
    pub id: LegacyId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company_id: Option<LegacyId>,
    #[serde(default)]
    pub applicants_count: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCompany {
    pub id: LegacyId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub job_count: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyApplication {
    pub id: LegacyId,
    #[serde(default)]
    pub job_id: Option<LegacyId>,
    #[serde(default)]
    pub resume_id: Option<LegacyId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyPersonal {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub title: String,
    pub linkedin: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyEducation {
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyExperience {
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyResumeData {
    pub personal: LegacyPersonal,
    pub education: Vec<LegacyEducation>,
    pub experience: Vec<LegacyExperience>,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyResume {
    pub id: LegacyId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub job_applications: Option<i64>,
    #[serde(default)]
    pub data: LegacyResumeData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyDashboardStats {
    pub active_listings: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyJobPosting {
    pub id: LegacyId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub applicants_count: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyDashboard {
    pub stats: Option<LegacyDashboardStats>,
    pub job_postings: Vec<LegacyJobPosting>,
    pub activities: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SnapshotWarning {
    pub key: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ParsedSnapshot {
    pub jobs: Vec<LegacyJob>,
    pub companies: Vec<LegacyCompany>,
    pub applications: Vec<LegacyApplication>,
    pub resumes: Vec<LegacyResume>,
    pub dashboard: LegacyDashboard,
    pub warnings: Vec<SnapshotWarning>,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

struct Warnings<'a>(&'a mut Vec<SnapshotWarning>);

impl Warnings<'_> {
    fn push(&mut self, key: &'static str, message: impl Into<String>) {
        self.0.push(SnapshotWarning {
            key,
            message: message.into(),
        });
    }
}

/// Parses a stored array. A missing or malformed key yields an empty
/// collection; an unreadable entry is skipped. Both leave a warning.
fn parse_collection<T: DeserializeOwned>(
    key: &'static str,
    raw: Option<&str>,
    warnings: &mut Warnings<'_>,
) -> Vec<T> {
    let Some(raw) = raw else {
        warnings.push(key, "key not present; treated as empty");
        return Vec::new();
    };
    let items = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            warnings.push(
                key,
                format!("expected an array, found {}; treated as empty", json_kind(&other)),
            );
            return Vec::new();
        }
        Err(e) => {
            warnings.push(key, format!("malformed JSON ({e}); treated as empty"));
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<T>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warnings.push(key, format!("entry {index} skipped: {e}"));
                None
            }
        })
        .collect()
}

fn parse_dashboard(raw: Option<&str>, warnings: &mut Warnings<'_>) -> LegacyDashboard {
    const KEY: &str = "dashboardData";
    let Some(raw) = raw else {
        warnings.push(KEY, "key not present; treated as empty");
        return LegacyDashboard::default();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_else(|e| {
            warnings.push(KEY, format!("unreadable dashboard ({e}); treated as empty"));
            LegacyDashboard::default()
        }),
        Ok(other) => {
            warnings.push(
                KEY,
                format!("expected an object, found {}; treated as empty", json_kind(&other)),
            );
            LegacyDashboard::default()
        }
        Err(e) => {
            warnings.push(KEY, format!("malformed JSON ({e}); treated as empty"));
            LegacyDashboard::default()
        }
    }
}

pub fn parse_snapshot(req: &SnapshotRequest) -> ParsedSnapshot {
    let mut collected = Vec::new();
    let mut warnings = Warnings(&mut collected);

    let jobs = parse_collection("jobs", req.jobs.as_deref(), &mut warnings);
    let companies = parse_collection("companies", req.companies.as_deref(), &mut warnings);
    let applications =
        parse_collection("applications", req.applications.as_deref(), &mut warnings);
    let resumes = parse_collection("savedResumes", req.saved_resumes.as_deref(), &mut warnings);
    let dashboard = parse_dashboard(req.dashboard_data.as_deref(), &mut warnings);

    ParsedSnapshot {
        jobs,
        companies,
        applications,
        resumes,
        dashboard,
        warnings: collected,
    }
}
