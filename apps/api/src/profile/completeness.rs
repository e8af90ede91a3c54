use serde::{Deserialize, Serialize};

use crate::models::user::JobSeekerProfile;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    Complete,
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub overall_score: f64,
    pub status: ProfileStatus,
    pub missing_fields: Vec<String>,
    pub recommendations: Vec<String>,
}

impl CompletenessReport {
    pub fn is_complete(&self) -> bool {
        self.missing_fields.is_empty()
    }
}

const FIELD_WEIGHTS: &[(&str, f64)] = &[
    ("skills", 0.20),
    ("current_job_title", 0.15),
    ("phone", 0.10),
    ("years_of_experience", 0.10),
    ("education", 0.10),
    ("city", 0.10),
    ("bio", 0.10),
    ("linkedin_url", 0.05),
    ("preferred_job_types", 0.05),
    ("expected_salary", 0.05),
];

fn filled(text: &Option<String>) -> bool {
    text.as_deref().is_some_and(|t| !t.trim().is_empty())
}

fn field_filled(profile: &JobSeekerProfile, field: &str) -> bool {
    match field {
        "skills" => !profile.skills.is_empty(),
        "current_job_title" => filled(&profile.current_job_title),
        "phone" => filled(&profile.phone),
        "years_of_experience" => filled(&profile.years_of_experience),
        "education" => filled(&profile.education),
        "city" => filled(&profile.city),
        "bio" => filled(&profile.bio),
        "linkedin_url" => filled(&profile.linkedin_url),
        "preferred_job_types" => !profile.preferred_job_types.is_empty(),
        "expected_salary" => filled(&profile.expected_salary),
        _ => false,
    }
}

pub fn compute_completeness_report(profile: &JobSeekerProfile) -> CompletenessReport {
    let mut score = 0.0;
    let mut missing_fields = Vec::new();

    for (field, weight) in FIELD_WEIGHTS {
        if field_filled(profile, field) {
            score += weight;
        } else {
            missing_fields.push(field.to_string());
        }
    }

    let total_weight: f64 = FIELD_WEIGHTS.iter().map(|(_, w)| w).sum();
    let overall_score = (score / total_weight).clamp(0.0, 1.0);

    let status = match overall_score {
        _ if missing_fields.is_empty() => ProfileStatus::Complete,
        s if s >= 0.7 => ProfileStatus::Strong,
        s if s >= 0.4 => ProfileStatus::Moderate,
        _ => ProfileStatus::Weak,
    };

    let mut recommendations = Vec::new();
    if missing_fields.iter().any(|f| f == "skills") {
        recommendations.push("Add your key skills so recruiters can find you".to_string());
    }
    if missing_fields.iter().any(|f| f == "bio") {
        recommendations.push("Write a short bio about your experience".to_string());
    }
    if !missing_fields.is_empty() && recommendations.is_empty() {
        recommendations.push(format!(
            "Fill in {} more field(s) to complete your profile",
            missing_fields.len()
        ));
    }

    CompletenessReport {
        overall_score,
        status,
        missing_fields,
        recommendations,
    }
}
