use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_TEMPLATE: &str = "Professional";
pub const RESUME_TEMPLATES: &[&str] = &[
    "Professional",
    "Modern",
    "Minimalist",
    "Creative",
    "Executive",
    "Technical",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub title: String,
    pub linkedin: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EducationItem {
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExperienceItem {
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

/// The builder form's content. Every section tolerates missing keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResumeData {
    pub personal: PersonalInfo,
    pub education: Vec<EducationItem>,
    pub experience: Vec<ExperienceItem>,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub achievements: Vec<String>,
}

impl ResumeData {
    /// Drops the empty rows the builder form starts with.
    pub fn normalized(mut self) -> Self {
        self.education.retain(|e| *e != EducationItem::default());
        self.experience.retain(|e| *e != ExperienceItem::default());
        for list in [&mut self.skills, &mut self.languages, &mut self.achievements] {
            list.retain(|item| !item.trim().is_empty());
            for item in list.iter_mut() {
                *item = item.trim().to_string();
            }
        }
        self
    }
}

/// A saved resume. `job_applications` is derived from the applications that
/// reference it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resume {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub template: String,
    pub data: ResumeData,
    pub last_modified: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub job_applications: i64,
}
