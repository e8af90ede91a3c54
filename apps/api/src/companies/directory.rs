use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::credentials::non_blank;
use crate::errors::AppError;
use crate::models::company::Company;

text_enum! {
    Industry {
        It => "IT",
        Finance => "Finance",
        Healthcare => "Healthcare",
        Education => "Education",
        Manufacturing => "Manufacturing",
        Retail => "Retail",
        Other => "Other",
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateCompanyRequest {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompanyQuery {
    pub q: Option<String>,
    pub industry: Option<String>,
}

pub fn build_company(
    req: CreateCompanyRequest,
    creator: Uuid,
    now: DateTime<Utc>,
) -> Result<Company, AppError> {
    let name = non_blank(req.name)
        .ok_or_else(|| AppError::Validation("Company name is required".to_string()))?;
    let industry = non_blank(req.industry)
        .map(|raw| raw.parse::<Industry>().map_err(AppError::Validation))
        .transpose()?;
    let website = non_blank(req.website);
    if let Some(site) = &website {
        if !(site.starts_with("http://") || site.starts_with("https://")) {
            return Err(AppError::Validation(
                "Website must start with http:// or https://".to_string(),
            ));
        }
    }

    Ok(Company {
        id: Uuid::new_v4(),
        name,
        industry: industry.map(|i| i.as_str().to_string()),
        location: non_blank(req.location),
        description: non_blank(req.description),
        website,
        logo: non_blank(req.logo),
        created_by: Some(creator),
        created_at: now,
        job_count: 0,
    })
}

/// Case-insensitive match of `q` against name or description, plus an exact
/// (case-insensitive) industry filter.
pub fn search_companies(companies: Vec<Company>, query: &CompanyQuery) -> Vec<Company> {
    let text = query
        .q
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());
    let industry = query
        .industry
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty() && !i.eq_ignore_ascii_case("all"));

    companies
        .into_iter()
        .filter(|c| match &text {
            Some(text) => {
                c.name.to_lowercase().contains(text)
                    || c.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(text))
            }
            None => true,
        })
        .filter(|c| match industry {
            Some(wanted) => c
                .industry
                .as_deref()
                .is_some_and(|i| i.eq_ignore_ascii_case(wanted)),
            None => true,
        })
        .collect()
}
