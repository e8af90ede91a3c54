use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::legacy::snapshot::{LegacyId, ParsedSnapshot, SnapshotWarning};

#[derive(Debug, Serialize, PartialEq)]
pub struct CounterDrift {
    pub collection: &'static str,
    pub id: String,
    /// Name or title of the record, when the snapshot has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub field: &'static str,
    pub stored: i64,
    pub actual: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DanglingReference {
    pub collection: &'static str,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub field: &'static str,
    pub target: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DuplicateId {
    pub collection: &'static str,
    pub id: String,
    pub occurrences: usize,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct SnapshotCounts {
    pub jobs: usize,
    pub companies: usize,
    pub applications: usize,
    pub saved_resumes: usize,
    pub activities: usize,
}

#[derive(Debug, Serialize)]
pub struct AuditReport {
    pub counts: SnapshotCounts,
    pub warnings: Vec<SnapshotWarning>,
    pub counter_drift: Vec<CounterDrift>,
    pub dangling_references: Vec<DanglingReference>,
    pub duplicate_ids: Vec<DuplicateId>,
    /// No drift, no dangling references, no duplicates and no warnings.
    pub clean: bool,
}

fn tally<'a>(ids: impl Iterator<Item = &'a LegacyId>) -> HashMap<String, i64> {
    let mut counts = HashMap::new();
    for id in ids {
        *counts.entry(id.key()).or_insert(0) += 1;
    }
    counts
}

/// Reports each repeated id once, in order of first appearance.
fn duplicates<'a>(
    collection: &'static str,
    ids: impl Iterator<Item = &'a LegacyId> + Clone,
) -> Vec<DuplicateId> {
    let counts = tally(ids.clone());
    let mut reported = HashSet::new();
    ids.filter_map(|id| {
        let key = id.key();
        let occurrences = counts.get(&key).copied().unwrap_or(0) as usize;
        (occurrences > 1 && reported.insert(key.clone())).then(|| DuplicateId {
            collection,
            id: key,
            occurrences,
        })
    })
    .collect()
}

/// Missing stored counters read as zero, as the browser code treated them.
fn drift(
    collection: &'static str,
    id: &LegacyId,
    label: Option<&String>,
    field: &'static str,
    stored: Option<i64>,
    actual: &HashMap<String, i64>,
) -> Option<CounterDrift> {
    let stored = stored.unwrap_or(0);
    let actual = actual.get(&id.key()).copied().unwrap_or(0);
    (stored != actual).then(|| CounterDrift {
        collection,
        id: id.key(),
        label: label.cloned(),
        field,
        stored,
        actual,
    })
}

fn dangling(
    collection: &'static str,
    id: &LegacyId,
    label: Option<&String>,
    field: &'static str,
    target: Option<&LegacyId>,
    known: &HashSet<String>,
) -> Option<DanglingReference> {
    let target = target?.key();
    (!known.contains(&target)).then(|| DanglingReference {
        collection,
        id: id.key(),
        label: label.cloned(),
        field,
        target,
    })
}

pub fn audit_snapshot(snapshot: ParsedSnapshot) -> AuditReport {
    let ParsedSnapshot {
        jobs,
        companies,
        applications,
        resumes,
        dashboard,
        warnings,
    } = snapshot;

    let jobs_per_company = tally(jobs.iter().filter_map(|j| j.company_id.as_ref()));
    let applications_per_job = tally(applications.iter().filter_map(|a| a.job_id.as_ref()));
    let applications_per_resume =
        tally(applications.iter().filter_map(|a| a.resume_id.as_ref()));

    let mut counter_drift = Vec::new();
    counter_drift.extend(companies.iter().filter_map(|c| {
        drift(
            "companies",
            &c.id,
            c.name.as_ref(),
            "jobCount",
            c.job_count,
            &jobs_per_company,
        )
    }));
    counter_drift.extend(jobs.iter().filter_map(|j| {
        drift(
            "jobs",
            &j.id,
            j.title.as_ref(),
            "applicantsCount",
            j.applicants_count,
            &applications_per_job,
        )
    }));
    counter_drift.extend(resumes.iter().filter_map(|r| {
        drift(
            "savedResumes",
            &r.id,
            r.name.as_ref(),
            "jobApplications",
            r.job_applications,
            &applications_per_resume,
        )
    }));
    counter_drift.extend(dashboard.job_postings.iter().filter_map(|p| {
        drift(
            "dashboardData.jobPostings",
            &p.id,
            p.title.as_ref(),
            "applicantsCount",
            p.applicants_count,
            &applications_per_job,
        )
    }));
    if let Some(stored) = dashboard.stats.as_ref().and_then(|s| s.active_listings) {
        if stored != jobs.len() as i64 {
            counter_drift.push(CounterDrift {
                collection: "dashboardData.stats",
                id: "stats".to_string(),
                label: None,
                field: "activeListings",
                stored,
                actual: jobs.len() as i64,
            });
        }
    }

    let company_ids: HashSet<String> = companies.iter().map(|c| c.id.key()).collect();
    let job_ids: HashSet<String> = jobs.iter().map(|j| j.id.key()).collect();
    let resume_ids: HashSet<String> = resumes.iter().map(|r| r.id.key()).collect();

    let mut dangling_references = Vec::new();
    dangling_references.extend(jobs.iter().filter_map(|j| {
        dangling(
            "jobs",
            &j.id,
            j.title.as_ref(),
            "companyId",
            j.company_id.as_ref(),
            &company_ids,
        )
    }));
    for a in &applications {
        dangling_references.extend(dangling(
            "applications",
            &a.id,
            None,
            "jobId",
            a.job_id.as_ref(),
            &job_ids,
        ));
        dangling_references.extend(dangling(
            "applications",
            &a.id,
            None,
            "resumeId",
            a.resume_id.as_ref(),
            &resume_ids,
        ));
    }
    dangling_references.extend(dashboard.job_postings.iter().filter_map(|p| {
        dangling(
            "dashboardData.jobPostings",
            &p.id,
            p.title.as_ref(),
            "id",
            Some(&p.id),
            &job_ids,
        )
    }));

    let mut duplicate_ids = Vec::new();
    duplicate_ids.extend(duplicates("jobs", jobs.iter().map(|j| &j.id)));
    duplicate_ids.extend(duplicates("companies", companies.iter().map(|c| &c.id)));
    duplicate_ids.extend(duplicates("applications", applications.iter().map(|a| &a.id)));
    duplicate_ids.extend(duplicates("savedResumes", resumes.iter().map(|r| &r.id)));

    let clean = warnings.is_empty()
        && counter_drift.is_empty()
        && dangling_references.is_empty()
        && duplicate_ids.is_empty();

    AuditReport {
        counts: SnapshotCounts {
            jobs: jobs.len(),
            companies: companies.len(),
            applications: applications.len(),
            saved_resumes: resumes.len(),
            activities: dashboard.activities.len(),
        },
        warnings,
        counter_drift,
        dangling_references,
        duplicate_ids,
        clean,
    }
}
