use axum::extract::State;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::Json;
use crate::legacy::audit::{audit_snapshot, AuditReport};
use crate::legacy::import::convert_resumes;
use crate::legacy::snapshot::{parse_snapshot, SnapshotRequest, SnapshotWarning};
use crate::models::resume::Resume;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub resumes: Vec<Resume>,
    pub warnings: Vec<SnapshotWarning>,
}

/// POST /api/v1/legacy/audit
pub async fn handle_audit(Json(req): Json<SnapshotRequest>) -> Json<AuditReport> {
    let report = audit_snapshot(parse_snapshot(&req));
    if !report.clean {
        warn!(
            warnings = report.warnings.len(),
            drift = report.counter_drift.len(),
            dangling = report.dangling_references.len(),
            duplicates = report.duplicate_ids.len(),
            "Legacy snapshot has inconsistencies"
        );
    }
    Json(report)
}

/// POST /api/v1/legacy/import-resumes
///
/// Only `savedResumes` is read; other keys are ignored.
pub async fn handle_import_resumes(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SnapshotRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    let owner_id = user.require_job_seeker()?;
    let req = SnapshotRequest {
        saved_resumes: req.saved_resumes,
        ..Default::default()
    };
    let parsed = parse_snapshot(&req);
    let mut warnings: Vec<SnapshotWarning> = parsed
        .warnings
        .into_iter()
        .filter(|w| w.key == "savedResumes")
        .collect();

    let resumes = convert_resumes(parsed.resumes, owner_id, Utc::now(), &mut warnings);
    if !resumes.is_empty() {
        state.store.insert_resumes(&resumes).await?;
    }
    for w in &warnings {
        warn!(key = w.key, "Legacy import: {}", w.message);
    }

    info!(user_id = %owner_id, imported = resumes.len(), "Legacy resumes imported");
    Ok(Json(ImportResponse {
        imported: resumes.len(),
        resumes,
        warnings,
    }))
}
