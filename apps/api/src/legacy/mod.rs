//! Reads snapshots of the old browser-side store (`jobs`, `companies`,
//! `applications`, `savedResumes`, `dashboardData`) so they can be audited
//! and the resumes carried over.

pub mod audit;
pub mod handlers;
pub mod import;
pub mod snapshot;
