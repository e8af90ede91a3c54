use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::MemoryStore;

const PASSWORD: &str = "Passw0rd!";

fn app() -> Router {
    build_router(AppState::new(
        Arc::new(MemoryStore::new()),
        &Config::for_tests(),
    ))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Registers an account of the given role ("jobseeker" or "recruiter") and
/// returns its bearer token plus the registered user object.
async fn sign_up(app: &Router, role: &str, email: &str, extra: Value) -> (String, Value) {
    let mut body = json!({ "email": email, "password": PASSWORD, "full_name": "Test User" });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        body.extend(extra.clone());
    }
    let (status, registered) = send(
        app,
        Method::POST,
        &format!("/api/auth/{role}/register"),
        None,
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{registered}");

    let (status, login) = send(
        app,
        Method::POST,
        &format!("/api/auth/{role}/login"),
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{login}");
    (
        login["token"].as_str().unwrap().to_string(),
        registered["user"].clone(),
    )
}

async fn post_job(app: &Router, token: &str, title: &str) -> Value {
    let (status, job) = send(
        app,
        Method::POST,
        "/api/v1/jobs",
        Some(token),
        Some(json!({ "title": title, "location": "Y", "description": "Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{job}");
    job
}

async fn create_resume(app: &Router, token: &str, name: &str) -> Value {
    let (status, resume) = send(
        app,
        Method::POST,
        "/api/v1/resumes",
        Some(token),
        Some(json!({ "name": name, "data": { "personal": { "first_name": "Asha" } } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{resume}");
    resume
}

#[tokio::test]
async fn test_health_reports_store() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn test_register_hides_password_and_rejects_duplicates() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/jobseeker/register",
        None,
        Some(json!({
            "email": "Asha@Example.com",
            "password": PASSWORD,
            "full_name": "Asha Verma",
            "skills": "Rust, SQL, "
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Registration successful");
    let user = &body["user"];
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());
    assert_eq!(user["email"], "asha@example.com");
    assert_eq!(user["skills"], json!(["Rust", "SQL"]));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/jobseeker/register",
        None,
        Some(json!({ "email": "asha@example.com", "password": PASSWORD, "full_name": "Asha" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Email already registered");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/jobseeker/register",
        None,
        Some(json!({ "email": "new@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Missing required fields");
}

#[tokio::test]
async fn test_login_success_and_failure() {
    let app = app();
    let (token, _) = sign_up(&app, "jobseeker", "ravi@example.com", json!({})).await;
    assert!(!token.is_empty());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/jobseeker/login",
        None,
        Some(json!({ "email": "ravi@example.com", "password": "Wr0ng-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("token").is_none());
    assert_eq!(body["error"]["message"], "Invalid email or password");

    // a job seeker account cannot sign in as a recruiter
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/recruiter/login",
        None,
        Some(json!({ "email": "ravi@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, me) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "jobseeker");
    assert_eq!(me["user"]["email"], "ravi@example.com");
}

#[tokio::test]
async fn test_post_job_on_empty_store() {
    let app = app();
    let (token, _) = sign_up(&app, "recruiter", "hr@example.com", json!({})).await;
    let job = post_job(&app, &token, "X").await;
    assert_eq!(job["company"], "Test User's Company");

    let (status, jobs) = send(&app, Method::GET, "/api/v1/jobs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let jobs = jobs.as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["title"], "X");
    assert_eq!(jobs[0]["applicants_count"], 0);

    let (_, dashboard) = send(
        &app,
        Method::GET,
        "/api/v1/dashboard/recruiter",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(dashboard["stats"]["active_listings"], 1);
    assert_eq!(dashboard["activities"][0]["action"], "Job listing 'X' published");
    assert_eq!(dashboard["activities"][0]["time"], "Just now");
}

#[tokio::test]
async fn test_only_recruiters_post_jobs() {
    let app = app();
    let body = json!({ "title": "X", "location": "Y", "description": "Z" });
    let (status, _) = send(&app, Method::POST, "/api/v1/jobs", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (token, _) = sign_up(&app, "jobseeker", "seeker@example.com", json!({})).await;
    let (status, _) = send(&app, Method::POST, "/api/v1/jobs", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_company_job_count_rises_per_post() {
    let app = app();
    let (token, recruiter) = sign_up(
        &app,
        "recruiter",
        "hr@acme.in",
        json!({ "company_name": "Acme" }),
    )
    .await;
    let company_id = recruiter["company_id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/companies/{company_id}");

    let (_, company) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(company["job_count"], 0);

    let job = post_job(&app, &token, "Backend Engineer").await;
    assert_eq!(job["company"], "Acme");
    let (_, company) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(company["job_count"], 1);
    assert_eq!(company["jobs"].as_array().unwrap().len(), 1);

    post_job(&app, &token, "Frontend Engineer").await;
    let (_, company) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(company["job_count"], 2);
}

#[tokio::test]
async fn test_apply_with_single_resume() {
    let app = app();
    let (recruiter, _) = sign_up(&app, "recruiter", "hr@acme.in", json!({})).await;
    let job = post_job(&app, &recruiter, "X").await;
    let job_id = job["id"].as_str().unwrap();

    let (seeker, _) = sign_up(&app, "jobseeker", "asha@example.com", json!({})).await;
    let apply_uri = format!("/api/v1/jobs/{job_id}/apply");

    let (status, body) = send(&app, Method::POST, &apply_uri, Some(&seeker), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "RESUME_REQUIRED");

    let resume = create_resume(&app, &seeker, "Main").await;
    let (_, options) = send(
        &app,
        Method::GET,
        &format!("/api/v1/jobs/{job_id}/apply-options"),
        Some(&seeker),
        None,
    )
    .await;
    assert_eq!(options["mode"], "direct");

    let (status, application) = send(&app, Method::POST, &apply_uri, Some(&seeker), None).await;
    assert_eq!(status, StatusCode::CREATED, "{application}");
    assert_eq!(application["resume_id"], resume["id"]);
    assert_eq!(application["job_id"], job["id"]);
    assert_eq!(application["status"], "Applied");

    let (status, _) = send(&app, Method::POST, &apply_uri, Some(&seeker), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, mine) = send(&app, Method::GET, "/api/v1/applications", Some(&seeker), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (_, job) = send(&app, Method::GET, &format!("/api/v1/jobs/{job_id}"), None, None).await;
    assert_eq!(job["applicants_count"], 1);

    let resume_uri = format!("/api/v1/resumes/{}", resume["id"].as_str().unwrap());
    let (_, resume) = send(&app, Method::GET, &resume_uri, Some(&seeker), None).await;
    assert_eq!(resume["job_applications"], 1);

    let (_, dashboard) = send(
        &app,
        Method::GET,
        "/api/v1/dashboard/recruiter",
        Some(&recruiter),
        None,
    )
    .await;
    assert_eq!(dashboard["stats"]["total_applicants"], 1);
    assert_eq!(dashboard["stats"]["pending_reviews"], 1);
    assert_eq!(dashboard["activities"][0]["action"], "New applicant for X");
}

#[tokio::test]
async fn test_status_update_limited_to_poster() {
    let app = app();
    let (owner, _) = sign_up(&app, "recruiter", "owner@acme.in", json!({})).await;
    let (other, _) = sign_up(&app, "recruiter", "other@acme.in", json!({})).await;
    let job = post_job(&app, &owner, "X").await;
    let job_id = job["id"].as_str().unwrap();

    let (seeker, _) = sign_up(&app, "jobseeker", "asha@example.com", json!({})).await;
    create_resume(&app, &seeker, "Main").await;
    let (_, application) = send(
        &app,
        Method::POST,
        &format!("/api/v1/jobs/{job_id}/apply"),
        Some(&seeker),
        None,
    )
    .await;
    let status_uri = format!(
        "/api/v1/applications/{}/status",
        application["id"].as_str().unwrap()
    );

    let (status, _) = send(
        &app,
        Method::PATCH,
        &status_uri,
        Some(&other),
        Some(json!({ "status": "Interview" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &status_uri,
        Some(&owner),
        Some(json!({ "status": "interview" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "Interview");

    let (_, dashboard) = send(
        &app,
        Method::GET,
        "/api/v1/dashboard/job-seeker",
        Some(&seeker),
        None,
    )
    .await;
    assert_eq!(dashboard["stats"]["interviews"], 1);
    assert_eq!(dashboard["stats"]["saved_resumes"], 1);
}

#[tokio::test]
async fn test_delete_resume_removes_exactly_one() {
    let app = app();
    let (seeker, _) = sign_up(&app, "jobseeker", "asha@example.com", json!({})).await;
    let keep = create_resume(&app, &seeker, "Keep").await;
    let doomed = create_resume(&app, &seeker, "Drop").await;
    let doomed_uri = format!("/api/v1/resumes/{}", doomed["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::DELETE, &doomed_uri, Some(&seeker), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = send(&app, Method::GET, "/api/v1/resumes", Some(&seeker), None).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], keep["id"]);
    assert_eq!(list[0]["name"], "Keep");

    let (status, _) = send(&app, Method::GET, &doomed_uri, Some(&seeker), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // another seeker cannot touch the remaining resume
    let (intruder, _) = sign_up(&app, "jobseeker", "eve@example.com", json!({})).await;
    let keep_uri = format!("/api/v1/resumes/{}", keep["id"].as_str().unwrap());
    let (status, _) = send(&app, Method::DELETE, &keep_uri, Some(&intruder), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_resume() {
    let app = app();
    let (seeker, _) = sign_up(&app, "jobseeker", "asha@example.com", json!({})).await;
    let original = create_resume(&app, &seeker, "Main").await;
    let (status, copy) = send(
        &app,
        Method::POST,
        &format!("/api/v1/resumes/{}/duplicate", original["id"].as_str().unwrap()),
        Some(&seeker),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy["name"], "Main (Copy)");
    assert_ne!(copy["id"], original["id"]);
    assert_eq!(copy["data"], original["data"]);
}

#[tokio::test]
async fn test_legacy_audit_and_import() {
    let app = app();
    let (status, report) = send(
        &app,
        Method::POST,
        "/api/v1/legacy/audit",
        None,
        Some(json!({
            "jobs": "[{\"id\": 1, \"companyId\": 7, \"applicantsCount\": 2}]",
            "companies": "not json",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["clean"], false);
    assert_eq!(report["counter_drift"][0]["field"], "applicantsCount");
    assert_eq!(report["dangling_references"][0]["target"], "7");
    assert_eq!(report["warnings"][0]["key"], "companies");

    let (seeker, _) = sign_up(&app, "jobseeker", "asha@example.com", json!({})).await;
    let (status, imported) = send(
        &app,
        Method::POST,
        "/api/v1/legacy/import-resumes",
        Some(&seeker),
        Some(json!({
            "savedResumes": "[{\"id\": 1, \"name\": \"Old\", \"jobApplications\": 4}]"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(imported["imported"], 1);

    let (_, list) = send(&app, Method::GET, "/api/v1/resumes", Some(&seeker), None).await;
    assert_eq!(list[0]["name"], "Old");
    assert_eq!(list[0]["job_applications"], 0);
}

#[tokio::test]
async fn test_post_job_accepts_every_form_value() {
    let app = app();
    let (recruiter, _) = sign_up(&app, "recruiter", "hr@acme.in", json!({})).await;

    let mut bodies = Vec::new();
    for value in ["full-time", "part-time", "contract", "temporary", "freelance", "internship"] {
        bodies.push(json!({ "employment_type": value }));
    }
    for value in ["entry", "junior", "mid", "senior", "director", "executive"] {
        bodies.push(json!({ "experience_level": value }));
    }
    for value in ["hourly", "daily", "weekly", "monthly", "annual"] {
        bodies.push(json!({ "salary": { "min": 100, "max": 200, "period": value } }));
    }

    for mut body in bodies {
        let expected = body.clone();
        body["title"] = json!("Role");
        body["location"] = json!("Pune");
        body["description"] = json!("Work");
        let (status, job) =
            send(&app, Method::POST, "/api/v1/jobs", Some(&recruiter), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{expected} -> {job}");
        for (field, value) in expected.as_object().unwrap() {
            if field == "salary" {
                assert_eq!(job["salary"]["period"], value["period"]);
            } else {
                assert_eq!(&job[field], value);
            }
        }
    }
}

#[tokio::test]
async fn test_malformed_input_gets_error_envelope() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/jobseeker/register",
        None,
        Some(json!({ "email": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(&app, Method::GET, "/api/v1/jobs/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(&app, Method::GET, "/api/v1/jobs?company_id=7", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/jobseeker/login")
        .body(Body::from("email=a@b.co"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_apply_rejects_malformed_resume_id() {
    let app = app();
    let (recruiter, _) = sign_up(&app, "recruiter", "hr@acme.in", json!({})).await;
    let job = post_job(&app, &recruiter, "X").await;
    let (seeker, _) = sign_up(&app, "jobseeker", "asha@example.com", json!({})).await;
    create_resume(&app, &seeker, "Only").await;

    let apply_uri = format!("/api/v1/jobs/{}/apply", job["id"].as_str().unwrap());
    let (status, body) = send(
        &app,
        Method::POST,
        &apply_uri,
        Some(&seeker),
        Some(json!({ "resume_id": "not-a-uuid" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, mine) = send(&app, Method::GET, "/api/v1/applications", Some(&seeker), None).await;
    assert!(mine.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_apply_respects_deadline() {
    let app = app();
    let (recruiter, _) = sign_up(&app, "recruiter", "hr@acme.in", json!({})).await;
    let (seeker, _) = sign_up(&app, "jobseeker", "asha@example.com", json!({})).await;
    create_resume(&app, &seeker, "Main").await;

    let today = chrono::Utc::now().date_naive();
    let mut outcomes = Vec::new();
    for deadline in [today - chrono::Duration::days(1), today] {
        let (status, job) = send(
            &app,
            Method::POST,
            "/api/v1/jobs",
            Some(&recruiter),
            Some(json!({
                "title": format!("Closes {deadline}"),
                "location": "Pune",
                "description": "Work",
                "application_deadline": deadline.to_string(),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{job}");
        let apply_uri = format!("/api/v1/jobs/{}/apply", job["id"].as_str().unwrap());
        let (status, _) = send(&app, Method::POST, &apply_uri, Some(&seeker), None).await;
        outcomes.push(status);
    }
    assert_eq!(
        outcomes,
        vec![StatusCode::UNPROCESSABLE_ENTITY, StatusCode::CREATED]
    );
}

#[tokio::test]
async fn test_apply_with_two_resumes_needs_selection() {
    let app = app();
    let (recruiter, _) = sign_up(&app, "recruiter", "hr@acme.in", json!({})).await;
    let job = post_job(&app, &recruiter, "X").await;
    let job_id = job["id"].as_str().unwrap();
    let (seeker, _) = sign_up(&app, "jobseeker", "asha@example.com", json!({})).await;
    create_resume(&app, &seeker, "General").await;
    let tailored = create_resume(&app, &seeker, "Tailored").await;

    let (_, options) = send(
        &app,
        Method::GET,
        &format!("/api/v1/jobs/{job_id}/apply-options"),
        Some(&seeker),
        None,
    )
    .await;
    assert_eq!(options["mode"], "select");
    assert_eq!(options["resumes"].as_array().unwrap().len(), 2);

    let apply_uri = format!("/api/v1/jobs/{job_id}/apply");
    let (status, body) = send(&app, Method::POST, &apply_uri, Some(&seeker), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "RESUME_SELECTION_REQUIRED");

    let (status, application) = send(
        &app,
        Method::POST,
        &apply_uri,
        Some(&seeker),
        Some(json!({ "resume_id": tailored["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{application}");
    assert_eq!(application["resume_id"], tailored["id"]);
    assert_eq!(application["resume_name"], "Tailored");
}
