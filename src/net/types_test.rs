use super::*;
use serde_json::json;

// =============================================================
// Helpers
// =============================================================

fn employer() -> User {
    serde_json::from_value(json!({
        "id": "u-emp",
        "email": "boss@corp.test",
        "role": "employer",
        "first_name": "Grace",
        "last_name": "Hopper"
    }))
    .unwrap()
}

fn job_json() -> serde_json::Value {
    json!({
        "id": "j-1",
        "title": "Backend Engineer",
        "description": "Build services.",
        "requirements": "Rust, SQL , ,Kubernetes",
        "location": "Remote",
        "employer_id": "u-emp",
        "status": "active",
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-02T00:00:00Z",
        "employer": { "id": "u-emp", "role": "employer", "first_name": "Grace", "last_name": "Hopper" }
    })
}

// =============================================================
// Enums
// =============================================================

#[test]
fn enums_use_lowercase_wire_names() {
    assert_eq!(serde_json::to_value(Role::Candidate).unwrap(), json!("candidate"));
    assert_eq!(serde_json::to_value(JobStatus::Draft).unwrap(), json!("draft"));
    assert_eq!(serde_json::to_value(ApplicationStatus::Accepted).unwrap(), json!("accepted"));
}

#[test]
fn enums_parse_case_insensitively() {
    assert_eq!("Employer".parse::<Role>(), Ok(Role::Employer));
    assert_eq!(" closed ".parse::<JobStatus>(), Ok(JobStatus::Closed));
    assert_eq!("REVIEWED".parse::<ApplicationStatus>(), Ok(ApplicationStatus::Reviewed));
    assert_eq!("admin".parse::<Role>(), Err("unknown role: admin".to_owned()));
}

#[test]
fn enum_display_matches_wire() {
    assert_eq!(ApplicationStatus::Rejected.to_string(), "rejected");
    assert_eq!(Role::Employer.as_str(), "employer");
}

// =============================================================
// Entities
// =============================================================

#[test]
fn job_decodes_with_partial_employer_embed() {
    let job: Job = serde_json::from_value(job_json()).unwrap();
    assert_eq!(job.status, JobStatus::Active);
    assert_eq!(job.salary, None);
    let embed = job.employer.as_ref().unwrap();
    assert_eq!(embed.full_name(), "Grace Hopper");
    assert_eq!(embed.email, None);
}

#[test]
fn job_page_decodes_employer_embed_without_identity() {
    let mut job = job_json();
    job["employer"] = json!({ "first_name": "Grace", "last_name": "Hopper", "bio": "Compiler pioneer" });
    let page: PagedEnvelope<Job> = serde_json::from_value(json!({
        "success": true,
        "data": [job],
        "pagination": { "page": 1, "limit": 10, "total": 1, "totalPages": 1 }
    }))
    .unwrap();

    let employer = page.data.unwrap()[0].employer.clone().unwrap();
    assert_eq!(employer.id, None);
    assert_eq!(employer.role, None);
    assert_eq!(employer.bio.as_deref(), Some("Compiler pioneer"));
}

#[test]
fn application_list_decodes_partial_job_and_candidate_embeds() {
    let env: Envelope<Vec<Application>> = serde_json::from_value(json!({
        "success": true,
        "data": [{
            "id": "a-1",
            "job_id": "j-1",
            "candidate_id": "c-1",
            "resume": "Long resume text",
            "status": "pending",
            "job": {
                "title": "Backend Engineer",
                "location": "Remote",
                "description": "Build services.",
                "employer": { "first_name": "Grace", "last_name": "Hopper" }
            },
            "candidate": { "first_name": "Ada", "email": "ada@example.test" }
        }]
    }))
    .unwrap();

    let app = &env.data.unwrap()[0];
    let job = app.job.as_ref().unwrap();
    assert_eq!(job.title, "Backend Engineer");
    assert_eq!(job.employer_id, None);
    assert_eq!(job.requirements, "");
    assert_eq!(job.employer.as_ref().unwrap().full_name(), "Grace Hopper");
    let candidate = app.candidate.as_ref().unwrap();
    assert_eq!(candidate.full_name(), "Ada");
    assert_eq!(candidate.role, None);
}

#[test]
fn requirement_list_splits_and_trims() {
    let job: Job = serde_json::from_value(job_json()).unwrap();
    assert_eq!(job.requirement_list(), vec!["Rust", "SQL", "Kubernetes"]);
}

#[test]
fn ownership_compares_employer_id() {
    let job: Job = serde_json::from_value(job_json()).unwrap();
    assert!(job.is_owned_by(&employer()));
    let mut other = employer();
    other.id = "u-other".into();
    assert!(!job.is_owned_by(&other));
}

#[test]
fn application_decodes_ai_analysis() {
    let app: Application = serde_json::from_value(json!({
        "id": "a-1",
        "job_id": "j-1",
        "candidate_id": "u-cand",
        "resume": "Ten years of distributed systems.",
        "status": "pending",
        "ai_score": 87,
        "ai_analysis": {
            "score": 87,
            "strengths": ["Rust"],
            "concerns": [],
            "explanation": "Strong match",
            "match_percentage": 90,
            "recommendation": "interview"
        },
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-01T00:00:00Z"
    }))
    .unwrap();
    assert_eq!(app.ai_score, Some(87.0));
    let analysis = app.ai_analysis.unwrap();
    assert_eq!(analysis.strengths, vec!["Rust".to_owned()]);
    assert_eq!(analysis.recommendation, "interview");
    assert!(app.cover_letter.is_none());
}

#[test]
fn full_name_trims_missing_halves() {
    let mut user = employer();
    user.last_name.clear();
    assert_eq!(user.full_name(), "Grace");
}

// =============================================================
// Envelopes
// =============================================================

#[test]
fn paged_envelope_reads_total_pages() {
    let env: PagedEnvelope<Job> = serde_json::from_value(json!({
        "success": true,
        "data": [job_json()],
        "pagination": { "page": 2, "limit": 10, "total": 25, "totalPages": 3 }
    }))
    .unwrap();
    assert_eq!(env.pagination, Some(Pagination { page: 2, limit: 10, total: 25, total_pages: 3 }));
    assert_eq!(env.data.unwrap().len(), 1);
}

#[test]
fn failure_envelope_has_no_data() {
    let env: Envelope<UserPayload> = serde_json::from_value(json!({ "success": false, "error": "X" })).unwrap();
    assert!(!env.success);
    assert!(env.data.is_none());
    assert_eq!(env.error.as_deref(), Some("X"));
}

#[test]
fn pagination_default_is_first_page_of_ten() {
    assert_eq!(Pagination::default(), Pagination { page: 1, limit: 10, total: 0, total_pages: 0 });
}

// =============================================================
// Request bodies and queries
// =============================================================

#[test]
fn register_request_flattens_profile() {
    let body = RegisterRequest {
        email: "a@b.com".into(),
        password: "secret1".into(),
        profile: SignUpProfile { first_name: "Ada".into(), last_name: "Lovelace".into(), role: Role::Candidate },
    };
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        json!({
            "email": "a@b.com",
            "password": "secret1",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "role": "candidate"
        })
    );
}

#[test]
fn partial_updates_skip_absent_fields() {
    let update = JobUpdate { status: Some(JobStatus::Closed), ..JobUpdate::default() };
    assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "status": "closed" }));
    assert!(ProfileUpdate::default().is_empty());
    let profile = ProfileUpdate { bio: Some("hi".into()), ..ProfileUpdate::default() };
    assert!(!profile.is_empty());
}

#[test]
fn job_query_drops_empty_filters() {
    let query = JobQuery { page: Some(2), limit: Some(10), search: Some("engineer".into()), location: Some(String::new()) };
    assert_eq!(
        query.to_pairs(),
        vec![
            ("page".to_owned(), "2".to_owned()),
            ("limit".to_owned(), "10".to_owned()),
            ("search".to_owned(), "engineer".to_owned()),
        ]
    );
    assert!(JobQuery::default().to_pairs().is_empty());
}
