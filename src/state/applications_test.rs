use std::sync::OnceLock;
use std::time::Duration;

use super::*;
use crate::net::mock::{MockTransport, OutcomeLog, application_json, client_with, fail, ok};
use reqwest::Method;
use serde_json::json;

/// Records what a view would read from the hook at the moment an outcome arrives.
#[derive(Default)]
struct StatusAtOutcome {
    read: OnceLock<Box<dyn Fn() -> Option<ApplicationStatus> + Send + Sync>>,
    seen: std::sync::Mutex<Vec<Option<ApplicationStatus>>>,
}

impl OutcomeListener for StatusAtOutcome {
    fn on_outcome(&self, _outcome: &Outcome) {
        let status = self.read.get().and_then(|read| read());
        self.seen.lock().unwrap().push(status);
    }
}

const RESUME: &str = "Eight years shipping backend services in Rust, Go and Python.";

// =============================================================
// JobApplicationsHook
// =============================================================

#[tokio::test]
async fn status_patch_changes_only_the_target_status() {
    let mock = MockTransport::new();
    let log = OutcomeLog::new();
    mock.push(
        200,
        ok(json!([application_json("a", "pending"), application_json("b", "pending"), application_json("c", "reviewed")])),
    );
    let hook = JobApplicationsHook::mount(client_with(&mock), log.clone(), Some("job-1".into())).await;
    let before = hook.snapshot().data;

    mock.push(200, ok(json!({ "id": "b", "status": "accepted" })));
    hook.update_application_status("b", ApplicationStatus::Accepted).await.unwrap();

    let after = hook.snapshot().data;
    let mut expected = before.clone();
    expected[1].status = ApplicationStatus::Accepted;
    assert_eq!(after, expected);
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);

    let put = mock.last_request();
    assert_eq!(put.method, Method::PUT);
    assert_eq!(put.path, "/applications/b/status");
    assert_eq!(put.body, Some(json!({ "status": "accepted" })));
    assert_eq!(mock.request_count(), 2);
    assert_eq!(log.all(), vec![Outcome::ApplicationStatusUpdated]);
}

#[tokio::test]
async fn failed_status_patch_leaves_list() {
    let mock = MockTransport::new();
    let log = OutcomeLog::new();
    mock.push(200, ok(json!([application_json("a", "pending")])));
    let hook = JobApplicationsHook::mount(client_with(&mock), log.clone(), Some("job-1".into())).await;
    let before = hook.snapshot();

    mock.push(200, fail(""));
    let err = hook.update_application_status("a", ApplicationStatus::Rejected).await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to update application status");
    assert_eq!(hook.snapshot(), before);
    assert_eq!(
        log.all(),
        vec![Outcome::failed(Action::UpdateApplicationStatus, "Failed to update application status")]
    );
}

#[tokio::test]
async fn job_applications_fetch_is_keyed_by_job() {
    let mock = MockTransport::new();
    let log = OutcomeLog::new();
    let hook = JobApplicationsHook::mount(client_with(&mock), log.clone(), None).await;
    assert_eq!(mock.request_count(), 0);
    assert!(!hook.snapshot().loading);

    mock.push(200, ok(json!([application_json("a", "pending")])));
    hook.set_job_id(Some("job 7".into())).await;
    assert_eq!(mock.last_request().path, "/applications/job/job%207");
    assert_eq!(hook.snapshot().data.len(), 1);

    mock.push(500, json!({ "error": "database unavailable" }));
    hook.refetch().await;
    let snap = hook.snapshot();
    assert_eq!(snap.error.as_deref(), Some("database unavailable"));
    assert_eq!(snap.data.len(), 1);
    assert!(log.all().is_empty());
}

#[tokio::test]
async fn list_is_patched_before_outcome_is_published() {
    let mock = MockTransport::new();
    let listener = Arc::new(StatusAtOutcome::default());
    mock.push(200, ok(json!([application_json("a", "pending")])));
    let hook = Arc::new(
        JobApplicationsHook::mount(client_with(&mock), listener.clone(), Some("job-1".into())).await,
    );
    let view = hook.clone();
    let _ = listener.read.set(Box::new(move || view.snapshot().data.first().map(|a| a.status)));

    mock.push(200, ok(json!({})));
    hook.update_application_status("a", ApplicationStatus::Accepted).await.unwrap();

    assert_eq!(*listener.seen.lock().unwrap(), vec![Some(ApplicationStatus::Accepted)]);
}

// =============================================================
// MyApplicationsHook
// =============================================================

#[tokio::test]
async fn short_resume_rejected_before_network() {
    let mock = MockTransport::new();
    let log = OutcomeLog::new();
    let hook = MyApplicationsHook::new(client_with(&mock), log.clone());

    let resume = "x".repeat(40);
    let err = hook.create_application("job-1", &resume, None).await.unwrap_err();

    assert!(matches!(err, ClientError::Validation { field: "resume", .. }));
    assert!(err.to_string().contains("minimum 50 characters"));
    assert_eq!(mock.request_count(), 0);
    assert!(log.all().is_empty());
}

#[tokio::test]
async fn submit_sends_trimmed_draft_and_refetches() {
    let mock = MockTransport::new();
    let log = OutcomeLog::new();
    let hook = MyApplicationsHook::new(client_with(&mock), log.clone());

    mock.push(201, ok(application_json("new", "pending")));
    mock.push(200, ok(json!([application_json("new", "pending")])));
    let created = hook.create_application("job-1", &format!("  {RESUME}  "), Some("   ")).await.unwrap();

    assert_eq!(created.unwrap().id, "new");
    let requests = mock.requests();
    assert_eq!(requests[0].path, "/applications");
    assert_eq!(requests[0].body, Some(json!({ "job_id": "job-1", "resume": RESUME })));
    assert_eq!(requests[1].path, "/applications/my-applications");
    assert_eq!(hook.snapshot().data.len(), 1);
    assert_eq!(log.all(), vec![Outcome::ApplicationSubmitted]);
}

#[tokio::test]
async fn duplicate_submission_surfaces_server_error() {
    let mock = MockTransport::new();
    let log = OutcomeLog::new();
    let hook = MyApplicationsHook::new(client_with(&mock), log.clone());

    mock.push(409, json!({ "success": false, "error": "You have already applied to this job" }));
    let err = hook.create_application("job-1", RESUME, None).await.unwrap_err();

    assert_eq!(err.status(), Some(409));
    assert_eq!(mock.request_count(), 1);
    assert_eq!(
        log.all(),
        vec![Outcome::failed(Action::SubmitApplication, "You have already applied to this job")]
    );
}

// =============================================================
// ApplicationHook
// =============================================================

#[tokio::test]
async fn single_application_status_is_patched_in_place() {
    let mock = MockTransport::new();
    let log = OutcomeLog::new();
    mock.push(200, ok(application_json("a", "pending")));
    let hook = ApplicationHook::mount(client_with(&mock), log.clone(), Some("a".into())).await;
    let before = hook.snapshot().data.unwrap();

    mock.push(200, ok(json!({})));
    hook.update_status(ApplicationStatus::Reviewed).await.unwrap();

    let after = hook.snapshot().data.unwrap();
    assert_eq!(after.status, ApplicationStatus::Reviewed);
    assert_eq!(Application { status: before.status, ..after }, before);
    assert_eq!(mock.request_count(), 2);
    assert_eq!(log.all(), vec![Outcome::ApplicationStatusUpdated]);
}

#[tokio::test]
async fn record_is_patched_before_outcome_is_published() {
    let mock = MockTransport::new();
    let listener = Arc::new(StatusAtOutcome::default());
    mock.push(200, ok(application_json("a", "pending")));
    let hook = Arc::new(ApplicationHook::mount(client_with(&mock), listener.clone(), Some("a".into())).await);
    let view = hook.clone();
    let _ = listener.read.set(Box::new(move || view.snapshot().data.map(|a| a.status)));

    mock.push(200, ok(json!({})));
    hook.update_status(ApplicationStatus::Rejected).await.unwrap();

    assert_eq!(*listener.seen.lock().unwrap(), vec![Some(ApplicationStatus::Rejected)]);
}

#[tokio::test]
async fn update_status_without_id_is_a_no_op() {
    let mock = MockTransport::new();
    let log = OutcomeLog::new();
    let hook = ApplicationHook::mount(client_with(&mock), log.clone(), None).await;

    assert_eq!(hook.update_status(ApplicationStatus::Accepted).await, Ok(None));
    assert_eq!(mock.request_count(), 0);
    assert!(log.all().is_empty());
}

// =============================================================
// ApplicationMutations
// =============================================================

#[tokio::test]
async fn single_mutation_reports_new_status() {
    let mock = MockTransport::new();
    let log = OutcomeLog::new();
    let mutations = ApplicationMutations::new(client_with(&mock), log.clone());

    mock.push(200, ok(application_json("a", "accepted")));
    let updated = mutations.update_application_status("a", ApplicationStatus::Accepted).await.unwrap();

    assert_eq!(updated.unwrap().status, ApplicationStatus::Accepted);
    assert!(!mutations.is_pending());
    assert_eq!(log.all(), vec![Outcome::ApplicationMarked(ApplicationStatus::Accepted)]);
}

#[tokio::test(start_paused = true)]
async fn bulk_update_runs_concurrently_and_reports_count() {
    let mock = MockTransport::new();
    let log = OutcomeLog::new();
    let mutations = ApplicationMutations::new(client_with(&mock), log.clone());
    for _ in 0..3 {
        mock.push_delayed(200, ok(json!({})), Duration::from_millis(100));
    }

    let updates = vec![
        ("a".to_owned(), ApplicationStatus::Accepted),
        ("b".to_owned(), ApplicationStatus::Rejected),
        ("c".to_owned(), ApplicationStatus::Reviewed),
    ];
    let start = tokio::time::Instant::now();
    let (count, pending_midway) = tokio::join!(mutations.bulk_update_applications(&updates), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        mutations.is_pending()
    });

    assert_eq!(count, Ok(3));
    assert!(pending_midway);
    assert!(!mutations.is_pending());
    assert!(start.elapsed() < Duration::from_millis(300));
    assert_eq!(mock.request_count(), 3);
    assert_eq!(log.all(), vec![Outcome::ApplicationsBulkUpdated(3)]);
}

#[tokio::test]
async fn bulk_update_with_one_failure_reports_generic_failure() {
    let mock = MockTransport::new();
    let log = OutcomeLog::new();
    let mutations = ApplicationMutations::new(client_with(&mock), log.clone());
    mock.push(200, ok(json!({})));
    mock.push(404, json!({ "error": "Application not found" }));

    let updates = vec![
        ("a".to_owned(), ApplicationStatus::Accepted),
        ("missing".to_owned(), ApplicationStatus::Accepted),
    ];
    let err = mutations.bulk_update_applications(&updates).await.unwrap_err();

    assert_eq!(err.to_string(), "Application not found");
    assert_eq!(
        log.all(),
        vec![Outcome::failed(Action::BulkUpdateApplications, "Failed to update some applications")]
    );
}
