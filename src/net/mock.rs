//! Scripted transport and JSON fixtures shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};

use super::api::ApiClient;
use super::transport::{ApiRequest, RawResponse, Transport};
use crate::error::ClientError;

struct Scripted {
    response: Result<RawResponse, ClientError>,
    delay: Option<Duration>,
}

/// Replays queued responses in send order and records every request.
pub(crate) struct MockTransport {
    queue: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self { queue: Mutex::new(VecDeque::new()), requests: Mutex::new(Vec::new()) })
    }

    pub(crate) fn push(&self, status: u16, body: Value) {
        self.push_scripted(Ok(RawResponse { status, body: body.to_string() }), None);
    }

    pub(crate) fn push_delayed(&self, status: u16, body: Value, delay: Duration) {
        self.push_scripted(Ok(RawResponse { status, body: body.to_string() }), Some(delay));
    }

    pub(crate) fn push_raw(&self, status: u16, body: &str) {
        self.push_scripted(Ok(RawResponse { status, body: body.to_owned() }), None);
    }

    pub(crate) fn push_error(&self, err: ClientError) {
        self.push_scripted(Err(err), None);
    }

    fn push_scripted(&self, response: Result<RawResponse, ClientError>, delay: Option<Duration>) {
        self.queue.lock().unwrap().push_back(Scripted { response, delay });
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn last_request(&self) -> ApiRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request sent")
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ClientError> {
        self.requests.lock().unwrap().push(request);
        let scripted = self.queue.lock().unwrap().pop_front();
        let Some(scripted) = scripted else {
            return Ok(RawResponse { status: 500, body: json!({ "error": "no scripted response" }).to_string() });
        };
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        scripted.response
    }
}

/// Value of query parameter `key`, if sent.
pub(crate) fn query_param(request: &ApiRequest, key: &str) -> Option<String> {
    request.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
}

pub(crate) fn client_with(mock: &Arc<MockTransport>) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(mock.clone()))
}

// =============================================================
// Fixtures
// =============================================================

pub(crate) fn ok(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

pub(crate) fn fail(error: &str) -> Value {
    json!({ "success": false, "error": error })
}

pub(crate) fn paged(items: Vec<Value>, page: u32, limit: u32, total: u64) -> Value {
    let total_pages = total.div_ceil(u64::from(limit));
    json!({
        "success": true,
        "data": items,
        "pagination": { "page": page, "limit": limit, "total": total, "totalPages": total_pages }
    })
}

pub(crate) fn user_json(id: &str, role: &str) -> Value {
    json!({
        "id": id,
        "email": format!("{id}@example.test"),
        "role": role,
        "first_name": "Test",
        "last_name": "User"
    })
}

pub(crate) fn auth_ok(user_id: &str, role: &str, token: &str) -> Value {
    ok(json!({ "user": user_json(user_id, role), "token": token }))
}

pub(crate) fn job_json(id: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Job {id}"),
        "description": "Design, build and operate backend services for the hiring platform.",
        "requirements": "Rust, PostgreSQL, distributed systems",
        "location": "Remote",
        "salary": "120k",
        "employer_id": "emp-1",
        "status": "active",
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-01T00:00:00Z"
    })
}

pub(crate) fn application_json(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "job_id": "job-1",
        "candidate_id": format!("cand-{id}"),
        "resume": "Seven years building payment systems in Rust and Go.",
        "cover_letter": "I would love to join the team.",
        "status": status,
        "ai_score": 72,
        "ai_analysis": {
            "score": 72,
            "strengths": ["Rust"],
            "concerns": ["No Kubernetes"],
            "explanation": "Solid backend match",
            "match_percentage": 75,
            "recommendation": "interview"
        },
        "created_at": "2026-01-03T00:00:00Z",
        "updated_at": "2026-01-03T00:00:00Z"
    })
}

// =============================================================
// Outcome recording
// =============================================================

/// Listener that keeps every outcome in order.
#[derive(Default)]
pub(crate) struct OutcomeLog {
    outcomes: Mutex<Vec<crate::state::outcome::Outcome>>,
}

impl OutcomeLog {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn all(&self) -> Vec<crate::state::outcome::Outcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl crate::state::outcome::OutcomeListener for OutcomeLog {
    fn on_outcome(&self, outcome: &crate::state::outcome::Outcome) {
        self.outcomes.lock().unwrap().push(outcome.clone());
    }
}
