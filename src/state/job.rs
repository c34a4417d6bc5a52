//! A single job posting, keyed by an optional id.

#[cfg(test)]
#[path = "job_test.rs"]
mod job_test;

use std::sync::{Arc, Mutex, PoisonError};

use super::resource::{Resource, ResourceCell, Settled};
use crate::net::api::ApiClient;
use crate::net::types::{Job, User};

/// Fetches `GET /jobs/:id` whenever the id changes. An absent id means
/// nothing to show: no request, `loading == false`.
pub struct JobHook {
    api: Arc<ApiClient>,
    id: Mutex<Option<String>>,
    cell: ResourceCell<Option<Job>>,
}

impl JobHook {
    #[must_use]
    pub fn new(api: Arc<ApiClient>, id: Option<String>) -> Self {
        Self { api, id: Mutex::new(id), cell: ResourceCell::new() }
    }

    pub async fn mount(api: Arc<ApiClient>, id: Option<String>) -> Self {
        let hook = Self::new(api, id);
        hook.refetch().await;
        hook
    }

    #[must_use]
    pub fn snapshot(&self) -> Resource<Option<Job>> {
        self.cell.snapshot()
    }

    pub async fn set_id(&self, id: Option<String>) {
        let changed = {
            let mut current = self.id.lock().unwrap_or_else(PoisonError::into_inner);
            let changed = *current != id;
            *current = id;
            changed
        };
        if changed {
            self.refetch().await;
        }
    }

    pub async fn refetch(&self) {
        let id = self.id.lock().unwrap_or_else(PoisonError::into_inner).clone();
        let Some(id) = id else {
            self.cell.idle();
            return;
        };
        let ticket = self.cell.begin();
        let result = self.api.get_job(&id).await;
        if let Settled::Failed(error) = self.cell.settle(ticket, result, |slot, job| *slot = Some(job)) {
            tracing::debug!(%error, job_id = %id, "job fetch failed");
        }
    }

    /// True when a job is loaded and `user` is its employer.
    #[must_use]
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.cell.snapshot().data.is_some_and(|job| job.is_owned_by(user))
    }

    pub fn dispose(&self) {
        self.cell.dispose();
    }
}
