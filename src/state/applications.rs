//! Application hooks and mutations.
//!
//! Status changes made from the per-job list and the single-application
//! view patch the matching record in place instead of refetching, and
//! publish their outcome after the patch. Every other mutation refetches
//! its list.

#[cfg(test)]
#[path = "applications_test.rs"]
mod applications_test;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;

use super::outcome::{Action, Outcome, OutcomeListener};
use super::resource::{Resource, ResourceCell, Settled};
use crate::error::ClientError;
use crate::net::api::ApiClient;
use crate::net::types::{Application, ApplicationStatus};
use crate::util::validate;

const BULK_FAILURE: &str = "Failed to update some applications";

fn report<T>(
    listener: &dyn OutcomeListener,
    action: Action,
    success: Outcome,
    result: &Result<T, ClientError>,
) {
    match result {
        Ok(_) => listener.on_outcome(&success),
        Err(e) => {
            tracing::warn!(error = %e, ?action, "application mutation failed");
            listener.on_outcome(&Outcome::failed(action, e.to_string()));
        }
    }
}

fn replace<T>(slot: &mut T, value: T) {
    *slot = value;
}

fn current(id: &Mutex<Option<String>>) -> Option<String> {
    id.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Store `id` and report whether it differs from the previous value.
fn swap_id(slot: &Mutex<Option<String>>, id: Option<String>) -> bool {
    let mut current = slot.lock().unwrap_or_else(PoisonError::into_inner);
    let changed = *current != id;
    *current = id;
    changed
}

// =============================================================================
// PER-JOB LIST (employer)
// =============================================================================

/// Applications received for one job.
pub struct JobApplicationsHook {
    api: Arc<ApiClient>,
    listener: Arc<dyn OutcomeListener>,
    job_id: Mutex<Option<String>>,
    cell: ResourceCell<Vec<Application>>,
}

impl JobApplicationsHook {
    #[must_use]
    pub fn new(api: Arc<ApiClient>, listener: Arc<dyn OutcomeListener>, job_id: Option<String>) -> Self {
        Self { api, listener, job_id: Mutex::new(job_id), cell: ResourceCell::new() }
    }

    pub async fn mount(api: Arc<ApiClient>, listener: Arc<dyn OutcomeListener>, job_id: Option<String>) -> Self {
        let hook = Self::new(api, listener, job_id);
        hook.refetch().await;
        hook
    }

    #[must_use]
    pub fn snapshot(&self) -> Resource<Vec<Application>> {
        self.cell.snapshot()
    }

    pub async fn set_job_id(&self, job_id: Option<String>) {
        if swap_id(&self.job_id, job_id) {
            self.refetch().await;
        }
    }

    pub async fn refetch(&self) {
        let Some(job_id) = current(&self.job_id) else {
            self.cell.idle();
            return;
        };
        let ticket = self.cell.begin();
        let result = self.api.job_applications(&job_id).await;
        if let Settled::Failed(error) = self.cell.settle(ticket, result, replace) {
            tracing::debug!(%error, %job_id, "job applications fetch failed");
        }
    }

    /// Change one application's status and patch it in the list.
    ///
    /// Only the `status` of the record with `id` changes; order and every
    /// other field are kept.
    ///
    /// # Errors
    ///
    /// Server failures publish a failure outcome and leave the list as is.
    pub async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, ClientError> {
        let result = self.api.update_application_status(id, status).await;
        if result.is_ok() {
            self.cell.patch(|apps| {
                for app in apps.iter_mut().filter(|a| a.id == id) {
                    app.status = status;
                }
            });
        }
        report(&*self.listener, Action::UpdateApplicationStatus, Outcome::ApplicationStatusUpdated, &result);
        result
    }

    pub fn dispose(&self) {
        self.cell.dispose();
    }
}

// =============================================================================
// OWN APPLICATIONS (candidate)
// =============================================================================

/// The signed-in candidate's applications.
pub struct MyApplicationsHook {
    api: Arc<ApiClient>,
    listener: Arc<dyn OutcomeListener>,
    cell: ResourceCell<Vec<Application>>,
}

impl MyApplicationsHook {
    #[must_use]
    pub fn new(api: Arc<ApiClient>, listener: Arc<dyn OutcomeListener>) -> Self {
        Self { api, listener, cell: ResourceCell::new() }
    }

    pub async fn mount(api: Arc<ApiClient>, listener: Arc<dyn OutcomeListener>) -> Self {
        let hook = Self::new(api, listener);
        hook.refetch().await;
        hook
    }

    #[must_use]
    pub fn snapshot(&self) -> Resource<Vec<Application>> {
        self.cell.snapshot()
    }

    pub async fn refetch(&self) {
        let ticket = self.cell.begin();
        let result = self.api.my_applications().await;
        if let Settled::Failed(error) = self.cell.settle(ticket, result, replace) {
            tracing::debug!(%error, "own applications fetch failed");
        }
    }

    /// Validate and submit an application, then refresh the list.
    ///
    /// # Errors
    ///
    /// Validation errors return before any request and without an outcome.
    /// Server failures publish a failure outcome and are returned.
    pub async fn create_application(
        &self,
        job_id: &str,
        resume: &str,
        cover_letter: Option<&str>,
    ) -> Result<Option<Application>, ClientError> {
        let draft = validate::application(job_id, resume, cover_letter)?;
        let result = self.api.create_application(&draft).await;
        report(&*self.listener, Action::SubmitApplication, Outcome::ApplicationSubmitted, &result);
        if result.is_ok() {
            self.refetch().await;
        }
        result
    }

    pub fn dispose(&self) {
        self.cell.dispose();
    }
}

// =============================================================================
// SINGLE APPLICATION
// =============================================================================

/// One application by id, with an in-place status update.
pub struct ApplicationHook {
    api: Arc<ApiClient>,
    listener: Arc<dyn OutcomeListener>,
    id: Mutex<Option<String>>,
    cell: ResourceCell<Option<Application>>,
}

impl ApplicationHook {
    #[must_use]
    pub fn new(api: Arc<ApiClient>, listener: Arc<dyn OutcomeListener>, id: Option<String>) -> Self {
        Self { api, listener, id: Mutex::new(id), cell: ResourceCell::new() }
    }

    pub async fn mount(api: Arc<ApiClient>, listener: Arc<dyn OutcomeListener>, id: Option<String>) -> Self {
        let hook = Self::new(api, listener, id);
        hook.refetch().await;
        hook
    }

    #[must_use]
    pub fn snapshot(&self) -> Resource<Option<Application>> {
        self.cell.snapshot()
    }

    pub async fn set_id(&self, id: Option<String>) {
        if swap_id(&self.id, id) {
            self.refetch().await;
        }
    }

    pub async fn refetch(&self) {
        let Some(id) = current(&self.id) else {
            self.cell.idle();
            return;
        };
        let ticket = self.cell.begin();
        let result = self.api.get_application(&id).await;
        if let Settled::Failed(error) = self.cell.settle(ticket, result, |slot, app| *slot = Some(app)) {
            tracing::debug!(%error, application_id = %id, "application fetch failed");
        }
    }

    /// Change the status and patch the loaded record. A no-op without an id.
    ///
    /// # Errors
    ///
    /// Server failures publish a failure outcome and leave the record as is.
    pub async fn update_status(&self, status: ApplicationStatus) -> Result<Option<Application>, ClientError> {
        let Some(id) = current(&self.id) else {
            return Ok(None);
        };
        let result = self.api.update_application_status(&id, status).await;
        if result.is_ok() {
            self.cell.patch(|slot| {
                if let Some(app) = slot {
                    app.status = status;
                }
            });
        }
        report(&*self.listener, Action::UpdateApplicationStatus, Outcome::ApplicationStatusUpdated, &result);
        result
    }

    pub fn dispose(&self) {
        self.cell.dispose();
    }
}

// =============================================================================
// STANDALONE MUTATIONS
// =============================================================================

/// Status changes not tied to a loaded list.
#[derive(Clone)]
pub struct ApplicationMutations {
    api: Arc<ApiClient>,
    listener: Arc<dyn OutcomeListener>,
    in_flight: Arc<AtomicUsize>,
}

/// Counts one in-flight mutation for [`ApplicationMutations::is_pending`].
struct PendingGuard<'a>(&'a AtomicUsize);

impl<'a> PendingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl ApplicationMutations {
    #[must_use]
    pub fn new(api: Arc<ApiClient>, listener: Arc<dyn OutcomeListener>) -> Self {
        Self { api, listener, in_flight: Arc::new(AtomicUsize::new(0)) }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    /// # Errors
    ///
    /// Server failures publish a failure outcome and are returned.
    pub async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, ClientError> {
        let _pending = PendingGuard::enter(&self.in_flight);
        let result = self.api.update_application_status(id, status).await;
        report(&*self.listener, Action::UpdateApplicationStatus, Outcome::ApplicationMarked(status), &result);
        result
    }

    /// Apply every `(id, status)` change concurrently. Returns how many were
    /// requested once all succeeded.
    ///
    /// # Errors
    ///
    /// Waits for every request, then returns the first failure in input
    /// order after publishing a single bulk failure outcome.
    pub async fn bulk_update_applications(&self, updates: &[(String, ApplicationStatus)]) -> Result<usize, ClientError> {
        let _pending = PendingGuard::enter(&self.in_flight);
        let results =
            join_all(updates.iter().map(|(id, status)| self.api.update_application_status(id, *status))).await;

        if let Some(err) = results.into_iter().find_map(Result::err) {
            tracing::warn!(error = %err, count = updates.len(), "bulk status update failed");
            self.listener.on_outcome(&Outcome::failed(Action::BulkUpdateApplications, BULK_FAILURE));
            return Err(err);
        }
        self.listener.on_outcome(&Outcome::ApplicationsBulkUpdated(updates.len()));
        Ok(updates.len())
    }
}
