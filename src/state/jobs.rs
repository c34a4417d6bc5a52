//! Paginated job lists: the public board and the employer's own postings.
//!
//! SYSTEM CONTEXT
//! ==============
//! Both hooks re-fetch whenever one of their parameters changes and after
//! every successful mutation. A failed fetch keeps the previous page visible,
//! records the error, and publishes a fetch failure outcome.

#[cfg(test)]
#[path = "jobs_test.rs"]
mod jobs_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::outcome::{Action, Outcome, OutcomeListener};
use super::resource::{Resource, ResourceCell, Settled};
use crate::error::ClientError;
use crate::net::api::ApiClient;
use crate::net::types::{Job, JobDraft, JobQuery, JobUpdate, Page, PageQuery, Pagination};
use crate::util::debounce::Debouncer;
use crate::util::validate;

/// One page of jobs plus its cursor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobList {
    pub jobs: Vec<Job>,
    pub pagination: Pagination,
}

/// Replace the items; keep the previous cursor when the response has none.
fn merge_page(list: &mut JobList, page: Page<Job>) {
    list.jobs = page.items;
    if let Some(pagination) = page.pagination {
        list.pagination = pagination;
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// PUBLIC BOARD
// =============================================================================

/// Dependencies of the public job list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobsParams {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub location: Option<String>,
}

impl JobsParams {
    /// First page, no filters.
    #[must_use]
    pub fn first_page(limit: u32) -> Self {
        Self { page: 1, limit, search: None, location: None }
    }

    fn query(&self) -> JobQuery {
        JobQuery {
            page: Some(self.page),
            limit: Some(self.limit),
            search: self.search.clone(),
            location: self.location.clone(),
        }
    }
}

pub struct JobsHook {
    api: Arc<ApiClient>,
    listener: Arc<dyn OutcomeListener>,
    params: Mutex<JobsParams>,
    cell: ResourceCell<JobList>,
    debounce: Debouncer,
}

impl JobsHook {
    /// Construct without fetching. Blank filters are dropped.
    #[must_use]
    pub fn new(api: Arc<ApiClient>, listener: Arc<dyn OutcomeListener>, mut params: JobsParams) -> Self {
        params.search = non_blank(params.search);
        params.location = non_blank(params.location);
        Self {
            api,
            listener,
            params: Mutex::new(params),
            cell: ResourceCell::new(),
            debounce: Debouncer::default(),
        }
    }

    /// Construct and run the first fetch.
    pub async fn mount(api: Arc<ApiClient>, listener: Arc<dyn OutcomeListener>, params: JobsParams) -> Self {
        let hook = Self::new(api, listener, params);
        hook.refetch().await;
        hook
    }

    #[must_use]
    pub fn snapshot(&self) -> Resource<JobList> {
        self.cell.snapshot()
    }

    #[must_use]
    pub fn params(&self) -> JobsParams {
        lock(&self.params).clone()
    }

    /// Re-run the fetch with the current parameters.
    pub async fn refetch(&self) {
        let (query, ticket) = {
            let params = lock(&self.params);
            (params.query(), self.cell.begin())
        };
        let result = self.api.list_jobs(&query).await;
        if let Settled::Failed(error) = self.cell.settle(ticket, result, merge_page) {
            tracing::warn!(%error, page = query.page, "job list fetch failed");
            self.listener.on_outcome(&Outcome::failed(Action::FetchJobs, "Failed to fetch jobs"));
        }
    }

    /// Apply `f` to the parameters and fetch if anything changed.
    async fn update_params(&self, f: impl FnOnce(&mut JobsParams)) {
        let changed = {
            let mut params = lock(&self.params);
            let before = params.clone();
            f(&mut *params);
            *params != before
        };
        if changed {
            self.refetch().await;
        }
    }

    pub async fn set_page(&self, page: u32) {
        self.update_params(|p| p.page = page.max(1)).await;
    }

    pub async fn set_limit(&self, limit: u32) {
        self.update_params(|p| p.limit = limit.max(1)).await;
    }

    /// Change the filters. A change always goes back to page 1.
    pub async fn set_filters(&self, search: Option<String>, location: Option<String>) {
        let search = non_blank(search);
        let location = non_blank(location);
        self.update_params(|p| {
            if p.search != search || p.location != location {
                p.search = search;
                p.location = location;
                p.page = 1;
            }
        })
        .await;
    }

    /// Debounced [`set_filters`](Self::set_filters) for keystroke input.
    /// Returns false when a later call superseded this one.
    pub async fn search(&self, search: Option<String>, location: Option<String>) -> bool {
        match self.debounce.settle((search, location)).await {
            Some((search, location)) => {
                self.set_filters(search, location).await;
                true
            }
            None => false,
        }
    }

    pub fn dispose(&self) {
        self.cell.dispose();
    }
}

// =============================================================================
// EMPLOYER POSTINGS
// =============================================================================

/// The signed-in employer's own jobs, with create/update/delete.
pub struct MyJobsHook {
    api: Arc<ApiClient>,
    listener: Arc<dyn OutcomeListener>,
    query: Mutex<PageQuery>,
    cell: ResourceCell<JobList>,
}

impl MyJobsHook {
    #[must_use]
    pub fn new(api: Arc<ApiClient>, listener: Arc<dyn OutcomeListener>, page: u32, limit: u32) -> Self {
        let query = PageQuery { page: Some(page.max(1)), limit: Some(limit.max(1)) };
        Self { api, listener, query: Mutex::new(query), cell: ResourceCell::new() }
    }

    pub async fn mount(api: Arc<ApiClient>, listener: Arc<dyn OutcomeListener>, page: u32, limit: u32) -> Self {
        let hook = Self::new(api, listener, page, limit);
        hook.refetch().await;
        hook
    }

    #[must_use]
    pub fn snapshot(&self) -> Resource<JobList> {
        self.cell.snapshot()
    }

    pub async fn refetch(&self) {
        let (query, ticket) = {
            let query = lock(&self.query);
            (*query, self.cell.begin())
        };
        let result = self.api.my_jobs(query).await;
        if let Settled::Failed(error) = self.cell.settle(ticket, result, merge_page) {
            tracing::warn!(%error, "employer job list fetch failed");
            self.listener.on_outcome(&Outcome::failed(Action::FetchMyJobs, "Failed to fetch your jobs"));
        }
    }

    pub async fn set_page(&self, page: u32) {
        let changed = {
            let mut query = lock(&self.query);
            let page = Some(page.max(1));
            let changed = query.page != page;
            query.page = page;
            changed
        };
        if changed {
            self.refetch().await;
        }
    }

    pub async fn set_limit(&self, limit: u32) {
        let changed = {
            let mut query = lock(&self.query);
            let limit = Some(limit.max(1));
            let changed = query.limit != limit;
            query.limit = limit;
            changed
        };
        if changed {
            self.refetch().await;
        }
    }

    /// Publish the mutation's outcome and resync the list on success.
    async fn after_mutation<T>(
        &self,
        action: Action,
        success: Outcome,
        result: Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        match result {
            Ok(value) => {
                self.listener.on_outcome(&success);
                self.refetch().await;
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, ?action, "job mutation failed");
                self.listener.on_outcome(&Outcome::failed(action, e.to_string()));
                Err(e)
            }
        }
    }

    /// Post a new job.
    ///
    /// # Errors
    ///
    /// Validation errors return before any request and without an outcome;
    /// server failures publish a failure outcome and leave the list as is.
    pub async fn create_job(&self, draft: JobDraft) -> Result<Option<Job>, ClientError> {
        validate::job_draft(&draft)?;
        let result = self.api.create_job(&draft).await;
        self.after_mutation(Action::CreateJob, Outcome::JobCreated, result).await
    }

    /// # Errors
    ///
    /// Server failures publish a failure outcome and are returned.
    pub async fn update_job(&self, id: &str, update: JobUpdate) -> Result<Option<Job>, ClientError> {
        let result = self.api.update_job(id, &update).await;
        self.after_mutation(Action::UpdateJob, Outcome::JobUpdated, result).await
    }

    /// # Errors
    ///
    /// Server failures publish a failure outcome and are returned.
    pub async fn delete_job(&self, id: &str) -> Result<(), ClientError> {
        let result = self.api.delete_job(id).await;
        self.after_mutation(Action::DeleteJob, Outcome::JobDeleted, result).await
    }

    pub fn dispose(&self) {
        self.cell.dispose();
    }
}
