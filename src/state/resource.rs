//! Fetch state shared by every resource hook.
//!
//! DESIGN
//! ======
//! A hook owns one [`ResourceCell`]. Each fetch takes a [`Ticket`] from
//! [`ResourceCell::begin`]; tickets are numbered per cell, and only the most
//! recently issued ticket may write back. Overlapping fetches therefore end
//! in the state of the last request *issued*, whatever order they resolve
//! in. After [`ResourceCell::dispose`] nothing is written at all.

#[cfg(test)]
#[path = "resource_test.rs"]
mod resource_test;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::ClientError;

/// `{data, loading, error}` as seen by a view.
#[derive(Clone, Debug, PartialEq)]
pub struct Resource<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T: Default> Default for Resource<T> {
    /// Hooks start out loading, before their first fetch resolves.
    fn default() -> Self {
        Self { data: T::default(), loading: true, error: None }
    }
}

/// Sequence number of one issued fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Ticket(u64);

/// What happened to a fetch result handed to [`ResourceCell::settle`].
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Settled {
    Applied,
    /// Applied as an error; carries the message now in `error`.
    Failed(String),
    /// A newer fetch was issued or the hook was disposed; nothing written.
    Stale,
}

pub(crate) struct ResourceCell<T> {
    state: Mutex<Resource<T>>,
    issued: AtomicU64,
    mounted: AtomicBool,
}

impl<T: Clone + Default> ResourceCell<T> {
    pub(crate) fn new() -> Self {
        Self { state: Mutex::new(Resource::default()), issued: AtomicU64::new(0), mounted: AtomicBool::new(true) }
    }

    fn lock(&self) -> MutexGuard<'_, Resource<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn snapshot(&self) -> Resource<T> {
        self.lock().clone()
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Issue a new ticket, superseding any fetch still in flight.
    pub(crate) fn begin(&self) -> Ticket {
        let mut state = self.lock();
        let ticket = Ticket(self.issued.fetch_add(1, Ordering::AcqRel) + 1);
        if self.is_mounted() {
            state.loading = true;
            state.error = None;
        }
        ticket
    }

    /// Invalidate in-flight fetches without starting a new one, e.g. when a
    /// hook's id becomes absent.
    pub(crate) fn idle(&self) {
        let mut state = self.lock();
        self.issued.fetch_add(1, Ordering::AcqRel);
        if self.is_mounted() {
            state.loading = false;
        }
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.is_mounted() && self.issued.load(Ordering::Acquire) == ticket.0
    }

    /// Write a fetch result back if `ticket` is still the latest.
    ///
    /// On success `apply` merges the value into `data`; on failure `data` is
    /// left as it was and the error message is recorded.
    pub(crate) fn settle<U>(
        &self,
        ticket: Ticket,
        result: Result<U, ClientError>,
        apply: impl FnOnce(&mut T, U),
    ) -> Settled {
        let mut state = self.lock();
        if !self.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, "discarding stale fetch result");
            return Settled::Stale;
        }
        state.loading = false;
        match result {
            Ok(value) => {
                apply(&mut state.data, value);
                state.error = None;
                Settled::Applied
            }
            Err(e) => {
                let message = e.to_string();
                state.error = Some(message.clone());
                Settled::Failed(message)
            }
        }
    }

    /// Patch `data` in place. Returns false once disposed.
    pub(crate) fn patch(&self, f: impl FnOnce(&mut T)) -> bool {
        let mut state = self.lock();
        if !self.is_mounted() {
            return false;
        }
        f(&mut state.data);
        true
    }

    /// Stop accepting writes. Idempotent.
    pub(crate) fn dispose(&self) {
        self.mounted.store(false, Ordering::Release);
    }
}
