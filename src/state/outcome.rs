//! Outcomes published by the session store and resource hooks.
//!
//! DESIGN
//! ======
//! The data layer only reports what happened. Turning an outcome into a
//! user-visible notification is the job of a listener such as
//! [`ToastQueue`](crate::util::toast::ToastQueue), so the core can be driven
//! and asserted on without any UI.

use crate::net::types::ApplicationStatus;

/// Operation an outcome refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    SignUp,
    SignIn,
    SignOut,
    UpdateProfile,
    FetchJobs,
    FetchMyJobs,
    CreateJob,
    UpdateJob,
    DeleteJob,
    SubmitApplication,
    UpdateApplicationStatus,
    BulkUpdateApplications,
}

/// Result of a user-initiated operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    SignedUp,
    SignedIn,
    SignedOut,
    /// Local sign-out finished but clearing persisted state failed.
    SignedOutLocally,
    ProfileUpdated,
    JobCreated,
    JobUpdated,
    JobDeleted,
    ApplicationSubmitted,
    /// Status changed from a list or detail view that patches in place.
    ApplicationStatusUpdated,
    /// Status changed through the standalone mutation helper.
    ApplicationMarked(ApplicationStatus),
    ApplicationsBulkUpdated(usize),
    Failed { action: Action, message: String },
}

impl Outcome {
    pub(crate) fn failed(action: Action, message: impl Into<String>) -> Self {
        Self::Failed { action, message: message.into() }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::SignedOutLocally)
    }
}

/// Receives outcomes as they happen.
pub trait OutcomeListener: Send + Sync {
    fn on_outcome(&self, outcome: &Outcome);
}

/// Drops every outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreOutcomes;

impl OutcomeListener for IgnoreOutcomes {
    fn on_outcome(&self, _outcome: &Outcome) {}
}
