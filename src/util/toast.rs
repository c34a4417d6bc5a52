//! Presentation adapter: outcomes in, toast notifications out.

#[cfg(test)]
#[path = "toast_test.rs"]
mod toast_test;

use std::sync::{Mutex, PoisonError};

use crate::state::outcome::{Action, Outcome, OutcomeListener};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    fn success(message: impl Into<String>) -> Self {
        Self { kind: ToastKind::Success, message: message.into() }
    }

    fn error(message: impl Into<String>) -> Self {
        Self { kind: ToastKind::Error, message: message.into() }
    }
}

/// Text shown when a failed action carries no message of its own.
fn default_failure(action: Action) -> &'static str {
    match action {
        Action::SignUp => "Registration failed",
        Action::SignIn => "Login failed",
        Action::SignOut => "Logout failed",
        Action::UpdateProfile => "Failed to update profile",
        Action::FetchJobs => "Failed to fetch jobs",
        Action::FetchMyJobs => "Failed to fetch your jobs",
        Action::CreateJob => "Failed to create job",
        Action::UpdateJob => "Failed to update job",
        Action::DeleteJob => "Failed to delete job",
        Action::SubmitApplication => "Failed to submit application",
        Action::UpdateApplicationStatus => "Failed to update application status",
        Action::BulkUpdateApplications => "Failed to update some applications",
    }
}

#[must_use]
pub fn toast_for(outcome: &Outcome) -> Toast {
    match outcome {
        Outcome::SignedUp => Toast::success("Account created successfully!"),
        Outcome::SignedIn => Toast::success("Signed in successfully!"),
        Outcome::SignedOut => Toast::success("Signed out successfully!"),
        Outcome::SignedOutLocally => Toast::error("Error during sign out, but you have been logged out locally"),
        Outcome::ProfileUpdated => Toast::success("Profile updated successfully!"),
        Outcome::JobCreated => Toast::success("Job created successfully!"),
        Outcome::JobUpdated => Toast::success("Job updated successfully!"),
        Outcome::JobDeleted => Toast::success("Job deleted successfully!"),
        Outcome::ApplicationSubmitted => Toast::success("Application submitted successfully!"),
        Outcome::ApplicationStatusUpdated => Toast::success("Application status updated!"),
        Outcome::ApplicationMarked(status) => Toast::success(format!("Application {status}!")),
        Outcome::ApplicationsBulkUpdated(count) => Toast::success(format!("{count} applications updated!")),
        Outcome::Failed { action, message } if message.is_empty() => Toast::error(default_failure(*action)),
        Outcome::Failed { message, .. } => Toast::error(message.clone()),
    }
}

/// Collects toasts until a view drains them.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending toast, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.toasts.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl OutcomeListener for ToastQueue {
    fn on_outcome(&self, outcome: &Outcome) {
        let toast = toast_for(outcome);
        tracing::debug!(kind = ?toast.kind, message = %toast.message, "toast");
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner).push(toast);
    }
}
