//! Route table and role-based route guard.
//!
//! A guard is evaluated against a [`SessionState`] snapshot in a fixed
//! order: still initializing, then missing user, then wrong role. The first
//! check that fires decides.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::net::types::Role;
use crate::state::session::SessionState;

/// Every screen the client knows about.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Jobs,
    JobDetails(String),
    Login,
    Register,
    CreateJob,
    MyJobs,
    /// Applications received for one job.
    Applications(String),
    MyApplications,
}

impl Route {
    /// Match a path against the route table. Unknown paths map to [`Route::Home`].
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["jobs"] => Self::Jobs,
            ["jobs", id] => Self::JobDetails((*id).to_owned()),
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["create-job"] => Self::CreateJob,
            ["my-jobs"] => Self::MyJobs,
            ["applications", job_id] => Self::Applications((*job_id).to_owned()),
            ["my-applications"] => Self::MyApplications,
            _ => Self::Home,
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Jobs => "/jobs".to_owned(),
            Self::JobDetails(id) => format!("/jobs/{id}"),
            Self::Login => "/login".to_owned(),
            Self::Register => "/register".to_owned(),
            Self::CreateJob => "/create-job".to_owned(),
            Self::MyJobs => "/my-jobs".to_owned(),
            Self::Applications(job_id) => format!("/applications/{job_id}"),
            Self::MyApplications => "/my-applications".to_owned(),
        }
    }

    /// Access rule for this route.
    #[must_use]
    pub fn guard(&self) -> RouteGuard {
        match self {
            Self::CreateJob | Self::MyJobs | Self::Applications(_) => RouteGuard::role(Role::Employer),
            Self::MyApplications => RouteGuard::role(Role::Candidate),
            Self::Home | Self::Jobs | Self::JobDetails(_) | Self::Login | Self::Register => RouteGuard::public(),
        }
    }

    fn is_auth_form(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }
}

/// What a view should do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Identity is still being restored; show a loading indicator.
    Loading,
    Redirect(Route),
    Render,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteGuard {
    pub require_auth: bool,
    pub require_role: Option<Role>,
}

impl RouteGuard {
    #[must_use]
    pub fn public() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn authenticated() -> Self {
        Self { require_auth: true, require_role: None }
    }

    /// Signed in with exactly `role`.
    #[must_use]
    pub fn role(role: Role) -> Self {
        Self { require_auth: true, require_role: Some(role) }
    }

    #[must_use]
    pub fn evaluate(&self, session: &SessionState) -> GuardDecision {
        if session.loading {
            return GuardDecision::Loading;
        }
        if self.require_auth && session.user.is_none() {
            return GuardDecision::Redirect(Route::Login);
        }
        if let Some(role) = self.require_role {
            if session.role() != Some(role) {
                return GuardDecision::Redirect(Route::Home);
            }
        }
        GuardDecision::Render
    }
}

/// Decide how to handle a navigation to `route`.
///
/// Applies the route's guard, and sends signed-in users away from the
/// login and register forms.
#[must_use]
pub fn resolve(route: &Route, session: &SessionState) -> GuardDecision {
    match route.guard().evaluate(session) {
        GuardDecision::Render if route.is_auth_form() && session.user.is_some() => {
            GuardDecision::Redirect(Route::Home)
        }
        decision => decision,
    }
}
