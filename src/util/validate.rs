//! Local form checks run before any request is sent.
//!
//! These mirror the backend's rules for early feedback; the server stays the
//! authority. Inputs are trimmed before length checks.

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ClientError;
use crate::net::types::{ApplicationDraft, Credentials, JobDraft, RegisterRequest};

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_PASSWORD_CHARS: usize = 6;
pub const MIN_JOB_TITLE_CHARS: usize = 3;
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 50;
pub const MIN_REQUIREMENTS_CHARS: usize = 20;
pub const MIN_RESUME_CHARS: usize = 50;
pub const MIN_COVER_LETTER_CHARS: usize = 20;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email pattern is valid")
});

fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}

fn require(field: &'static str, value: &str, required: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() { Err(ClientError::validation(field, required)) } else { Ok(()) }
}

fn require_min(
    field: &'static str,
    value: &str,
    min: usize,
    required: &str,
    too_short: &str,
) -> Result<(), ClientError> {
    require(field, value, required)?;
    if char_len(value) < min { Err(ClientError::validation(field, too_short)) } else { Ok(()) }
}

/// Email must look like `local@domain.tld`.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] for a blank or malformed address.
pub fn email(value: &str) -> Result<(), ClientError> {
    require("email", value, "Email is required")?;
    if EMAIL_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(ClientError::validation("email", "Invalid email address"))
    }
}

/// Sign-in form: both fields present.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] for the first failing field.
pub fn credentials(credentials: &Credentials) -> Result<(), ClientError> {
    require("email", &credentials.email, "Email is required")?;
    require("password", &credentials.password, "Password is required")
}

/// Registration form.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] for the first failing field.
pub fn registration(request: &RegisterRequest) -> Result<(), ClientError> {
    require_min(
        "first_name",
        &request.profile.first_name,
        MIN_NAME_CHARS,
        "First name is required",
        "First name must be at least 2 characters",
    )?;
    require_min(
        "last_name",
        &request.profile.last_name,
        MIN_NAME_CHARS,
        "Last name is required",
        "Last name must be at least 2 characters",
    )?;
    email(&request.email)?;
    require_min(
        "password",
        &request.password,
        MIN_PASSWORD_CHARS,
        "Password is required",
        "Password must be at least 6 characters",
    )
}

/// New job posting form.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] for the first failing field.
pub fn job_draft(draft: &JobDraft) -> Result<(), ClientError> {
    require_min(
        "title",
        &draft.title,
        MIN_JOB_TITLE_CHARS,
        "Job title is required",
        "Job title must be at least 3 characters",
    )?;
    require("location", &draft.location, "Location is required")?;
    require_min(
        "description",
        &draft.description,
        MIN_JOB_DESCRIPTION_CHARS,
        "Job description is required",
        "Job description must be at least 50 characters",
    )?;
    require_min(
        "requirements",
        &draft.requirements,
        MIN_REQUIREMENTS_CHARS,
        "Requirements are required",
        "Requirements must be at least 20 characters",
    )
}

/// Application form. Returns the draft with trimmed text and a blank cover
/// letter dropped.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] for the first failing field.
pub fn application(job_id: &str, resume: &str, cover_letter: Option<&str>) -> Result<ApplicationDraft, ClientError> {
    require("job_id", job_id, "Job is required")?;
    require_min(
        "resume",
        resume,
        MIN_RESUME_CHARS,
        "Resume/experience is required",
        "Please provide more details about your experience (minimum 50 characters)",
    )?;
    let cover_letter = cover_letter.map(str::trim).filter(|c| !c.is_empty());
    if let Some(letter) = cover_letter {
        if char_len(letter) < MIN_COVER_LETTER_CHARS {
            return Err(ClientError::validation(
                "cover_letter",
                "Cover letter must be at least 20 characters if provided",
            ));
        }
    }
    Ok(ApplicationDraft {
        job_id: job_id.trim().to_owned(),
        resume: resume.trim().to_owned(),
        cover_letter: cover_letter.map(str::to_owned),
    })
}
