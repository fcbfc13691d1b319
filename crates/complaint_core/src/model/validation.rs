//! Write-time validation errors shared by all entities.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Validation failure for an entity about to be written or just read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Email does not look like `local@domain.tld`.
    InvalidEmail(String),
    /// `updated_at` is earlier than `created_at`.
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
    /// Employee names itself as supervisor.
    SelfSupervision(i64),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must be >= created_at ({created_at})"
            ),
            Self::SelfSupervision(id) => write!(f, "employee {id} cannot supervise itself"),
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn require_email(value: &str) -> Result<(), ModelValidationError> {
    if !EMAIL_RE.is_match(value.trim()) {
        return Err(ModelValidationError::InvalidEmail(value.to_string()));
    }
    Ok(())
}
