//! Complaint submitter account.
//!
//! # Invariants
//! - `email` is unique across users (enforced by the store, case-insensitive).
//! - `created_at` is set once at construction and never rewritten.
//! - `active` starts as `true`.

use crate::model::now_epoch_ms;
use crate::model::validation::{require_email, ModelValidationError};
use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// Account that owns zero or more complaints.
///
/// Deleting a user deletes every complaint it owns, see
/// `UserRepository::delete_user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    /// Already-hashed credential. Opaque to this crate.
    pub password_hash: String,
    pub phone: Option<String>,
    pub created_at: i64,
    pub active: bool,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            phone: None,
            created_at: now_epoch_ms(),
            active: true,
        }
    }

    /// Only the email shape is checked; every other field is free-form.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_email(&self.email)
    }
}
