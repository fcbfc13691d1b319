//! Staff member that complaints are assigned to.
//!
//! # Invariants
//! - `supervisor_id` is a lookup key only; deleting a supervisor clears it on
//!   subordinates instead of deleting them.
//! - No uniqueness is assumed for `email`.

use crate::model::now_epoch_ms;
use crate::model::validation::{require_email, ModelValidationError};
use serde::{Deserialize, Serialize};

pub type EmployeeId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeRole {
    Agent,
    Manager,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Option<EmployeeId>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: EmployeeRole,
    pub supervisor_id: Option<EmployeeId>,
    pub created_at: i64,
    pub active: bool,
}

impl Employee {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: EmployeeRole,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            supervisor_id: None,
            created_at: now_epoch_ms(),
            active: true,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_email(&self.email)?;
        if let (Some(id), Some(supervisor_id)) = (self.id, self.supervisor_id) {
            if id == supervisor_id {
                return Err(ModelValidationError::SelfSupervision(id));
            }
        }
        Ok(())
    }
}
