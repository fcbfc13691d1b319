//! Complaint domain model.
//!
//! # Responsibility
//! - Define the central complaint record and its status enumeration.
//! - Provide construction defaults and the `updated_at` refresh helper.
//!
//! # Invariants
//! - A complaint always belongs to exactly one user.
//! - `updated_at >= created_at`.
//! - The entity does not guard status transitions; callers do, see
//!   `service::complaint_service`.

use crate::model::employee::EmployeeId;
use crate::model::now_epoch_ms;
use crate::model::user::UserId;
use crate::model::validation::ModelValidationError;
use serde::{Deserialize, Serialize};

pub type ComplaintId = i64;

/// Complaint lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    /// Submitted, nobody assigned yet.
    Open,
    Assigned,
    InProgress,
    Resolved,
    Rejected,
    Closed,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 6] = [
        Self::Open,
        Self::Assigned,
        Self::InProgress,
        Self::Resolved,
        Self::Rejected,
        Self::Closed,
    ];

    /// Wire/storage spelling, e.g. `IN_PROGRESS`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Assigned => "ASSIGNED",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Rejected => "REJECTED",
            Self::Closed => "CLOSED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected | Self::Closed)
    }

    pub fn is_rejection(self) -> bool {
        self == Self::Rejected
    }
}

/// Caller-supplied fields for a new complaint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComplaintDraft {
    pub product_type: String,
    pub product_model: String,
    pub purchased_from: String,
    /// Epoch milliseconds.
    pub purchase_date: Option<i64>,
    pub issue_description: String,
}

/// Central complaint record.
///
/// Comments and images live in their own tables; load them together with
/// `ComplaintRepository::load_details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawComplaint")]
pub struct Complaint {
    pub id: Option<ComplaintId>,
    pub user_id: UserId,
    pub product_type: String,
    pub product_model: String,
    pub purchased_from: String,
    pub purchase_date: Option<i64>,
    pub issue_description: String,
    pub status: ComplaintStatus,
    /// Employee responsible for resolution.
    pub assigned_to: Option<EmployeeId>,
    /// Employee who made the assignment.
    pub assigned_by: Option<EmployeeId>,
    /// Set only while `status` is a rejection state.
    pub reject_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Complaint {
    /// Creates an `OPEN` complaint owned by `user_id`.
    ///
    /// # Invariants
    /// - `created_at == updated_at` on return.
    /// - No assignment and no reject reason.
    pub fn new(user_id: UserId, draft: ComplaintDraft) -> Self {
        let now = now_epoch_ms();
        Self {
            id: None,
            user_id,
            product_type: draft.product_type,
            product_model: draft.product_model,
            purchased_from: draft.purchased_from,
            purchase_date: draft.purchase_date,
            issue_description: draft.issue_description,
            status: ComplaintStatus::Open,
            assigned_to: None,
            assigned_by: None,
            reject_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at` to now without ever moving it backwards.
    pub fn touch(&mut self) {
        self.updated_at = now_epoch_ms().max(self.updated_at).max(self.created_at);
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.updated_at < self.created_at {
            return Err(ModelValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawComplaint {
    id: Option<ComplaintId>,
    user_id: UserId,
    product_type: String,
    product_model: String,
    purchased_from: String,
    purchase_date: Option<i64>,
    issue_description: String,
    status: ComplaintStatus,
    assigned_to: Option<EmployeeId>,
    assigned_by: Option<EmployeeId>,
    reject_reason: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<RawComplaint> for Complaint {
    type Error = ModelValidationError;

    fn try_from(raw: RawComplaint) -> Result<Self, Self::Error> {
        let complaint = Complaint {
            id: raw.id,
            user_id: raw.user_id,
            product_type: raw.product_type,
            product_model: raw.product_model,
            purchased_from: raw.purchased_from,
            purchase_date: raw.purchase_date,
            issue_description: raw.issue_description,
            status: raw.status,
            assigned_to: raw.assigned_to,
            assigned_by: raw.assigned_by,
            reject_reason: raw.reject_reason,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        };
        complaint.validate()?;
        Ok(complaint)
    }
}
