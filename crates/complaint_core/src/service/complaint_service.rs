//! Complaint use-case service.
//!
//! # Responsibility
//! - Carry the caller obligations the entity does not enforce itself:
//!   status transition checks, `reject_reason` pairing, `updated_at` refresh.
//! - Delegate persistence to a `ComplaintRepository`.
//!
//! # Invariants
//! - `reject_reason` is stored iff the policy requires it for the status.
//! - Every mutation goes through `update_complaint`, which stamps
//!   `updated_at`.

use crate::model::complaint::{Complaint, ComplaintDraft, ComplaintId, ComplaintStatus};
use crate::model::employee::EmployeeId;
use crate::model::user::UserId;
use crate::repo::complaint_repo::ComplaintRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Decides which status changes are legal.
///
/// Inject a custom implementation to model a different workflow.
pub trait StatusTransitionPolicy {
    /// Also gates assignment, as a move from `from` to `ASSIGNED`.
    fn allows(&self, from: ComplaintStatus, to: ComplaintStatus) -> bool;
    fn requires_reject_reason(&self, status: ComplaintStatus) -> bool;

    /// Status an assigned complaint ends up in.
    ///
    /// Defaults to `OPEN -> ASSIGNED` and keeps every other status, so
    /// reassignment does not rewind progress.
    fn status_after_assign(&self, from: ComplaintStatus) -> ComplaintStatus {
        if from == ComplaintStatus::Open {
            ComplaintStatus::Assigned
        } else {
            from
        }
    }
}

/// Allows any move that does not leave a terminal state; only `REJECTED`
/// needs a reason.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTransitionPolicy;

impl StatusTransitionPolicy for DefaultTransitionPolicy {
    fn allows(&self, from: ComplaintStatus, to: ComplaintStatus) -> bool {
        from == to || !from.is_terminal()
    }

    fn requires_reject_reason(&self, status: ComplaintStatus) -> bool {
        status.is_rejection()
    }
}

/// Service error for complaint use-cases.
#[derive(Debug)]
pub enum ComplaintServiceError {
    ComplaintNotFound(ComplaintId),
    TransitionNotAllowed {
        from: ComplaintStatus,
        to: ComplaintStatus,
    },
    /// Target status needs a non-empty reject reason.
    MissingRejectReason(ComplaintStatus),
    Repo(RepoError),
}

impl Display for ComplaintServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ComplaintNotFound(id) => write!(f, "complaint not found: {id}"),
            Self::TransitionNotAllowed { from, to } => write!(
                f,
                "status transition {} -> {} is not allowed",
                from.as_str(),
                to.as_str()
            ),
            Self::MissingRejectReason(status) => {
                write!(f, "status {} requires a reject reason", status.as_str())
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ComplaintServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ComplaintServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "complaint",
                id,
            } => Self::ComplaintNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type ComplaintServiceResult<T> = Result<T, ComplaintServiceError>;

/// Use-case service wrapper for complaint lifecycle operations.
pub struct ComplaintService<R: ComplaintRepository, P: StatusTransitionPolicy = DefaultTransitionPolicy>
{
    repo: R,
    policy: P,
}

impl<R: ComplaintRepository> ComplaintService<R, DefaultTransitionPolicy> {
    /// Creates a service with the default transition policy.
    pub fn new(repo: R) -> Self {
        Self::with_policy(repo, DefaultTransitionPolicy)
    }
}

impl<R: ComplaintRepository, P: StatusTransitionPolicy> ComplaintService<R, P> {
    pub fn with_policy(repo: R, policy: P) -> Self {
        Self { repo, policy }
    }

    /// Files a new `OPEN` complaint for `user_id`.
    ///
    /// A missing user surfaces as `RepoError::ConstraintViolation`.
    pub fn submit(
        &self,
        user_id: UserId,
        draft: ComplaintDraft,
    ) -> ComplaintServiceResult<Complaint> {
        let created = self.repo.create_complaint(&Complaint::new(user_id, draft))?;
        info!(
            "event=complaint_submit module=service status=ok complaint_id={} user_id={}",
            created.id.unwrap_or_default(),
            user_id
        );
        Ok(created)
    }

    pub fn get(&self, id: ComplaintId) -> ComplaintServiceResult<Complaint> {
        self.repo
            .get_complaint(id)?
            .ok_or(ComplaintServiceError::ComplaintNotFound(id))
    }

    /// Records who handles the complaint and who decided it.
    ///
    /// # Contract
    /// - Fails with `TransitionNotAllowed` unless the policy allows the
    ///   current status to move to `ASSIGNED`.
    /// - The resulting status comes from
    ///   `StatusTransitionPolicy::status_after_assign`.
    pub fn assign(
        &self,
        id: ComplaintId,
        assigned_to: EmployeeId,
        assigned_by: EmployeeId,
    ) -> ComplaintServiceResult<Complaint> {
        let mut complaint = self.get(id)?;
        self.check_transition(complaint.status, ComplaintStatus::Assigned)?;

        complaint.status = self.policy.status_after_assign(complaint.status);
        complaint.assigned_to = Some(assigned_to);
        complaint.assigned_by = Some(assigned_by);
        self.repo.update_complaint(&mut complaint)?;

        info!(
            "event=complaint_assign module=service status=ok complaint_id={} assigned_to={} assigned_by={}",
            id, assigned_to, assigned_by
        );
        Ok(complaint)
    }

    /// Moves a complaint to `status`, pairing it with `reject_reason`.
    ///
    /// # Contract
    /// - Fails with `TransitionNotAllowed` when the policy refuses.
    /// - Fails with `MissingRejectReason` when the policy requires a reason
    ///   and none (or only whitespace) is given.
    /// - Clears any stored reason when the target status does not need one.
    pub fn transition_status(
        &self,
        id: ComplaintId,
        status: ComplaintStatus,
        reject_reason: Option<&str>,
    ) -> ComplaintServiceResult<Complaint> {
        let mut complaint = self.get(id)?;
        self.check_transition(complaint.status, status)?;

        let reason = reject_reason
            .map(str::trim)
            .filter(|value| !value.is_empty());
        complaint.reject_reason = if self.policy.requires_reject_reason(status) {
            match reason {
                Some(value) => Some(value.to_string()),
                None => return Err(ComplaintServiceError::MissingRejectReason(status)),
            }
        } else {
            None
        };

        let from = complaint.status;
        complaint.status = status;
        self.repo.update_complaint(&mut complaint)?;

        info!(
            "event=complaint_transition module=service status=ok complaint_id={} from={} to={}",
            id,
            from.as_str(),
            status.as_str()
        );
        Ok(complaint)
    }

    fn check_transition(
        &self,
        from: ComplaintStatus,
        to: ComplaintStatus,
    ) -> ComplaintServiceResult<()> {
        if !self.policy.allows(from, to) {
            warn!(
                "event=complaint_transition module=service status=rejected from={} to={}",
                from.as_str(),
                to.as_str()
            );
            return Err(ComplaintServiceError::TransitionNotAllowed { from, to });
        }
        Ok(())
    }
}
