//! Data layer for complaint tracking.
//!
//! Entities (`model`), SQLite bootstrap and migrations (`db`), per-entity
//! repositories (`repo`) and the complaint lifecycle service (`service`).

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::actor::ActorRef;
pub use model::comment::{CommentId, ComplaintComment};
pub use model::complaint::{Complaint, ComplaintDraft, ComplaintId, ComplaintStatus};
pub use model::employee::{Employee, EmployeeId, EmployeeRole};
pub use model::image::{ComplaintImage, ImageId};
pub use model::user::{User, UserId};
pub use model::validation::ModelValidationError;
pub use repo::comment_repo::{ComplaintCommentRepository, SqliteComplaintCommentRepository};
pub use repo::complaint_repo::{
    ComplaintDetails, ComplaintListQuery, ComplaintRepository, SqliteComplaintRepository,
};
pub use repo::employee_repo::{
    EmployeeDetachSummary, EmployeeRepository, SqliteEmployeeRepository,
};
pub use repo::image_repo::{ComplaintImageRepository, SqliteComplaintImageRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{CascadeSummary, RepoError, RepoResult};
pub use service::complaint_service::{
    ComplaintService, ComplaintServiceError, ComplaintServiceResult, DefaultTransitionPolicy,
    StatusTransitionPolicy,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
