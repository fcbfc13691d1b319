//! Comment attached to one complaint.

use crate::model::actor::ActorRef;
use crate::model::complaint::ComplaintId;
use crate::model::now_epoch_ms;
use serde::{Deserialize, Serialize};

pub type CommentId = i64;

/// Text comment written by a user or an employee.
///
/// The repository checks on save that `complaint_id` and `author` both
/// resolve to existing rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintComment {
    pub id: Option<CommentId>,
    pub complaint_id: ComplaintId,
    pub author: ActorRef,
    pub comment_text: String,
    pub created_at: i64,
}

impl ComplaintComment {
    pub fn new(complaint_id: ComplaintId, author: ActorRef, text: impl Into<String>) -> Self {
        Self {
            id: None,
            complaint_id,
            author,
            comment_text: text.into(),
            created_at: now_epoch_ms(),
        }
    }
}
