//! Image reference attached to one complaint.
//!
//! Only the URL is stored; reading or writing file bytes belongs to the
//! external file store.

use crate::model::actor::ActorRef;
use crate::model::complaint::ComplaintId;
use crate::model::now_epoch_ms;
use serde::{Deserialize, Serialize};

pub type ImageId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintImage {
    pub id: Option<ImageId>,
    pub complaint_id: ComplaintId,
    pub uploaded_by: ActorRef,
    pub file_url: String,
    pub created_at: i64,
    pub description: Option<String>,
}

impl ComplaintImage {
    pub fn new(
        complaint_id: ComplaintId,
        uploaded_by: ActorRef,
        file_url: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            complaint_id,
            uploaded_by,
            file_url: file_url.into(),
            created_at: now_epoch_ms(),
            description: None,
        }
    }
}
