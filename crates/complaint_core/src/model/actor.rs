//! Polymorphic author/uploader reference.

use crate::model::employee::EmployeeId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Who wrote a comment or uploaded an image.
///
/// The kind and the id travel together, so a user id can never be
/// mistaken for an employee id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRef {
    User(UserId),
    Employee(EmployeeId),
}

impl ActorRef {
    /// Raw identifier inside whichever table the variant selects.
    pub fn id(self) -> i64 {
        match self {
            Self::User(id) | Self::Employee(id) => id,
        }
    }

    pub fn is_user(self) -> bool {
        matches!(self, Self::User(_))
    }
}
