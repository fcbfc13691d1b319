//! Domain model for complaint tracking.
//!
//! # Responsibility
//! - Define the persisted entities: users, employees, complaints and their
//!   comments/images.
//! - Provide construction defaults and write-time validation.
//!
//! # Invariants
//! - Identifiers are store-assigned surrogates; `None` means "not persisted".
//! - Timestamps are Unix epoch milliseconds.
//! - Cross-table references are stored ids, never owned values.

pub mod actor;
pub mod comment;
pub mod complaint;
pub mod employee;
pub mod image;
pub mod user;
pub mod validation;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in epoch milliseconds.
///
/// Clocks set before 1970 collapse to `0` instead of panicking.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
