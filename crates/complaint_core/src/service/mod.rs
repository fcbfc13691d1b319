//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Enforce the obligations repositories leave to their callers.

pub mod complaint_service;
