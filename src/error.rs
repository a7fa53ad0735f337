//! Error types for polyclinic
//!
//! This module defines the error hierarchy used throughout the crate.
//! We use `thiserror` for library-style errors that are part of the API;
//! the embedding application maps them to its own response codes at the
//! boundary. Denied, NotFound and Unauthenticated are deliberately
//! distinct kinds: a caller must be able to tell "you lack permission"
//! from "this does not exist" from "you are not signed in".

use crate::authz::{Action, ResourceKind};
use crate::principal::DoctorId;
use thiserror::Error;

/// Top-level clinic error
#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Access denied: {0}")]
    Denied(#[from] DeniedError),

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ClinicError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ClinicError::NotFound { what: what.into() }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, ClinicError::Denied(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClinicError::NotFound { .. })
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ClinicError::Unauthenticated)
    }
}

/// Authorization failure
///
/// Terminal for the current request; never retried. Carries the action
/// and resource kind that were attempted plus a human-readable reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{action} on {kind} denied: {reason}")]
pub struct DeniedError {
    pub action: Action,
    pub kind: ResourceKind,
    pub reason: String,
}

impl DeniedError {
    pub fn new(action: Action, kind: ResourceKind, reason: impl Into<String>) -> Self {
        Self {
            action,
            kind,
            reason: reason.into(),
        }
    }

    /// Denial for a profile create that names a foreign user account
    pub fn user_binding(action: Action, kind: ResourceKind) -> Self {
        Self {
            action,
            kind,
            reason: "profiles may only be bound to your own user account".into(),
        }
    }

    /// Denial for an update that tries to move a record to another owner
    pub fn owner_immutable(action: Action, kind: ResourceKind) -> Self {
        Self {
            action,
            kind,
            reason: "ownership references cannot be changed".into(),
        }
    }

    /// Denial for booking against a doctor who is not taking appointments
    pub fn doctor_unavailable(doctor: DoctorId) -> Self {
        Self {
            action: Action::CustomWrite,
            kind: ResourceKind::Appointment,
            reason: format!("doctor {} is unavailable for booking", doctor),
        }
    }
}

/// Persistence backend errors
///
/// The bundled in-memory store never produces these; the variant exists
/// so that database-backed implementations of the store trait have a
/// structured failure surface.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend failure: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Result type alias for clinic operations
pub type Result<T> = std::result::Result<T, ClinicError>;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
