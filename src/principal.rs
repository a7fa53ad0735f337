//! Principal and authentication context
//!
//! The authenticated caller for one inbound request. Authentication itself
//! (credentials, sessions, tokens) happens outside this crate; callers
//! construct an [`Authn`] from whatever their authenticator resolved and
//! pass it to every operation.

use crate::error::ClinicError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Doctor identity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoctorId(pub u64);

/// Patient identity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The authenticated caller and its role linkage for the current request
///
/// Roles are carried as typed optional identity references, resolved once
/// at request entry and never re-derived per check. A principal may hold
/// both a doctor and a patient identity; the rules treat that as two role
/// memberships, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// The underlying user account
    pub user_id: UserId,
    /// Administrative privileges
    pub is_admin: bool,
    /// Linked doctor identity, if any
    pub doctor: Option<DoctorId>,
    /// Linked patient identity, if any
    pub patient: Option<PatientId>,
}

impl Principal {
    /// A principal with no roles beyond being authenticated
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
            doctor: None,
            patient: None,
        }
    }

    /// An administrator
    pub fn admin(user_id: UserId) -> Self {
        Self {
            is_admin: true,
            ..Self::new(user_id)
        }
    }

    /// A principal linked to a doctor identity
    pub fn doctor(user_id: UserId, doctor: DoctorId) -> Self {
        Self {
            doctor: Some(doctor),
            ..Self::new(user_id)
        }
    }

    /// A principal linked to a patient identity
    pub fn patient(user_id: UserId, patient: PatientId) -> Self {
        Self {
            patient: Some(patient),
            ..Self::new(user_id)
        }
    }

    /// Attach a doctor identity
    pub fn with_doctor(mut self, doctor: DoctorId) -> Self {
        self.doctor = Some(doctor);
        self
    }

    /// Attach a patient identity
    pub fn with_patient(mut self, patient: PatientId) -> Self {
        self.patient = Some(patient);
        self
    }

    /// Role predicate: administrative privileges
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Role predicate: linked doctor identity present
    pub fn is_doctor(&self) -> bool {
        self.doctor.is_some()
    }

    /// Role predicate: linked patient identity present
    pub fn is_patient(&self) -> bool {
        self.patient.is_some()
    }
}

/// Authentication state of the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authn {
    /// No credentials were presented, or they did not resolve to a user
    Anonymous,
    /// A resolved principal
    Authenticated(Principal),
}

impl Authn {
    /// The principal, if the request is authenticated
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Authn::Anonymous => None,
            Authn::Authenticated(principal) => Some(principal),
        }
    }

    /// The principal, or [`ClinicError::Unauthenticated`]
    ///
    /// Operations that need an identity call this so that missing
    /// authentication surfaces as its own error kind, never as a denial.
    pub fn principal_required(&self) -> Result<&Principal, ClinicError> {
        self.principal().ok_or(ClinicError::Unauthenticated)
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Authn::Anonymous)
    }
}

impl From<Principal> for Authn {
    fn from(principal: Principal) -> Self {
        Authn::Authenticated(principal)
    }
}
