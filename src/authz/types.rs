//! Authorization types
//!
//! Core types used by the authorization engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of record an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Doctor,
    Department,
    Availability,
    DoctorNote,
    Patient,
    Insurance,
    MedicalRecord,
    Appointment,
    AppointmentNote,
}

impl ResourceKind {
    /// Get the kind name as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Doctor => "doctor",
            ResourceKind::Department => "department",
            ResourceKind::Availability => "availability",
            ResourceKind::DoctorNote => "doctor_note",
            ResourceKind::Patient => "patient",
            ResourceKind::Insurance => "insurance",
            ResourceKind::MedicalRecord => "medical_record",
            ResourceKind::Appointment => "appointment",
            ResourceKind::AppointmentNote => "appointment_note",
        }
    }

    /// Try to parse a kind from a string
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "doctor" => Some(ResourceKind::Doctor),
            "department" => Some(ResourceKind::Department),
            "availability" => Some(ResourceKind::Availability),
            "doctor_note" => Some(ResourceKind::DoctorNote),
            "patient" => Some(ResourceKind::Patient),
            "insurance" => Some(ResourceKind::Insurance),
            "medical_record" => Some(ResourceKind::MedicalRecord),
            "appointment" => Some(ResourceKind::Appointment),
            "appointment_note" => Some(ResourceKind::AppointmentNote),
            _ => None,
        }
    }

    /// Get all kinds
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Doctor,
            ResourceKind::Department,
            ResourceKind::Availability,
            ResourceKind::DoctorNote,
            ResourceKind::Patient,
            ResourceKind::Insurance,
            ResourceKind::MedicalRecord,
            ResourceKind::Appointment,
            ResourceKind::AppointmentNote,
        ]
    }

    /// Kinds anyone may read: the doctor directory, departments, and
    /// published availability slots
    pub const fn is_public(&self) -> bool {
        matches!(
            self,
            ResourceKind::Doctor | ResourceKind::Department | ResourceKind::Availability
        )
    }

    /// Kinds owned by a patient identity
    pub const fn is_patient_owned(&self) -> bool {
        matches!(
            self,
            ResourceKind::Patient | ResourceKind::Insurance | ResourceKind::MedicalRecord
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The operation being attempted on a resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read a collection
    List,
    /// Read a single record
    Retrieve,
    Create,
    Update,
    Delete,
    /// Non-CRUD read (clinical history, appointment notes, paired booking read)
    CustomRead,
    /// Non-CRUD write (doctor-initiated booking)
    CustomWrite,
}

impl Action {
    /// Check if this action only reads data
    pub const fn is_read(&self) -> bool {
        matches!(self, Action::List | Action::Retrieve | Action::CustomRead)
    }

    /// Check if this action modifies data
    pub const fn is_write(&self) -> bool {
        !self.is_read()
    }

    /// Get the action name as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Retrieve => "retrieve",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::CustomRead => "custom_read",
            Action::CustomWrite => "custom_write",
        }
    }

    /// Try to parse an action from a string
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "list" => Some(Action::List),
            "retrieve" => Some(Action::Retrieve),
            "create" => Some(Action::Create),
            "update" => Some(Action::Update),
            "delete" => Some(Action::Delete),
            "custom_read" => Some(Action::CustomRead),
            "custom_write" => Some(Action::CustomWrite),
            _ => None,
        }
    }

    /// Get all actions
    pub fn all() -> &'static [Action] {
        &[
            Action::List,
            Action::Retrieve,
            Action::Create,
            Action::Update,
            Action::Delete,
            Action::CustomRead,
            Action::CustomWrite,
        ]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of an authorization check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Access is allowed
    Allowed,
    /// Access is denied with a reason
    Denied(String),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Decision::Denied(_))
    }
}
