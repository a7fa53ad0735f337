//! Doctor-side records
//!
//! Doctors, the departments they work in, their published availability
//! slots, and their private working notes.

use crate::authz::{Resource, ResourceRef};
use crate::principal::{DoctorId, UserId};
use serde::{Deserialize, Serialize};

/// A practicing doctor's profile
///
/// Publicly listable as part of the clinic directory. The `user` field
/// binds the profile to the account that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub user: UserId,
    pub first_name: String,
    pub last_name: String,
    pub qualification: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub biography: String,
    /// Vacationing doctors cannot be booked
    #[serde(default)]
    pub is_on_vacation: bool,
}

impl Resource for Doctor {
    fn resource_ref(&self) -> ResourceRef {
        ResourceRef::Doctor { id: self.id }
    }
}

/// Payload for creating or replacing a doctor profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDoctor {
    pub user: UserId,
    pub first_name: String,
    pub last_name: String,
    pub qualification: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub biography: String,
    #[serde(default)]
    pub is_on_vacation: bool,
}

/// A clinical department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Resource for Department {
    fn resource_ref(&self) -> ResourceRef {
        ResourceRef::Department
    }
}

/// Payload for creating or replacing a department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDepartment {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A published availability window for one doctor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub id: u64,
    pub doctor: DoctorId,
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
}

impl Resource for Availability {
    fn resource_ref(&self) -> ResourceRef {
        ResourceRef::Availability {
            doctor: self.doctor,
        }
    }
}

/// Payload for creating or replacing an availability window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAvailability {
    pub doctor: DoctorId,
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
}

/// A doctor's private working note
///
/// Never publicly readable; even other doctors cannot see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorNote {
    pub id: u64,
    pub doctor: DoctorId,
    pub note: String,
    pub date: String,
}

impl Resource for DoctorNote {
    fn resource_ref(&self) -> ResourceRef {
        ResourceRef::DoctorNote {
            doctor: self.doctor,
        }
    }
}

/// Payload for creating or replacing a doctor note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDoctorNote {
    pub doctor: DoctorId,
    pub note: String,
    pub date: String,
}
