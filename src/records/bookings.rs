//! Booking records
//!
//! Appointments link one doctor and one patient; both are owners.
//! Appointment notes are written against an appointment and carry the
//! authoring doctor; their patient side is reached through the
//! appointment, which is why [`AppointmentNote`] cannot produce a
//! [`ResourceRef`] on its own.

use crate::authz::{Resource, ResourceRef};
use crate::principal::{DoctorId, PatientId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an appointment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Scheduled,
    Completed,
    Canceled,
}

impl AppointmentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Canceled => "canceled",
        }
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(AppointmentStatus::Pending),
            "scheduled" => Some(AppointmentStatus::Scheduled),
            "completed" => Some(AppointmentStatus::Completed),
            "canceled" => Some(AppointmentStatus::Canceled),
            _ => None,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A booked appointment between one doctor and one patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: u64,
    pub doctor: DoctorId,
    pub patient: PatientId,
    pub appointment_date: String,
    pub appointment_time: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl Resource for Appointment {
    fn resource_ref(&self) -> ResourceRef {
        ResourceRef::Appointment {
            doctor: self.doctor,
            patient: self.patient,
        }
    }
}

/// Client payload for booking an appointment
///
/// Identity fields are optional on purpose: the service resolves them
/// from the caller and the route, overriding whatever the client sent.
/// Only administrators book from the payload's own references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    #[serde(default)]
    pub doctor: Option<DoctorId>,
    #[serde(default)]
    pub patient: Option<PatientId>,
    pub appointment_date: String,
    pub appointment_time: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: AppointmentStatus,
}

/// Fully resolved appointment payload handed to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub doctor: DoctorId,
    pub patient: PatientId,
    pub appointment_date: String,
    pub appointment_time: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl AppointmentDraft {
    /// Resolve the draft against concrete doctor and patient identities
    pub fn resolve(self, doctor: DoctorId, patient: PatientId) -> NewAppointment {
        NewAppointment {
            doctor,
            patient,
            appointment_date: self.appointment_date,
            appointment_time: self.appointment_time,
            notes: self.notes,
            status: self.status,
        }
    }
}

/// A note attached to an appointment by a doctor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentNote {
    pub id: u64,
    pub appointment: u64,
    pub doctor: DoctorId,
    pub note: String,
    pub date: String,
}

impl AppointmentNote {
    /// Ownership view, with the patient side taken from the appointment
    /// this note belongs to
    pub fn resource_ref_with(&self, patient: PatientId) -> ResourceRef {
        ResourceRef::AppointmentNote {
            doctor: self.doctor,
            patient,
        }
    }
}

/// Payload for creating or replacing an appointment note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointmentNote {
    pub appointment: u64,
    pub doctor: DoctorId,
    pub note: String,
    pub date: String,
}
