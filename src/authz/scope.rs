//! Visibility scope filters
//!
//! Collection reads are narrowed before querying: the engine hands the
//! store a [`ScopeFilter`] value describing which rows the caller may
//! see, and the store turns it into its own query condition. The engine
//! never scans rows itself.

use crate::authz::types::ResourceKind;
use crate::principal::{Authn, DoctorId, PatientId};
use std::fmt;
use tracing::debug;

/// Visibility filter over a collection of one resource kind
///
/// Interpreted by the store; every variant must be expressible as a
/// single query condition. `TreatedBy` is the join filter "the owning
/// patient has at least one appointment with this doctor".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFilter {
    /// Every row is visible
    All,
    /// No row is visible
    Empty,
    /// Patient-owned rows of exactly this patient
    OwnedByPatient(PatientId),
    /// Doctor-owned rows of exactly this doctor
    OwnedByDoctor(DoctorId),
    /// Patient-owned rows whose patient has an appointment with this doctor
    TreatedBy(DoctorId),
    /// Appointment rows involving either of the caller's identities
    InvolvedIn {
        doctor: Option<DoctorId>,
        patient: Option<PatientId>,
    },
}

impl ScopeFilter {
    pub const fn is_empty(&self) -> bool {
        matches!(self, ScopeFilter::Empty)
    }

    pub const fn is_all(&self) -> bool {
        matches!(self, ScopeFilter::All)
    }
}

impl fmt::Display for ScopeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeFilter::All => write!(f, "all"),
            ScopeFilter::Empty => write!(f, "none"),
            ScopeFilter::OwnedByPatient(id) => write!(f, "patient {}", id),
            ScopeFilter::OwnedByDoctor(id) => write!(f, "doctor {}", id),
            ScopeFilter::TreatedBy(id) => write!(f, "patients of doctor {}", id),
            ScopeFilter::InvolvedIn { doctor, patient } => {
                write!(f, "involving doctor {:?} / patient {:?}", doctor, patient)
            }
        }
    }
}

/// Produce the visibility filter for a caller on one resource kind
///
/// Idempotent and mutation-free. Anonymous callers see the public kinds
/// in full and nothing else; role-less principals get an empty result
/// set on private kinds, not an error.
pub fn scope_filter(authn: &Authn, kind: ResourceKind) -> ScopeFilter {
    let filter = resolve(authn, kind);
    debug!(kind = %kind, filter = %filter, "Resolved scope filter");
    filter
}

fn resolve(authn: &Authn, kind: ResourceKind) -> ScopeFilter {
    // Public directories are fully visible to everyone, anonymous included.
    if kind.is_public() {
        return ScopeFilter::All;
    }

    let Some(principal) = authn.principal() else {
        return ScopeFilter::Empty;
    };

    if principal.is_admin() {
        return ScopeFilter::All;
    }

    match kind {
        ResourceKind::Doctor | ResourceKind::Department | ResourceKind::Availability => {
            ScopeFilter::All
        }

        // A doctor sees the patients it has appointments with; a patient
        // sees itself. A principal holding both identities is scoped as
        // a doctor, matching the source system's branch order.
        ResourceKind::Patient | ResourceKind::Insurance | ResourceKind::MedicalRecord => {
            if let Some(doctor) = principal.doctor {
                ScopeFilter::TreatedBy(doctor)
            } else if let Some(patient) = principal.patient {
                ScopeFilter::OwnedByPatient(patient)
            } else {
                ScopeFilter::Empty
            }
        }

        ResourceKind::DoctorNote => match principal.doctor {
            Some(doctor) => ScopeFilter::OwnedByDoctor(doctor),
            None => ScopeFilter::Empty,
        },

        ResourceKind::Appointment | ResourceKind::AppointmentNote => {
            if principal.doctor.is_none() && principal.patient.is_none() {
                ScopeFilter::Empty
            } else {
                ScopeFilter::InvolvedIn {
                    doctor: principal.doctor,
                    patient: principal.patient,
                }
            }
        }
    }
}
