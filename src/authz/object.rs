//! Object-level ownership check
//!
//! Decides whether a principal may perform an action on one fetched
//! record, using only the record's owner references. Rules are evaluated
//! in a fixed order, first match wins:
//!
//! 1. Admin principals are allowed.
//! 2. Reads on public kinds (doctor, department, availability) are allowed.
//! 3. Appointments and appointment notes are dually owned: the referenced
//!    doctor or the referenced patient passes, nobody else.
//! 4. Doctor-owned records pass only for the matching doctor identity.
//! 5. Patient-owned records pass on writes only for the matching patient.
//! 6. Patient-owned records pass on reads also for a doctor with at least
//!    one appointment with that patient, answered by [`AppointmentLink`].
//! 7. Everything else is denied.
//!
//! Mismatched (action, kind) combinations deny rather than erroring.

use crate::authz::types::{Action, Decision, ResourceKind};
use crate::principal::{DoctorId, PatientId, Principal};
use tracing::debug;

/// Ownership view of a persisted record
///
/// Carries exactly the owner references the rules compare against,
/// nothing else. Appointment notes have no patient column of their own;
/// the service resolves their appointment first and fills in its patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRef {
    Doctor { id: DoctorId },
    Department,
    Availability { doctor: DoctorId },
    DoctorNote { doctor: DoctorId },
    Patient { id: PatientId },
    Insurance { patient: PatientId },
    MedicalRecord { patient: PatientId },
    Appointment { doctor: DoctorId, patient: PatientId },
    AppointmentNote { doctor: DoctorId, patient: PatientId },
}

impl ResourceRef {
    /// The kind this reference belongs to
    pub const fn kind(&self) -> ResourceKind {
        match self {
            ResourceRef::Doctor { .. } => ResourceKind::Doctor,
            ResourceRef::Department => ResourceKind::Department,
            ResourceRef::Availability { .. } => ResourceKind::Availability,
            ResourceRef::DoctorNote { .. } => ResourceKind::DoctorNote,
            ResourceRef::Patient { .. } => ResourceKind::Patient,
            ResourceRef::Insurance { .. } => ResourceKind::Insurance,
            ResourceRef::MedicalRecord { .. } => ResourceKind::MedicalRecord,
            ResourceRef::Appointment { .. } => ResourceKind::Appointment,
            ResourceRef::AppointmentNote { .. } => ResourceKind::AppointmentNote,
        }
    }
}

/// Records that expose an ownership view of themselves
pub trait Resource {
    fn resource_ref(&self) -> ResourceRef;
}

/// Oracle for the one relationship question rule 6 asks
///
/// "Does this doctor have at least one appointment with this patient?"
/// The in-memory store answers from its appointment table; a database
/// backend would answer with an EXISTS query. Implementations must not
/// mutate anything.
pub trait AppointmentLink {
    fn doctor_treats(&self, doctor: DoctorId, patient: PatientId) -> bool;
}

/// An [`AppointmentLink`] with no appointments at all
///
/// Useful where the treating-doctor read path is known not to apply.
pub struct NoAppointments;

impl AppointmentLink for NoAppointments {
    fn doctor_treats(&self, _doctor: DoctorId, _patient: PatientId) -> bool {
        false
    }
}

/// Check whether a principal may perform an action on a fetched record
pub fn check_object(
    principal: &Principal,
    action: Action,
    resource: &ResourceRef,
    links: &dyn AppointmentLink,
) -> Decision {
    debug!(
        action = %action,
        kind = %resource.kind(),
        user = %principal.user_id,
        "Checking object ownership"
    );

    // Rule 1: admins pass unconditionally.
    if principal.is_admin() {
        return Decision::Allowed;
    }

    // Rule 2: public kinds are readable by anyone.
    if action.is_read() && resource.kind().is_public() {
        return Decision::Allowed;
    }

    match *resource {
        // Rule 3: dual ownership, either side passes.
        ResourceRef::Appointment { doctor, patient }
        | ResourceRef::AppointmentNote { doctor, patient } => {
            if principal.doctor == Some(doctor) || principal.patient == Some(patient) {
                Decision::Allowed
            } else {
                Decision::Denied("not a participant in this appointment".to_string())
            }
        }

        // Rule 4: doctor-owned records, owner only. Reads on the public
        // ones already returned above, so only writes and doctor notes
        // reach these arms.
        ResourceRef::Doctor { id } => {
            if principal.doctor == Some(id) {
                Decision::Allowed
            } else {
                Decision::Denied("belongs to another doctor".to_string())
            }
        }
        ResourceRef::Availability { doctor } | ResourceRef::DoctorNote { doctor } => {
            if principal.doctor == Some(doctor) {
                Decision::Allowed
            } else {
                Decision::Denied("belongs to another doctor".to_string())
            }
        }

        // Rules 5 and 6: patient-owned records. Owner always passes;
        // on reads, a treating doctor passes too.
        ResourceRef::Patient { id: owner }
        | ResourceRef::Insurance { patient: owner }
        | ResourceRef::MedicalRecord { patient: owner } => {
            if principal.patient == Some(owner) {
                return Decision::Allowed;
            }
            if action.is_read()
                && let Some(doctor) = principal.doctor
                && links.doctor_treats(doctor, owner)
            {
                return Decision::Allowed;
            }
            Decision::Denied("belongs to another patient".to_string())
        }

        // Rule 7: nothing else matches. Non-admin department writes land
        // here.
        ResourceRef::Department => {
            Decision::Denied("departments are managed by administrators".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::UserId;

    /// Link oracle backed by an explicit pair list
    struct Pairs(Vec<(DoctorId, PatientId)>);

    impl AppointmentLink for Pairs {
        fn doctor_treats(&self, doctor: DoctorId, patient: PatientId) -> bool {
            self.0.contains(&(doctor, patient))
        }
    }

    fn admin() -> Principal {
        Principal::admin(UserId(1))
    }

    fn doctor(id: u64) -> Principal {
        Principal::doctor(UserId(100 + id), DoctorId(id))
    }

    fn patient(id: u64) -> Principal {
        Principal::patient(UserId(200 + id), PatientId(id))
    }

    #[test]
    fn test_admin_passes_everything() {
        let refs = [
            ResourceRef::Doctor { id: DoctorId(1) },
            ResourceRef::Department,
            ResourceRef::DoctorNote { doctor: DoctorId(1) },
            ResourceRef::Insurance { patient: PatientId(2) },
            ResourceRef::Appointment {
                doctor: DoctorId(1),
                patient: PatientId(2),
            },
        ];
        for resource in refs {
            for action in Action::all() {
                assert!(
                    check_object(&admin(), *action, &resource, &NoAppointments).is_allowed(),
                    "admin denied {action} on {:?}",
                    resource.kind()
                );
            }
        }
    }

    #[test]
    fn test_public_reads_pass_for_anyone() {
        let stranger = patient(9);
        for resource in [
            ResourceRef::Doctor { id: DoctorId(1) },
            ResourceRef::Department,
            ResourceRef::Availability { doctor: DoctorId(1) },
        ] {
            assert!(check_object(&stranger, Action::Retrieve, &resource, &NoAppointments)
                .is_allowed());
            assert!(check_object(&stranger, Action::List, &resource, &NoAppointments).is_allowed());
        }
    }

    #[test]
    fn test_appointment_dual_ownership() {
        let appt = ResourceRef::Appointment {
            doctor: DoctorId(1),
            patient: PatientId(2),
        };

        assert!(check_object(&doctor(1), Action::Update, &appt, &NoAppointments).is_allowed());
        assert!(check_object(&patient(2), Action::Update, &appt, &NoAppointments).is_allowed());
        assert!(check_object(&doctor(3), Action::Update, &appt, &NoAppointments).is_denied());
        assert!(check_object(&patient(4), Action::Retrieve, &appt, &NoAppointments).is_denied());
    }

    #[test]
    fn test_doctor_owned_writes_are_owner_only() {
        let slot = ResourceRef::Availability { doctor: DoctorId(1) };
        assert!(check_object(&doctor(1), Action::Update, &slot, &NoAppointments).is_allowed());
        assert!(check_object(&doctor(2), Action::Update, &slot, &NoAppointments).is_denied());

        let profile = ResourceRef::Doctor { id: DoctorId(1) };
        assert!(check_object(&doctor(1), Action::Delete, &profile, &NoAppointments).is_allowed());
        assert!(check_object(&doctor(2), Action::Delete, &profile, &NoAppointments).is_denied());
    }

    #[test]
    fn test_doctor_notes_are_private_even_for_reads() {
        let note = ResourceRef::DoctorNote { doctor: DoctorId(1) };
        assert!(check_object(&doctor(1), Action::Retrieve, &note, &NoAppointments).is_allowed());
        assert!(check_object(&doctor(2), Action::Retrieve, &note, &NoAppointments).is_denied());
    }

    #[test]
    fn test_insurance_write_ownership() {
        let own = ResourceRef::Insurance { patient: PatientId(7) };
        let foreign = ResourceRef::Insurance { patient: PatientId(9) };

        assert!(check_object(&patient(7), Action::Update, &own, &NoAppointments).is_allowed());
        assert!(check_object(&patient(7), Action::Update, &foreign, &NoAppointments).is_denied());
    }

    #[test]
    fn test_treating_doctor_may_read_but_not_write() {
        let record = ResourceRef::MedicalRecord { patient: PatientId(2) };
        let links = Pairs(vec![(DoctorId(1), PatientId(2))]);

        assert!(check_object(&doctor(1), Action::Retrieve, &record, &links).is_allowed());
        assert!(check_object(&doctor(1), Action::CustomRead, &record, &links).is_allowed());
        assert!(check_object(&doctor(1), Action::Update, &record, &links).is_denied());

        // No appointment, no read.
        assert!(check_object(&doctor(3), Action::Retrieve, &record, &links).is_denied());
    }

    #[test]
    fn test_mismatched_pairs_deny_without_erroring() {
        let ins = ResourceRef::Insurance { patient: PatientId(2) };
        assert!(check_object(&patient(7), Action::CustomWrite, &ins, &NoAppointments).is_denied());
        assert!(check_object(&doctor(1), Action::CustomWrite, &ins, &NoAppointments).is_denied());

        assert!(check_object(
            &doctor(1),
            Action::Update,
            &ResourceRef::Department,
            &NoAppointments
        )
        .is_denied());
    }
}
