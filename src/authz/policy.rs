//! Coarse action policy
//!
//! Decides, before any record is loaded, whether a principal may even
//! attempt an action on a resource kind. Admins pass unconditionally;
//! everyone else goes through a total table: every (kind, action) pair
//! resolves to a requirement, and unlisted combinations fall back to
//! [`Requirement::Denied`] rather than erroring. Instance-level
//! decisions are deferred to the object check; empty-result narrowing
//! is deferred to the scope filter.

use crate::authz::types::{Action, Decision, ResourceKind};
use crate::principal::Principal;
use tracing::{debug, trace};

/// Role requirement for attempting an action on a resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone, including anonymous callers
    Public,
    /// Any authenticated principal
    Authenticated,
    /// Administrators only
    Admin,
    /// Administrators or a linked doctor identity
    AdminOrDoctor,
    /// Administrators or a linked patient identity
    AdminOrPatient,
    /// Administrators, doctors, or patients
    AnyRole,
    /// Never permitted at this layer
    Denied,
}

/// Look up the coarse requirement for a (kind, action) pair
pub const fn requirement(kind: ResourceKind, action: Action) -> Requirement {
    use Action::*;

    match kind {
        // The doctor directory is public; profiles are created by staff
        // and maintained by their owners.
        ResourceKind::Doctor => match action {
            List | Retrieve | CustomRead => Requirement::Public,
            Create => Requirement::Admin,
            Update | Delete | CustomWrite => Requirement::AdminOrDoctor,
        },
        ResourceKind::Department => match action {
            List | Retrieve | CustomRead => Requirement::Public,
            Create | Update | Delete => Requirement::Admin,
            CustomWrite => Requirement::Denied,
        },
        ResourceKind::Availability => match action {
            List | Retrieve | CustomRead => Requirement::Public,
            Create | Update | Delete => Requirement::AdminOrDoctor,
            CustomWrite => Requirement::Denied,
        },
        // Doctor notes have no public read.
        ResourceKind::DoctorNote => match action {
            List | Retrieve | CustomRead | Create | Update | Delete => Requirement::AdminOrDoctor,
            CustomWrite => Requirement::Denied,
        },
        ResourceKind::Patient | ResourceKind::Insurance | ResourceKind::MedicalRecord => {
            match action {
                List | Retrieve | Create | Update | Delete | CustomRead => Requirement::AnyRole,
                CustomWrite => Requirement::Denied,
            }
        }
        // Patients initiate bookings; the doctor-routed booking path
        // additionally resolves the caller's patient profile inside the
        // operation, so admins pass here and may still end up with
        // NotFound there.
        ResourceKind::Appointment | ResourceKind::AppointmentNote => match action {
            List | Retrieve | CustomRead => Requirement::Authenticated,
            Create | CustomWrite => Requirement::AdminOrPatient,
            Update | Delete => Requirement::AnyRole,
        },
    }
}

/// Evaluate the coarse table for an authenticated principal
///
/// Anonymous callers never reach this function; the `require_*` entry
/// points fold them into the unauthenticated error first.
pub fn check_action(principal: &Principal, action: Action, kind: ResourceKind) -> Decision {
    debug!(
        action = %action,
        kind = %kind,
        user = %principal.user_id,
        "Checking action policy"
    );

    // Admins are authorized for everything, ahead of the table.
    if principal.is_admin() {
        trace!("Admin principal, table not consulted");
        return Decision::Allowed;
    }

    let requirement = requirement(kind, action);
    trace!(requirement = ?requirement, "Resolved coarse requirement");

    match requirement {
        Requirement::Public | Requirement::Authenticated => Decision::Allowed,
        Requirement::Admin => Decision::Denied("requires the admin role".to_string()),
        Requirement::AdminOrDoctor => {
            if principal.is_doctor() {
                Decision::Allowed
            } else {
                Decision::Denied("requires the admin or doctor role".to_string())
            }
        }
        Requirement::AdminOrPatient => {
            if principal.is_patient() {
                Decision::Allowed
            } else {
                Decision::Denied("requires the admin or patient role".to_string())
            }
        }
        Requirement::AnyRole => {
            if principal.is_doctor() || principal.is_patient() {
                Decision::Allowed
            } else {
                Decision::Denied("requires an admin, doctor, or patient role".to_string())
            }
        }
        Requirement::Denied => Decision::Denied(format!("{} is not defined for {}", action, kind)),
    }
}
