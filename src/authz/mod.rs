//! Authorization engine
//!
//! Pure decision functions for role-based access to clinic records.
//!
//! ## Decision model
//!
//! Every operation goes through up to three gates, in order:
//!
//! 1. **Coarse action check** ([`check_action`]) - may this principal
//!    attempt this action on this resource kind at all? A total table;
//!    unlisted pairs deny.
//! 2. **Object ownership check** ([`check_object`]) - given the fetched
//!    record's owner references, may the principal touch this record?
//!    Ordered rules, first match wins, default deny.
//! 3. **Scope filter** ([`scope_filter`]) - for collection reads, which
//!    rows may the principal see? Returned as data and executed by the
//!    store, never by scanning here.
//!
//! At every gate, admin principals pass first and unconditionally.
//! Unauthenticated callers are folded into
//! [`ClinicError::Unauthenticated`] by the `require_*` entry points and
//! never surface as denials; the only operations open to them are reads
//! of the public kinds (doctor directory, departments, availability).
//!
//! The engine holds no state, performs no I/O, and never mutates
//! records. Its single relationship question, "does this doctor treat
//! this patient", is answered through the [`AppointmentLink`] oracle so
//! the object check and the scope filter agree by construction.

pub mod object;
pub mod policy;
pub mod scope;
pub mod types;

pub use object::{AppointmentLink, NoAppointments, Resource, ResourceRef, check_object};
pub use policy::{Requirement, check_action, requirement};
pub use scope::{ScopeFilter, scope_filter};
pub use types::{Action, Decision, ResourceKind};

use crate::error::{ClinicError, DeniedError};
use crate::principal::Authn;

/// Coarse gate over an [`Authn`], folding anonymity and denial into errors
///
/// Anonymous callers pass only where the table says [`Requirement::Public`];
/// everywhere else they get [`ClinicError::Unauthenticated`], which is
/// deliberately distinct from a denial.
pub fn require_action(authn: &Authn, action: Action, kind: ResourceKind) -> Result<(), ClinicError> {
    match authn.principal() {
        None => {
            if requirement(kind, action) == Requirement::Public {
                Ok(())
            } else {
                Err(ClinicError::Unauthenticated)
            }
        }
        Some(principal) => match check_action(principal, action, kind) {
            Decision::Allowed => Ok(()),
            Decision::Denied(reason) => Err(DeniedError::new(action, kind, reason).into()),
        },
    }
}

/// Object gate over an [`Authn`], folding anonymity and denial into errors
pub fn require_object(
    authn: &Authn,
    action: Action,
    resource: &ResourceRef,
    links: &dyn AppointmentLink,
) -> Result<(), ClinicError> {
    match authn.principal() {
        None => {
            if action.is_read() && resource.kind().is_public() {
                Ok(())
            } else {
                Err(ClinicError::Unauthenticated)
            }
        }
        Some(principal) => match check_object(principal, action, resource, links) {
            Decision::Allowed => Ok(()),
            Decision::Denied(reason) => Err(DeniedError::new(action, resource.kind(), reason).into()),
        },
    }
}
