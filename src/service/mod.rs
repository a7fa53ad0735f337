//! Clinic service layer
//!
//! Gated operations over a [`ClinicStore`]. Every operation walks the
//! same path: coarse action check, then scope or fetch, then the
//! fine-grained ownership check, then the store call. Denials are
//! logged here at the service boundary with structured fields; the
//! engine itself only emits debug traces.
//!
//! Fetch-then-check ordering is deliberate: retrieving a record that
//! exists but is out of scope yields `Denied`, while an absent id
//! yields `NotFound`, so clients can tell "not yours" from "does not
//! exist".

mod bookings;
mod doctors;
mod patients;

pub use bookings::AppointmentNotes;
pub use patients::{ClinicalHistory, PatientSummary};

use crate::authz::{Action, AppointmentLink, ResourceKind};
use crate::error::{ClinicError, DeniedError, Result};
use crate::principal::{Authn, Principal, UserId};
use crate::records::Patient;
use crate::store::ClinicStore;
use tracing::warn;

/// The embedding surface for a host application
///
/// Generic over the store so tests run against
/// [`MemoryStore`](crate::store::MemoryStore) and hosts can bring their
/// own backend.
pub struct ClinicService<S> {
    store: S,
}

impl<S: ClinicStore> ClinicService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Direct store access, bypassing authorization
    ///
    /// For fixture setup and host-side plumbing; request paths must go
    /// through the service operations.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn links(&self) -> &dyn AppointmentLink {
        &self.store
    }

    /// Resolve the caller's own patient profile
    ///
    /// A missing link and a missing row surface identically; callers
    /// without a patient profile cannot use the patient-side booking
    /// operations, admins included.
    async fn own_patient_profile(&self, principal: &Principal) -> Result<Patient> {
        let id = principal
            .patient
            .ok_or_else(|| ClinicError::not_found("patient profile"))?;
        self.store
            .get_patient(id)
            .await?
            .ok_or_else(|| ClinicError::not_found("patient profile"))
    }
}

/// Non-admin updates may not move a record to another owner
fn require_owner_unchanged(authn: &Authn, unchanged: bool, kind: ResourceKind) -> Result<()> {
    if unchanged || authn.principal().is_some_and(Principal::is_admin) {
        return Ok(());
    }
    warn!(kind = %kind, "Denied update that changes ownership");
    Err(DeniedError::owner_immutable(Action::Update, kind).into())
}

/// Non-admin profile creates must bind to the caller's own user account
fn require_user_binding(principal: &Principal, bound: UserId, kind: ResourceKind) -> Result<()> {
    if principal.is_admin() || principal.user_id == bound {
        return Ok(());
    }
    warn!(
        user = %principal.user_id,
        bound = %bound,
        kind = %kind,
        "Denied profile create bound to a foreign user"
    );
    Err(DeniedError::user_binding(Action::Create, kind).into())
}
