//! Doctor-side operations
//!
//! CRUD for the doctor directory, departments, availability slots and
//! private doctor notes. The directory kinds are publicly readable;
//! writes stay with administrators and the owning doctor.

use super::{ClinicService, require_owner_unchanged};
use crate::authz::{self, Action, Resource, ResourceKind, ResourceRef};
use crate::error::{ClinicError, Result};
use crate::principal::{Authn, DoctorId};
use crate::records::{
    Availability, Department, Doctor, DoctorNote, NewAvailability, NewDepartment, NewDoctor,
    NewDoctorNote,
};
use crate::store::ClinicStore;
use tracing::instrument;

impl<S: ClinicStore> ClinicService<S> {
    // ===== Doctors =====

    #[instrument(skip(self, authn))]
    pub async fn list_doctors(&self, authn: &Authn) -> Result<Vec<Doctor>> {
        authz::require_action(authn, Action::List, ResourceKind::Doctor)?;
        let filter = authz::scope_filter(authn, ResourceKind::Doctor);
        Ok(self.store.list_doctors(filter).await?)
    }

    #[instrument(skip(self, authn))]
    pub async fn get_doctor(&self, authn: &Authn, id: DoctorId) -> Result<Doctor> {
        authz::require_action(authn, Action::Retrieve, ResourceKind::Doctor)?;
        let doctor = self
            .store
            .get_doctor(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("doctor {id}")))?;
        authz::require_object(authn, Action::Retrieve, &doctor.resource_ref(), self.links())?;
        Ok(doctor)
    }

    #[instrument(skip(self, authn, draft))]
    pub async fn create_doctor(&self, authn: &Authn, draft: NewDoctor) -> Result<Doctor> {
        authz::require_action(authn, Action::Create, ResourceKind::Doctor)?;
        Ok(self.store.create_doctor(draft).await?)
    }

    #[instrument(skip(self, authn, draft))]
    pub async fn update_doctor(
        &self,
        authn: &Authn,
        id: DoctorId,
        draft: NewDoctor,
    ) -> Result<Doctor> {
        authz::require_action(authn, Action::Update, ResourceKind::Doctor)?;
        let existing = self
            .store
            .get_doctor(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("doctor {id}")))?;
        authz::require_object(authn, Action::Update, &existing.resource_ref(), self.links())?;
        require_owner_unchanged(authn, draft.user == existing.user, ResourceKind::Doctor)?;
        self.store
            .update_doctor(id, draft)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("doctor {id}")))
    }

    #[instrument(skip(self, authn))]
    pub async fn delete_doctor(&self, authn: &Authn, id: DoctorId) -> Result<()> {
        authz::require_action(authn, Action::Delete, ResourceKind::Doctor)?;
        let existing = self
            .store
            .get_doctor(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("doctor {id}")))?;
        authz::require_object(authn, Action::Delete, &existing.resource_ref(), self.links())?;
        self.store.delete_doctor(id).await?;
        Ok(())
    }

    // ===== Departments =====

    #[instrument(skip(self, authn))]
    pub async fn list_departments(&self, authn: &Authn) -> Result<Vec<Department>> {
        authz::require_action(authn, Action::List, ResourceKind::Department)?;
        let filter = authz::scope_filter(authn, ResourceKind::Department);
        Ok(self.store.list_departments(filter).await?)
    }

    #[instrument(skip(self, authn))]
    pub async fn get_department(&self, authn: &Authn, id: u64) -> Result<Department> {
        authz::require_action(authn, Action::Retrieve, ResourceKind::Department)?;
        let department = self
            .store
            .get_department(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("department {id}")))?;
        authz::require_object(authn, Action::Retrieve, &ResourceRef::Department, self.links())?;
        Ok(department)
    }

    #[instrument(skip(self, authn, draft))]
    pub async fn create_department(
        &self,
        authn: &Authn,
        draft: NewDepartment,
    ) -> Result<Department> {
        authz::require_action(authn, Action::Create, ResourceKind::Department)?;
        Ok(self.store.create_department(draft).await?)
    }

    #[instrument(skip(self, authn, draft))]
    pub async fn update_department(
        &self,
        authn: &Authn,
        id: u64,
        draft: NewDepartment,
    ) -> Result<Department> {
        authz::require_action(authn, Action::Update, ResourceKind::Department)?;
        self.store
            .update_department(id, draft)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("department {id}")))
    }

    #[instrument(skip(self, authn))]
    pub async fn delete_department(&self, authn: &Authn, id: u64) -> Result<()> {
        authz::require_action(authn, Action::Delete, ResourceKind::Department)?;
        if !self.store.delete_department(id).await? {
            return Err(ClinicError::not_found(format!("department {id}")));
        }
        Ok(())
    }

    // ===== Availability slots =====

    #[instrument(skip(self, authn))]
    pub async fn list_availabilities(&self, authn: &Authn) -> Result<Vec<Availability>> {
        authz::require_action(authn, Action::List, ResourceKind::Availability)?;
        let filter = authz::scope_filter(authn, ResourceKind::Availability);
        Ok(self.store.list_availabilities(filter).await?)
    }

    #[instrument(skip(self, authn))]
    pub async fn get_availability(&self, authn: &Authn, id: u64) -> Result<Availability> {
        authz::require_action(authn, Action::Retrieve, ResourceKind::Availability)?;
        let slot = self
            .store
            .get_availability(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("availability {id}")))?;
        authz::require_object(authn, Action::Retrieve, &slot.resource_ref(), self.links())?;
        Ok(slot)
    }

    /// Create an availability slot for a doctor
    ///
    /// A non-admin draft must reference the caller's own doctor
    /// identity; the would-be record goes through the ownership check
    /// before anything is written.
    #[instrument(skip(self, authn, draft))]
    pub async fn create_availability(
        &self,
        authn: &Authn,
        draft: NewAvailability,
    ) -> Result<Availability> {
        authz::require_action(authn, Action::Create, ResourceKind::Availability)?;
        let would_be = ResourceRef::Availability { doctor: draft.doctor };
        authz::require_object(authn, Action::Create, &would_be, self.links())?;
        Ok(self.store.create_availability(draft).await?)
    }

    #[instrument(skip(self, authn, draft))]
    pub async fn update_availability(
        &self,
        authn: &Authn,
        id: u64,
        draft: NewAvailability,
    ) -> Result<Availability> {
        authz::require_action(authn, Action::Update, ResourceKind::Availability)?;
        let existing = self
            .store
            .get_availability(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("availability {id}")))?;
        authz::require_object(authn, Action::Update, &existing.resource_ref(), self.links())?;
        require_owner_unchanged(
            authn,
            draft.doctor == existing.doctor,
            ResourceKind::Availability,
        )?;
        self.store
            .update_availability(id, draft)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("availability {id}")))
    }

    #[instrument(skip(self, authn))]
    pub async fn delete_availability(&self, authn: &Authn, id: u64) -> Result<()> {
        authz::require_action(authn, Action::Delete, ResourceKind::Availability)?;
        let existing = self
            .store
            .get_availability(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("availability {id}")))?;
        authz::require_object(authn, Action::Delete, &existing.resource_ref(), self.links())?;
        self.store.delete_availability(id).await?;
        Ok(())
    }

    // ===== Doctor notes =====

    #[instrument(skip(self, authn))]
    pub async fn list_doctor_notes(&self, authn: &Authn) -> Result<Vec<DoctorNote>> {
        authz::require_action(authn, Action::List, ResourceKind::DoctorNote)?;
        let filter = authz::scope_filter(authn, ResourceKind::DoctorNote);
        Ok(self.store.list_doctor_notes(filter).await?)
    }

    #[instrument(skip(self, authn))]
    pub async fn get_doctor_note(&self, authn: &Authn, id: u64) -> Result<DoctorNote> {
        authz::require_action(authn, Action::Retrieve, ResourceKind::DoctorNote)?;
        let note = self
            .store
            .get_doctor_note(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("doctor note {id}")))?;
        authz::require_object(authn, Action::Retrieve, &note.resource_ref(), self.links())?;
        Ok(note)
    }

    #[instrument(skip(self, authn, draft))]
    pub async fn create_doctor_note(
        &self,
        authn: &Authn,
        draft: NewDoctorNote,
    ) -> Result<DoctorNote> {
        authz::require_action(authn, Action::Create, ResourceKind::DoctorNote)?;
        let would_be = ResourceRef::DoctorNote { doctor: draft.doctor };
        authz::require_object(authn, Action::Create, &would_be, self.links())?;
        Ok(self.store.create_doctor_note(draft).await?)
    }

    #[instrument(skip(self, authn, draft))]
    pub async fn update_doctor_note(
        &self,
        authn: &Authn,
        id: u64,
        draft: NewDoctorNote,
    ) -> Result<DoctorNote> {
        authz::require_action(authn, Action::Update, ResourceKind::DoctorNote)?;
        let existing = self
            .store
            .get_doctor_note(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("doctor note {id}")))?;
        authz::require_object(authn, Action::Update, &existing.resource_ref(), self.links())?;
        require_owner_unchanged(authn, draft.doctor == existing.doctor, ResourceKind::DoctorNote)?;
        self.store
            .update_doctor_note(id, draft)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("doctor note {id}")))
    }

    #[instrument(skip(self, authn))]
    pub async fn delete_doctor_note(&self, authn: &Authn, id: u64) -> Result<()> {
        authz::require_action(authn, Action::Delete, ResourceKind::DoctorNote)?;
        let existing = self
            .store
            .get_doctor_note(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("doctor note {id}")))?;
        authz::require_object(authn, Action::Delete, &existing.resource_ref(), self.links())?;
        self.store.delete_doctor_note(id).await?;
        Ok(())
    }
}
