//! Patient-side operations
//!
//! CRUD for patient profiles, insurance policies and medical records,
//! plus the aggregated clinical history read. All three kinds are
//! patient-owned: a patient reaches only their own rows, a doctor
//! reaches the rows of patients they have an appointment with.

use super::{ClinicService, require_owner_unchanged, require_user_binding};
use crate::authz::{self, Action, Resource, ResourceKind, ResourceRef, ScopeFilter};
use crate::error::{ClinicError, Result};
use crate::principal::{Authn, PatientId};
use crate::records::{
    Insurance, MedicalRecord, NewInsurance, NewMedicalRecord, NewPatient, Patient,
};
use crate::store::ClinicStore;
use serde::Serialize;
use tracing::instrument;

/// Patient header of a [`ClinicalHistory`] report
#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary {
    pub id: PatientId,
    pub full_name: String,
    pub date_of_birth: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    pub medical_history: String,
}

impl From<Patient> for PatientSummary {
    fn from(patient: Patient) -> Self {
        Self {
            full_name: patient.full_name(),
            id: patient.id,
            date_of_birth: patient.date_of_birth,
            contact_number: patient.contact_number,
            email: patient.email,
            address: patient.address,
            medical_history: patient.medical_history,
        }
    }
}

/// Aggregated clinical history of one patient
///
/// Everything the clinic holds about the patient in one read: the
/// profile summary, all insurance policies and all medical records.
#[derive(Debug, Clone, Serialize)]
pub struct ClinicalHistory {
    pub patient: PatientSummary,
    pub insurances: Vec<Insurance>,
    pub medical_records: Vec<MedicalRecord>,
}

impl<S: ClinicStore> ClinicService<S> {
    // ===== Patients =====

    #[instrument(skip(self, authn))]
    pub async fn list_patients(&self, authn: &Authn) -> Result<Vec<Patient>> {
        authz::require_action(authn, Action::List, ResourceKind::Patient)?;
        let filter = authz::scope_filter(authn, ResourceKind::Patient);
        Ok(self.store.list_patients(filter).await?)
    }

    #[instrument(skip(self, authn))]
    pub async fn get_patient(&self, authn: &Authn, id: PatientId) -> Result<Patient> {
        authz::require_action(authn, Action::Retrieve, ResourceKind::Patient)?;
        let patient = self
            .store
            .get_patient(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("patient {id}")))?;
        authz::require_object(authn, Action::Retrieve, &patient.resource_ref(), self.links())?;
        Ok(patient)
    }

    /// Create a patient profile
    ///
    /// Non-admin callers may only bind the profile to their own user
    /// account; this is how a fresh account bootstraps its patient
    /// identity.
    #[instrument(skip(self, authn, draft))]
    pub async fn create_patient(&self, authn: &Authn, draft: NewPatient) -> Result<Patient> {
        authz::require_action(authn, Action::Create, ResourceKind::Patient)?;
        let principal = authn.principal_required()?;
        require_user_binding(principal, draft.user, ResourceKind::Patient)?;
        Ok(self.store.create_patient(draft).await?)
    }

    #[instrument(skip(self, authn, draft))]
    pub async fn update_patient(
        &self,
        authn: &Authn,
        id: PatientId,
        draft: NewPatient,
    ) -> Result<Patient> {
        authz::require_action(authn, Action::Update, ResourceKind::Patient)?;
        let existing = self
            .store
            .get_patient(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("patient {id}")))?;
        authz::require_object(authn, Action::Update, &existing.resource_ref(), self.links())?;
        require_owner_unchanged(authn, draft.user == existing.user, ResourceKind::Patient)?;
        self.store
            .update_patient(id, draft)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("patient {id}")))
    }

    #[instrument(skip(self, authn))]
    pub async fn delete_patient(&self, authn: &Authn, id: PatientId) -> Result<()> {
        authz::require_action(authn, Action::Delete, ResourceKind::Patient)?;
        let existing = self
            .store
            .get_patient(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("patient {id}")))?;
        authz::require_object(authn, Action::Delete, &existing.resource_ref(), self.links())?;
        self.store.delete_patient(id).await?;
        Ok(())
    }

    // ===== Insurances =====

    #[instrument(skip(self, authn))]
    pub async fn list_insurances(&self, authn: &Authn) -> Result<Vec<Insurance>> {
        authz::require_action(authn, Action::List, ResourceKind::Insurance)?;
        let filter = authz::scope_filter(authn, ResourceKind::Insurance);
        Ok(self.store.list_insurances(filter).await?)
    }

    #[instrument(skip(self, authn))]
    pub async fn get_insurance(&self, authn: &Authn, id: u64) -> Result<Insurance> {
        authz::require_action(authn, Action::Retrieve, ResourceKind::Insurance)?;
        let insurance = self
            .store
            .get_insurance(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("insurance {id}")))?;
        authz::require_object(authn, Action::Retrieve, &insurance.resource_ref(), self.links())?;
        Ok(insurance)
    }

    /// Create an insurance policy
    ///
    /// The would-be record goes through the ownership check, so a
    /// non-admin draft must reference the caller's own patient identity.
    #[instrument(skip(self, authn, draft))]
    pub async fn create_insurance(&self, authn: &Authn, draft: NewInsurance) -> Result<Insurance> {
        authz::require_action(authn, Action::Create, ResourceKind::Insurance)?;
        let would_be = ResourceRef::Insurance { patient: draft.patient };
        authz::require_object(authn, Action::Create, &would_be, self.links())?;
        Ok(self.store.create_insurance(draft).await?)
    }

    #[instrument(skip(self, authn, draft))]
    pub async fn update_insurance(
        &self,
        authn: &Authn,
        id: u64,
        draft: NewInsurance,
    ) -> Result<Insurance> {
        authz::require_action(authn, Action::Update, ResourceKind::Insurance)?;
        let existing = self
            .store
            .get_insurance(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("insurance {id}")))?;
        authz::require_object(authn, Action::Update, &existing.resource_ref(), self.links())?;
        require_owner_unchanged(authn, draft.patient == existing.patient, ResourceKind::Insurance)?;
        self.store
            .update_insurance(id, draft)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("insurance {id}")))
    }

    #[instrument(skip(self, authn))]
    pub async fn delete_insurance(&self, authn: &Authn, id: u64) -> Result<()> {
        authz::require_action(authn, Action::Delete, ResourceKind::Insurance)?;
        let existing = self
            .store
            .get_insurance(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("insurance {id}")))?;
        authz::require_object(authn, Action::Delete, &existing.resource_ref(), self.links())?;
        self.store.delete_insurance(id).await?;
        Ok(())
    }

    // ===== Medical records =====

    #[instrument(skip(self, authn))]
    pub async fn list_medical_records(&self, authn: &Authn) -> Result<Vec<MedicalRecord>> {
        authz::require_action(authn, Action::List, ResourceKind::MedicalRecord)?;
        let filter = authz::scope_filter(authn, ResourceKind::MedicalRecord);
        Ok(self.store.list_medical_records(filter).await?)
    }

    #[instrument(skip(self, authn))]
    pub async fn get_medical_record(&self, authn: &Authn, id: u64) -> Result<MedicalRecord> {
        authz::require_action(authn, Action::Retrieve, ResourceKind::MedicalRecord)?;
        let record = self
            .store
            .get_medical_record(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("medical record {id}")))?;
        authz::require_object(authn, Action::Retrieve, &record.resource_ref(), self.links())?;
        Ok(record)
    }

    #[instrument(skip(self, authn, draft))]
    pub async fn create_medical_record(
        &self,
        authn: &Authn,
        draft: NewMedicalRecord,
    ) -> Result<MedicalRecord> {
        authz::require_action(authn, Action::Create, ResourceKind::MedicalRecord)?;
        let would_be = ResourceRef::MedicalRecord { patient: draft.patient };
        authz::require_object(authn, Action::Create, &would_be, self.links())?;
        Ok(self.store.create_medical_record(draft).await?)
    }

    #[instrument(skip(self, authn, draft))]
    pub async fn update_medical_record(
        &self,
        authn: &Authn,
        id: u64,
        draft: NewMedicalRecord,
    ) -> Result<MedicalRecord> {
        authz::require_action(authn, Action::Update, ResourceKind::MedicalRecord)?;
        let existing = self
            .store
            .get_medical_record(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("medical record {id}")))?;
        authz::require_object(authn, Action::Update, &existing.resource_ref(), self.links())?;
        require_owner_unchanged(
            authn,
            draft.patient == existing.patient,
            ResourceKind::MedicalRecord,
        )?;
        self.store
            .update_medical_record(id, draft)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("medical record {id}")))
    }

    #[instrument(skip(self, authn))]
    pub async fn delete_medical_record(&self, authn: &Authn, id: u64) -> Result<()> {
        authz::require_action(authn, Action::Delete, ResourceKind::MedicalRecord)?;
        let existing = self
            .store
            .get_medical_record(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("medical record {id}")))?;
        authz::require_object(authn, Action::Delete, &existing.resource_ref(), self.links())?;
        self.store.delete_medical_record(id).await?;
        Ok(())
    }

    // ===== Clinical history =====

    /// Aggregate everything the clinic holds about one patient
    ///
    /// Readable by administrators, the patient, and doctors with an
    /// appointment with the patient.
    #[instrument(skip(self, authn))]
    pub async fn clinical_history(
        &self,
        authn: &Authn,
        patient_id: PatientId,
    ) -> Result<ClinicalHistory> {
        authz::require_action(authn, Action::CustomRead, ResourceKind::Patient)?;
        let patient = self
            .store
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("patient {patient_id}")))?;
        authz::require_object(authn, Action::CustomRead, &patient.resource_ref(), self.links())?;

        let insurances = self
            .store
            .list_insurances(ScopeFilter::OwnedByPatient(patient_id))
            .await?;
        let medical_records = self
            .store
            .list_medical_records(ScopeFilter::OwnedByPatient(patient_id))
            .await?;

        Ok(ClinicalHistory {
            patient: patient.into(),
            insurances,
            medical_records,
        })
    }
}
