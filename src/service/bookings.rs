//! Booking operations
//!
//! Appointment and appointment-note CRUD plus the doctor-initiated
//! booking pair. Booking is the one operation with a business gate on
//! top of authorization: a vacationing doctor cannot be booked, and
//! the denial happens before any write.

use super::{ClinicService, require_owner_unchanged};
use crate::authz::{self, Action, Resource, ResourceKind, ResourceRef};
use crate::error::{ClinicError, DeniedError, Result};
use crate::principal::{Authn, DoctorId, PatientId};
use crate::records::{
    Appointment, AppointmentDraft, AppointmentNote, AppointmentStatus, NewAppointment,
    NewAppointmentNote,
};
use crate::store::ClinicStore;
use serde::Serialize;
use tracing::{instrument, warn};

/// An appointment and the notes attached to it, in one read
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentNotes {
    pub appointment_id: u64,
    pub doctor: DoctorId,
    pub patient: PatientId,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: AppointmentStatus,
    pub notes: Vec<AppointmentNote>,
}

impl<S: ClinicStore> ClinicService<S> {
    // ===== Appointments =====

    #[instrument(skip(self, authn))]
    pub async fn list_appointments(&self, authn: &Authn) -> Result<Vec<Appointment>> {
        authz::require_action(authn, Action::List, ResourceKind::Appointment)?;
        let filter = authz::scope_filter(authn, ResourceKind::Appointment);
        Ok(self.store.list_appointments(filter).await?)
    }

    #[instrument(skip(self, authn))]
    pub async fn get_appointment(&self, authn: &Authn, id: u64) -> Result<Appointment> {
        authz::require_action(authn, Action::Retrieve, ResourceKind::Appointment)?;
        let appointment = self
            .store
            .get_appointment(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("appointment {id}")))?;
        authz::require_object(authn, Action::Retrieve, &appointment.resource_ref(), self.links())?;
        Ok(appointment)
    }

    /// Create an appointment (patient-initiated path)
    ///
    /// A non-admin caller books for themselves: the draft's patient
    /// reference is overridden with the caller's own patient identity.
    /// Admins book the draft verbatim, naming both sides.
    #[instrument(skip(self, authn, draft))]
    pub async fn create_appointment(
        &self,
        authn: &Authn,
        draft: AppointmentDraft,
    ) -> Result<Appointment> {
        authz::require_action(authn, Action::Create, ResourceKind::Appointment)?;
        let principal = authn.principal_required()?;

        let doctor = draft
            .doctor
            .ok_or_else(|| ClinicError::not_found("doctor reference in draft"))?;
        let patient = if principal.is_admin() {
            draft
                .patient
                .ok_or_else(|| ClinicError::not_found("patient reference in draft"))?
        } else {
            principal
                .patient
                .ok_or_else(|| ClinicError::not_found("patient profile"))?
        };

        Ok(self.store.create_appointment(draft.resolve(doctor, patient)).await?)
    }

    #[instrument(skip(self, authn, draft))]
    pub async fn update_appointment(
        &self,
        authn: &Authn,
        id: u64,
        draft: NewAppointment,
    ) -> Result<Appointment> {
        authz::require_action(authn, Action::Update, ResourceKind::Appointment)?;
        let existing = self
            .store
            .get_appointment(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("appointment {id}")))?;
        authz::require_object(authn, Action::Update, &existing.resource_ref(), self.links())?;
        require_owner_unchanged(
            authn,
            draft.doctor == existing.doctor && draft.patient == existing.patient,
            ResourceKind::Appointment,
        )?;
        self.store
            .update_appointment(id, draft)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("appointment {id}")))
    }

    #[instrument(skip(self, authn))]
    pub async fn delete_appointment(&self, authn: &Authn, id: u64) -> Result<()> {
        authz::require_action(authn, Action::Delete, ResourceKind::Appointment)?;
        let existing = self
            .store
            .get_appointment(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("appointment {id}")))?;
        authz::require_object(authn, Action::Delete, &existing.resource_ref(), self.links())?;
        self.store.delete_appointment(id).await?;
        Ok(())
    }

    // ===== Doctor-initiated booking =====

    /// Book an appointment with a specific doctor
    ///
    /// Requires a resolvable patient profile for the caller, admins
    /// included. The target doctor must exist and not be on vacation;
    /// a vacationing doctor yields a denial with zero writes performed.
    #[instrument(skip(self, authn, draft))]
    pub async fn book_with_doctor(
        &self,
        authn: &Authn,
        doctor_id: DoctorId,
        draft: AppointmentDraft,
    ) -> Result<Appointment> {
        authz::require_action(authn, Action::CustomWrite, ResourceKind::Appointment)?;
        let principal = authn.principal_required()?;
        let patient = self.own_patient_profile(principal).await?;

        let doctor = self
            .store
            .get_doctor(doctor_id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("doctor {doctor_id}")))?;
        if doctor.is_on_vacation {
            warn!(doctor = %doctor_id, patient = %patient.id, "Denied booking with vacationing doctor");
            return Err(DeniedError::doctor_unavailable(doctor_id).into());
        }

        Ok(self
            .store
            .create_appointment(draft.resolve(doctor.id, patient.id))
            .await?)
    }

    /// The appointments between the caller's patient profile and one doctor
    ///
    /// The paired read for [`book_with_doctor`](Self::book_with_doctor):
    /// exactly the caller's appointments with this doctor, not all
    /// appointments of either side.
    #[instrument(skip(self, authn))]
    pub async fn appointments_with_doctor(
        &self,
        authn: &Authn,
        doctor_id: DoctorId,
    ) -> Result<Vec<Appointment>> {
        authz::require_action(authn, Action::CustomRead, ResourceKind::Appointment)?;
        let principal = authn.principal_required()?;
        let patient = self.own_patient_profile(principal).await?;

        let doctor = self
            .store
            .get_doctor(doctor_id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("doctor {doctor_id}")))?;

        Ok(self.store.appointments_between(doctor.id, patient.id).await?)
    }

    // ===== Appointment notes =====

    #[instrument(skip(self, authn))]
    pub async fn list_appointment_notes(&self, authn: &Authn) -> Result<Vec<AppointmentNote>> {
        authz::require_action(authn, Action::List, ResourceKind::AppointmentNote)?;
        let filter = authz::scope_filter(authn, ResourceKind::AppointmentNote);
        Ok(self.store.list_appointment_notes(filter).await?)
    }

    #[instrument(skip(self, authn))]
    pub async fn get_appointment_note(&self, authn: &Authn, id: u64) -> Result<AppointmentNote> {
        authz::require_action(authn, Action::Retrieve, ResourceKind::AppointmentNote)?;
        let note = self
            .store
            .get_appointment_note(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("appointment note {id}")))?;
        let resource = self.note_resource(&note).await?;
        authz::require_object(authn, Action::Retrieve, &resource, self.links())?;
        Ok(note)
    }

    /// Attach a note to an appointment
    ///
    /// The referenced appointment must exist and the caller must be a
    /// participant in it (or an admin).
    #[instrument(skip(self, authn, draft))]
    pub async fn create_appointment_note(
        &self,
        authn: &Authn,
        draft: NewAppointmentNote,
    ) -> Result<AppointmentNote> {
        authz::require_action(authn, Action::Create, ResourceKind::AppointmentNote)?;
        let appointment = self
            .store
            .get_appointment(draft.appointment)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("appointment {}", draft.appointment)))?;
        let would_be = ResourceRef::AppointmentNote {
            doctor: appointment.doctor,
            patient: appointment.patient,
        };
        authz::require_object(authn, Action::Create, &would_be, self.links())?;
        Ok(self.store.create_appointment_note(draft).await?)
    }

    #[instrument(skip(self, authn, draft))]
    pub async fn update_appointment_note(
        &self,
        authn: &Authn,
        id: u64,
        draft: NewAppointmentNote,
    ) -> Result<AppointmentNote> {
        authz::require_action(authn, Action::Update, ResourceKind::AppointmentNote)?;
        let existing = self
            .store
            .get_appointment_note(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("appointment note {id}")))?;
        let resource = self.note_resource(&existing).await?;
        authz::require_object(authn, Action::Update, &resource, self.links())?;
        require_owner_unchanged(
            authn,
            draft.doctor == existing.doctor && draft.appointment == existing.appointment,
            ResourceKind::AppointmentNote,
        )?;
        self.store
            .update_appointment_note(id, draft)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("appointment note {id}")))
    }

    #[instrument(skip(self, authn))]
    pub async fn delete_appointment_note(&self, authn: &Authn, id: u64) -> Result<()> {
        authz::require_action(authn, Action::Delete, ResourceKind::AppointmentNote)?;
        let existing = self
            .store
            .get_appointment_note(id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("appointment note {id}")))?;
        let resource = self.note_resource(&existing).await?;
        authz::require_object(authn, Action::Delete, &resource, self.links())?;
        self.store.delete_appointment_note(id).await?;
        Ok(())
    }

    /// An appointment together with all its notes, in note id order
    #[instrument(skip(self, authn))]
    pub async fn appointment_notes(
        &self,
        authn: &Authn,
        appointment_id: u64,
    ) -> Result<AppointmentNotes> {
        authz::require_action(authn, Action::CustomRead, ResourceKind::Appointment)?;
        let appointment = self
            .store
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("appointment {appointment_id}")))?;
        authz::require_object(
            authn,
            Action::CustomRead,
            &appointment.resource_ref(),
            self.links(),
        )?;

        let notes = self.store.notes_for_appointment(appointment.id).await?;
        Ok(AppointmentNotes {
            appointment_id: appointment.id,
            doctor: appointment.doctor,
            patient: appointment.patient,
            appointment_date: appointment.appointment_date,
            appointment_time: appointment.appointment_time,
            status: appointment.status,
            notes,
        })
    }

    /// Ownership view of a note: authoring doctor plus the patient of
    /// the appointment it belongs to
    async fn note_resource(&self, note: &AppointmentNote) -> Result<ResourceRef> {
        let appointment = self
            .store
            .get_appointment(note.appointment)
            .await?
            .ok_or_else(|| ClinicError::not_found(format!("appointment {}", note.appointment)))?;
        Ok(note.resource_ref_with(appointment.patient))
    }
}
