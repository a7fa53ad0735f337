//! Persistence seam for clinic records
//!
//! One wide trait covering CRUD for the nine record kinds plus the two
//! join queries the booking paths need. Collection reads take a
//! [`ScopeFilter`] and must apply it inside the query, preserving stable
//! id order; they never return rows outside the filter. The bundled
//! [`MemoryStore`] is the reference implementation.

pub mod memory;

pub use memory::MemoryStore;

use crate::authz::{AppointmentLink, ScopeFilter};
use crate::error::StoreResult;
use crate::principal::{DoctorId, PatientId};
use crate::records::{
    Appointment, AppointmentNote, Availability, Department, Doctor, DoctorNote, Insurance,
    MedicalRecord, NewAppointment, NewAppointmentNote, NewAvailability, NewDepartment, NewDoctor,
    NewDoctorNote, NewInsurance, NewMedicalRecord, NewPatient, Patient,
};
// async_trait required for dyn-compatible async store implementations
use async_trait::async_trait;

/// Storage operations for clinic records
///
/// `create_*` assigns the next id in creation order and returns the
/// stored record. `update_*` replaces every field except the id and
/// returns `None` when the record is absent. `delete_*` reports whether
/// a record was removed. Listings come back ordered by id.
#[async_trait]
pub trait ClinicStore: AppointmentLink + Send + Sync {
    // ===== Doctors =====

    async fn list_doctors(&self, filter: ScopeFilter) -> StoreResult<Vec<Doctor>>;
    async fn get_doctor(&self, id: DoctorId) -> StoreResult<Option<Doctor>>;
    async fn create_doctor(&self, draft: NewDoctor) -> StoreResult<Doctor>;
    async fn update_doctor(&self, id: DoctorId, draft: NewDoctor) -> StoreResult<Option<Doctor>>;
    async fn delete_doctor(&self, id: DoctorId) -> StoreResult<bool>;

    // ===== Departments =====

    async fn list_departments(&self, filter: ScopeFilter) -> StoreResult<Vec<Department>>;
    async fn get_department(&self, id: u64) -> StoreResult<Option<Department>>;
    async fn create_department(&self, draft: NewDepartment) -> StoreResult<Department>;
    async fn update_department(
        &self,
        id: u64,
        draft: NewDepartment,
    ) -> StoreResult<Option<Department>>;
    async fn delete_department(&self, id: u64) -> StoreResult<bool>;

    // ===== Availabilities =====

    async fn list_availabilities(&self, filter: ScopeFilter) -> StoreResult<Vec<Availability>>;
    async fn get_availability(&self, id: u64) -> StoreResult<Option<Availability>>;
    async fn create_availability(&self, draft: NewAvailability) -> StoreResult<Availability>;
    async fn update_availability(
        &self,
        id: u64,
        draft: NewAvailability,
    ) -> StoreResult<Option<Availability>>;
    async fn delete_availability(&self, id: u64) -> StoreResult<bool>;

    // ===== Doctor notes =====

    async fn list_doctor_notes(&self, filter: ScopeFilter) -> StoreResult<Vec<DoctorNote>>;
    async fn get_doctor_note(&self, id: u64) -> StoreResult<Option<DoctorNote>>;
    async fn create_doctor_note(&self, draft: NewDoctorNote) -> StoreResult<DoctorNote>;
    async fn update_doctor_note(
        &self,
        id: u64,
        draft: NewDoctorNote,
    ) -> StoreResult<Option<DoctorNote>>;
    async fn delete_doctor_note(&self, id: u64) -> StoreResult<bool>;

    // ===== Patients =====

    async fn list_patients(&self, filter: ScopeFilter) -> StoreResult<Vec<Patient>>;
    async fn get_patient(&self, id: PatientId) -> StoreResult<Option<Patient>>;
    async fn create_patient(&self, draft: NewPatient) -> StoreResult<Patient>;
    async fn update_patient(
        &self,
        id: PatientId,
        draft: NewPatient,
    ) -> StoreResult<Option<Patient>>;
    async fn delete_patient(&self, id: PatientId) -> StoreResult<bool>;

    // ===== Insurances =====

    async fn list_insurances(&self, filter: ScopeFilter) -> StoreResult<Vec<Insurance>>;
    async fn get_insurance(&self, id: u64) -> StoreResult<Option<Insurance>>;
    async fn create_insurance(&self, draft: NewInsurance) -> StoreResult<Insurance>;
    async fn update_insurance(
        &self,
        id: u64,
        draft: NewInsurance,
    ) -> StoreResult<Option<Insurance>>;
    async fn delete_insurance(&self, id: u64) -> StoreResult<bool>;

    // ===== Medical records =====

    async fn list_medical_records(&self, filter: ScopeFilter) -> StoreResult<Vec<MedicalRecord>>;
    async fn get_medical_record(&self, id: u64) -> StoreResult<Option<MedicalRecord>>;
    async fn create_medical_record(&self, draft: NewMedicalRecord) -> StoreResult<MedicalRecord>;
    async fn update_medical_record(
        &self,
        id: u64,
        draft: NewMedicalRecord,
    ) -> StoreResult<Option<MedicalRecord>>;
    async fn delete_medical_record(&self, id: u64) -> StoreResult<bool>;

    // ===== Appointments =====

    async fn list_appointments(&self, filter: ScopeFilter) -> StoreResult<Vec<Appointment>>;
    async fn get_appointment(&self, id: u64) -> StoreResult<Option<Appointment>>;
    async fn create_appointment(&self, draft: NewAppointment) -> StoreResult<Appointment>;
    async fn update_appointment(
        &self,
        id: u64,
        draft: NewAppointment,
    ) -> StoreResult<Option<Appointment>>;
    async fn delete_appointment(&self, id: u64) -> StoreResult<bool>;

    /// Appointments between exactly this doctor and this patient, id order
    async fn appointments_between(
        &self,
        doctor: DoctorId,
        patient: PatientId,
    ) -> StoreResult<Vec<Appointment>>;

    // ===== Appointment notes =====

    async fn list_appointment_notes(
        &self,
        filter: ScopeFilter,
    ) -> StoreResult<Vec<AppointmentNote>>;
    async fn get_appointment_note(&self, id: u64) -> StoreResult<Option<AppointmentNote>>;
    async fn create_appointment_note(
        &self,
        draft: NewAppointmentNote,
    ) -> StoreResult<AppointmentNote>;
    async fn update_appointment_note(
        &self,
        id: u64,
        draft: NewAppointmentNote,
    ) -> StoreResult<Option<AppointmentNote>>;
    async fn delete_appointment_note(&self, id: u64) -> StoreResult<bool>;

    /// Notes attached to one appointment, id order
    async fn notes_for_appointment(&self, appointment: u64) -> StoreResult<Vec<AppointmentNote>>;
}
