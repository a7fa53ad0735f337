//! In-memory store
//!
//! Reference implementation of [`ClinicStore`] backed by ordered maps
//! under a single lock. Ids come from one monotonic sequence, so every
//! listing is stable in creation order. Suitable for tests and for
//! embedding hosts that do not need durability.

use crate::authz::{AppointmentLink, ScopeFilter};
use crate::error::StoreResult;
use crate::principal::{DoctorId, PatientId};
use crate::records::{
    Appointment, AppointmentNote, Availability, Department, Doctor, DoctorNote, Insurance,
    MedicalRecord, NewAppointment, NewAppointmentNote, NewAvailability, NewDepartment, NewDoctor,
    NewDoctorNote, NewInsurance, NewMedicalRecord, NewPatient, Patient,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

/// All tables behind one lock
#[derive(Default)]
struct Tables {
    next_id: u64,
    doctors: BTreeMap<DoctorId, Doctor>,
    departments: BTreeMap<u64, Department>,
    availabilities: BTreeMap<u64, Availability>,
    doctor_notes: BTreeMap<u64, DoctorNote>,
    patients: BTreeMap<PatientId, Patient>,
    insurances: BTreeMap<u64, Insurance>,
    medical_records: BTreeMap<u64, MedicalRecord>,
    appointments: BTreeMap<u64, Appointment>,
    appointment_notes: BTreeMap<u64, AppointmentNote>,
}

impl Tables {
    fn alloc(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn doctor_treats(&self, doctor: DoctorId, patient: PatientId) -> bool {
        self.appointments
            .values()
            .any(|a| a.doctor == doctor && a.patient == patient)
    }

    /// Filter semantics for rows owned by a patient identity
    fn patient_owned_in_scope(&self, owner: PatientId, filter: ScopeFilter) -> bool {
        match filter {
            ScopeFilter::All => true,
            ScopeFilter::OwnedByPatient(id) => owner == id,
            ScopeFilter::TreatedBy(doctor) => self.doctor_treats(doctor, owner),
            _ => false,
        }
    }

    fn appointment_in_scope(&self, appointment: &Appointment, filter: ScopeFilter) -> bool {
        match filter {
            ScopeFilter::All => true,
            ScopeFilter::InvolvedIn { doctor, patient } => {
                doctor == Some(appointment.doctor) || patient == Some(appointment.patient)
            }
            _ => false,
        }
    }

    /// An appointment note matches its authoring doctor directly and its
    /// patient through the appointment it belongs to.
    fn note_in_scope(&self, note: &AppointmentNote, filter: ScopeFilter) -> bool {
        match filter {
            ScopeFilter::All => true,
            ScopeFilter::InvolvedIn { doctor, patient } => {
                if doctor == Some(note.doctor) {
                    return true;
                }
                match (patient, self.appointments.get(&note.appointment)) {
                    (Some(patient), Some(appointment)) => appointment.patient == patient,
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

/// In-memory [`ClinicStore`] implementation
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Lock helpers recover from poisoning by continuing with the data;
    // all writes here are single-field replacements.

    fn read_tables(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|poisoned| {
            warn!("store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_tables(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|poisoned| {
            warn!("store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl AppointmentLink for MemoryStore {
    fn doctor_treats(&self, doctor: DoctorId, patient: PatientId) -> bool {
        self.read_tables().doctor_treats(doctor, patient)
    }
}

fn doctor_from(id: DoctorId, d: NewDoctor) -> Doctor {
    Doctor {
        id,
        user: d.user,
        first_name: d.first_name,
        last_name: d.last_name,
        qualification: d.qualification,
        contact_number: d.contact_number,
        email: d.email,
        address: d.address,
        biography: d.biography,
        is_on_vacation: d.is_on_vacation,
    }
}

fn department_from(id: u64, d: NewDepartment) -> Department {
    Department {
        id,
        name: d.name,
        description: d.description,
    }
}

fn availability_from(id: u64, d: NewAvailability) -> Availability {
    Availability {
        id,
        doctor: d.doctor,
        start_date: d.start_date,
        end_date: d.end_date,
        start_time: d.start_time,
        end_time: d.end_time,
    }
}

fn doctor_note_from(id: u64, d: NewDoctorNote) -> DoctorNote {
    DoctorNote {
        id,
        doctor: d.doctor,
        note: d.note,
        date: d.date,
    }
}

fn patient_from(id: PatientId, d: NewPatient) -> Patient {
    Patient {
        id,
        user: d.user,
        first_name: d.first_name,
        last_name: d.last_name,
        date_of_birth: d.date_of_birth,
        contact_number: d.contact_number,
        email: d.email,
        address: d.address,
        medical_history: d.medical_history,
    }
}

fn insurance_from(id: u64, d: NewInsurance) -> Insurance {
    Insurance {
        id,
        patient: d.patient,
        provider: d.provider,
        policy_number: d.policy_number,
        expiration_date: d.expiration_date,
    }
}

fn medical_record_from(id: u64, d: NewMedicalRecord) -> MedicalRecord {
    MedicalRecord {
        id,
        patient: d.patient,
        date: d.date,
        diagnosis: d.diagnosis,
        treatment: d.treatment,
        follow_up_date: d.follow_up_date,
    }
}

fn appointment_from(id: u64, d: NewAppointment) -> Appointment {
    Appointment {
        id,
        doctor: d.doctor,
        patient: d.patient,
        appointment_date: d.appointment_date,
        appointment_time: d.appointment_time,
        notes: d.notes,
        status: d.status,
    }
}

fn appointment_note_from(id: u64, d: NewAppointmentNote) -> AppointmentNote {
    AppointmentNote {
        id,
        appointment: d.appointment,
        doctor: d.doctor,
        note: d.note,
        date: d.date,
    }
}

#[async_trait]
impl super::ClinicStore for MemoryStore {
    // ===== Doctors =====

    async fn list_doctors(&self, filter: ScopeFilter) -> StoreResult<Vec<Doctor>> {
        let tables = self.read_tables();
        Ok(match filter {
            ScopeFilter::All => tables.doctors.values().cloned().collect(),
            _ => Vec::new(),
        })
    }

    async fn get_doctor(&self, id: DoctorId) -> StoreResult<Option<Doctor>> {
        Ok(self.read_tables().doctors.get(&id).cloned())
    }

    async fn create_doctor(&self, draft: NewDoctor) -> StoreResult<Doctor> {
        let mut tables = self.write_tables();
        let id = DoctorId(tables.alloc());
        let record = doctor_from(id, draft);
        tables.doctors.insert(id, record.clone());
        Ok(record)
    }

    async fn update_doctor(&self, id: DoctorId, draft: NewDoctor) -> StoreResult<Option<Doctor>> {
        let mut tables = self.write_tables();
        if !tables.doctors.contains_key(&id) {
            return Ok(None);
        }
        let record = doctor_from(id, draft);
        tables.doctors.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn delete_doctor(&self, id: DoctorId) -> StoreResult<bool> {
        Ok(self.write_tables().doctors.remove(&id).is_some())
    }

    // ===== Departments =====

    async fn list_departments(&self, filter: ScopeFilter) -> StoreResult<Vec<Department>> {
        let tables = self.read_tables();
        Ok(match filter {
            ScopeFilter::All => tables.departments.values().cloned().collect(),
            _ => Vec::new(),
        })
    }

    async fn get_department(&self, id: u64) -> StoreResult<Option<Department>> {
        Ok(self.read_tables().departments.get(&id).cloned())
    }

    async fn create_department(&self, draft: NewDepartment) -> StoreResult<Department> {
        let mut tables = self.write_tables();
        let id = tables.alloc();
        let record = department_from(id, draft);
        tables.departments.insert(id, record.clone());
        Ok(record)
    }

    async fn update_department(
        &self,
        id: u64,
        draft: NewDepartment,
    ) -> StoreResult<Option<Department>> {
        let mut tables = self.write_tables();
        if !tables.departments.contains_key(&id) {
            return Ok(None);
        }
        let record = department_from(id, draft);
        tables.departments.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn delete_department(&self, id: u64) -> StoreResult<bool> {
        Ok(self.write_tables().departments.remove(&id).is_some())
    }

    // ===== Availabilities =====

    async fn list_availabilities(&self, filter: ScopeFilter) -> StoreResult<Vec<Availability>> {
        let tables = self.read_tables();
        Ok(match filter {
            ScopeFilter::All => tables.availabilities.values().cloned().collect(),
            _ => Vec::new(),
        })
    }

    async fn get_availability(&self, id: u64) -> StoreResult<Option<Availability>> {
        Ok(self.read_tables().availabilities.get(&id).cloned())
    }

    async fn create_availability(&self, draft: NewAvailability) -> StoreResult<Availability> {
        let mut tables = self.write_tables();
        let id = tables.alloc();
        let record = availability_from(id, draft);
        tables.availabilities.insert(id, record.clone());
        Ok(record)
    }

    async fn update_availability(
        &self,
        id: u64,
        draft: NewAvailability,
    ) -> StoreResult<Option<Availability>> {
        let mut tables = self.write_tables();
        if !tables.availabilities.contains_key(&id) {
            return Ok(None);
        }
        let record = availability_from(id, draft);
        tables.availabilities.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn delete_availability(&self, id: u64) -> StoreResult<bool> {
        Ok(self.write_tables().availabilities.remove(&id).is_some())
    }

    // ===== Doctor notes =====

    async fn list_doctor_notes(&self, filter: ScopeFilter) -> StoreResult<Vec<DoctorNote>> {
        let tables = self.read_tables();
        Ok(tables
            .doctor_notes
            .values()
            .filter(|note| match filter {
                ScopeFilter::All => true,
                ScopeFilter::OwnedByDoctor(doctor) => note.doctor == doctor,
                _ => false,
            })
            .cloned()
            .collect())
    }

    async fn get_doctor_note(&self, id: u64) -> StoreResult<Option<DoctorNote>> {
        Ok(self.read_tables().doctor_notes.get(&id).cloned())
    }

    async fn create_doctor_note(&self, draft: NewDoctorNote) -> StoreResult<DoctorNote> {
        let mut tables = self.write_tables();
        let id = tables.alloc();
        let record = doctor_note_from(id, draft);
        tables.doctor_notes.insert(id, record.clone());
        Ok(record)
    }

    async fn update_doctor_note(
        &self,
        id: u64,
        draft: NewDoctorNote,
    ) -> StoreResult<Option<DoctorNote>> {
        let mut tables = self.write_tables();
        if !tables.doctor_notes.contains_key(&id) {
            return Ok(None);
        }
        let record = doctor_note_from(id, draft);
        tables.doctor_notes.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn delete_doctor_note(&self, id: u64) -> StoreResult<bool> {
        Ok(self.write_tables().doctor_notes.remove(&id).is_some())
    }

    // ===== Patients =====

    async fn list_patients(&self, filter: ScopeFilter) -> StoreResult<Vec<Patient>> {
        let tables = self.read_tables();
        Ok(tables
            .patients
            .values()
            .filter(|patient| tables.patient_owned_in_scope(patient.id, filter))
            .cloned()
            .collect())
    }

    async fn get_patient(&self, id: PatientId) -> StoreResult<Option<Patient>> {
        Ok(self.read_tables().patients.get(&id).cloned())
    }

    async fn create_patient(&self, draft: NewPatient) -> StoreResult<Patient> {
        let mut tables = self.write_tables();
        let id = PatientId(tables.alloc());
        let record = patient_from(id, draft);
        tables.patients.insert(id, record.clone());
        Ok(record)
    }

    async fn update_patient(
        &self,
        id: PatientId,
        draft: NewPatient,
    ) -> StoreResult<Option<Patient>> {
        let mut tables = self.write_tables();
        if !tables.patients.contains_key(&id) {
            return Ok(None);
        }
        let record = patient_from(id, draft);
        tables.patients.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn delete_patient(&self, id: PatientId) -> StoreResult<bool> {
        Ok(self.write_tables().patients.remove(&id).is_some())
    }

    // ===== Insurances =====

    async fn list_insurances(&self, filter: ScopeFilter) -> StoreResult<Vec<Insurance>> {
        let tables = self.read_tables();
        Ok(tables
            .insurances
            .values()
            .filter(|insurance| tables.patient_owned_in_scope(insurance.patient, filter))
            .cloned()
            .collect())
    }

    async fn get_insurance(&self, id: u64) -> StoreResult<Option<Insurance>> {
        Ok(self.read_tables().insurances.get(&id).cloned())
    }

    async fn create_insurance(&self, draft: NewInsurance) -> StoreResult<Insurance> {
        let mut tables = self.write_tables();
        let id = tables.alloc();
        let record = insurance_from(id, draft);
        tables.insurances.insert(id, record.clone());
        Ok(record)
    }

    async fn update_insurance(
        &self,
        id: u64,
        draft: NewInsurance,
    ) -> StoreResult<Option<Insurance>> {
        let mut tables = self.write_tables();
        if !tables.insurances.contains_key(&id) {
            return Ok(None);
        }
        let record = insurance_from(id, draft);
        tables.insurances.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn delete_insurance(&self, id: u64) -> StoreResult<bool> {
        Ok(self.write_tables().insurances.remove(&id).is_some())
    }

    // ===== Medical records =====

    async fn list_medical_records(&self, filter: ScopeFilter) -> StoreResult<Vec<MedicalRecord>> {
        let tables = self.read_tables();
        Ok(tables
            .medical_records
            .values()
            .filter(|record| tables.patient_owned_in_scope(record.patient, filter))
            .cloned()
            .collect())
    }

    async fn get_medical_record(&self, id: u64) -> StoreResult<Option<MedicalRecord>> {
        Ok(self.read_tables().medical_records.get(&id).cloned())
    }

    async fn create_medical_record(&self, draft: NewMedicalRecord) -> StoreResult<MedicalRecord> {
        let mut tables = self.write_tables();
        let id = tables.alloc();
        let record = medical_record_from(id, draft);
        tables.medical_records.insert(id, record.clone());
        Ok(record)
    }

    async fn update_medical_record(
        &self,
        id: u64,
        draft: NewMedicalRecord,
    ) -> StoreResult<Option<MedicalRecord>> {
        let mut tables = self.write_tables();
        if !tables.medical_records.contains_key(&id) {
            return Ok(None);
        }
        let record = medical_record_from(id, draft);
        tables.medical_records.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn delete_medical_record(&self, id: u64) -> StoreResult<bool> {
        Ok(self.write_tables().medical_records.remove(&id).is_some())
    }

    // ===== Appointments =====

    async fn list_appointments(&self, filter: ScopeFilter) -> StoreResult<Vec<Appointment>> {
        let tables = self.read_tables();
        Ok(tables
            .appointments
            .values()
            .filter(|appointment| tables.appointment_in_scope(appointment, filter))
            .cloned()
            .collect())
    }

    async fn get_appointment(&self, id: u64) -> StoreResult<Option<Appointment>> {
        Ok(self.read_tables().appointments.get(&id).cloned())
    }

    async fn create_appointment(&self, draft: NewAppointment) -> StoreResult<Appointment> {
        let mut tables = self.write_tables();
        let id = tables.alloc();
        let record = appointment_from(id, draft);
        tables.appointments.insert(id, record.clone());
        Ok(record)
    }

    async fn update_appointment(
        &self,
        id: u64,
        draft: NewAppointment,
    ) -> StoreResult<Option<Appointment>> {
        let mut tables = self.write_tables();
        if !tables.appointments.contains_key(&id) {
            return Ok(None);
        }
        let record = appointment_from(id, draft);
        tables.appointments.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn delete_appointment(&self, id: u64) -> StoreResult<bool> {
        Ok(self.write_tables().appointments.remove(&id).is_some())
    }

    async fn appointments_between(
        &self,
        doctor: DoctorId,
        patient: PatientId,
    ) -> StoreResult<Vec<Appointment>> {
        let tables = self.read_tables();
        Ok(tables
            .appointments
            .values()
            .filter(|a| a.doctor == doctor && a.patient == patient)
            .cloned()
            .collect())
    }

    // ===== Appointment notes =====

    async fn list_appointment_notes(
        &self,
        filter: ScopeFilter,
    ) -> StoreResult<Vec<AppointmentNote>> {
        let tables = self.read_tables();
        Ok(tables
            .appointment_notes
            .values()
            .filter(|note| tables.note_in_scope(note, filter))
            .cloned()
            .collect())
    }

    async fn get_appointment_note(&self, id: u64) -> StoreResult<Option<AppointmentNote>> {
        Ok(self.read_tables().appointment_notes.get(&id).cloned())
    }

    async fn create_appointment_note(
        &self,
        draft: NewAppointmentNote,
    ) -> StoreResult<AppointmentNote> {
        let mut tables = self.write_tables();
        let id = tables.alloc();
        let record = appointment_note_from(id, draft);
        tables.appointment_notes.insert(id, record.clone());
        Ok(record)
    }

    async fn update_appointment_note(
        &self,
        id: u64,
        draft: NewAppointmentNote,
    ) -> StoreResult<Option<AppointmentNote>> {
        let mut tables = self.write_tables();
        if !tables.appointment_notes.contains_key(&id) {
            return Ok(None);
        }
        let record = appointment_note_from(id, draft);
        tables.appointment_notes.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn delete_appointment_note(&self, id: u64) -> StoreResult<bool> {
        Ok(self.write_tables().appointment_notes.remove(&id).is_some())
    }

    async fn notes_for_appointment(&self, appointment: u64) -> StoreResult<Vec<AppointmentNote>> {
        let tables = self.read_tables();
        Ok(tables
            .appointment_notes
            .values()
            .filter(|note| note.appointment == appointment)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::UserId;
    use crate::store::ClinicStore;

    fn new_patient(user: u64, name: &str) -> NewPatient {
        NewPatient {
            user: UserId(user),
            first_name: name.to_string(),
            last_name: "Test".to_string(),
            date_of_birth: "1990-01-01".to_string(),
            contact_number: "555-0000".to_string(),
            email: format!("{name}@example.com"),
            address: "1 Main St".to_string(),
            medical_history: String::new(),
        }
    }

    fn new_appointment(doctor: DoctorId, patient: PatientId) -> NewAppointment {
        NewAppointment {
            doctor,
            patient,
            appointment_date: "2026-04-01".to_string(),
            appointment_time: "10:00".to_string(),
            notes: String::new(),
            status: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_monotonic_and_listings_ordered() {
        let store = MemoryStore::new();
        let a = store.create_patient(new_patient(1, "a")).await.unwrap();
        let b = store.create_patient(new_patient(2, "b")).await.unwrap();
        let c = store.create_patient(new_patient(3, "c")).await.unwrap();
        assert!(a.id < b.id && b.id < c.id);

        let listed = store.list_patients(ScopeFilter::All).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[tokio::test]
    async fn test_owned_by_patient_filter() {
        let store = MemoryStore::new();
        let a = store.create_patient(new_patient(1, "a")).await.unwrap();
        let b = store.create_patient(new_patient(2, "b")).await.unwrap();

        let scoped = store
            .list_patients(ScopeFilter::OwnedByPatient(a.id))
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id, a.id);

        let none = store.list_patients(ScopeFilter::Empty).await.unwrap();
        assert!(none.is_empty());

        // A filter variant that does not apply to this kind matches nothing.
        let mismatched = store
            .list_patients(ScopeFilter::InvolvedIn {
                doctor: None,
                patient: Some(b.id),
            })
            .await
            .unwrap();
        assert!(mismatched.is_empty());
    }

    #[tokio::test]
    async fn test_treated_by_follows_appointments() {
        let store = MemoryStore::new();
        let patient = store.create_patient(new_patient(1, "a")).await.unwrap();
        let doctor = DoctorId(77);

        assert!(!store.doctor_treats(doctor, patient.id));
        let before = store
            .list_patients(ScopeFilter::TreatedBy(doctor))
            .await
            .unwrap();
        assert!(before.is_empty());

        store
            .create_appointment(new_appointment(doctor, patient.id))
            .await
            .unwrap();

        assert!(store.doctor_treats(doctor, patient.id));
        let after = store
            .list_patients(ScopeFilter::TreatedBy(doctor))
            .await
            .unwrap();
        assert_eq!(after.len(), 1);
    }

    #[tokio::test]
    async fn test_update_replaces_and_keeps_id() {
        let store = MemoryStore::new();
        let created = store.create_patient(new_patient(1, "a")).await.unwrap();

        let mut draft = new_patient(1, "renamed");
        draft.medical_history = "updated".to_string();
        let updated = store.update_patient(created.id, draft).await.unwrap().unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.first_name, "renamed");

        let missing = store
            .update_patient(PatientId(9999), new_patient(1, "x"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_notes_follow_their_appointment() {
        let store = MemoryStore::new();
        let doctor = DoctorId(1);
        let patient = PatientId(2);
        let appointment = store
            .create_appointment(new_appointment(doctor, patient))
            .await
            .unwrap();

        let note = store
            .create_appointment_note(NewAppointmentNote {
                appointment: appointment.id,
                doctor,
                note: "bring previous scans".to_string(),
                date: "2026-04-01".to_string(),
            })
            .await
            .unwrap();

        let for_appt = store.notes_for_appointment(appointment.id).await.unwrap();
        assert_eq!(for_appt, vec![note.clone()]);

        // Patient side of the scope goes through the appointment.
        let seen_by_patient = store
            .list_appointment_notes(ScopeFilter::InvolvedIn {
                doctor: None,
                patient: Some(patient),
            })
            .await
            .unwrap();
        assert_eq!(seen_by_patient.len(), 1);

        let seen_by_other = store
            .list_appointment_notes(ScopeFilter::InvolvedIn {
                doctor: None,
                patient: Some(PatientId(999)),
            })
            .await
            .unwrap();
        assert!(seen_by_other.is_empty());
    }

    #[tokio::test]
    async fn test_appointments_between_is_exact() {
        let store = MemoryStore::new();
        store
            .create_appointment(new_appointment(DoctorId(1), PatientId(1)))
            .await
            .unwrap();
        store
            .create_appointment(new_appointment(DoctorId(1), PatientId(2)))
            .await
            .unwrap();
        store
            .create_appointment(new_appointment(DoctorId(2), PatientId(1)))
            .await
            .unwrap();

        let between = store
            .appointments_between(DoctorId(1), PatientId(1))
            .await
            .unwrap();
        assert_eq!(between.len(), 1);
        assert_eq!(between[0].doctor, DoctorId(1));
        assert_eq!(between[0].patient, PatientId(1));
    }
}
