//! Clinic domain records
//!
//! Serde-friendly record and payload types for the nine resource kinds,
//! split by domain the way the service layer is.

pub mod bookings;
pub mod doctors;
pub mod patients;

pub use bookings::{
    Appointment, AppointmentDraft, AppointmentNote, AppointmentStatus, NewAppointment,
    NewAppointmentNote,
};
pub use doctors::{
    Availability, Department, Doctor, DoctorNote, NewAvailability, NewDepartment, NewDoctor,
    NewDoctorNote,
};
pub use patients::{
    Insurance, MedicalRecord, NewInsurance, NewMedicalRecord, NewPatient, Patient,
};
