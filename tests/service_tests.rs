//! Service layer integration tests
//!
//! This suite covers the gated CRUD surface:
//! - Retrieval semantics: out-of-scope rows deny, absent ids are missing
//! - Create payload validation: no impersonation of other identities
//! - Update owner immutability for non-admin callers
//! - Admin-only department writes
//! - The patient-initiated appointment create path
//! - Anonymous access and store error plumbing

use polyclinic::error::StoreError;
use polyclinic::records::{
    AppointmentDraft, Doctor, NewAppointment, NewAvailability, NewDoctor, NewInsurance,
    NewMedicalRecord, NewPatient, Patient,
};
use polyclinic::{
    Authn, ClinicError, ClinicService, ClinicStore, MemoryStore, PatientId, Principal, UserId,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn new_doctor(user: u64, last_name: &str) -> NewDoctor {
    NewDoctor {
        user: UserId(user),
        first_name: "Alex".to_string(),
        last_name: last_name.to_string(),
        qualification: "MD".to_string(),
        contact_number: "555-0101".to_string(),
        email: format!("{}@clinic.example", last_name.to_lowercase()),
        address: "1 Clinic Way".to_string(),
        biography: String::new(),
        is_on_vacation: false,
    }
}

fn new_patient(user: u64, last_name: &str) -> NewPatient {
    NewPatient {
        user: UserId(user),
        first_name: "Sam".to_string(),
        last_name: last_name.to_string(),
        date_of_birth: "1990-01-01".to_string(),
        contact_number: "555-0202".to_string(),
        email: format!("{}@example.com", last_name.to_lowercase()),
        address: "2 Patient Rd".to_string(),
        medical_history: String::new(),
    }
}

fn new_insurance(patient: PatientId) -> NewInsurance {
    NewInsurance {
        patient,
        provider: "Acme Mutual".to_string(),
        policy_number: format!("POL-{patient}"),
        expiration_date: "2027-01-01".to_string(),
    }
}

fn admin() -> Authn {
    Authn::from(Principal::admin(UserId(1)))
}

fn as_doctor(doctor: &Doctor) -> Authn {
    Authn::from(Principal::doctor(doctor.user, doctor.id))
}

fn as_patient(patient: &Patient) -> Authn {
    Authn::from(Principal::patient(patient.user, patient.id))
}

/// Two doctors, two patients, one appointment between ames and novak
struct Clinic {
    service: ClinicService<MemoryStore>,
    ames: Doctor,
    bowen: Doctor,
    novak: Patient,
    ortiz: Patient,
}

async fn seeded_clinic() -> Clinic {
    let service = ClinicService::new(MemoryStore::new());
    let store = service.store();

    let ames = store.create_doctor(new_doctor(10, "Ames")).await.unwrap();
    let bowen = store.create_doctor(new_doctor(11, "Bowen")).await.unwrap();
    let novak = store.create_patient(new_patient(20, "Novak")).await.unwrap();
    let ortiz = store.create_patient(new_patient(21, "Ortiz")).await.unwrap();

    store
        .create_appointment(NewAppointment {
            doctor: ames.id,
            patient: novak.id,
            appointment_date: "2026-03-01".to_string(),
            appointment_time: "09:30".to_string(),
            notes: String::new(),
            status: Default::default(),
        })
        .await
        .unwrap();

    Clinic {
        service,
        ames,
        bowen,
        novak,
        ortiz,
    }
}

// =============================================================================
// 1. Retrieval Semantics: Denied vs NotFound
// =============================================================================

mod retrieval {
    use super::*;

    #[tokio::test]
    async fn test_foreign_row_denies_but_absent_row_is_missing() {
        let clinic = seeded_clinic().await;
        let ortiz_policy = clinic
            .service
            .store()
            .create_insurance(new_insurance(clinic.ortiz.id))
            .await
            .unwrap();

        let novak = as_patient(&clinic.novak);

        // Exists, but belongs to Ortiz.
        let err = clinic
            .service
            .get_insurance(&novak, ortiz_policy.id)
            .await
            .unwrap_err();
        assert!(err.is_denied());

        // Does not exist at all.
        let err = clinic.service.get_insurance(&novak, 9999).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_treating_doctor_reads_fine_grained_records() {
        let clinic = seeded_clinic().await;
        let store = clinic.service.store();
        let novak_record = store
            .create_medical_record(NewMedicalRecord {
                patient: clinic.novak.id,
                date: "2026-02-01".to_string(),
                diagnosis: "checkup".to_string(),
                treatment: "none".to_string(),
                follow_up_date: None,
            })
            .await
            .unwrap();
        let ortiz_record = store
            .create_medical_record(NewMedicalRecord {
                patient: clinic.ortiz.id,
                date: "2026-02-02".to_string(),
                diagnosis: "checkup".to_string(),
                treatment: "none".to_string(),
                follow_up_date: None,
            })
            .await
            .unwrap();

        let ames = as_doctor(&clinic.ames);

        // Ames has an appointment with Novak but not with Ortiz.
        assert!(clinic.service.get_medical_record(&ames, novak_record.id).await.is_ok());
        let err = clinic
            .service
            .get_medical_record(&ames, ortiz_record.id)
            .await
            .unwrap_err();
        assert!(err.is_denied());
    }

    #[tokio::test]
    async fn test_public_directory_retrieve_for_everyone() {
        let clinic = seeded_clinic().await;

        let anonymous = clinic
            .service
            .get_doctor(&Authn::Anonymous, clinic.ames.id)
            .await
            .unwrap();
        assert_eq!(anonymous.id, clinic.ames.id);

        let err = clinic
            .service
            .get_doctor(&Authn::Anonymous, polyclinic::DoctorId(9999))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

// =============================================================================
// 2. Create Payload Validation
// =============================================================================

mod create_validation {
    use super::*;

    #[tokio::test]
    async fn test_patient_cannot_create_insurance_for_another_patient() {
        let clinic = seeded_clinic().await;
        let novak = as_patient(&clinic.novak);

        let err = clinic
            .service
            .create_insurance(&novak, new_insurance(clinic.ortiz.id))
            .await
            .unwrap_err();
        assert!(err.is_denied());

        // Nothing was written.
        let all = clinic.service.list_insurances(&admin()).await.unwrap();
        assert!(all.is_empty());

        // The own identity passes.
        let own = clinic
            .service
            .create_insurance(&novak, new_insurance(clinic.novak.id))
            .await
            .unwrap();
        assert_eq!(own.patient, clinic.novak.id);
    }

    #[tokio::test]
    async fn test_doctor_cannot_create_availability_for_another_doctor() {
        let clinic = seeded_clinic().await;
        let ames = as_doctor(&clinic.ames);

        let foreign = NewAvailability {
            doctor: clinic.bowen.id,
            start_date: "2026-03-01".to_string(),
            end_date: "2026-03-05".to_string(),
            start_time: "08:00".to_string(),
            end_time: "16:00".to_string(),
        };
        let err = clinic.service.create_availability(&ames, foreign).await.unwrap_err();
        assert!(err.is_denied());

        let own = NewAvailability {
            doctor: clinic.ames.id,
            start_date: "2026-03-01".to_string(),
            end_date: "2026-03-05".to_string(),
            start_time: "08:00".to_string(),
            end_time: "16:00".to_string(),
        };
        assert!(clinic.service.create_availability(&ames, own).await.is_ok());
    }

    #[tokio::test]
    async fn test_patient_profile_binds_to_own_user_account_only() {
        let clinic = seeded_clinic().await;
        // Novak is already a patient and tries to register a profile
        // bound to somebody else's user account.
        let novak = as_patient(&clinic.novak);

        let err = clinic
            .service
            .create_patient(&novak, new_patient(999, "Foreign"))
            .await
            .unwrap_err();
        match err {
            ClinicError::Denied(denied) => {
                assert!(denied.reason.contains("own user account"));
            }
            other => panic!("expected Denied, got {other:?}"),
        }

        // Admins may bind any user.
        assert!(
            clinic
                .service
                .create_patient(&admin(), new_patient(999, "Provisioned"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_admin_impersonation_checks_are_bypassed() {
        let clinic = seeded_clinic().await;

        // An admin may create rows naming any owner.
        let policy = clinic
            .service
            .create_insurance(&admin(), new_insurance(clinic.ortiz.id))
            .await
            .unwrap();
        assert_eq!(policy.patient, clinic.ortiz.id);
    }
}

// =============================================================================
// 3. Update Owner Immutability
// =============================================================================

mod update_immutability {
    use super::*;

    #[tokio::test]
    async fn test_owner_reference_is_immutable_for_non_admins() {
        let clinic = seeded_clinic().await;
        let novak = as_patient(&clinic.novak);
        let policy = clinic
            .service
            .create_insurance(&novak, new_insurance(clinic.novak.id))
            .await
            .unwrap();

        // Novak tries to hand the policy to Ortiz.
        let err = clinic
            .service
            .update_insurance(&novak, policy.id, new_insurance(clinic.ortiz.id))
            .await
            .unwrap_err();
        match err {
            ClinicError::Denied(denied) => {
                assert!(denied.reason.contains("cannot be changed"));
            }
            other => panic!("expected Denied, got {other:?}"),
        }

        // Non-owner fields update fine.
        let mut renamed = new_insurance(clinic.novak.id);
        renamed.provider = "Borealis Health".to_string();
        let updated = clinic
            .service
            .update_insurance(&novak, policy.id, renamed)
            .await
            .unwrap();
        assert_eq!(updated.provider, "Borealis Health");
        assert_eq!(updated.id, policy.id);
    }

    #[tokio::test]
    async fn test_admin_may_move_a_record_between_owners() {
        let clinic = seeded_clinic().await;
        let policy = clinic
            .service
            .store()
            .create_insurance(new_insurance(clinic.novak.id))
            .await
            .unwrap();

        let moved = clinic
            .service
            .update_insurance(&admin(), policy.id, new_insurance(clinic.ortiz.id))
            .await
            .unwrap();
        assert_eq!(moved.patient, clinic.ortiz.id);
    }

    #[tokio::test]
    async fn test_doctor_cannot_rebind_their_profile_to_another_user() {
        let clinic = seeded_clinic().await;
        let ames = as_doctor(&clinic.ames);

        let mut rebound = new_doctor(999, "Ames");
        rebound.qualification = "MD, PhD".to_string();
        let err = clinic
            .service
            .update_doctor(&ames, clinic.ames.id, rebound)
            .await
            .unwrap_err();
        assert!(err.is_denied());

        // Same user, new details: allowed.
        let mut renamed = new_doctor(10, "Ames");
        renamed.qualification = "MD, PhD".to_string();
        let updated = clinic
            .service
            .update_doctor(&ames, clinic.ames.id, renamed)
            .await
            .unwrap();
        assert_eq!(updated.qualification, "MD, PhD");
    }

    #[tokio::test]
    async fn test_doctor_cannot_touch_a_foreign_profile() {
        let clinic = seeded_clinic().await;
        let ames = as_doctor(&clinic.ames);

        let err = clinic
            .service
            .update_doctor(&ames, clinic.bowen.id, new_doctor(11, "Bowen"))
            .await
            .unwrap_err();
        assert!(err.is_denied());
    }
}

// =============================================================================
// 4. Department Administration
// =============================================================================

mod departments {
    use super::*;
    use polyclinic::records::NewDepartment;

    fn cardiology() -> NewDepartment {
        NewDepartment {
            name: "Cardiology".to_string(),
            description: "Heart and vascular care".to_string(),
        }
    }

    #[tokio::test]
    async fn test_writes_are_admin_only_reads_are_public() {
        let clinic = seeded_clinic().await;

        let err = clinic
            .service
            .create_department(&as_doctor(&clinic.ames), cardiology())
            .await
            .unwrap_err();
        assert!(err.is_denied());

        let department = clinic
            .service
            .create_department(&admin(), cardiology())
            .await
            .unwrap();

        // Anyone can read it back, even unauthenticated.
        let listed = clinic
            .service
            .list_departments(&Authn::Anonymous)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, department.id);
    }

    #[tokio::test]
    async fn test_delete_of_missing_department_is_not_found() {
        let clinic = seeded_clinic().await;
        let err = clinic.service.delete_department(&admin(), 404).await.unwrap_err();
        assert!(err.is_not_found());
    }
}

// =============================================================================
// 5. Patient-Initiated Appointment Create
// =============================================================================

mod appointment_create {
    use super::*;

    fn draft_with(doctor: Option<polyclinic::DoctorId>, patient: Option<PatientId>) -> AppointmentDraft {
        AppointmentDraft {
            doctor,
            patient,
            appointment_date: "2026-04-01".to_string(),
            appointment_time: "10:00".to_string(),
            notes: String::new(),
            status: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_patient_reference_is_overridden_with_the_caller() {
        let clinic = seeded_clinic().await;
        let novak = as_patient(&clinic.novak);

        // The draft claims to book for Ortiz; the service books for Novak.
        let created = clinic
            .service
            .create_appointment(&novak, draft_with(Some(clinic.bowen.id), Some(clinic.ortiz.id)))
            .await
            .unwrap();
        assert_eq!(created.patient, clinic.novak.id);
        assert_eq!(created.doctor, clinic.bowen.id);
    }

    #[tokio::test]
    async fn test_admin_books_the_draft_verbatim() {
        let clinic = seeded_clinic().await;

        let created = clinic
            .service
            .create_appointment(&admin(), draft_with(Some(clinic.bowen.id), Some(clinic.ortiz.id)))
            .await
            .unwrap();
        assert_eq!(created.patient, clinic.ortiz.id);

        // Without a patient reference there is nothing to book.
        let err = clinic
            .service
            .create_appointment(&admin(), draft_with(Some(clinic.bowen.id), None))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_draft_without_doctor_reference_is_missing() {
        let clinic = seeded_clinic().await;
        let err = clinic
            .service
            .create_appointment(&as_patient(&clinic.novak), draft_with(None, None))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

// =============================================================================
// 6. Error Plumbing
// =============================================================================

mod errors {
    use super::*;

    #[tokio::test]
    async fn test_anonymous_writes_ask_for_authentication() {
        let clinic = seeded_clinic().await;
        let err = clinic
            .service
            .create_patient(&Authn::Anonymous, new_patient(5, "Ghost"))
            .await
            .unwrap_err();
        assert!(err.is_unauthenticated());
        assert!(!err.is_denied());
    }

    #[test]
    fn test_store_errors_surface_with_their_cause() {
        let backend = StoreError::Backend(anyhow::anyhow!("connection reset by peer"));
        let err = ClinicError::from(backend);
        assert!(err.to_string().contains("connection reset by peer"));
        assert!(!err.is_denied() && !err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_of_missing_record_is_not_found_before_any_check() {
        let clinic = seeded_clinic().await;
        let err = clinic
            .service
            .update_insurance(&admin(), 9999, new_insurance(clinic.novak.id))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
