//! Patient-side records
//!
//! Patient profiles and the records hanging off them: insurance policies
//! and the medical history. All of these are patient-owned; doctors gain
//! read access only through a treating relationship.

use crate::authz::{Resource, ResourceRef};
use crate::principal::{PatientId, UserId};
use serde::{Deserialize, Serialize};

/// A patient's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub user: UserId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub medical_history: String,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Resource for Patient {
    fn resource_ref(&self) -> ResourceRef {
        ResourceRef::Patient { id: self.id }
    }
}

/// Payload for creating or replacing a patient profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub user: UserId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub medical_history: String,
}

/// An insurance policy held by a patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insurance {
    pub id: u64,
    pub patient: PatientId,
    pub provider: String,
    pub policy_number: String,
    pub expiration_date: String,
}

impl Resource for Insurance {
    fn resource_ref(&self) -> ResourceRef {
        ResourceRef::Insurance {
            patient: self.patient,
        }
    }
}

/// Payload for creating or replacing an insurance policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInsurance {
    pub patient: PatientId,
    pub provider: String,
    pub policy_number: String,
    pub expiration_date: String,
}

/// One entry in a patient's medical record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: u64,
    pub patient: PatientId,
    pub date: String,
    pub diagnosis: String,
    pub treatment: String,
    #[serde(default)]
    pub follow_up_date: Option<String>,
}

impl Resource for MedicalRecord {
    fn resource_ref(&self) -> ResourceRef {
        ResourceRef::MedicalRecord {
            patient: self.patient,
        }
    }
}

/// Payload for creating or replacing a medical record entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMedicalRecord {
    pub patient: PatientId,
    pub date: String,
    pub diagnosis: String,
    pub treatment: String,
    #[serde(default)]
    pub follow_up_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let patient = Patient {
            id: PatientId(7),
            user: UserId(70),
            first_name: "Luis".into(),
            last_name: "Mora".into(),
            date_of_birth: "1990-02-11".into(),
            contact_number: "555-0200".into(),
            email: "luis@example.com".into(),
            address: "2 Elm St".into(),
            medical_history: String::new(),
        };
        assert_eq!(patient.full_name(), "Luis Mora");
        assert_eq!(patient.resource_ref(), ResourceRef::Patient { id: PatientId(7) });
    }

    #[test]
    fn test_owner_refs() {
        let insurance = Insurance {
            id: 1,
            patient: PatientId(7),
            provider: "Acme Health".into(),
            policy_number: "P-100".into(),
            expiration_date: "2027-01-01".into(),
        };
        assert_eq!(
            insurance.resource_ref(),
            ResourceRef::Insurance { patient: PatientId(7) }
        );

        let record: MedicalRecord = serde_json::from_value(serde_json::json!({
            "id": 2,
            "patient": 7,
            "date": "2026-03-01",
            "diagnosis": "flu",
            "treatment": "rest"
        }))
        .unwrap();
        assert_eq!(record.follow_up_date, None);
        assert_eq!(
            record.resource_ref(),
            ResourceRef::MedicalRecord { patient: PatientId(7) }
        );
    }
}
