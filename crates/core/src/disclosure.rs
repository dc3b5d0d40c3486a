//! Purpose- and role-scoped field disclosure.
//!
//! Data minimization: a caller receives only the fields the policy allows
//! for the stated purpose and the caller's role, never the full record.
//! Copying is an explicit per-field `match` over [`PatientField`] with no
//! reflective enumeration, so a field the policy does not name cannot reach
//! the output object.

use crate::patient::{Patient, PatientField, PatientName};
use crate::policy::DisclosurePolicy;
use chrono::NaiveDate;
use pdg_types::{Purpose, Role};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// A patient record reduced to the fields permitted for one (purpose, role).
///
/// Withheld fields are `None` and are omitted from serialized output
/// entirely, so a response never even names what was redacted.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisclosedPatient {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<PatientName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_insurance_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub medical_history: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub medications: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub allergies: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub insurance_info: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub emergency_contacts: Option<Value>,
}

impl DisclosedPatient {
    /// A fully redacted view: identifier only.
    fn redacted(id: Uuid) -> Self {
        Self {
            id,
            name: None,
            date_of_birth: None,
            social_insurance_number: None,
            health_card_number: None,
            address: None,
            city: None,
            province: None,
            postal_code: None,
            phone_number: None,
            email: None,
            medical_history: None,
            medications: None,
            allergies: None,
            insurance_info: None,
            emergency_contacts: None,
        }
    }
}

/// Result of the disclosure filter.
///
/// `accessed_fields` is the exact list of field names copied into `patient`
/// (the identifier first), consumed verbatim by the audit recorder. Names
/// only, never values.
#[derive(Debug, Clone)]
pub struct Disclosure {
    pub patient: DisclosedPatient,
    pub accessed_fields: Vec<&'static str>,
}

/// Computes the disclosable subset of `patient` for `(purpose, role)`.
///
/// Pure and deterministic: identical inputs always yield identical output.
/// The bare identifier is always disclosed and always listed first in
/// `accessed_fields`; a role with no allowance for the purpose receives the
/// identifier alone.
pub fn filter_fields(
    patient: &Patient,
    purpose: Purpose,
    role: Role,
    policy: &DisclosurePolicy,
) -> Disclosure {
    let mut disclosed = DisclosedPatient::redacted(patient.id);
    let mut accessed_fields = vec!["id"];

    for field in policy.allowed_fields(purpose, role) {
        match field {
            PatientField::Name => disclosed.name = Some(patient.name.clone()),
            PatientField::DateOfBirth => disclosed.date_of_birth = Some(patient.date_of_birth),
            PatientField::SocialInsuranceNumber => {
                disclosed.social_insurance_number = patient.social_insurance_number.clone();
            }
            PatientField::HealthCardNumber => {
                disclosed.health_card_number = patient.health_card_number.clone();
            }
            PatientField::Address => disclosed.address = patient.address.clone(),
            PatientField::City => disclosed.city = patient.city.clone(),
            PatientField::Province => disclosed.province = patient.province.clone(),
            PatientField::PostalCode => disclosed.postal_code = patient.postal_code.clone(),
            PatientField::PhoneNumber => disclosed.phone_number = patient.phone_number.clone(),
            PatientField::Email => disclosed.email = patient.email.clone(),
            PatientField::MedicalHistory => {
                disclosed.medical_history = patient.medical_history.clone();
            }
            PatientField::Medications => disclosed.medications = patient.medications.clone(),
            PatientField::Allergies => disclosed.allergies = patient.allergies.clone(),
            PatientField::InsuranceInfo => {
                disclosed.insurance_info = patient.insurance_info.clone();
            }
            PatientField::EmergencyContacts => {
                disclosed.emergency_contacts = patient.emergency_contacts.clone();
            }
        }
        accessed_fields.push(field.name());
    }

    Disclosure {
        patient: disclosed,
        accessed_fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn full_patient() -> Patient {
        Patient {
            id: Uuid::new_v4(),
            name: PatientName {
                given: vec!["John".to_string()],
                family: "Doe".to_string(),
            },
            date_of_birth: "1985-03-15".parse().expect("valid date"),
            social_insurance_number: Some("123-456-789".to_string()),
            health_card_number: Some("9876543210".to_string()),
            address: Some("123 Main Street".to_string()),
            city: Some("Vancouver".to_string()),
            province: Some("BC".to_string()),
            postal_code: Some("V6B 1A1".to_string()),
            phone_number: Some("604-555-0100".to_string()),
            email: Some("john.doe@example.com".to_string()),
            medical_history: Some(json!([{ "condition": "Hypertension", "diagnosedYear": 2020 }])),
            medications: Some(json!([{ "name": "Lisinopril", "dosage": "10mg" }])),
            allergies: Some(json!(["Penicillin"])),
            insurance_info: Some(json!({ "provider": "Pacific Blue Cross" })),
            emergency_contacts: Some(json!([{ "name": "Jane Doe", "relationship": "Spouse" }])),
        }
    }

    fn serialized_keys(patient: &DisclosedPatient) -> BTreeSet<String> {
        serde_json::to_value(patient)
            .expect("serialize")
            .as_object()
            .expect("object")
            .keys()
            .cloned()
            .collect()
    }

    #[test]
    fn physician_treatment_discloses_documented_fields() {
        let patient = full_patient();
        let policy = DisclosurePolicy::default();

        let disclosure = filter_fields(&patient, Purpose::Treatment, Role::Physician, &policy);

        assert_eq!(
            disclosure.accessed_fields,
            vec![
                "id",
                "name",
                "dateOfBirth",
                "medicalHistory",
                "medications",
                "allergies",
                "healthCardNumber",
            ]
        );
        assert_eq!(disclosure.accessed_fields.len(), 7);
        assert_eq!(
            disclosure.patient.health_card_number,
            patient.health_card_number
        );
        assert!(disclosure.patient.social_insurance_number.is_none());
        assert!(disclosure.patient.address.is_none());
    }

    #[test]
    fn nurse_treatment_excludes_health_card_number() {
        let patient = full_patient();
        let policy = DisclosurePolicy::default();

        let disclosure = filter_fields(&patient, Purpose::Treatment, Role::Nurse, &policy);

        assert!(disclosure.patient.health_card_number.is_none());
        assert!(!disclosure.accessed_fields.contains(&"healthCardNumber"));
        assert_eq!(disclosure.patient.medications, patient.medications);
    }

    #[test]
    fn billing_purpose_discloses_contact_and_insurance_fields() {
        let patient = full_patient();
        let policy = DisclosurePolicy::default();

        for role in [Role::Billing, Role::Admin] {
            let disclosure = filter_fields(&patient, Purpose::Billing, role, &policy);
            assert_eq!(
                disclosure.accessed_fields,
                vec![
                    "id",
                    "name",
                    "address",
                    "city",
                    "province",
                    "postalCode",
                    "phoneNumber",
                    "email",
                    "insuranceInfo",
                ]
            );
            assert!(disclosure.patient.medical_history.is_none());
        }
    }

    #[test]
    fn referral_is_physician_only() {
        let patient = full_patient();
        let policy = DisclosurePolicy::default();

        let physician = filter_fields(&patient, Purpose::Referral, Role::Physician, &policy);
        assert_eq!(
            physician.accessed_fields,
            vec!["id", "name", "dateOfBirth", "healthCardNumber", "medicalHistory"]
        );

        let nurse = filter_fields(&patient, Purpose::Referral, Role::Nurse, &policy);
        assert_eq!(nurse.accessed_fields, vec!["id"]);
        assert_eq!(serialized_keys(&nurse.patient), BTreeSet::from(["id".to_string()]));
    }

    #[test]
    fn emergency_gives_nurse_medications_but_not_receptionist() {
        let patient = full_patient();
        let policy = DisclosurePolicy::default();

        let nurse = filter_fields(&patient, Purpose::Emergency, Role::Nurse, &policy);
        assert_eq!(
            nurse.accessed_fields,
            vec![
                "id",
                "name",
                "dateOfBirth",
                "allergies",
                "emergencyContacts",
                "medications",
            ]
        );
        assert_eq!(nurse.patient.medications, patient.medications);

        let receptionist = filter_fields(&patient, Purpose::Emergency, Role::Receptionist, &policy);
        assert!(receptionist.patient.medications.is_none());
        assert_eq!(
            receptionist.patient.emergency_contacts,
            patient.emergency_contacts
        );
    }

    #[test]
    fn research_discloses_only_birth_date() {
        let patient = full_patient();
        let policy = DisclosurePolicy::default();

        let disclosure = filter_fields(&patient, Purpose::Research, Role::Admin, &policy);
        assert_eq!(disclosure.accessed_fields, vec!["id", "dateOfBirth"]);
        assert_eq!(
            serialized_keys(&disclosure.patient),
            BTreeSet::from(["id".to_string(), "dateOfBirth".to_string()])
        );
    }

    #[test]
    fn role_without_allowance_receives_identifier_only() {
        let patient = full_patient();
        let policy = DisclosurePolicy::default();

        let disclosure = filter_fields(&patient, Purpose::Treatment, Role::Billing, &policy);
        assert_eq!(disclosure.accessed_fields, vec!["id"]);
        assert_eq!(disclosure.patient.id, patient.id);
        assert!(disclosure.patient.name.is_none());
    }

    #[test]
    fn serialized_keys_match_accessed_fields_for_every_pair() {
        let patient = full_patient();
        let policy = DisclosurePolicy::default();

        for role in Role::ALL {
            for purpose in Purpose::ALL {
                let disclosure = filter_fields(&patient, purpose, role, &policy);

                let expected: BTreeSet<String> = disclosure
                    .accessed_fields
                    .iter()
                    .map(|f| f.to_string())
                    .collect();
                assert_eq!(
                    serialized_keys(&disclosure.patient),
                    expected,
                    "({role}, {purpose})"
                );
            }
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let patient = full_patient();
        let policy = DisclosurePolicy::default();

        for role in Role::ALL {
            for purpose in Purpose::ALL {
                let first = filter_fields(&patient, purpose, role, &policy);
                let second = filter_fields(&patient, purpose, role, &policy);
                assert_eq!(first.patient, second.patient);
                assert_eq!(first.accessed_fields, second.accessed_fields);
            }
        }
    }
}
