//! Patient record model.
//!
//! The record store owns patient records; the core only reads and redacts
//! them. The sensitive fields here (government identifier, health card
//! number, clinical entries, insurance details) are exactly the ones the
//! disclosure filter is responsible for withholding.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// A patient's structured name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientName {
    /// Given names, in order.
    pub given: Vec<String>,
    /// Family name.
    pub family: String,
}

/// The full patient record as held by the record store.
///
/// Clinical entries (`medical_history`, `medications`, `allergies`,
/// `insurance_info`, `emergency_contacts`) are carried as opaque JSON values;
/// the core discloses or withholds them whole and never inspects their
/// contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub name: PatientName,
    pub date_of_birth: NaiveDate,
    pub social_insurance_number: Option<String>,
    pub health_card_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub medical_history: Option<Value>,
    pub medications: Option<Value>,
    pub allergies: Option<Value>,
    pub insurance_info: Option<Value>,
    pub emergency_contacts: Option<Value>,
}

impl Patient {
    /// Initials derived from the first given name and the family name.
    pub fn initials(&self) -> String {
        let given = self.name.given.first().and_then(|g| g.chars().next());
        let family = self.name.family.chars().next();
        given.into_iter().chain(family).collect()
    }
}

/// Minimal identity-verification view of a patient.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub initials: String,
    #[schema(value_type = String)]
    pub date_of_birth: NaiveDate,
}

impl PatientSummary {
    /// Field names a summary disclosure touches, for audit recording.
    pub const FIELDS: [&'static str; 3] = ["id", "initials", "dateOfBirth"];

    pub fn of(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            initials: patient.initials(),
            date_of_birth: patient.date_of_birth,
        }
    }
}

/// A disclosable field of the patient record.
///
/// Closed enumeration: the disclosure filter copies fields through an
/// explicit match on these variants, so no field outside this set can reach
/// a filtered record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PatientField {
    Name,
    DateOfBirth,
    SocialInsuranceNumber,
    HealthCardNumber,
    Address,
    City,
    Province,
    PostalCode,
    PhoneNumber,
    Email,
    MedicalHistory,
    Medications,
    Allergies,
    InsuranceInfo,
    EmergencyContacts,
}

impl PatientField {
    /// Wire name of the field, as recorded in audit `fieldsAccessed` lists.
    pub fn name(&self) -> &'static str {
        match self {
            PatientField::Name => "name",
            PatientField::DateOfBirth => "dateOfBirth",
            PatientField::SocialInsuranceNumber => "socialInsuranceNumber",
            PatientField::HealthCardNumber => "healthCardNumber",
            PatientField::Address => "address",
            PatientField::City => "city",
            PatientField::Province => "province",
            PatientField::PostalCode => "postalCode",
            PatientField::PhoneNumber => "phoneNumber",
            PatientField::Email => "email",
            PatientField::MedicalHistory => "medicalHistory",
            PatientField::Medications => "medications",
            PatientField::Allergies => "allergies",
            PatientField::InsuranceInfo => "insuranceInfo",
            PatientField::EmergencyContacts => "emergencyContacts",
        }
    }
}
