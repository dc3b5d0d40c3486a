//! # PDG Core
//!
//! Core access-control pipeline for the patient disclosure gateway.
//!
//! Every data-access request flows through four stages, strictly in order:
//!
//! 1. **Role-purpose authorizer** ([`policy`]): is this role permitted to
//!    ask for this purpose at all?
//! 2. **Consent verifier** ([`consent`]): does a valid, unexpired,
//!    non-withdrawn grant cover the (patient, purpose) pair?
//! 3. **Field disclosure filter** ([`disclosure`]): which exact fields may
//!    be released, and which names go on the record?
//! 4. **Audit recorder** ([`audit`]): one append-only entry per outcome,
//!    success or denial, names only, never values.
//!
//! The authorizer and filter are pure; the verifier performs one read and
//! the recorder one append against the [`store::RecordStore`] port.
//!
//! **No API concerns**: authentication and HTTP serving belong in
//! `api-rest`; the core trusts the [`Actor`] it is handed.

pub mod actor;
pub mod audit;
pub mod consent;
pub mod disclosure;
pub mod error;
pub mod patient;
pub mod policy;
pub mod service;
pub mod store;

pub use actor::Actor;
pub use audit::{AuditAction, AuditEntry, RequestMetadata, ResourceType};
pub use consent::{
    ConsentDenialReason, ConsentGrant, ConsentVerification, EMERGENCY_ACCESS_JUSTIFICATION,
};
pub use disclosure::{filter_fields, DisclosedPatient, Disclosure};
pub use error::{DisclosureError, DisclosureResult};
pub use patient::{Patient, PatientField, PatientName, PatientSummary};
pub use policy::{DisclosurePolicy, FieldRule};
pub use service::{AccessGrant, ConsentReceipt, DisclosureService};
pub use store::{MemoryStore, RecordStore, StorageError};

// Re-export the shared vocabulary so callers need only one dependency.
pub use pdg_types::{NonEmptyText, Purpose, Role};
