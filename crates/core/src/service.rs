//! The disclosure pipeline: authorize, verify consent, filter, audit.
//!
//! [`DisclosureService`] is the single entry point for callers (an HTTP
//! layer, a job runner). Stages run strictly in order and short-circuit on
//! denial; every terminal outcome writes exactly one audit entry before
//! returning, except a missing patient, where no PHI was touched.

use crate::actor::Actor;
use crate::audit::{AuditAction, AuditEntry, RequestMetadata, ResourceType};
use crate::consent::{evaluate_grant, ConsentGrant, ConsentVerification, EMERGENCY_ACCESS_JUSTIFICATION};
use crate::disclosure::{filter_fields, DisclosedPatient};
use crate::error::{DisclosureError, DisclosureResult};
use crate::patient::PatientSummary;
use crate::policy::DisclosurePolicy;
use crate::store::{RecordStore, StorageError};
use chrono::{DateTime, Utc};
use pdg_types::{NonEmptyText, Purpose};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Consent metadata returned with a successful access, for caller display.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsentReceipt {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub consent_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&ConsentVerification> for ConsentReceipt {
    fn from(verification: &ConsentVerification) -> Self {
        Self {
            verified: verification.is_valid(),
            consent_id: verification.consent_id(),
            expires_at: verification.expires_at(),
        }
    }
}

/// Successful outcome of an access request.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccessGrant {
    pub patient: DisclosedPatient,
    pub consent: ConsentReceipt,
}

/// Entry point for every disclosure operation.
///
/// Holds the record-store port and the immutable policy tables. Cloning is
/// cheap; requests run independently with no shared mutable state beyond the
/// store itself.
#[derive(Clone)]
pub struct DisclosureService {
    store: Arc<dyn RecordStore>,
    policy: Arc<DisclosurePolicy>,
}

impl DisclosureService {
    /// Service with the standard policy tables.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_policy(store, DisclosurePolicy::default())
    }

    /// Service with substituted policy tables.
    pub fn with_policy(store: Arc<dyn RecordStore>, policy: DisclosurePolicy) -> Self {
        Self {
            store,
            policy: Arc::new(policy),
        }
    }

    pub fn policy(&self) -> &DisclosurePolicy {
        &self.policy
    }

    /// Runs the full access pipeline for one request.
    ///
    /// Denials are audited as `ACCESS_DENIED` before the error is returned;
    /// no stage after a denial executes except the audit append.
    pub async fn request_access(
        &self,
        patient_id: Uuid,
        purpose: Purpose,
        actor: &Actor,
        metadata: &RequestMetadata,
    ) -> DisclosureResult<AccessGrant> {
        if !self.policy.authorizes(actor.role, purpose) {
            self.record_denial(patient_id, purpose, actor, metadata).await?;
            return Err(DisclosureError::AuthorizationDenied {
                role: actor.role,
                purpose,
            });
        }

        let verification = self.verify_consent(patient_id, purpose, actor).await?;
        if let ConsentVerification::Denied { reason } = &verification {
            self.record_denial(patient_id, purpose, actor, metadata).await?;
            return Err(DisclosureError::ConsentDenied(*reason));
        }

        let patient = self
            .store
            .find_patient(patient_id)
            .await?
            .ok_or(DisclosureError::PatientNotFound)?;

        let disclosure = filter_fields(&patient, purpose, actor.role, &self.policy);

        self.record_audit(AuditEntry::new(
            AuditAction::PatientAccess,
            ResourceType::Patient,
            patient_id.to_string(),
            actor,
            Some(purpose.to_string()),
            disclosure
                .accessed_fields
                .iter()
                .map(|field| field.to_string())
                .collect(),
            metadata,
        ))
        .await?;

        Ok(AccessGrant {
            patient: disclosure.patient,
            consent: ConsentReceipt::from(&verification),
        })
    }

    /// Checks whether valid consent exists for `(patient, purpose)`.
    ///
    /// The emergency purpose short-circuits before any storage lookup.
    /// Denial is reported through the returned value, never as an error.
    pub async fn verify_consent(
        &self,
        patient_id: Uuid,
        purpose: Purpose,
        actor: &Actor,
    ) -> Result<ConsentVerification, StorageError> {
        if purpose == Purpose::Emergency {
            return Ok(ConsentVerification::EmergencyOverride {
                justification: EMERGENCY_ACCESS_JUSTIFICATION,
            });
        }

        tracing::debug!(actor = %actor.id, patient = %patient_id, %purpose, "verifying consent");
        let grant = self.store.find_active_consent(patient_id, purpose).await?;
        Ok(evaluate_grant(grant, Utc::now()))
    }

    /// Records a new consent grant and audits it.
    pub async fn grant_consent(
        &self,
        patient_id: Uuid,
        purpose: Purpose,
        granted_by: NonEmptyText,
        expires_at: Option<DateTime<Utc>>,
        actor: &Actor,
        metadata: &RequestMetadata,
    ) -> DisclosureResult<Uuid> {
        if self.store.find_patient(patient_id).await?.is_none() {
            return Err(DisclosureError::PatientNotFound);
        }

        let grant = ConsentGrant {
            id: Uuid::new_v4(),
            patient_id,
            purpose,
            granted_by: granted_by.into_inner(),
            granted_at: Utc::now(),
            expires_at,
            withdrawn_at: None,
            active: true,
        };
        let consent_id = grant.id;
        self.store.insert_consent(grant).await?;

        self.record_audit(AuditEntry::new(
            AuditAction::ConsentGranted,
            ResourceType::Consent,
            consent_id.to_string(),
            actor,
            Some(purpose.to_string()),
            Vec::new(),
            metadata,
        ))
        .await?;

        Ok(consent_id)
    }

    /// Marks a grant withdrawn and audits the withdrawal.
    ///
    /// Fails with [`DisclosureError::ConsentNotFound`] when the grant does
    /// not exist or belongs to a different patient.
    pub async fn withdraw_consent(
        &self,
        patient_id: Uuid,
        consent_id: Uuid,
        actor: &Actor,
        metadata: &RequestMetadata,
    ) -> DisclosureResult<()> {
        let existing = self
            .store
            .find_consent(consent_id)
            .await?
            .filter(|grant| grant.patient_id == patient_id)
            .ok_or(DisclosureError::ConsentNotFound)?;

        self.store
            .mark_consent_withdrawn(consent_id, Utc::now())
            .await?;

        self.record_audit(AuditEntry::new(
            AuditAction::ConsentWithdrawn,
            ResourceType::Consent,
            consent_id.to_string(),
            actor,
            Some(existing.purpose.to_string()),
            Vec::new(),
            metadata,
        ))
        .await?;

        Ok(())
    }

    /// Minimal identity-verification view of a patient, audited like any
    /// other access.
    pub async fn patient_summary(
        &self,
        patient_id: Uuid,
        actor: &Actor,
        metadata: &RequestMetadata,
    ) -> DisclosureResult<PatientSummary> {
        let patient = self
            .store
            .find_patient(patient_id)
            .await?
            .ok_or(DisclosureError::PatientNotFound)?;
        let summary = PatientSummary::of(&patient);

        self.record_audit(AuditEntry::new(
            AuditAction::PatientAccess,
            ResourceType::PatientSummary,
            patient_id.to_string(),
            actor,
            Some("verification".to_string()),
            PatientSummary::FIELDS
                .iter()
                .map(|field| field.to_string())
                .collect(),
            metadata,
        ))
        .await?;

        Ok(summary)
    }

    /// Appends one audit entry, running the value-shape tripwire first.
    ///
    /// A failed append is surfaced as [`DisclosureError::AuditUnrecorded`]:
    /// the trail is the compliance record and must not be lost silently.
    pub async fn record_audit(&self, entry: AuditEntry) -> DisclosureResult<()> {
        if crate::audit::contains_value_shaped_fields(&entry.fields_accessed) {
            tracing::warn!(
                entry_id = %entry.id,
                "possible PHI value detected in audit field names"
            );
        }

        self.store.append_audit(entry).await.map_err(|error| {
            tracing::error!(%error, "audit append failed; access trail may be lost");
            DisclosureError::AuditUnrecorded(error)
        })
    }

    async fn record_denial(
        &self,
        patient_id: Uuid,
        purpose: Purpose,
        actor: &Actor,
        metadata: &RequestMetadata,
    ) -> DisclosureResult<()> {
        self.record_audit(AuditEntry::new(
            AuditAction::AccessDenied,
            ResourceType::Patient,
            patient_id.to_string(),
            actor,
            Some(purpose.to_string()),
            Vec::new(),
            metadata,
        ))
        .await
    }
}
