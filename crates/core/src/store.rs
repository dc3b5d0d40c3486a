//! Record-store port and the in-memory adapter.
//!
//! The datastore is an external collaborator: the core delegates consistency
//! (read-after-write for consent grants, append-durability for audit
//! entries) to whatever sits behind [`RecordStore`]. Storage failures are
//! never retried here; they propagate to the caller.

use crate::audit::AuditEntry;
use crate::consent::ConsentGrant;
use crate::patient::Patient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pdg_types::Purpose;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Error from the record-store collaborator.
#[derive(Debug, Clone, thiserror::Error)]
#[error("record store failure: {0}")]
pub struct StorageError(pub String);

/// Port for the external datastore.
///
/// Implementations must be safe to share across concurrent requests; the
/// pipeline holds the store behind an `Arc` and performs at most one read
/// and one append per request.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point lookup of a patient record.
    async fn find_patient(&self, patient_id: Uuid) -> Result<Option<Patient>, StorageError>;

    /// The most recently granted *active* consent for `(patient, purpose)`.
    async fn find_active_consent(
        &self,
        patient_id: Uuid,
        purpose: Purpose,
    ) -> Result<Option<ConsentGrant>, StorageError>;

    /// Point lookup of a consent grant by identifier.
    async fn find_consent(&self, consent_id: Uuid) -> Result<Option<ConsentGrant>, StorageError>;

    /// Stores a new consent grant.
    async fn insert_consent(&self, grant: ConsentGrant) -> Result<(), StorageError>;

    /// Stamps a grant withdrawn and clears its active flag, returning the
    /// updated grant, or `None` if no such grant exists. Grants are never
    /// physically deleted.
    async fn mark_consent_withdrawn(
        &self,
        consent_id: Uuid,
        withdrawn_at: DateTime<Utc>,
    ) -> Result<Option<ConsentGrant>, StorageError>;

    /// Appends one audit entry.
    async fn append_audit(&self, entry: AuditEntry) -> Result<(), StorageError>;
}

#[derive(Default)]
struct MemoryInner {
    patients: HashMap<Uuid, Patient>,
    consents: HashMap<Uuid, ConsentGrant>,
    audit_log: Vec<AuditEntry>,
}

/// In-memory record store backing tests and the demo server.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_inner(&self) -> Result<RwLockReadGuard<'_, MemoryInner>, StorageError> {
        self.inner
            .read()
            .map_err(|_| StorageError("memory store lock poisoned".to_string()))
    }

    fn write_inner(&self) -> Result<RwLockWriteGuard<'_, MemoryInner>, StorageError> {
        self.inner
            .write()
            .map_err(|_| StorageError("memory store lock poisoned".to_string()))
    }

    /// Seeds a patient record. The core itself never writes patients; this
    /// exists for demo and test setup.
    pub fn insert_patient(&self, patient: Patient) -> Result<(), StorageError> {
        self.write_inner()?.patients.insert(patient.id, patient);
        Ok(())
    }

    /// Snapshot of the audit log, oldest entry first.
    pub fn audit_entries(&self) -> Result<Vec<AuditEntry>, StorageError> {
        Ok(self.read_inner()?.audit_log.clone())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_patient(&self, patient_id: Uuid) -> Result<Option<Patient>, StorageError> {
        Ok(self.read_inner()?.patients.get(&patient_id).cloned())
    }

    async fn find_active_consent(
        &self,
        patient_id: Uuid,
        purpose: Purpose,
    ) -> Result<Option<ConsentGrant>, StorageError> {
        let inner = self.read_inner()?;
        let grant = inner
            .consents
            .values()
            .filter(|grant| {
                grant.patient_id == patient_id && grant.purpose == purpose && grant.active
            })
            .max_by_key(|grant| grant.granted_at)
            .cloned();
        Ok(grant)
    }

    async fn find_consent(&self, consent_id: Uuid) -> Result<Option<ConsentGrant>, StorageError> {
        Ok(self.read_inner()?.consents.get(&consent_id).cloned())
    }

    async fn insert_consent(&self, grant: ConsentGrant) -> Result<(), StorageError> {
        self.write_inner()?.consents.insert(grant.id, grant);
        Ok(())
    }

    async fn mark_consent_withdrawn(
        &self,
        consent_id: Uuid,
        withdrawn_at: DateTime<Utc>,
    ) -> Result<Option<ConsentGrant>, StorageError> {
        let mut inner = self.write_inner()?;
        let Some(grant) = inner.consents.get_mut(&consent_id) else {
            return Ok(None);
        };
        grant.withdrawn_at = Some(withdrawn_at);
        grant.active = false;
        Ok(Some(grant.clone()))
    }

    async fn append_audit(&self, entry: AuditEntry) -> Result<(), StorageError> {
        self.write_inner()?.audit_log.push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn grant_for(patient_id: Uuid, purpose: Purpose, granted_at: DateTime<Utc>) -> ConsentGrant {
        ConsentGrant {
            id: Uuid::new_v4(),
            patient_id,
            purpose,
            granted_by: "John Doe".to_string(),
            granted_at,
            expires_at: None,
            withdrawn_at: None,
            active: true,
        }
    }

    #[tokio::test]
    async fn active_consent_lookup_prefers_most_recent_grant() {
        let store = MemoryStore::new();
        let patient_id = Uuid::new_v4();
        let now = Utc::now();

        let older = grant_for(patient_id, Purpose::Treatment, now - Duration::days(10));
        let newer = grant_for(patient_id, Purpose::Treatment, now - Duration::days(1));
        store.insert_consent(older).await.expect("insert");
        store.insert_consent(newer.clone()).await.expect("insert");

        let found = store
            .find_active_consent(patient_id, Purpose::Treatment)
            .await
            .expect("lookup")
            .expect("grant present");
        assert_eq!(found.id, newer.id);
    }

    #[tokio::test]
    async fn active_consent_lookup_skips_inactive_and_other_purposes() {
        let store = MemoryStore::new();
        let patient_id = Uuid::new_v4();
        let now = Utc::now();

        let mut inactive = grant_for(patient_id, Purpose::Treatment, now);
        inactive.active = false;
        store.insert_consent(inactive).await.expect("insert");
        store
            .insert_consent(grant_for(patient_id, Purpose::Billing, now))
            .await
            .expect("insert");

        let found = store
            .find_active_consent(patient_id, Purpose::Treatment)
            .await
            .expect("lookup");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn withdrawal_stamps_and_deactivates_without_deleting() {
        let store = MemoryStore::new();
        let patient_id = Uuid::new_v4();
        let grant = grant_for(patient_id, Purpose::Treatment, Utc::now());
        let consent_id = grant.id;
        store.insert_consent(grant).await.expect("insert");

        let withdrawn_at = Utc::now();
        let updated = store
            .mark_consent_withdrawn(consent_id, withdrawn_at)
            .await
            .expect("withdraw")
            .expect("grant present");
        assert!(!updated.active);
        assert_eq!(updated.withdrawn_at, Some(withdrawn_at));

        // Still present for point lookup: grants are evidence, not ephemera.
        let found = store
            .find_consent(consent_id)
            .await
            .expect("lookup")
            .expect("grant retained");
        assert!(!found.active);
    }

    #[tokio::test]
    async fn withdrawing_unknown_grant_returns_none() {
        let store = MemoryStore::new();
        let updated = store
            .mark_consent_withdrawn(Uuid::new_v4(), Utc::now())
            .await
            .expect("withdraw");
        assert!(updated.is_none());
    }
}
