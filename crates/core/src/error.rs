//! Error taxonomy for disclosure operations.

use crate::consent::ConsentDenialReason;
use crate::store::StorageError;
use pdg_types::{Purpose, Role};

/// Errors surfaced by the disclosure pipeline.
///
/// The two denial variants are recoverable business outcomes (403
/// equivalents) and are always audited as `ACCESS_DENIED` before being
/// returned. Storage failures are fatal to the request and never retried
/// here; retries belong to the storage collaborator.
#[derive(Debug, thiserror::Error)]
pub enum DisclosureError {
    #[error("role '{role}' does not permit access for purpose '{purpose}'")]
    AuthorizationDenied { role: Role, purpose: Purpose },

    #[error("consent verification failed: {0}")]
    ConsentDenied(ConsentDenialReason),

    #[error("patient not found")]
    PatientNotFound,

    #[error("consent record not found")]
    ConsentNotFound,

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The access may already have happened but its trail could not be
    /// written. Callers must surface this distinctly: a silently lost audit
    /// entry is a compliance failure.
    #[error("failed to record audit entry: {0}")]
    AuditUnrecorded(#[source] StorageError),
}

pub type DisclosureResult<T> = std::result::Result<T, DisclosureError>;
