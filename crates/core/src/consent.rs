//! Consent grants and their verification.
//!
//! A [`ConsentGrant`] records a patient's authorization for one purpose.
//! Grants are append/mutate-only: withdrawal stamps `withdrawn_at` and clears
//! `active`, but grants are never physically deleted, so the consent table
//! remains usable as evidence.
//!
//! Verification reports denial through [`ConsentVerification`] rather than an
//! error: absent consent is an expected business outcome, not an exceptional
//! condition.

use chrono::{DateTime, Utc};
use pdg_types::Purpose;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Justification recorded when emergency access proceeds without a consent
/// lookup. Emergencies must never be blocked by missing paperwork; the
/// bypass is a deliberate policy exception and is still audited.
pub const EMERGENCY_ACCESS_JUSTIFICATION: &str =
    "Emergency access permitted under PIPA BC Section 18";

/// A patient's recorded authorization for one purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentGrant {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub purpose: Purpose,
    /// Who authorized the grant (free text, e.g. the patient or a guardian).
    pub granted_by: String,
    pub granted_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub withdrawn_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl ConsentGrant {
    /// Whether this grant authorizes access at `now`.
    ///
    /// A grant is valid iff it is active, has not been withdrawn, and has not
    /// passed its expiry (if any).
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.active
            && self.withdrawn_at.is_none()
            && self.expires_at.map_or(true, |expires_at| expires_at >= now)
    }
}

/// Why consent verification rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentDenialReason {
    /// No active grant exists for the (patient, purpose) pair.
    NotFound,
    /// A grant exists but has been withdrawn.
    Withdrawn,
    /// A grant exists but its expiry has passed.
    Expired,
}

impl fmt::Display for ConsentDenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConsentDenialReason::NotFound => "No active consent found for this purpose",
            ConsentDenialReason::Withdrawn => "Consent has been withdrawn",
            ConsentDenialReason::Expired => "Consent has expired",
        };
        f.write_str(text)
    }
}

/// Outcome of consent verification.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsentVerification {
    /// A valid grant covers the request.
    Granted {
        consent_id: Uuid,
        expires_at: Option<DateTime<Utc>>,
    },
    /// Emergency purpose: access permitted without a grant lookup.
    EmergencyOverride { justification: &'static str },
    /// No valid grant covers the request.
    Denied { reason: ConsentDenialReason },
}

impl ConsentVerification {
    pub fn is_valid(&self) -> bool {
        !matches!(self, ConsentVerification::Denied { .. })
    }

    /// Identifier of the covering grant, when one was found.
    pub fn consent_id(&self) -> Option<Uuid> {
        match self {
            ConsentVerification::Granted { consent_id, .. } => Some(*consent_id),
            _ => None,
        }
    }

    /// Expiry of the covering grant, when one was found and bounded.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ConsentVerification::Granted { expires_at, .. } => *expires_at,
            _ => None,
        }
    }
}

/// Evaluates the most relevant grant retrieved from storage.
///
/// The withdrawal check runs even though withdrawal also clears `active`:
/// a withdrawn grant must never validate, whatever its `active` flag says.
pub(crate) fn evaluate_grant(
    grant: Option<ConsentGrant>,
    now: DateTime<Utc>,
) -> ConsentVerification {
    let Some(grant) = grant else {
        return ConsentVerification::Denied {
            reason: ConsentDenialReason::NotFound,
        };
    };

    if grant.withdrawn_at.is_some() {
        return ConsentVerification::Denied {
            reason: ConsentDenialReason::Withdrawn,
        };
    }

    // A deactivated grant without a withdrawal stamp is treated as absent.
    if !grant.active {
        return ConsentVerification::Denied {
            reason: ConsentDenialReason::NotFound,
        };
    }

    if let Some(expires_at) = grant.expires_at {
        if expires_at < now {
            return ConsentVerification::Denied {
                reason: ConsentDenialReason::Expired,
            };
        }
    }

    ConsentVerification::Granted {
        consent_id: grant.id,
        expires_at: grant.expires_at,
    }
}
