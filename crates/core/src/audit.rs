//! Append-only audit trail types and the PHI-value tripwire.
//!
//! Audit entries record who accessed what resource, for which purpose, and
//! which field *names* were disclosed. They must never contain patient field
//! values; the tripwire in [`contains_value_shaped_fields`] is a last-resort
//! heuristic against a future caller passing values where names belong.

use crate::actor::Actor;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

/// What an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    PatientAccess,
    PatientUpdate,
    AccessDenied,
    ConsentGranted,
    ConsentWithdrawn,
}

/// The kind of resource an audit entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Patient,
    PatientSummary,
    Consent,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Patient => "patient",
            ResourceType::PatientSummary => "patient_summary",
            ResourceType::Consent => "consent",
        }
    }
}

/// Caller metadata recorded alongside audit entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    pub ip_address: String,
    pub user_agent: String,
}

impl RequestMetadata {
    /// Metadata placeholder for callers without request context.
    pub fn unknown() -> Self {
        Self {
            ip_address: "unknown".to_string(),
            user_agent: "unknown".to_string(),
        }
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::unknown()
    }
}

/// One immutable record of an access attempt.
///
/// `resource_id` identifies the record, never its contents;
/// `fields_accessed` carries field names only. Entries are created exactly
/// once per pipeline invocation and never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub action: AuditAction,
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub actor_id: String,
    pub purpose: Option<String>,
    pub fields_accessed: Vec<String>,
    pub ip_address: String,
    pub user_agent: String,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Creates an entry stamped with a fresh identifier and the current time.
    pub fn new(
        action: AuditAction,
        resource_type: ResourceType,
        resource_id: impl Into<String>,
        actor: &Actor,
        purpose: Option<String>,
        fields_accessed: Vec<String>,
        metadata: &RequestMetadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            resource_type,
            resource_id: resource_id.into(),
            actor_id: actor.id.clone(),
            purpose,
            fields_accessed,
            ip_address: metadata.ip_address.clone(),
            user_agent: metadata.user_agent.clone(),
            recorded_at: Utc::now(),
        }
    }
}

static VALUE_SHAPE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // SIN-like triplets
        Regex::new(r"\d{3}-\d{3}-\d{3}").expect("static pattern compiles"),
        // bare 10-digit runs (health card or phone numbers)
        Regex::new(r"\d{10}").expect("static pattern compiles"),
        // email-like strings
        Regex::new(r"@.*\.(com|ca|org)").expect("static pattern compiles"),
    ]
});

/// Scans a field-name list for value-shaped content.
///
/// Matches SIN-like triplets, 10-digit runs, and email-like strings in the
/// JSON-serialized list. This is a best-effort heuristic, not a security
/// boundary: it cannot catch free-text values such as names or addresses.
pub fn contains_value_shaped_fields(fields: &[String]) -> bool {
    let serialized = serde_json::to_string(fields).unwrap_or_default();
    VALUE_SHAPE_PATTERNS
        .iter()
        .any(|pattern| pattern.is_match(&serialized))
}
