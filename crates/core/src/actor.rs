//! Authenticated caller identity.

use pdg_types::Role;

/// The authenticated caller of a disclosure operation.
///
/// Actors are resolved by an external authentication collaborator before the
/// core is invoked; the core trusts the value as already authenticated and
/// treats it as immutable for the duration of a request.
#[derive(Debug, Clone)]
pub struct Actor {
    /// Stable identifier of the caller, recorded in audit entries.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Contact email address.
    pub email: String,

    /// Professional role, consumed by the role-purpose authorizer.
    pub role: Role,

    /// Optional department, informational only.
    pub department: Option<String>,
}
