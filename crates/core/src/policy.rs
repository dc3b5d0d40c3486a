//! Static disclosure policy: role-purpose permissions and field allow-lists.
//!
//! Both tables are immutable values built once at process start and injected
//! into [`DisclosureService`](crate::service::DisclosureService); nothing in
//! the pipeline can change them at runtime. Tests substitute their own tables
//! through [`DisclosurePolicy::new`].

use crate::patient::PatientField;
use pdg_types::{Purpose, Role};
use std::collections::{BTreeMap, BTreeSet};

/// Field allow-list rule for one purpose.
///
/// A rule names the roles it applies to (or any authenticated role), the
/// fields every eligible role may see, and per-role extras. A role outside
/// `eligible_roles` receives only the bare identifier.
#[derive(Debug, Clone)]
pub struct FieldRule {
    eligible_roles: Option<BTreeSet<Role>>,
    base_fields: Vec<PatientField>,
    role_extras: BTreeMap<Role, Vec<PatientField>>,
}

impl FieldRule {
    /// Rule restricted to the given roles.
    pub fn for_roles(
        roles: impl IntoIterator<Item = Role>,
        base_fields: impl IntoIterator<Item = PatientField>,
    ) -> Self {
        Self {
            eligible_roles: Some(roles.into_iter().collect()),
            base_fields: base_fields.into_iter().collect(),
            role_extras: BTreeMap::new(),
        }
    }

    /// Rule applying to any authenticated role.
    pub fn for_any_role(base_fields: impl IntoIterator<Item = PatientField>) -> Self {
        Self {
            eligible_roles: None,
            base_fields: base_fields.into_iter().collect(),
            role_extras: BTreeMap::new(),
        }
    }

    /// Adds fields one role receives on top of the base list.
    pub fn with_extras(
        mut self,
        role: Role,
        extras: impl IntoIterator<Item = PatientField>,
    ) -> Self {
        self.role_extras.insert(role, extras.into_iter().collect());
        self
    }
}

/// Immutable policy tables gating every disclosure.
#[derive(Debug, Clone)]
pub struct DisclosurePolicy {
    permitted_purposes: BTreeMap<Role, BTreeSet<Purpose>>,
    field_rules: BTreeMap<Purpose, FieldRule>,
}

impl DisclosurePolicy {
    /// Builds a policy from explicit tables (test substitution point).
    pub fn new(
        permitted_purposes: BTreeMap<Role, BTreeSet<Purpose>>,
        field_rules: BTreeMap<Purpose, FieldRule>,
    ) -> Self {
        Self {
            permitted_purposes,
            field_rules,
        }
    }

    /// Whether `role` may request data for `purpose`.
    ///
    /// Pure and deterministic. Any pair absent from the permission table is
    /// denied; there is no default-allow path.
    pub fn authorizes(&self, role: Role, purpose: Purpose) -> bool {
        self.permitted_purposes
            .get(&role)
            .map_or(false, |purposes| purposes.contains(&purpose))
    }

    /// The fields `role` may see for `purpose`, in disclosure order.
    ///
    /// Returns an empty list (identifier-only disclosure) when the purpose
    /// has no rule or the role is not eligible under it.
    pub fn allowed_fields(&self, purpose: Purpose, role: Role) -> Vec<PatientField> {
        let Some(rule) = self.field_rules.get(&purpose) else {
            return Vec::new();
        };

        if let Some(eligible) = &rule.eligible_roles {
            if !eligible.contains(&role) {
                return Vec::new();
            }
        }

        let mut fields = rule.base_fields.clone();
        if let Some(extras) = rule.role_extras.get(&role) {
            fields.extend(extras.iter().copied());
        }
        fields
    }
}

impl Default for DisclosurePolicy {
    fn default() -> Self {
        use PatientField::*;

        let permitted_purposes = BTreeMap::from([
            (
                Role::Physician,
                BTreeSet::from([Purpose::Treatment, Purpose::Referral, Purpose::Emergency]),
            ),
            (
                Role::Nurse,
                BTreeSet::from([Purpose::Treatment, Purpose::Emergency]),
            ),
            (Role::Admin, BTreeSet::from([Purpose::Billing])),
            (Role::Billing, BTreeSet::from([Purpose::Billing])),
            (Role::Receptionist, BTreeSet::from([Purpose::Emergency])),
        ]);

        let field_rules = BTreeMap::from([
            (
                Purpose::Treatment,
                FieldRule::for_roles(
                    [Role::Physician, Role::Nurse],
                    [Name, DateOfBirth, MedicalHistory, Medications, Allergies],
                )
                .with_extras(Role::Physician, [HealthCardNumber]),
            ),
            (
                Purpose::Billing,
                FieldRule::for_roles(
                    [Role::Billing, Role::Admin],
                    [
                        Name,
                        Address,
                        City,
                        Province,
                        PostalCode,
                        PhoneNumber,
                        Email,
                        InsuranceInfo,
                    ],
                ),
            ),
            (
                Purpose::Referral,
                FieldRule::for_roles(
                    [Role::Physician],
                    [Name, DateOfBirth, HealthCardNumber, MedicalHistory],
                ),
            ),
            (
                Purpose::Emergency,
                FieldRule::for_any_role([Name, DateOfBirth, Allergies, EmergencyContacts])
                    .with_extras(Role::Physician, [Medications])
                    .with_extras(Role::Nurse, [Medications]),
            ),
            // TODO: de-identify research disclosures; until that lands only
            // the birth date is released for research.
            (Purpose::Research, FieldRule::for_any_role([DateOfBirth])),
        ]);

        Self::new(permitted_purposes, field_rules)
    }
}
