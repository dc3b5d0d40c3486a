//! Shared vocabulary types for the PDG (patient disclosure gateway) workspace.
//!
//! This crate holds the closed enumerations that gate every disclosure
//! decision, [`Role`] and [`Purpose`], together with small validated text
//! types used at the API boundary. Keeping them in one dependency-light crate
//! lets both the core pipeline and the HTTP layer share a single wire form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during
/// construction; construction fails if nothing remains. Used for free-text
/// values that must carry information, such as the name of whoever authorized
/// a consent grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct ParseRoleError(String);

/// The professional role of an authenticated actor.
///
/// This enumeration is deliberately *closed*: every disclosure rule in the
/// core is keyed on these five roles, and an unrecognized role string is
/// rejected at the authentication boundary rather than defaulting to any
/// access at all.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Physician,
    Nurse,
    Admin,
    Billing,
    Receptionist,
}

impl Role {
    /// All roles, for exhaustive iteration in policy checks and tests.
    pub const ALL: [Role; 5] = [
        Role::Physician,
        Role::Nurse,
        Role::Admin,
        Role::Billing,
        Role::Receptionist,
    ];

    /// The lowercase wire form of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Physician => "physician",
            Role::Nurse => "nurse",
            Role::Admin => "admin",
            Role::Billing => "billing",
            Role::Receptionist => "receptionist",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "physician" => Ok(Role::Physician),
            "nurse" => Ok(Role::Nurse),
            "admin" => Ok(Role::Admin),
            "billing" => Ok(Role::Billing),
            "receptionist" => Ok(Role::Receptionist),
            other => Err(ParseRoleError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an unknown purpose string.
#[derive(Debug, thiserror::Error)]
#[error("unknown purpose '{0}'")]
pub struct ParsePurposeError(String);

/// The declared reason a caller requests access to patient data.
///
/// Purpose gates both the role permission check and the consent lookup, so
/// every request must state one. `Emergency` is the single purpose exempt
/// from consent verification; the exemption is still audited.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Treatment,
    Billing,
    Referral,
    Research,
    Emergency,
}

impl Purpose {
    /// All purposes, for exhaustive iteration in policy checks and tests.
    pub const ALL: [Purpose; 5] = [
        Purpose::Treatment,
        Purpose::Billing,
        Purpose::Referral,
        Purpose::Research,
        Purpose::Emergency,
    ];

    /// The lowercase wire form of this purpose.
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Treatment => "treatment",
            Purpose::Billing => "billing",
            Purpose::Referral => "referral",
            Purpose::Research => "research",
            Purpose::Emergency => "emergency",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = ParsePurposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "treatment" => Ok(Purpose::Treatment),
            "billing" => Ok(Purpose::Billing),
            "referral" => Ok(Purpose::Referral),
            "research" => Ok(Purpose::Research),
            "emergency" => Ok(Purpose::Emergency),
            other => Err(ParsePurposeError(other.to_owned())),
        }
    }
}
