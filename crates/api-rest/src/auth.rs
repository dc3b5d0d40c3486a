//! Mock header-based authentication.
//!
//! Resolves `X-User-*` headers into an [`Actor`]. This stands in for a real
//! identity provider in the demo deployment; requests without an identity
//! and a recognized role are refused before any handler runs.

use crate::error::ApiError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use pdg_core::{Actor, RequestMetadata};
use pdg_types::Role;

/// Extractor yielding the authenticated caller.
pub struct AuthenticatedActor(pub Actor);

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedActor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        let id = header_str(headers, "X-User-Id");
        let role = header_str(headers, "X-User-Role").and_then(|raw| raw.parse::<Role>().ok());
        let (Some(id), Some(role)) = (id, role) else {
            return Err(ApiError::unauthorized());
        };

        let name = header_str(headers, "X-User-Name").unwrap_or("Unknown User");
        let email = header_str(headers, "X-User-Email").unwrap_or("unknown@example.com");

        Ok(Self(Actor {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            department: None,
        }))
    }
}

/// Request metadata for audit entries, taken from forwarding headers.
pub fn request_metadata(headers: &HeaderMap) -> RequestMetadata {
    let ip_address = header_str(headers, "X-Forwarded-For")
        .or_else(|| header_str(headers, "X-Real-IP"))
        .unwrap_or("unknown");
    let user_agent = header_str(headers, "User-Agent").unwrap_or("unknown");

    RequestMetadata {
        ip_address: ip_address.to_string(),
        user_agent: user_agent.to_string(),
    }
}
