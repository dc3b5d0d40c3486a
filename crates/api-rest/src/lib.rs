//! # API REST
//!
//! REST surface for the patient disclosure gateway.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Mock header authentication and request metadata extraction
//! - OpenAPI/Swagger documentation
//! - Mapping pipeline errors onto HTTP status codes
//!
//! All access-control decisions live in `pdg-core`; this crate only
//! translates between HTTP and the [`DisclosureService`] operations.

#![warn(rust_2018_idioms)]

mod auth;
mod error;
mod routes;

pub use auth::{request_metadata, AuthenticatedActor};
pub use error::{ApiError, ErrorBody};

use axum::routing::{delete, get, post};
use axum::Router;
use pdg_core::DisclosureService;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub disclosure: DisclosureService,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health,
        routes::access_patient,
        routes::patient_summary,
        routes::grant_patient_consent,
        routes::withdraw_patient_consent,
    ),
    components(schemas(
        routes::HealthResponse,
        routes::AccessResponse,
        routes::SummaryResponse,
        routes::CreateConsentRequest,
        routes::ConsentCreatedResponse,
        routes::MessageResponse,
        error::ErrorBody,
        pdg_core::DisclosedPatient,
        pdg_core::PatientName,
        pdg_core::PatientSummary,
        pdg_core::ConsentReceipt,
        pdg_types::Purpose,
        pdg_types::Role,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router for the given disclosure service.
pub fn router(disclosure: DisclosureService) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/patients/:id", get(routes::access_patient))
        .route("/api/patients/:id/summary", get(routes::patient_summary))
        .route(
            "/api/patients/:id/consent",
            post(routes::grant_patient_consent),
        )
        .route(
            "/api/patients/:id/consent/:consent_id",
            delete(routes::withdraw_patient_consent),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(AppState { disclosure })
}
