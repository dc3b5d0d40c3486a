//! REST handlers for the disclosure pipeline.

use crate::auth::{request_metadata, AuthenticatedActor};
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use pdg_core::{ConsentReceipt, DisclosedPatient, PatientSummary};
use pdg_types::{NonEmptyText, Purpose, Role};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AccessQuery {
    /// Declared purpose of the access request.
    pub purpose: Purpose,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccessResponse {
    pub data: DisclosedPatient,
    pub consent: ConsentReceipt,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    pub data: PatientSummary,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConsentRequest {
    pub purpose: Purpose,
    /// Who authorized the grant (must be non-empty).
    #[schema(value_type = String)]
    pub granted_by: NonEmptyText,
    #[schema(value_type = Option<String>)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsentCreatedResponse {
    pub message: String,
    #[schema(value_type = String)]
    pub consent_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "pdg".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    params(
        ("id" = String, Path, description = "Patient identifier"),
        AccessQuery
    ),
    responses(
        (status = 200, description = "Filtered patient record", body = AccessResponse),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Role or consent denial"),
        (status = 404, description = "Patient not found")
    )
)]
/// Purpose-scoped patient access: authorization, consent verification, data
/// minimization, and audit logging all apply.
pub async fn access_patient(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
    Query(query): Query<AccessQuery>,
    headers: HeaderMap,
) -> Result<Json<AccessResponse>, ApiError> {
    let metadata = request_metadata(&headers);
    let access = state
        .disclosure
        .request_access(id, query.purpose, &actor, &metadata)
        .await?;

    Ok(Json(AccessResponse {
        data: access.patient,
        consent: access.consent,
    }))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}/summary",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Minimal patient summary", body = SummaryResponse),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Patient not found")
    )
)]
/// Minimal lookup for identity verification; still audited.
pub async fn patient_summary(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<SummaryResponse>, ApiError> {
    let metadata = request_metadata(&headers);
    let summary = state.disclosure.patient_summary(id, &actor, &metadata).await?;

    Ok(Json(SummaryResponse { data: summary }))
}

#[utoipa::path(
    post,
    path = "/api/patients/{id}/consent",
    params(("id" = String, Path, description = "Patient identifier")),
    request_body = CreateConsentRequest,
    responses(
        (status = 201, description = "Consent recorded", body = ConsentCreatedResponse),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Patient not found")
    )
)]
/// Records a consent grant. Restricted to clinical and admin staff.
pub async fn grant_patient_consent(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<CreateConsentRequest>,
) -> Result<(StatusCode, Json<ConsentCreatedResponse>), ApiError> {
    if !matches!(actor.role, Role::Physician | Role::Nurse | Role::Admin) {
        return Err(ApiError::forbidden(
            "Insufficient permissions for this resource",
        ));
    }

    let metadata = request_metadata(&headers);
    let consent_id = state
        .disclosure
        .grant_consent(
            id,
            body.purpose,
            body.granted_by,
            body.expires_at,
            &actor,
            &metadata,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ConsentCreatedResponse {
            message: "Consent recorded successfully".to_string(),
            consent_id,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/patients/{id}/consent/{consent_id}",
    params(
        ("id" = String, Path, description = "Patient identifier"),
        ("consent_id" = String, Path, description = "Consent grant identifier")
    ),
    responses(
        (status = 200, description = "Consent withdrawn", body = MessageResponse),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Consent record not found")
    )
)]
/// Withdraws a consent grant. Individuals may withdraw consent at any time;
/// the grant is retained (inactive) for the audit trail.
pub async fn withdraw_patient_consent(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path((id, consent_id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let metadata = request_metadata(&headers);
    state
        .disclosure
        .withdraw_consent(id, consent_id, &actor, &metadata)
        .await?;

    Ok(Json(MessageResponse {
        message: "Consent withdrawn successfully".to_string(),
    }))
}
