use std::sync::Arc;

use chrono::{Duration, Utc};
use pdg_core::{
    ConsentGrant, DisclosureService, MemoryStore, Patient, PatientName, Purpose, RecordStore,
};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Main entry point for the PDG demo server.
///
/// Serves the disclosure REST API backed by an in-memory record store seeded
/// with fictional patients and a mix of active, expired, and withdrawn
/// consent grants, so every pipeline outcome can be exercised from curl or
/// the Swagger UI at `/swagger-ui`.
///
/// # Environment Variables
/// - `PDG_REST_ADDR`: REST server address (default: "0.0.0.0:3001")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("pdg=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("PDG_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());

    let store = Arc::new(MemoryStore::new());
    seed_demo_records(&store).await?;

    let service = DisclosureService::new(store);
    let app = api_rest::router(service);

    tracing::info!("++ Starting PDG REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Seeds fictional demo data: three patients and consent grants in every
/// lifecycle state (active, expired, withdrawn).
async fn seed_demo_records(store: &Arc<MemoryStore>) -> anyhow::Result<()> {
    let john = Patient {
        id: Uuid::new_v4(),
        name: PatientName {
            given: vec!["John".to_string()],
            family: "Doe".to_string(),
        },
        date_of_birth: "1985-03-15".parse()?,
        social_insurance_number: Some("123-456-789".to_string()),
        health_card_number: Some("9876543210".to_string()),
        address: Some("123 Main Street".to_string()),
        city: Some("Vancouver".to_string()),
        province: Some("BC".to_string()),
        postal_code: Some("V6B 1A1".to_string()),
        phone_number: Some("604-555-0100".to_string()),
        email: Some("john.doe@example.com".to_string()),
        medical_history: Some(json!([{ "condition": "Hypertension", "diagnosedYear": 2020 }])),
        medications: Some(json!([{ "name": "Lisinopril", "dosage": "10mg" }])),
        allergies: Some(json!(["Penicillin"])),
        insurance_info: Some(json!({
            "provider": "Pacific Blue Cross",
            "policyNumber": "PBC-123456"
        })),
        emergency_contacts: Some(json!([
            { "name": "Jane Doe", "relationship": "Spouse", "phone": "604-555-0101" }
        ])),
    };

    let maria = Patient {
        id: Uuid::new_v4(),
        name: PatientName {
            given: vec!["Maria".to_string()],
            family: "Garcia".to_string(),
        },
        date_of_birth: "1992-07-22".parse()?,
        social_insurance_number: Some("987-654-321".to_string()),
        health_card_number: Some("1234567890".to_string()),
        address: Some("456 Oak Avenue".to_string()),
        city: Some("Victoria".to_string()),
        province: Some("BC".to_string()),
        postal_code: Some("V8W 2C3".to_string()),
        phone_number: Some("250-555-0200".to_string()),
        email: Some("maria.garcia@example.com".to_string()),
        medical_history: Some(json!([])),
        medications: Some(json!([])),
        allergies: Some(json!(["Latex"])),
        insurance_info: Some(json!({ "provider": "Manulife", "policyNumber": "MAN-789012" })),
        emergency_contacts: Some(json!([])),
    };

    let robert = Patient {
        id: Uuid::new_v4(),
        name: PatientName {
            given: vec!["Robert".to_string()],
            family: "Chen".to_string(),
        },
        date_of_birth: "1978-11-08".parse()?,
        social_insurance_number: Some("456-789-123".to_string()),
        health_card_number: Some("5678901234".to_string()),
        address: Some("789 Cedar Lane".to_string()),
        city: Some("Surrey".to_string()),
        province: Some("BC".to_string()),
        postal_code: Some("V3T 4K5".to_string()),
        phone_number: Some("604-555-0300".to_string()),
        email: Some("robert.chen@example.com".to_string()),
        medical_history: Some(json!([
            { "condition": "Type 2 Diabetes", "diagnosedYear": 2018 },
            { "condition": "Asthma", "diagnosedYear": 2005 }
        ])),
        medications: Some(json!([
            { "name": "Metformin", "dosage": "500mg" },
            { "name": "Albuterol", "dosage": "as needed" }
        ])),
        allergies: Some(json!([])),
        insurance_info: Some(json!({ "provider": "Sun Life", "policyNumber": "SL-345678" })),
        emergency_contacts: Some(json!([
            { "name": "Lisa Chen", "relationship": "Wife", "phone": "604-555-0301" }
        ])),
    };

    let now = Utc::now();
    let grants = vec![
        // Active treatment consent for John
        ConsentGrant {
            id: Uuid::new_v4(),
            patient_id: john.id,
            purpose: Purpose::Treatment,
            granted_by: "John Doe".to_string(),
            granted_at: now - Duration::days(30),
            expires_at: Some(now + Duration::days(335)),
            withdrawn_at: None,
            active: true,
        },
        // Active billing consent for John
        ConsentGrant {
            id: Uuid::new_v4(),
            patient_id: john.id,
            purpose: Purpose::Billing,
            granted_by: "John Doe".to_string(),
            granted_at: now - Duration::days(30),
            expires_at: None,
            withdrawn_at: None,
            active: true,
        },
        // Expired treatment consent for Maria
        ConsentGrant {
            id: Uuid::new_v4(),
            patient_id: maria.id,
            purpose: Purpose::Treatment,
            granted_by: "Maria Garcia".to_string(),
            granted_at: now - Duration::days(400),
            expires_at: Some(now - Duration::days(35)),
            withdrawn_at: None,
            active: true,
        },
        // Withdrawn research consent for Robert
        ConsentGrant {
            id: Uuid::new_v4(),
            patient_id: robert.id,
            purpose: Purpose::Research,
            granted_by: "Robert Chen".to_string(),
            granted_at: now - Duration::days(90),
            expires_at: None,
            withdrawn_at: Some(now - Duration::days(10)),
            active: false,
        },
    ];

    for patient in [john, maria, robert] {
        tracing::info!(patient = %patient.id, "seeded demo patient");
        store.insert_patient(patient)?;
    }
    for grant in grants {
        store.insert_consent(grant).await?;
    }

    Ok(())
}
