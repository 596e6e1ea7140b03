//! End-to-end registry walkthrough binary
//!
//! Registers two owners and an official, verifies a property, and runs a
//! full ownership transfer, logging every accepted state change.

use registry_core::types::{
    ContentRef, EmployeeId, Identity, IdDocument, NewOfficial, NewOwner, NewProperty, PropertyKind,
};
use registry_core::{Config, Registry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting DeedRail registry demo");

    let config = Config::from_env()?;
    let fees = config.fees.clone();
    let registrar = Identity::new(config.registrar.clone());
    let registry = Registry::open(config)?;

    let alice = Identity::new("0xalice");
    let bob = Identity::new("0xbob");
    let inspector = Identity::new("0xinspector");
    let employee = EmployeeId::new("EMP-001");

    registry
        .register_owner(
            &alice,
            NewOwner {
                name: "Alice Kumar".into(),
                id_document: IdDocument::new("ID-ALICE-1"),
                contact: "alice@example.com".into(),
                state: "KA".into(),
                district: "North".into(),
            },
        )
        .await?;
    registry
        .register_owner(
            &bob,
            NewOwner {
                name: "Bob Verma".into(),
                id_document: IdDocument::new("ID-BOB-1"),
                contact: "bob@example.com".into(),
                state: "KA".into(),
                district: "North".into(),
            },
        )
        .await?;
    registry
        .register_official(
            &registrar,
            NewOfficial {
                employee_id: employee.clone(),
                identity: inspector.clone(),
                name: "Inspector Rao".into(),
                department: "Land Records".into(),
                state: "KA".into(),
                district: "North".into(),
            },
        )
        .await?;
    registry.verify_owner(&registrar, &alice).await?;

    let property_id = registry
        .register_property(
            &alice,
            NewProperty {
                address: "12 Canal Road".into(),
                district: "North".into(),
                state: "KA".into(),
                area: 1200,
                kind: PropertyKind::Residential,
                survey_number: "SRV-44".into(),
                subdivision: "A".into(),
                document: ContentRef::new("doc://deed-1"),
            },
        )
        .await?;

    let verification_id = registry
        .request_property_verification(&alice, property_id, fees.verification_fee)
        .await?;
    registry
        .verify_property(
            &inspector,
            verification_id,
            &employee,
            true,
            Some("papers in order".into()),
        )
        .await?;

    let transfer_id = registry
        .create_transfer_request(
            &alice,
            property_id,
            &bob,
            ContentRef::new("doc://transfer-1"),
            fees.transfer_fee,
        )
        .await?;
    registry
        .approve_transfer_request(&inspector, transfer_id, &employee)
        .await?;
    registry.complete_transfer(&bob, transfer_id).await?;

    let property = registry.get_property_details(property_id).await?;
    tracing::info!(
        property = %property_id,
        owner = %property.owner,
        transfers = property.transfer_history.len(),
        "transfer complete"
    );

    let amount = registry.withdraw_fees(&registrar).await?;
    tracing::info!(%amount, "escrow withdrawn");

    match registry.audit().verify_chain() {
        Ok(()) => tracing::info!(entries = registry.audit().len(), "audit chain verified"),
        Err(sequence) => tracing::error!(sequence, "audit chain broken"),
    }

    // Dump the audit trail as JSON lines for external observers
    if std::env::var("REGISTRY_DUMP_AUDIT").is_ok() {
        for entry in registry.audit().entries() {
            println!("{}", serde_json::to_string(&entry)?);
        }
    }

    registry.shutdown().await?;
    Ok(())
}
