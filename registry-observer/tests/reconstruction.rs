//! The audit contract, end to end: a projection rebuilt purely from audit
//! entries must match the live registry's reads.

use registry_core::types::{
    ContentRef, EmployeeId, Identity, IdDocument, NewOfficial, NewOwner, NewProperty, PropertyKind,
    TransferStatus, VerificationStatus,
};
use registry_core::{Config, Registry};
use registry_observer::{verify_entries, Projection};
use rust_decimal::Decimal;

fn registrar() -> Identity {
    Identity::new("registrar")
}

async fn run_full_scenario() -> Registry {
    let registry = Registry::open(Config::default()).unwrap();
    let alice = Identity::new("0xalice");
    let bob = Identity::new("0xbob");
    let inspector = Identity::new("0xinspector");
    let employee = EmployeeId::new("EMP-1");

    registry
        .register_owner(
            &alice,
            NewOwner {
                name: "Alice Kumar".to_string(),
                id_document: IdDocument::new("ID-A"),
                contact: "alice@example.com".to_string(),
                state: "KA".to_string(),
                district: "North".to_string(),
            },
        )
        .await
        .unwrap();
    registry
        .register_owner(
            &bob,
            NewOwner {
                name: "Bob Verma".to_string(),
                id_document: IdDocument::new("ID-B"),
                contact: "bob@example.com".to_string(),
                state: "KA".to_string(),
                district: "North".to_string(),
            },
        )
        .await
        .unwrap();
    registry
        .register_official(
            &registrar(),
            NewOfficial {
                employee_id: employee.clone(),
                identity: inspector.clone(),
                name: "Inspector Rao".to_string(),
                department: "Land Records".to_string(),
                state: "KA".to_string(),
                district: "North".to_string(),
            },
        )
        .await
        .unwrap();
    registry.verify_owner(&registrar(), &alice).await.unwrap();

    let property_id = registry
        .register_property(
            &alice,
            NewProperty {
                address: "12 Canal Road".to_string(),
                district: "North".to_string(),
                state: "KA".to_string(),
                area: 1200,
                kind: PropertyKind::Residential,
                survey_number: "SRV-44".to_string(),
                subdivision: "A".to_string(),
                document: ContentRef::new("doc://deed-1"),
            },
        )
        .await
        .unwrap();
    registry
        .update_property_document(&alice, property_id, ContentRef::new("doc://deed-2"))
        .await
        .unwrap();

    let verification_id = registry
        .request_property_verification(&alice, property_id, Decimal::new(100, 0))
        .await
        .unwrap();
    registry
        .verify_property(
            &inspector,
            verification_id,
            &employee,
            true,
            Some("papers in order".to_string()),
        )
        .await
        .unwrap();

    let transfer_id = registry
        .create_transfer_request(
            &alice,
            property_id,
            &bob,
            ContentRef::new("doc://transfer-1"),
            Decimal::new(250, 0),
        )
        .await
        .unwrap();
    registry
        .approve_transfer_request(&inspector, transfer_id, &employee)
        .await
        .unwrap();
    registry.complete_transfer(&bob, transfer_id).await.unwrap();

    registry.withdraw_fees(&registrar()).await.unwrap();

    registry
}

#[tokio::test]
async fn projection_matches_live_registry() {
    let registry = run_full_scenario().await;
    let entries = registry.audit().entries();

    verify_entries(&entries).unwrap();
    let projection = Projection::from_entries(&entries).unwrap();
    assert_eq!(projection.applied(), entries.len() as u64);

    let alice = Identity::new("0xalice");
    let bob = Identity::new("0xbob");

    // Records match field for field
    let live_owner = registry.get_owner_details(&alice).await.unwrap();
    assert_eq!(projection.owner(&alice), Some(&live_owner));
    assert!(live_owner.verified);

    let live_official = registry
        .get_official_details(&EmployeeId::new("EMP-1"))
        .await
        .unwrap();
    assert_eq!(projection.official(&EmployeeId::new("EMP-1")), Some(&live_official));

    let property_id = registry.get_owner_properties(&bob).await.unwrap()[0];
    let live_property = registry.get_property_details(property_id).await.unwrap();
    assert_eq!(projection.property(property_id), Some(&live_property));
    assert_eq!(live_property.owner, bob);
    assert_eq!(live_property.document, ContentRef::new("doc://deed-2"));

    // Indexes match
    assert_eq!(
        projection.owner_properties(&alice),
        registry.get_owner_properties(&alice).await.unwrap()
    );
    assert_eq!(
        projection.owner_properties(&bob),
        registry.get_owner_properties(&bob).await.unwrap()
    );

    // Request states match
    let live_verification = registry
        .get_verification_request_details(registry_core::types::VerificationId(1))
        .await
        .unwrap();
    assert_eq!(live_verification.status, VerificationStatus::Approved);
    assert_eq!(
        projection.verification_request(live_verification.id),
        Some(&live_verification)
    );

    let live_transfer = registry
        .get_transfer_request_details(registry_core::types::TransferId(1))
        .await
        .unwrap();
    assert_eq!(live_transfer.status, TransferStatus::Completed);
    assert_eq!(projection.transfer_request(live_transfer.id), Some(&live_transfer));

    // Fee accounting matches
    let live_totals = registry.fee_totals().await.unwrap();
    assert_eq!(projection.escrow_balance(), live_totals.escrow_balance);
    assert_eq!(projection.total_withdrawn(), live_totals.total_withdrawn);

    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn projection_detects_tampering() {
    let registry = run_full_scenario().await;
    let mut entries = registry.audit().entries();

    // Flip one byte of a mid-chain hash
    entries[3].entry_hash[0] ^= 0xff;

    assert!(Projection::from_entries(&entries).is_err());

    registry.shutdown().await.unwrap();
}
