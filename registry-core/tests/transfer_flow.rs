//! End-to-end workflow tests through the public `Registry` API

use registry_core::types::{
    ContentRef, EmployeeId, Identity, IdDocument, NewOfficial, NewOwner, NewProperty, PropertyId,
    PropertyKind, TransferStatus, VerificationStatus,
};
use registry_core::{Config, Error, Registry};
use rust_decimal::Decimal;

fn registrar() -> Identity {
    Identity::new("registrar")
}

fn owner_fields(name: &str, doc: &str) -> NewOwner {
    NewOwner {
        name: name.to_string(),
        id_document: IdDocument::new(doc),
        contact: format!("{}@example.com", doc.to_lowercase()),
        state: "KA".to_string(),
        district: "North".to_string(),
    }
}

fn property_fields(survey: &str) -> NewProperty {
    NewProperty {
        address: "12 Canal Road".to_string(),
        district: "North".to_string(),
        state: "KA".to_string(),
        area: 1200,
        kind: PropertyKind::Residential,
        survey_number: survey.to_string(),
        subdivision: "A".to_string(),
        document: ContentRef::new("doc://deed"),
    }
}

async fn registry_with_official() -> (Registry, Identity, EmployeeId) {
    let registry = Registry::open(Config::default()).unwrap();
    let official = Identity::new("0xinspector");
    let employee = EmployeeId::new("EMP-1");
    registry
        .register_official(
            &registrar(),
            NewOfficial {
                employee_id: employee.clone(),
                identity: official.clone(),
                name: "Inspector".to_string(),
                department: "Land Records".to_string(),
                state: "KA".to_string(),
                district: "North".to_string(),
            },
        )
        .await
        .unwrap();
    (registry, official, employee)
}

#[tokio::test]
async fn pending_lists_track_workflow_progress() {
    let (registry, official, employee) = registry_with_official().await;
    let alice = Identity::new("0xalice");
    let bob = Identity::new("0xbob");

    registry
        .register_owner(&alice, owner_fields("Alice", "ID-A"))
        .await
        .unwrap();
    registry
        .register_owner(&bob, owner_fields("Bob", "ID-B"))
        .await
        .unwrap();
    let property_id = registry
        .register_property(&alice, property_fields("SRV-44"))
        .await
        .unwrap();

    let verification_id = registry
        .request_property_verification(&alice, property_id, Decimal::new(100, 0))
        .await
        .unwrap();

    let pending = registry.get_pending_verification_requests().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, verification_id);
    assert_eq!(pending[0].status, VerificationStatus::Pending);

    registry
        .verify_property(&official, verification_id, &employee, true, None)
        .await
        .unwrap();
    assert!(registry
        .get_pending_verification_requests()
        .await
        .unwrap()
        .is_empty());

    let transfer_id = registry
        .create_transfer_request(
            &alice,
            property_id,
            &bob,
            ContentRef::new("doc://transfer"),
            Decimal::new(250, 0),
        )
        .await
        .unwrap();

    let pending = registry.get_pending_transfer_requests().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].status, TransferStatus::Requested);

    registry
        .approve_transfer_request(&official, transfer_id, &employee)
        .await
        .unwrap();
    assert!(registry
        .get_pending_transfer_requests()
        .await
        .unwrap()
        .is_empty());

    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn complete_before_approval_leaves_ownership_unchanged() {
    let (registry, official, employee) = registry_with_official().await;
    let alice = Identity::new("0xalice");
    let bob = Identity::new("0xbob");

    registry
        .register_owner(&alice, owner_fields("Alice", "ID-A"))
        .await
        .unwrap();
    registry
        .register_owner(&bob, owner_fields("Bob", "ID-B"))
        .await
        .unwrap();
    let property_id = registry
        .register_property(&alice, property_fields("SRV-44"))
        .await
        .unwrap();
    let verification_id = registry
        .request_property_verification(&alice, property_id, Decimal::new(100, 0))
        .await
        .unwrap();
    registry
        .verify_property(&official, verification_id, &employee, true, None)
        .await
        .unwrap();
    let transfer_id = registry
        .create_transfer_request(
            &alice,
            property_id,
            &bob,
            ContentRef::new("doc://transfer"),
            Decimal::new(250, 0),
        )
        .await
        .unwrap();

    let err = registry.complete_transfer(&bob, transfer_id).await.unwrap_err();
    assert!(matches!(err, Error::TransferNotApproved(_)));
    assert_eq!(
        registry.get_property_details(property_id).await.unwrap().owner,
        alice
    );

    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn second_completion_fails_with_already_completed() {
    let (registry, official, employee) = registry_with_official().await;
    let alice = Identity::new("0xalice");
    let bob = Identity::new("0xbob");

    registry
        .register_owner(&alice, owner_fields("Alice", "ID-A"))
        .await
        .unwrap();
    registry
        .register_owner(&bob, owner_fields("Bob", "ID-B"))
        .await
        .unwrap();
    let property_id = registry
        .register_property(&alice, property_fields("SRV-44"))
        .await
        .unwrap();
    let verification_id = registry
        .request_property_verification(&alice, property_id, Decimal::new(100, 0))
        .await
        .unwrap();
    registry
        .verify_property(&official, verification_id, &employee, true, None)
        .await
        .unwrap();
    let transfer_id = registry
        .create_transfer_request(
            &alice,
            property_id,
            &bob,
            ContentRef::new("doc://transfer"),
            Decimal::new(250, 0),
        )
        .await
        .unwrap();
    registry
        .approve_transfer_request(&official, transfer_id, &employee)
        .await
        .unwrap();

    // Either party may finalize; the from-party wins this time
    registry.complete_transfer(&alice, transfer_id).await.unwrap();

    let err = registry.complete_transfer(&bob, transfer_id).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyCompleted(_)));

    let property = registry.get_property_details(property_id).await.unwrap();
    assert_eq!(property.owner, bob);
    assert_eq!(property.transfer_history, vec![transfer_id]);

    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn racing_completions_yield_exactly_one_winner() {
    let (registry, official, employee) = registry_with_official().await;
    let alice = Identity::new("0xalice");
    let bob = Identity::new("0xbob");

    registry
        .register_owner(&alice, owner_fields("Alice", "ID-A"))
        .await
        .unwrap();
    registry
        .register_owner(&bob, owner_fields("Bob", "ID-B"))
        .await
        .unwrap();
    let property_id = registry
        .register_property(&alice, property_fields("SRV-44"))
        .await
        .unwrap();
    let verification_id = registry
        .request_property_verification(&alice, property_id, Decimal::new(100, 0))
        .await
        .unwrap();
    registry
        .verify_property(&official, verification_id, &employee, true, None)
        .await
        .unwrap();
    let transfer_id = registry
        .create_transfer_request(
            &alice,
            property_id,
            &bob,
            ContentRef::new("doc://transfer"),
            Decimal::new(250, 0),
        )
        .await
        .unwrap();
    registry
        .approve_transfer_request(&official, transfer_id, &employee)
        .await
        .unwrap();

    // Both parties race to finalize through cloned handles; the single
    // writer applies them in mailbox order and the loser fails against
    // the winner's state.
    let from_side = tokio::spawn({
        let registry = registry.clone();
        let alice = alice.clone();
        async move { registry.complete_transfer(&alice, transfer_id).await }
    });
    let to_side = tokio::spawn({
        let registry = registry.clone();
        let bob = bob.clone();
        async move { registry.complete_transfer(&bob, transfer_id).await }
    });

    let results = [from_side.await.unwrap(), to_side.await.unwrap()];
    let oks = results.iter().filter(|r| r.is_ok()).count();
    let already_completed = results
        .iter()
        .filter(|r| matches!(r, Err(Error::AlreadyCompleted(_))))
        .count();
    assert_eq!((oks, already_completed), (1, 1));

    // Ownership moved exactly once
    let property = registry.get_property_details(property_id).await.unwrap();
    assert_eq!(property.owner, bob);
    assert_eq!(property.transfer_history, vec![transfer_id]);
    assert!(registry.get_owner_properties(&alice).await.unwrap().is_empty());
    assert_eq!(
        registry.get_owner_properties(&bob).await.unwrap(),
        vec![property_id]
    );
    assert!(registry.audit().verify_chain().is_ok());

    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn searches_are_pure_and_leak_nothing() {
    let (registry, _, _) = registry_with_official().await;
    let alice = Identity::new("0xalice");

    registry
        .register_owner(&alice, owner_fields("Alice", "ID-A"))
        .await
        .unwrap();
    let first = registry
        .register_property(&alice, property_fields("SRV-1"))
        .await
        .unwrap();
    let second = registry
        .register_property(&alice, property_fields("SRV-2"))
        .await
        .unwrap();

    let audit_len = registry.audit().len();
    for _ in 0..3 {
        assert_eq!(
            registry
                .search_properties_by_location("KA", "North")
                .await
                .unwrap(),
            vec![first, second]
        );
        assert_eq!(
            registry
                .search_properties_by_owner_id_document(&IdDocument::new("ID-A"))
                .await
                .unwrap(),
            vec![first, second]
        );
        assert!(registry
            .search_properties_by_owner_id_document(&IdDocument::new("ID-NOBODY"))
            .await
            .unwrap()
            .is_empty());
    }
    assert_eq!(registry.audit().len(), audit_len);

    let err = registry
        .get_property_details(PropertyId(99))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    registry.shutdown().await.unwrap();
}
