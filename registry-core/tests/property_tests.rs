//! Property-based tests for registry invariants
//!
//! These tests use proptest to verify critical invariants across random
//! operation sequences:
//! - Escrow accounting: balance == collected - withdrawn >= 0
//! - Owner-index partition: each property lives in exactly one owner's index
//! - Dense id assignment
//! - One-way state transitions for requests

use proptest::prelude::*;
use registry_core::state::RegistryState;
use registry_core::types::{
    ContentRef, EmployeeId, Identity, IdDocument, NewOfficial, NewOwner, NewProperty, PropertyId,
    PropertyKind, TransferId, VerificationId,
};
use registry_core::Config;
use rust_decimal::Decimal;

const OWNER_POOL: usize = 4;
const VERIFICATION_FEE: i64 = 100;
const TRANSFER_FEE: i64 = 250;

/// One randomly chosen registry operation
#[derive(Debug, Clone)]
enum Op {
    RegisterOwner(usize),
    RegisterProperty(usize),
    RequestVerification { owner: usize, property: u64, offered: i64 },
    ResolveVerification { request: u64, approve: bool },
    CreateTransfer { from: usize, to: usize, property: u64 },
    ApproveTransfer { request: u64 },
    CompleteTransfer { request: u64, by_recipient: bool },
    Withdraw,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..OWNER_POOL).prop_map(Op::RegisterOwner),
        (0..OWNER_POOL).prop_map(Op::RegisterProperty),
        (0..OWNER_POOL, 1u64..8, prop_oneof![Just(VERIFICATION_FEE), Just(50)]).prop_map(
            |(owner, property, offered)| Op::RequestVerification {
                owner,
                property,
                offered,
            }
        ),
        (1u64..8, any::<bool>()).prop_map(|(request, approve)| Op::ResolveVerification {
            request,
            approve
        }),
        (0..OWNER_POOL, 0..OWNER_POOL, 1u64..8).prop_map(|(from, to, property)| {
            Op::CreateTransfer { from, to, property }
        }),
        (1u64..8).prop_map(|request| Op::ApproveTransfer { request }),
        (1u64..8, any::<bool>()).prop_map(|(request, by_recipient)| Op::CompleteTransfer {
            request,
            by_recipient,
        }),
        Just(Op::Withdraw),
    ]
}

fn identity(i: usize) -> Identity {
    Identity::new(format!("0xowner{}", i))
}

fn registrar() -> Identity {
    Identity::new("registrar")
}

fn official_identity() -> Identity {
    Identity::new("0xofficial")
}

fn employee() -> EmployeeId {
    EmployeeId::new("EMP-1")
}

/// Fresh state with one active official registered
fn seeded_state() -> RegistryState {
    let mut config = Config::default();
    config.fees.verification_fee = Decimal::new(VERIFICATION_FEE, 0);
    config.fees.transfer_fee = Decimal::new(TRANSFER_FEE, 0);
    let mut state = RegistryState::new(&config);
    state
        .register_official(
            &registrar(),
            NewOfficial {
                employee_id: employee(),
                identity: official_identity(),
                name: "Inspector".to_string(),
                department: "Land Records".to_string(),
                state: "KA".to_string(),
                district: "North".to_string(),
            },
        )
        .expect("seeding official");
    state
}

fn apply(state: &mut RegistryState, op: &Op) {
    // Most randomly generated operations are expected to fail their
    // preconditions; the invariants must hold either way.
    match op {
        Op::RegisterOwner(i) => {
            let _ = state.register_owner(
                &identity(*i),
                NewOwner {
                    name: format!("Owner {}", i),
                    id_document: IdDocument::new(format!("ID-{}", i)),
                    contact: format!("owner{}@example.com", i),
                    state: "KA".to_string(),
                    district: "North".to_string(),
                },
            );
        }
        Op::RegisterProperty(i) => {
            let _ = state.register_property(
                &identity(*i),
                NewProperty {
                    address: "12 Canal Road".to_string(),
                    district: "North".to_string(),
                    state: "KA".to_string(),
                    area: 1000,
                    kind: PropertyKind::Land,
                    survey_number: "SRV-1".to_string(),
                    subdivision: "A".to_string(),
                    document: ContentRef::new("doc://deed"),
                },
            );
        }
        Op::RequestVerification {
            owner,
            property,
            offered,
        } => {
            let _ = state.request_property_verification(
                &identity(*owner),
                PropertyId(*property),
                Decimal::new(*offered, 0),
            );
        }
        Op::ResolveVerification { request, approve } => {
            let _ = state.verify_property(
                &official_identity(),
                VerificationId(*request),
                &employee(),
                *approve,
                None,
            );
        }
        Op::CreateTransfer { from, to, property } => {
            let _ = state.create_transfer_request(
                &identity(*from),
                PropertyId(*property),
                identity(*to),
                ContentRef::new("doc://transfer"),
                Decimal::new(TRANSFER_FEE, 0),
            );
        }
        Op::ApproveTransfer { request } => {
            let _ = state.approve_transfer_request(
                &official_identity(),
                TransferId(*request),
                &employee(),
            );
        }
        Op::CompleteTransfer {
            request,
            by_recipient,
        } => {
            if let Ok(transfer) = state.transfer_request(TransferId(*request)) {
                let caller = if *by_recipient { transfer.to } else { transfer.from };
                let _ = state.complete_transfer(&caller, TransferId(*request));
            }
        }
        Op::Withdraw => {
            let _ = state.withdraw_fees(&registrar());
        }
    }
}

proptest! {
    #[test]
    fn escrow_accounting_holds(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut state = seeded_state();
        for op in &ops {
            apply(&mut state, op);

            let totals = state.fee_totals();
            prop_assert!(totals.escrow_balance >= Decimal::ZERO);
            prop_assert_eq!(
                totals.escrow_balance,
                totals.collected_verification + totals.collected_transfer
                    - totals.total_withdrawn
            );
        }
    }

    #[test]
    fn owner_index_partitions_properties(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut state = seeded_state();
        for op in &ops {
            apply(&mut state, op);
        }

        // Every registered property appears exactly once, in its owner's
        // index and nobody else's.
        let mut id = 1u64;
        while let Ok(property) = state.property(PropertyId(id)) {
            for i in 0..OWNER_POOL {
                let index = state.owner_properties(&identity(i));
                let hits = index.iter().filter(|p| **p == property.id).count();
                if identity(i) == property.owner {
                    prop_assert_eq!(hits, 1, "owner index must hold its property once");
                } else {
                    prop_assert_eq!(hits, 0, "property leaked into a stranger's index");
                }
            }
            id += 1;
        }
    }

    #[test]
    fn property_ids_are_dense(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut state = seeded_state();
        for op in &ops {
            apply(&mut state, op);
        }

        // Count successes by probing; ids must have no holes.
        let mut id = 1u64;
        while state.property(PropertyId(id)).is_ok() {
            id += 1;
        }
        // Nothing past the first gap
        prop_assert!(state.property(PropertyId(id + 1)).is_err());
    }

    #[test]
    fn resolved_requests_stay_resolved(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut state = seeded_state();
        for op in &ops {
            apply(&mut state, op);
        }

        let mut id = 1u64;
        while let Ok(request) = state.verification_request(VerificationId(id)) {
            if request.status.is_resolved() {
                let err = state
                    .verify_property(
                        &official_identity(),
                        VerificationId(id),
                        &employee(),
                        true,
                        None,
                    )
                    .unwrap_err();
                prop_assert_eq!(err.kind(), "already_resolved");
            }
            id += 1;
        }
    }
}
