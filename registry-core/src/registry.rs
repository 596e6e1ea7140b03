//! Main registry gateway
//!
//! Ties state, actor, audit log, and metrics together into the public API.
//! Callers hold a `Registry` (or clone its handle) and pass their identity
//! into every operation; nothing here is ambient or global.
//!
//! # Example
//!
//! ```no_run
//! use registry_core::{Config, Registry};
//! use registry_core::types::{Identity, NewOwner, IdDocument};
//!
//! #[tokio::main]
//! async fn main() -> registry_core::Result<()> {
//!     let registry = Registry::open(Config::default())?;
//!
//!     let alice = Identity::new("0xalice");
//!     registry
//!         .register_owner(&alice, NewOwner {
//!             name: "Alice".into(),
//!             id_document: IdDocument::new("ID123456"),
//!             contact: "alice@example.com".into(),
//!             state: "KA".into(),
//!             district: "North".into(),
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

use crate::actor::{spawn_registry_actor, RegistryHandle};
use crate::audit::AuditLog;
use crate::config::Config;
use crate::error::Result;
use crate::metrics::Metrics;
use crate::state::RegistryState;
use crate::types::{
    ContentRef, EmployeeId, FeeTotals, Identity, IdDocument, NewOfficial, NewOwner, NewProperty,
    Official, Owner, Property, PropertyId, TransferId, TransferRequest, VerificationId,
    VerificationRequest,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Role-gated registry of property ownership
#[derive(Clone)]
pub struct Registry {
    handle: RegistryHandle,
    audit: Arc<AuditLog>,
    metrics: Metrics,
    config: Config,
}

impl Registry {
    /// Open a registry with the given configuration
    pub fn open(config: Config) -> Result<Self> {
        let metrics = Metrics::new()
            .map_err(|e| crate::Error::Config(format!("metrics registration failed: {}", e)))?;
        let audit = Arc::new(AuditLog::new(config.audit.broadcast_capacity));
        let state = RegistryState::new(&config);

        tracing::info!(
            registrar = %config.registrar,
            verification_fee = %config.fees.verification_fee,
            transfer_fee = %config.fees.transfer_fee,
            jurisdiction_matching = config.policy.jurisdiction_matching,
            "opening registry"
        );

        let handle = spawn_registry_actor(
            state,
            audit.clone(),
            metrics.clone(),
            config.actor.mailbox_capacity,
        );

        Ok(Self {
            handle,
            audit,
            metrics,
            config,
        })
    }

    /// The audit log, for external observers
    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    /// Prometheus metrics, for scraping
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Configuration this registry was opened with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A cloneable low-level handle (same serialization guarantees)
    pub fn handle(&self) -> RegistryHandle {
        self.handle.clone()
    }

    // --- Identity ledger -------------------------------------------------

    /// Register the caller as an owner
    pub async fn register_owner(&self, caller: &Identity, new: NewOwner) -> Result<()> {
        self.handle.register_owner(caller.clone(), new).await
    }

    /// Mark an owner as identity-verified (verifier privilege)
    pub async fn verify_owner(&self, caller: &Identity, identity: &Identity) -> Result<()> {
        self.handle
            .verify_owner(caller.clone(), identity.clone())
            .await
    }

    /// Register a verifying official (registrar only)
    pub async fn register_official(&self, caller: &Identity, new: NewOfficial) -> Result<()> {
        self.handle.register_official(caller.clone(), new).await
    }

    /// Toggle an official's active flag (registrar only)
    pub async fn set_official_status(
        &self,
        caller: &Identity,
        employee_id: &EmployeeId,
        active: bool,
    ) -> Result<()> {
        self.handle
            .set_official_status(caller.clone(), employee_id.clone(), active)
            .await
    }

    // --- Property ledger -------------------------------------------------

    /// Register a property to the calling owner; returns its id
    pub async fn register_property(&self, caller: &Identity, new: NewProperty) -> Result<PropertyId> {
        self.handle.register_property(caller.clone(), new).await
    }

    /// Replace a property's document reference (current owner only)
    pub async fn update_property_document(
        &self,
        caller: &Identity,
        property_id: PropertyId,
        document: ContentRef,
    ) -> Result<()> {
        self.handle
            .update_property_document(caller.clone(), property_id, document)
            .await
    }

    // --- Verification workflow -------------------------------------------

    /// Open a fee-gated verification request; returns its id
    pub async fn request_property_verification(
        &self,
        caller: &Identity,
        property_id: PropertyId,
        offered: Decimal,
    ) -> Result<VerificationId> {
        self.handle
            .request_property_verification(caller.clone(), property_id, offered)
            .await
    }

    /// Resolve a pending verification request (verifier privilege)
    pub async fn verify_property(
        &self,
        caller: &Identity,
        request_id: VerificationId,
        employee_id: &EmployeeId,
        approve: bool,
        notes: Option<String>,
    ) -> Result<()> {
        self.handle
            .verify_property(caller.clone(), request_id, employee_id.clone(), approve, notes)
            .await
    }

    // --- Transfer workflow -----------------------------------------------

    /// Open a fee-gated transfer request; returns its id
    pub async fn create_transfer_request(
        &self,
        caller: &Identity,
        property_id: PropertyId,
        to: &Identity,
        document: ContentRef,
        offered: Decimal,
    ) -> Result<TransferId> {
        self.handle
            .create_transfer_request(caller.clone(), property_id, to.clone(), document, offered)
            .await
    }

    /// Approve a requested transfer (verifier privilege)
    pub async fn approve_transfer_request(
        &self,
        caller: &Identity,
        request_id: TransferId,
        employee_id: &EmployeeId,
    ) -> Result<()> {
        self.handle
            .approve_transfer_request(caller.clone(), request_id, employee_id.clone())
            .await
    }

    /// Complete an approved transfer (either party)
    pub async fn complete_transfer(&self, caller: &Identity, request_id: TransferId) -> Result<()> {
        self.handle.complete_transfer(caller.clone(), request_id).await
    }

    // --- Fee ledger ------------------------------------------------------

    /// Drain the escrow balance (registrar only); returns the amount
    pub async fn withdraw_fees(&self, caller: &Identity) -> Result<Decimal> {
        self.handle.withdraw_fees(caller.clone()).await
    }

    /// Fee ledger snapshot
    pub async fn fee_totals(&self) -> Result<FeeTotals> {
        self.handle.fee_totals().await
    }

    /// Current escrow balance
    pub async fn escrow_balance(&self) -> Result<Decimal> {
        Ok(self.handle.fee_totals().await?.escrow_balance)
    }

    // --- Reads -----------------------------------------------------------

    /// Property record by id
    pub async fn get_property_details(&self, id: PropertyId) -> Result<Property> {
        self.handle.property(id).await
    }

    /// Owner record by identity
    pub async fn get_owner_details(&self, identity: &Identity) -> Result<Owner> {
        self.handle.owner(identity.clone()).await
    }

    /// Official record by employee id
    pub async fn get_official_details(&self, employee_id: &EmployeeId) -> Result<Official> {
        self.handle.official(employee_id.clone()).await
    }

    /// Verification request by id
    pub async fn get_verification_request_details(
        &self,
        id: VerificationId,
    ) -> Result<VerificationRequest> {
        self.handle.verification_request(id).await
    }

    /// Transfer request by id
    pub async fn get_transfer_request_details(&self, id: TransferId) -> Result<TransferRequest> {
        self.handle.transfer_request(id).await
    }

    /// Property ids currently owned by an identity
    pub async fn get_owner_properties(&self, identity: &Identity) -> Result<Vec<PropertyId>> {
        self.handle.owner_properties(identity.clone()).await
    }

    /// Unresolved verification requests, oldest first
    pub async fn get_pending_verification_requests(&self) -> Result<Vec<VerificationRequest>> {
        self.handle.pending_verification_requests().await
    }

    /// Unapproved transfer requests, oldest first
    pub async fn get_pending_transfer_requests(&self) -> Result<Vec<TransferRequest>> {
        self.handle.pending_transfer_requests().await
    }

    /// Completed transfer ids for a property, oldest first
    pub async fn get_property_transfer_history(&self, id: PropertyId) -> Result<Vec<TransferId>> {
        self.handle.property_transfer_history(id).await
    }

    /// Property ids in a (state, district)
    pub async fn search_properties_by_location(
        &self,
        state: &str,
        district: &str,
    ) -> Result<Vec<PropertyId>> {
        self.handle
            .search_by_location(state.to_string(), district.to_string())
            .await
    }

    /// Property ids owned by the holder of an id document
    pub async fn search_properties_by_owner_id_document(
        &self,
        id_document: &IdDocument,
    ) -> Result<Vec<PropertyId>> {
        self.handle.search_by_id_document(id_document.clone()).await
    }

    /// Shutdown the registry
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("service", &self.config.service_name)
            .field("audit_entries", &self.audit.len())
            .finish()
    }
}
