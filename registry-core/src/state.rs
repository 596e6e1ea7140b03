//! Registry state: the owned ledgers and every mutation over them
//!
//! All maps, indices, and counters live here, owned by the single writer.
//! Every mutation runs all its precondition checks before touching anything,
//! so a returned error always means zero observable side effects. Each
//! accepted mutation returns the [`AuditEvent`] describing it; the caller
//! (the actor) appends it to the audit log inside the same atomic unit.

use crate::audit::AuditEvent;
use crate::authz::{policy_from_config, ResolutionPolicy};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fees::{FeeKind, FeeLedger};
use crate::types::{
    ContentRef, EmployeeId, FeeTotals, Identity, IdDocument, NewOfficial, NewOwner, NewProperty,
    Official, Owner, Property, PropertyId, TransferId, TransferRequest, TransferStatus,
    VerificationId, VerificationRequest, VerificationStatus,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// The complete registry state behind the mutation gateway
pub struct RegistryState {
    registrar: Identity,
    policy: Box<dyn ResolutionPolicy>,

    // Identity ledger
    owners: HashMap<Identity, Owner>,
    owners_by_document: HashMap<IdDocument, Identity>,
    officials: HashMap<EmployeeId, Official>,
    officials_by_identity: HashMap<Identity, EmployeeId>,

    // Property ledger
    properties: BTreeMap<PropertyId, Property>,
    next_property_id: u64,
    owner_index: HashMap<Identity, Vec<PropertyId>>,
    location_index: HashMap<(String, String), Vec<PropertyId>>,

    // Workflows
    verifications: BTreeMap<VerificationId, VerificationRequest>,
    next_verification_id: u64,
    pending_verifications: Vec<VerificationId>,
    transfers: BTreeMap<TransferId, TransferRequest>,
    next_transfer_id: u64,
    pending_transfers: Vec<TransferId>,

    // Fee ledger
    fees: FeeLedger,
}

impl RegistryState {
    /// Create empty state from configuration
    pub fn new(config: &Config) -> Self {
        Self {
            registrar: Identity::new(config.registrar.clone()),
            policy: policy_from_config(&config.policy),
            owners: HashMap::new(),
            owners_by_document: HashMap::new(),
            officials: HashMap::new(),
            officials_by_identity: HashMap::new(),
            properties: BTreeMap::new(),
            next_property_id: 1,
            owner_index: HashMap::new(),
            location_index: HashMap::new(),
            verifications: BTreeMap::new(),
            next_verification_id: 1,
            pending_verifications: Vec::new(),
            transfers: BTreeMap::new(),
            next_transfer_id: 1,
            pending_transfers: Vec::new(),
            fees: FeeLedger::new(&config.fees),
        }
    }

    /// The privileged registrar identity
    pub fn registrar(&self) -> &Identity {
        &self.registrar
    }

    // ---------------------------------------------------------------------
    // Identity ledger
    // ---------------------------------------------------------------------

    /// Register the caller as an owner
    pub fn register_owner(&mut self, caller: &Identity, new: NewOwner) -> Result<AuditEvent> {
        if self.owners.contains_key(caller) {
            return Err(Error::AlreadyRegistered(caller.to_string()));
        }
        // The id-document index is one-to-one; a reused document would
        // silently shadow the earlier owner in search results.
        if self.owners_by_document.contains_key(&new.id_document) {
            return Err(Error::AlreadyRegistered(format!(
                "id document {}",
                new.id_document
            )));
        }

        let owner = Owner {
            identity: caller.clone(),
            name: new.name,
            id_document: new.id_document,
            contact: new.contact,
            state: new.state,
            district: new.district,
            verified: false,
            registered_at: Utc::now(),
        };

        self.owners_by_document
            .insert(owner.id_document.clone(), caller.clone());
        self.owner_index.entry(caller.clone()).or_default();
        self.owners.insert(caller.clone(), owner.clone());

        Ok(AuditEvent::OwnerRegistered { owner })
    }

    /// Mark an owner as identity-verified
    ///
    /// Re-verifying an already-verified owner is a deterministic no-op and
    /// returns `Ok(None)` (no state change, no audit entry).
    pub fn verify_owner(
        &mut self,
        caller: &Identity,
        identity: &Identity,
    ) -> Result<Option<AuditEvent>> {
        let verified_by = self.require_verifier(caller)?;

        let owner = self
            .owners
            .get_mut(identity)
            .ok_or_else(|| Error::NotFound(format!("owner {}", identity)))?;

        if owner.verified {
            return Ok(None);
        }
        owner.verified = true;

        Ok(Some(AuditEvent::OwnerVerified {
            identity: identity.clone(),
            verified_by,
        }))
    }

    /// Register a verifying official (registrar only)
    pub fn register_official(&mut self, caller: &Identity, new: NewOfficial) -> Result<AuditEvent> {
        self.require_registrar(caller)?;

        if self.officials.contains_key(&new.employee_id) {
            return Err(Error::AlreadyRegistered(new.employee_id.to_string()));
        }
        if self.officials_by_identity.contains_key(&new.identity) {
            return Err(Error::AlreadyRegistered(format!(
                "official identity {}",
                new.identity
            )));
        }

        let official = Official {
            employee_id: new.employee_id,
            identity: new.identity,
            name: new.name,
            department: new.department,
            state: new.state,
            district: new.district,
            active: true,
            registered_at: Utc::now(),
        };

        self.officials_by_identity
            .insert(official.identity.clone(), official.employee_id.clone());
        self.officials
            .insert(official.employee_id.clone(), official.clone());

        Ok(AuditEvent::OfficialRegistered { official })
    }

    /// Toggle an official's active flag (registrar only)
    pub fn set_official_status(
        &mut self,
        caller: &Identity,
        employee_id: &EmployeeId,
        active: bool,
    ) -> Result<AuditEvent> {
        self.require_registrar(caller)?;

        let official = self
            .officials
            .get_mut(employee_id)
            .ok_or_else(|| Error::NotFound(format!("official {}", employee_id)))?;
        official.active = active;

        Ok(AuditEvent::OfficialStatusChanged {
            employee_id: employee_id.clone(),
            active,
        })
    }

    // ---------------------------------------------------------------------
    // Property ledger
    // ---------------------------------------------------------------------

    /// Register a new property to the calling owner
    pub fn register_property(
        &mut self,
        caller: &Identity,
        new: NewProperty,
    ) -> Result<(PropertyId, AuditEvent)> {
        if !self.owners.contains_key(caller) {
            return Err(Error::OwnerNotRegistered(caller.to_string()));
        }

        let id = PropertyId(self.next_property_id);
        self.next_property_id += 1;

        let property = Property {
            id,
            address: new.address,
            district: new.district,
            state: new.state,
            area: new.area,
            kind: new.kind,
            survey_number: new.survey_number,
            subdivision: new.subdivision,
            owner: caller.clone(),
            document: new.document,
            registered: true,
            verified: false,
            transferable: false,
            registered_at: Utc::now(),
            last_transfer_at: None,
            verification_fee_paid: false,
            transfer_history: Vec::new(),
        };

        self.owner_index.entry(caller.clone()).or_default().push(id);
        self.location_index
            .entry((property.state.clone(), property.district.clone()))
            .or_default()
            .push(id);
        self.properties.insert(id, property.clone());

        Ok((id, AuditEvent::PropertyRegistered { property }))
    }

    /// Replace a property's document reference (current owner only)
    pub fn update_property_document(
        &mut self,
        caller: &Identity,
        property_id: PropertyId,
        document: ContentRef,
    ) -> Result<AuditEvent> {
        let property = self
            .properties
            .get_mut(&property_id)
            .ok_or_else(|| Error::NotFound(format!("property {}", property_id)))?;
        if property.owner != *caller {
            return Err(Error::NotOwner(property_id.to_string()));
        }

        property.document = document.clone();

        Ok(AuditEvent::DocumentUpdated {
            property_id,
            document,
        })
    }

    // ---------------------------------------------------------------------
    // Verification workflow
    // ---------------------------------------------------------------------

    /// Open a fee-gated verification request for the caller's property
    pub fn request_property_verification(
        &mut self,
        caller: &Identity,
        property_id: PropertyId,
        offered: Decimal,
    ) -> Result<(VerificationId, AuditEvent)> {
        // All checks before any mutation: an under-paid request must never
        // leave a dangling record or collected fee.
        let property = self
            .properties
            .get(&property_id)
            .ok_or_else(|| Error::NotFound(format!("property {}", property_id)))?;
        if property.owner != *caller {
            return Err(Error::NotPropertyOwner(property_id.to_string()));
        }
        if property.verified {
            return Err(Error::AlreadyVerified(property_id.to_string()));
        }
        self.fees.check(FeeKind::Verification, offered)?;

        self.fees.collect(FeeKind::Verification, offered);

        let id = VerificationId(self.next_verification_id);
        self.next_verification_id += 1;

        let request = VerificationRequest {
            id,
            property_id,
            requester: caller.clone(),
            requested_at: Utc::now(),
            fee_paid: offered,
            status: VerificationStatus::Pending,
            resolved_by: None,
            notes: None,
            resolved_at: None,
        };

        self.pending_verifications.push(id);
        self.verifications.insert(id, request.clone());
        if let Some(property) = self.properties.get_mut(&property_id) {
            property.verification_fee_paid = true;
        }

        Ok((id, AuditEvent::VerificationRequested { request }))
    }

    /// Resolve a pending verification request (verifier privilege)
    pub fn verify_property(
        &mut self,
        caller: &Identity,
        request_id: VerificationId,
        employee_id: &EmployeeId,
        approve: bool,
        notes: Option<String>,
    ) -> Result<AuditEvent> {
        let request = self
            .verifications
            .get(&request_id)
            .ok_or_else(|| Error::NotFound(format!("verification request {}", request_id)))?;
        if request.status.is_resolved() {
            return Err(Error::AlreadyResolved(request_id.to_string()));
        }
        let property_id = request.property_id;
        self.authorize_resolution(caller, employee_id, property_id)?;

        let resolved_at = Utc::now();
        let request = self
            .verifications
            .get_mut(&request_id)
            .expect("checked above");
        request.status = if approve {
            VerificationStatus::Approved
        } else {
            VerificationStatus::Rejected
        };
        request.resolved_by = Some(employee_id.clone());
        request.notes = notes.clone();
        request.resolved_at = Some(resolved_at);
        self.pending_verifications.retain(|id| *id != request_id);

        if approve {
            if let Some(property) = self.properties.get_mut(&property_id) {
                property.verified = true;
                property.transferable = true;
            }
        }

        Ok(AuditEvent::VerificationResolved {
            request_id,
            property_id,
            approved: approve,
            resolved_by: employee_id.clone(),
            notes,
            resolved_at,
        })
    }

    // ---------------------------------------------------------------------
    // Transfer workflow
    // ---------------------------------------------------------------------

    /// Open a fee-gated transfer request (current owner only)
    pub fn create_transfer_request(
        &mut self,
        caller: &Identity,
        property_id: PropertyId,
        to: Identity,
        document: ContentRef,
        offered: Decimal,
    ) -> Result<(TransferId, AuditEvent)> {
        let property = self
            .properties
            .get(&property_id)
            .ok_or_else(|| Error::NotFound(format!("property {}", property_id)))?;
        if property.owner != *caller {
            return Err(Error::NotPropertyOwner(property_id.to_string()));
        }
        if !property.verified || !property.transferable {
            return Err(Error::PropertyNotTransferable(property_id.to_string()));
        }
        if to == *caller {
            return Err(Error::SelfTransfer(property_id.to_string()));
        }
        self.fees.check(FeeKind::Transfer, offered)?;

        self.fees.collect(FeeKind::Transfer, offered);

        let id = TransferId(self.next_transfer_id);
        self.next_transfer_id += 1;

        let request = TransferRequest {
            id,
            property_id,
            from: caller.clone(),
            to,
            requested_at: Utc::now(),
            status: TransferStatus::Requested,
            document,
            fee_paid: offered,
            approved_by: None,
            completed_at: None,
        };

        self.pending_transfers.push(id);
        self.transfers.insert(id, request.clone());

        Ok((id, AuditEvent::TransferRequested { request }))
    }

    /// Approve a requested transfer (verifier privilege)
    pub fn approve_transfer_request(
        &mut self,
        caller: &Identity,
        request_id: TransferId,
        employee_id: &EmployeeId,
    ) -> Result<AuditEvent> {
        let request = self
            .transfers
            .get(&request_id)
            .ok_or_else(|| Error::NotFound(format!("transfer request {}", request_id)))?;
        if request.status != TransferStatus::Requested {
            return Err(Error::AlreadyApproved(request_id.to_string()));
        }
        let property_id = request.property_id;
        self.authorize_resolution(caller, employee_id, property_id)?;

        let request = self.transfers.get_mut(&request_id).expect("checked above");
        request.status = TransferStatus::Approved;
        request.approved_by = Some(employee_id.clone());
        self.pending_transfers.retain(|id| *id != request_id);

        Ok(AuditEvent::TransferApproved {
            request_id,
            property_id,
            approved_by: employee_id.clone(),
        })
    }

    /// Complete an approved transfer; callable by either party
    ///
    /// This is the only operation that reassigns a property's owner. Its
    /// sub-steps (owner field, both owner indexes, transfer history,
    /// last-transfer date, request status) apply as one unit; no partial
    /// state is ever visible outside the writer.
    pub fn complete_transfer(&mut self, caller: &Identity, request_id: TransferId) -> Result<AuditEvent> {
        let request = self
            .transfers
            .get(&request_id)
            .ok_or_else(|| Error::NotFound(format!("transfer request {}", request_id)))?;
        match request.status {
            TransferStatus::Requested => {
                return Err(Error::TransferNotApproved(request_id.to_string()))
            }
            TransferStatus::Completed => {
                return Err(Error::AlreadyCompleted(request_id.to_string()))
            }
            TransferStatus::Approved => {}
        }
        // The one relaxed authorization point: either side may finalize.
        if request.from != *caller && request.to != *caller {
            return Err(Error::Unauthorized(format!(
                "{} is neither party to {}",
                caller, request_id
            )));
        }
        let property = self
            .properties
            .get(&request.property_id)
            .ok_or_else(|| Error::NotFound(format!("property {}", request.property_id)))?;
        // A sibling request may have moved the property since this one was
        // approved; its approval no longer stands.
        if property.owner != request.from {
            return Err(Error::PropertyNotTransferable(format!(
                "{} changed owners since {}",
                request.property_id, request_id
            )));
        }

        let from = request.from.clone();
        let to = request.to.clone();
        let property_id = request.property_id;
        let completed_at = Utc::now();

        let property = self
            .properties
            .get_mut(&property_id)
            .expect("checked above");
        property.owner = to.clone();
        property.transfer_history.push(request_id);
        property.last_transfer_at = Some(completed_at);

        if let Some(ids) = self.owner_index.get_mut(&from) {
            ids.retain(|id| *id != property_id);
        }
        self.owner_index
            .entry(to.clone())
            .or_default()
            .push(property_id);

        let request = self.transfers.get_mut(&request_id).expect("checked above");
        request.status = TransferStatus::Completed;
        request.completed_at = Some(completed_at);

        Ok(AuditEvent::TransferCompleted {
            request_id,
            property_id,
            from,
            to,
            completed_at,
        })
    }

    // ---------------------------------------------------------------------
    // Fee ledger
    // ---------------------------------------------------------------------

    /// Drain the escrow balance (registrar only)
    pub fn withdraw_fees(&mut self, caller: &Identity) -> Result<(Decimal, AuditEvent)> {
        self.require_registrar(caller)?;

        let amount = self.fees.withdraw_all();
        let totals = self.fees.totals();

        Ok((
            amount,
            AuditEvent::FeesWithdrawn {
                amount,
                total_withdrawn: totals.total_withdrawn,
            },
        ))
    }

    // ---------------------------------------------------------------------
    // Reads (never mutate)
    // ---------------------------------------------------------------------

    /// Property record by id
    pub fn property(&self, id: PropertyId) -> Result<Property> {
        self.properties
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("property {}", id)))
    }

    /// Owner record by identity
    pub fn owner(&self, identity: &Identity) -> Result<Owner> {
        self.owners
            .get(identity)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("owner {}", identity)))
    }

    /// Official record by employee id
    pub fn official(&self, employee_id: &EmployeeId) -> Result<Official> {
        self.officials
            .get(employee_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("official {}", employee_id)))
    }

    /// Verification request by id
    pub fn verification_request(&self, id: VerificationId) -> Result<VerificationRequest> {
        self.verifications
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("verification request {}", id)))
    }

    /// Transfer request by id
    pub fn transfer_request(&self, id: TransferId) -> Result<TransferRequest> {
        self.transfers
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("transfer request {}", id)))
    }

    /// Property ids currently owned by the identity
    pub fn owner_properties(&self, identity: &Identity) -> Vec<PropertyId> {
        self.owner_index.get(identity).cloned().unwrap_or_default()
    }

    /// Unresolved verification requests, oldest first
    pub fn pending_verification_requests(&self) -> Vec<VerificationRequest> {
        self.pending_verifications
            .iter()
            .filter_map(|id| self.verifications.get(id).cloned())
            .collect()
    }

    /// Unapproved transfer requests, oldest first
    pub fn pending_transfer_requests(&self) -> Vec<TransferRequest> {
        self.pending_transfers
            .iter()
            .filter_map(|id| self.transfers.get(id).cloned())
            .collect()
    }

    /// Completed transfer ids for a property, oldest first
    pub fn property_transfer_history(&self, id: PropertyId) -> Result<Vec<TransferId>> {
        self.properties
            .get(&id)
            .map(|p| p.transfer_history.clone())
            .ok_or_else(|| Error::NotFound(format!("property {}", id)))
    }

    /// Property ids in a (state, district), via the write-time index
    pub fn search_by_location(&self, state: &str, district: &str) -> Vec<PropertyId> {
        self.location_index
            .get(&(state.to_string(), district.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Property ids owned by the holder of an id document
    ///
    /// Returns id lists only, never raw records: nothing about an unrelated
    /// owner leaks through a document lookup.
    pub fn search_by_id_document(&self, id_document: &IdDocument) -> Vec<PropertyId> {
        self.owners_by_document
            .get(id_document)
            .map(|identity| self.owner_properties(identity))
            .unwrap_or_default()
    }

    /// Fee ledger snapshot
    pub fn fee_totals(&self) -> FeeTotals {
        self.fees.totals()
    }

    /// Current escrow balance
    pub fn escrow_balance(&self) -> Decimal {
        self.fees.escrow_balance()
    }

    // ---------------------------------------------------------------------
    // Authorization helpers
    // ---------------------------------------------------------------------

    fn require_registrar(&self, caller: &Identity) -> Result<()> {
        if *caller != self.registrar {
            return Err(Error::Unauthorized(format!(
                "{} is not the registrar",
                caller
            )));
        }
        Ok(())
    }

    /// Verifier privilege: the registrar, or any active official calling
    /// with their registered identity. Returns the official's employee id,
    /// or `None` for the registrar.
    fn require_verifier(&self, caller: &Identity) -> Result<Option<EmployeeId>> {
        if *caller == self.registrar {
            return Ok(None);
        }
        let employee_id = self
            .officials_by_identity
            .get(caller)
            .ok_or_else(|| Error::Unauthorized(format!("{} holds no verifier privilege", caller)))?;
        let official = self
            .officials
            .get(employee_id)
            .ok_or_else(|| Error::Unauthorized(format!("{} holds no verifier privilege", caller)))?;
        if !official.active {
            return Err(Error::Unauthorized(format!(
                "official {} is inactive",
                employee_id
            )));
        }
        Ok(Some(employee_id.clone()))
    }

    /// Authorization for resolving a request against a property
    ///
    /// The presented employee id must name an active official; the caller
    /// must be that official (or the registrar, who bypasses the policy);
    /// the configured [`ResolutionPolicy`] must accept the pairing.
    fn authorize_resolution(
        &self,
        caller: &Identity,
        employee_id: &EmployeeId,
        property_id: PropertyId,
    ) -> Result<()> {
        let official = self
            .officials
            .get(employee_id)
            .ok_or_else(|| Error::Unauthorized(format!("unknown official {}", employee_id)))?;
        if !official.active {
            return Err(Error::Unauthorized(format!(
                "official {} is inactive",
                employee_id
            )));
        }
        if *caller == self.registrar {
            return Ok(());
        }
        if official.identity != *caller {
            return Err(Error::Unauthorized(format!(
                "{} is not official {}",
                caller, employee_id
            )));
        }
        let property = self
            .properties
            .get(&property_id)
            .ok_or_else(|| Error::NotFound(format!("property {}", property_id)))?;
        if !self.policy.may_resolve(official, property) {
            return Err(Error::Unauthorized(format!(
                "official {} may not resolve requests for {} under the {} policy",
                employee_id,
                property_id,
                self.policy.name()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for RegistryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryState")
            .field("owners", &self.owners.len())
            .field("officials", &self.officials.len())
            .field("properties", &self.properties.len())
            .field("verifications", &self.verifications.len())
            .field("transfers", &self.transfers.len())
            .field("policy", &self.policy.name())
            .finish()
    }
}
