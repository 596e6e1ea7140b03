//! Read-model reconstruction from audit events
//!
//! The projection folds events into owners, officials, properties, and
//! request states using only the fields the entries carry. It never reads
//! the live ledgers; equality between a projection and the live registry is
//! the acceptance test for the audit contract.

use crate::error::{ObserverError, Result};
use crate::verifier::verify_entries;
use registry_core::audit::{AuditEntry, AuditEvent};
use registry_core::types::{
    EmployeeId, Identity, Official, Owner, Property, PropertyId, TransferId, TransferRequest,
    TransferStatus, VerificationId, VerificationRequest, VerificationStatus,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Registry read model rebuilt purely from audit events
#[derive(Debug, Default)]
pub struct Projection {
    owners: HashMap<Identity, Owner>,
    officials: HashMap<EmployeeId, Official>,
    properties: BTreeMap<PropertyId, Property>,
    verifications: BTreeMap<VerificationId, VerificationRequest>,
    transfers: BTreeMap<TransferId, TransferRequest>,
    owner_index: HashMap<Identity, Vec<PropertyId>>,
    escrow_balance: Decimal,
    total_withdrawn: Decimal,
    applied: u64,
}

impl Projection {
    /// Empty projection
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify the chain, then fold every entry
    pub fn from_entries(entries: &[AuditEntry]) -> Result<Self> {
        verify_entries(entries)?;
        let mut projection = Self::new();
        for entry in entries {
            projection.apply(&entry.event)?;
        }
        Ok(projection)
    }

    /// Number of events folded so far
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Fold one event
    pub fn apply(&mut self, event: &AuditEvent) -> Result<()> {
        match event {
            AuditEvent::OwnerRegistered { owner } => {
                self.owner_index.entry(owner.identity.clone()).or_default();
                self.owners.insert(owner.identity.clone(), owner.clone());
            }

            AuditEvent::OwnerVerified { identity, .. } => {
                self.owner_mut(identity)?.verified = true;
            }

            AuditEvent::OfficialRegistered { official } => {
                self.officials
                    .insert(official.employee_id.clone(), official.clone());
            }

            AuditEvent::OfficialStatusChanged {
                employee_id,
                active,
            } => {
                self.officials
                    .get_mut(employee_id)
                    .ok_or_else(|| {
                        ObserverError::Inconsistent(format!("unseen official {}", employee_id))
                    })?
                    .active = *active;
            }

            AuditEvent::PropertyRegistered { property } => {
                self.owner_index
                    .entry(property.owner.clone())
                    .or_default()
                    .push(property.id);
                self.properties.insert(property.id, property.clone());
            }

            AuditEvent::DocumentUpdated {
                property_id,
                document,
            } => {
                self.property_mut(*property_id)?.document = document.clone();
            }

            AuditEvent::VerificationRequested { request } => {
                self.escrow_balance += request.fee_paid;
                self.property_mut(request.property_id)?.verification_fee_paid = true;
                self.verifications.insert(request.id, request.clone());
            }

            AuditEvent::VerificationResolved {
                request_id,
                property_id,
                approved,
                resolved_by,
                notes,
                resolved_at,
            } => {
                let request = self.verifications.get_mut(request_id).ok_or_else(|| {
                    ObserverError::Inconsistent(format!("unseen verification {}", request_id))
                })?;
                request.status = if *approved {
                    VerificationStatus::Approved
                } else {
                    VerificationStatus::Rejected
                };
                request.resolved_by = Some(resolved_by.clone());
                request.notes = notes.clone();
                request.resolved_at = Some(*resolved_at);

                if *approved {
                    let property = self.property_mut(*property_id)?;
                    property.verified = true;
                    property.transferable = true;
                }
            }

            AuditEvent::TransferRequested { request } => {
                self.escrow_balance += request.fee_paid;
                self.transfers.insert(request.id, request.clone());
            }

            AuditEvent::TransferApproved {
                request_id,
                approved_by,
                ..
            } => {
                let request = self.transfers.get_mut(request_id).ok_or_else(|| {
                    ObserverError::Inconsistent(format!("unseen transfer {}", request_id))
                })?;
                request.status = TransferStatus::Approved;
                request.approved_by = Some(approved_by.clone());
            }

            AuditEvent::TransferCompleted {
                request_id,
                property_id,
                from,
                to,
                completed_at,
            } => {
                let request = self.transfers.get_mut(request_id).ok_or_else(|| {
                    ObserverError::Inconsistent(format!("unseen transfer {}", request_id))
                })?;
                request.status = TransferStatus::Completed;
                request.completed_at = Some(*completed_at);

                let property = self.property_mut(*property_id)?;
                property.owner = to.clone();
                property.transfer_history.push(*request_id);
                property.last_transfer_at = Some(*completed_at);

                if let Some(ids) = self.owner_index.get_mut(from) {
                    ids.retain(|id| id != property_id);
                }
                self.owner_index
                    .entry(to.clone())
                    .or_default()
                    .push(*property_id);
            }

            AuditEvent::FeesWithdrawn {
                amount,
                total_withdrawn,
            } => {
                self.escrow_balance -= *amount;
                self.total_withdrawn = *total_withdrawn;
            }
        }

        self.applied += 1;
        tracing::trace!(event = event.label(), applied = self.applied, "projected");
        Ok(())
    }

    /// Reconstructed owner record
    pub fn owner(&self, identity: &Identity) -> Option<&Owner> {
        self.owners.get(identity)
    }

    /// Reconstructed official record
    pub fn official(&self, employee_id: &EmployeeId) -> Option<&Official> {
        self.officials.get(employee_id)
    }

    /// Reconstructed property record
    pub fn property(&self, id: PropertyId) -> Option<&Property> {
        self.properties.get(&id)
    }

    /// Reconstructed verification request
    pub fn verification_request(&self, id: VerificationId) -> Option<&VerificationRequest> {
        self.verifications.get(&id)
    }

    /// Reconstructed transfer request
    pub fn transfer_request(&self, id: TransferId) -> Option<&TransferRequest> {
        self.transfers.get(&id)
    }

    /// Reconstructed per-owner property index
    pub fn owner_properties(&self, identity: &Identity) -> Vec<PropertyId> {
        self.owner_index.get(identity).cloned().unwrap_or_default()
    }

    /// Reconstructed escrow balance
    pub fn escrow_balance(&self) -> Decimal {
        self.escrow_balance
    }

    /// Reconstructed all-time withdrawn total
    pub fn total_withdrawn(&self) -> Decimal {
        self.total_withdrawn
    }

    fn owner_mut(&mut self, identity: &Identity) -> Result<&mut Owner> {
        self.owners
            .get_mut(identity)
            .ok_or_else(|| ObserverError::Inconsistent(format!("unseen owner {}", identity)))
    }

    fn property_mut(&mut self, id: PropertyId) -> Result<&mut Property> {
        self.properties
            .get_mut(&id)
            .ok_or_else(|| ObserverError::Inconsistent(format!("unseen property {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_references_are_inconsistent() {
        let mut projection = Projection::new();
        let err = projection
            .apply(&AuditEvent::OwnerVerified {
                identity: Identity::new("0xghost"),
                verified_by: None,
            })
            .unwrap_err();
        assert!(matches!(err, ObserverError::Inconsistent(_)));

        let err = projection
            .apply(&AuditEvent::OfficialStatusChanged {
                employee_id: EmployeeId::new("EMP-404"),
                active: false,
            })
            .unwrap_err();
        assert!(matches!(err, ObserverError::Inconsistent(_)));
    }
}
