//! Single-writer actor serializing all registry operations
//!
//! Every public operation becomes one message through a bounded mailbox to
//! one actor task that owns [`RegistryState`]. Two racing conflicting calls
//! are applied in mailbox order; the loser fails its precondition check
//! against the winner's state (`AlreadyCompleted`, `AlreadyResolved`, ...)
//! instead of corrupting anything. A mutation and its audit entry happen
//! while the actor handles a single message, so no partial update is ever
//! observable.

use crate::audit::{AuditEvent, AuditLog};
use crate::error::{Error, Result};
use crate::metrics::Metrics;
use crate::state::RegistryState;
use crate::types::{
    ContentRef, EmployeeId, FeeTotals, Identity, IdDocument, NewOfficial, NewOwner, NewProperty,
    Official, Owner, Property, PropertyId, TransferId, TransferRequest, VerificationId,
    VerificationRequest,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Message sent to the registry actor
pub enum RegistryMessage {
    /// Register the caller as an owner
    RegisterOwner {
        /// Calling identity
        caller: Identity,
        /// Owner record fields
        new: NewOwner,
        /// Reply channel
        reply: oneshot::Sender<Result<()>>,
    },
    /// Verify an owner's identity
    VerifyOwner {
        /// Calling identity (verifier privilege required)
        caller: Identity,
        /// Owner to verify
        identity: Identity,
        /// Reply channel
        reply: oneshot::Sender<Result<()>>,
    },
    /// Register an official (registrar only)
    RegisterOfficial {
        /// Calling identity
        caller: Identity,
        /// Official record fields
        new: NewOfficial,
        /// Reply channel
        reply: oneshot::Sender<Result<()>>,
    },
    /// Toggle an official's active flag (registrar only)
    SetOfficialStatus {
        /// Calling identity
        caller: Identity,
        /// Employee id
        employee_id: EmployeeId,
        /// New active flag
        active: bool,
        /// Reply channel
        reply: oneshot::Sender<Result<()>>,
    },
    /// Register a property to the calling owner
    RegisterProperty {
        /// Calling identity
        caller: Identity,
        /// Property record fields
        new: NewProperty,
        /// Reply channel
        reply: oneshot::Sender<Result<PropertyId>>,
    },
    /// Replace a property's document reference
    UpdatePropertyDocument {
        /// Calling identity
        caller: Identity,
        /// Property id
        property_id: PropertyId,
        /// New content reference
        document: ContentRef,
        /// Reply channel
        reply: oneshot::Sender<Result<()>>,
    },
    /// Open a verification request
    RequestPropertyVerification {
        /// Calling identity
        caller: Identity,
        /// Property id
        property_id: PropertyId,
        /// Offered fee amount
        offered: Decimal,
        /// Reply channel
        reply: oneshot::Sender<Result<VerificationId>>,
    },
    /// Resolve a verification request
    VerifyProperty {
        /// Calling identity
        caller: Identity,
        /// Request id
        request_id: VerificationId,
        /// Resolving official
        employee_id: EmployeeId,
        /// Approve or reject
        approve: bool,
        /// Resolution notes
        notes: Option<String>,
        /// Reply channel
        reply: oneshot::Sender<Result<()>>,
    },
    /// Open a transfer request
    CreateTransferRequest {
        /// Calling identity
        caller: Identity,
        /// Property id
        property_id: PropertyId,
        /// Recipient
        to: Identity,
        /// Transfer deed reference
        document: ContentRef,
        /// Offered fee amount
        offered: Decimal,
        /// Reply channel
        reply: oneshot::Sender<Result<TransferId>>,
    },
    /// Approve a transfer request
    ApproveTransferRequest {
        /// Calling identity
        caller: Identity,
        /// Request id
        request_id: TransferId,
        /// Approving official
        employee_id: EmployeeId,
        /// Reply channel
        reply: oneshot::Sender<Result<()>>,
    },
    /// Complete an approved transfer
    CompleteTransfer {
        /// Calling identity (either party)
        caller: Identity,
        /// Request id
        request_id: TransferId,
        /// Reply channel
        reply: oneshot::Sender<Result<()>>,
    },
    /// Drain the escrow balance (registrar only)
    WithdrawFees {
        /// Calling identity
        caller: Identity,
        /// Reply channel carries the withdrawn amount
        reply: oneshot::Sender<Result<Decimal>>,
    },
    /// Property record by id
    GetProperty {
        /// Property id
        id: PropertyId,
        /// Reply channel
        reply: oneshot::Sender<Result<Property>>,
    },
    /// Owner record by identity
    GetOwner {
        /// Owner identity
        identity: Identity,
        /// Reply channel
        reply: oneshot::Sender<Result<Owner>>,
    },
    /// Official record by employee id
    GetOfficial {
        /// Employee id
        employee_id: EmployeeId,
        /// Reply channel
        reply: oneshot::Sender<Result<Official>>,
    },
    /// Verification request by id
    GetVerificationRequest {
        /// Request id
        id: VerificationId,
        /// Reply channel
        reply: oneshot::Sender<Result<VerificationRequest>>,
    },
    /// Transfer request by id
    GetTransferRequest {
        /// Request id
        id: TransferId,
        /// Reply channel
        reply: oneshot::Sender<Result<TransferRequest>>,
    },
    /// Property ids owned by an identity
    GetOwnerProperties {
        /// Owner identity
        identity: Identity,
        /// Reply channel
        reply: oneshot::Sender<Result<Vec<PropertyId>>>,
    },
    /// Unresolved verification requests
    GetPendingVerifications {
        /// Reply channel
        reply: oneshot::Sender<Result<Vec<VerificationRequest>>>,
    },
    /// Unapproved transfer requests
    GetPendingTransfers {
        /// Reply channel
        reply: oneshot::Sender<Result<Vec<TransferRequest>>>,
    },
    /// Completed transfer ids for a property
    GetTransferHistory {
        /// Property id
        id: PropertyId,
        /// Reply channel
        reply: oneshot::Sender<Result<Vec<TransferId>>>,
    },
    /// Property ids in a (state, district)
    SearchByLocation {
        /// State
        state: String,
        /// District
        district: String,
        /// Reply channel
        reply: oneshot::Sender<Result<Vec<PropertyId>>>,
    },
    /// Property ids owned by the holder of an id document
    SearchByIdDocument {
        /// Id document
        id_document: IdDocument,
        /// Reply channel
        reply: oneshot::Sender<Result<Vec<PropertyId>>>,
    },
    /// Fee ledger snapshot
    GetFeeTotals {
        /// Reply channel
        reply: oneshot::Sender<Result<FeeTotals>>,
    },
    /// Shut the actor down
    Shutdown,
}

// Reply senders carry no useful debug output; the variant name is enough.
impl std::fmt::Debug for RegistryMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RegistryMessage::RegisterOwner { .. } => "RegisterOwner",
            RegistryMessage::VerifyOwner { .. } => "VerifyOwner",
            RegistryMessage::RegisterOfficial { .. } => "RegisterOfficial",
            RegistryMessage::SetOfficialStatus { .. } => "SetOfficialStatus",
            RegistryMessage::RegisterProperty { .. } => "RegisterProperty",
            RegistryMessage::UpdatePropertyDocument { .. } => "UpdatePropertyDocument",
            RegistryMessage::RequestPropertyVerification { .. } => "RequestPropertyVerification",
            RegistryMessage::VerifyProperty { .. } => "VerifyProperty",
            RegistryMessage::CreateTransferRequest { .. } => "CreateTransferRequest",
            RegistryMessage::ApproveTransferRequest { .. } => "ApproveTransferRequest",
            RegistryMessage::CompleteTransfer { .. } => "CompleteTransfer",
            RegistryMessage::WithdrawFees { .. } => "WithdrawFees",
            RegistryMessage::GetProperty { .. } => "GetProperty",
            RegistryMessage::GetOwner { .. } => "GetOwner",
            RegistryMessage::GetOfficial { .. } => "GetOfficial",
            RegistryMessage::GetVerificationRequest { .. } => "GetVerificationRequest",
            RegistryMessage::GetTransferRequest { .. } => "GetTransferRequest",
            RegistryMessage::GetOwnerProperties { .. } => "GetOwnerProperties",
            RegistryMessage::GetPendingVerifications { .. } => "GetPendingVerifications",
            RegistryMessage::GetPendingTransfers { .. } => "GetPendingTransfers",
            RegistryMessage::GetTransferHistory { .. } => "GetTransferHistory",
            RegistryMessage::SearchByLocation { .. } => "SearchByLocation",
            RegistryMessage::SearchByIdDocument { .. } => "SearchByIdDocument",
            RegistryMessage::GetFeeTotals { .. } => "GetFeeTotals",
            RegistryMessage::Shutdown => "Shutdown",
        };
        f.write_str(name)
    }
}

/// Actor that owns the state and processes messages one at a time
pub struct RegistryActor {
    state: RegistryState,
    audit: Arc<AuditLog>,
    metrics: Metrics,
    mailbox: mpsc::Receiver<RegistryMessage>,
}

impl RegistryActor {
    /// Create new actor
    pub fn new(
        state: RegistryState,
        audit: Arc<AuditLog>,
        metrics: Metrics,
        mailbox: mpsc::Receiver<RegistryMessage>,
    ) -> Self {
        Self {
            state,
            audit,
            metrics,
            mailbox,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            if matches!(msg, RegistryMessage::Shutdown) {
                break;
            }
            self.handle_message(msg);
        }
        tracing::debug!("registry actor stopped");
    }

    /// Commit an accepted mutation: audit entry + metrics + log line
    fn commit(&self, op: &'static str, event: AuditEvent) {
        let entry = self.audit.append(event);
        self.metrics.audit_entries.inc();
        self.metrics.accepted.with_label_values(&[op]).inc();
        tracing::info!(op, sequence = entry.sequence, event = entry.event.label(), "accepted");
    }

    /// Record a rejected mutation
    fn reject(&self, op: &'static str, err: &Error) {
        self.metrics.rejected.with_label_values(&[op, err.kind()]).inc();
        tracing::warn!(op, kind = err.kind(), error = %err, "rejected");
    }

    fn handle_message(&mut self, msg: RegistryMessage) {
        match msg {
            RegistryMessage::RegisterOwner { caller, new, reply } => {
                let result = self.state.register_owner(&caller, new);
                let _ = reply.send(match result {
                    Ok(event) => {
                        self.commit("register_owner", event);
                        Ok(())
                    }
                    Err(err) => {
                        self.reject("register_owner", &err);
                        Err(err)
                    }
                });
            }

            RegistryMessage::VerifyOwner {
                caller,
                identity,
                reply,
            } => {
                let result = self.state.verify_owner(&caller, &identity);
                let _ = reply.send(match result {
                    Ok(Some(event)) => {
                        self.commit("verify_owner", event);
                        Ok(())
                    }
                    // Re-verification: deterministic no-op
                    Ok(None) => Ok(()),
                    Err(err) => {
                        self.reject("verify_owner", &err);
                        Err(err)
                    }
                });
            }

            RegistryMessage::RegisterOfficial { caller, new, reply } => {
                let result = self.state.register_official(&caller, new);
                let _ = reply.send(match result {
                    Ok(event) => {
                        self.commit("register_official", event);
                        Ok(())
                    }
                    Err(err) => {
                        self.reject("register_official", &err);
                        Err(err)
                    }
                });
            }

            RegistryMessage::SetOfficialStatus {
                caller,
                employee_id,
                active,
                reply,
            } => {
                let result = self.state.set_official_status(&caller, &employee_id, active);
                let _ = reply.send(match result {
                    Ok(event) => {
                        self.commit("set_official_status", event);
                        Ok(())
                    }
                    Err(err) => {
                        self.reject("set_official_status", &err);
                        Err(err)
                    }
                });
            }

            RegistryMessage::RegisterProperty { caller, new, reply } => {
                let result = self.state.register_property(&caller, new);
                let _ = reply.send(match result {
                    Ok((id, event)) => {
                        self.commit("register_property", event);
                        Ok(id)
                    }
                    Err(err) => {
                        self.reject("register_property", &err);
                        Err(err)
                    }
                });
            }

            RegistryMessage::UpdatePropertyDocument {
                caller,
                property_id,
                document,
                reply,
            } => {
                let result = self
                    .state
                    .update_property_document(&caller, property_id, document);
                let _ = reply.send(match result {
                    Ok(event) => {
                        self.commit("update_property_document", event);
                        Ok(())
                    }
                    Err(err) => {
                        self.reject("update_property_document", &err);
                        Err(err)
                    }
                });
            }

            RegistryMessage::RequestPropertyVerification {
                caller,
                property_id,
                offered,
                reply,
            } => {
                let result = self
                    .state
                    .request_property_verification(&caller, property_id, offered);
                let _ = reply.send(match result {
                    Ok((id, event)) => {
                        self.metrics
                            .fees_collected
                            .with_label_values(&["verification"])
                            .inc_by(decimal_to_f64(offered));
                        self.commit("request_property_verification", event);
                        Ok(id)
                    }
                    Err(err) => {
                        self.reject("request_property_verification", &err);
                        Err(err)
                    }
                });
            }

            RegistryMessage::VerifyProperty {
                caller,
                request_id,
                employee_id,
                approve,
                notes,
                reply,
            } => {
                let result =
                    self.state
                        .verify_property(&caller, request_id, &employee_id, approve, notes);
                let _ = reply.send(match result {
                    Ok(event) => {
                        self.commit("verify_property", event);
                        Ok(())
                    }
                    Err(err) => {
                        self.reject("verify_property", &err);
                        Err(err)
                    }
                });
            }

            RegistryMessage::CreateTransferRequest {
                caller,
                property_id,
                to,
                document,
                offered,
                reply,
            } => {
                let result = self
                    .state
                    .create_transfer_request(&caller, property_id, to, document, offered);
                let _ = reply.send(match result {
                    Ok((id, event)) => {
                        self.metrics
                            .fees_collected
                            .with_label_values(&["transfer"])
                            .inc_by(decimal_to_f64(offered));
                        self.commit("create_transfer_request", event);
                        Ok(id)
                    }
                    Err(err) => {
                        self.reject("create_transfer_request", &err);
                        Err(err)
                    }
                });
            }

            RegistryMessage::ApproveTransferRequest {
                caller,
                request_id,
                employee_id,
                reply,
            } => {
                let result = self
                    .state
                    .approve_transfer_request(&caller, request_id, &employee_id);
                let _ = reply.send(match result {
                    Ok(event) => {
                        self.commit("approve_transfer_request", event);
                        Ok(())
                    }
                    Err(err) => {
                        self.reject("approve_transfer_request", &err);
                        Err(err)
                    }
                });
            }

            RegistryMessage::CompleteTransfer {
                caller,
                request_id,
                reply,
            } => {
                let result = self.state.complete_transfer(&caller, request_id);
                let _ = reply.send(match result {
                    Ok(event) => {
                        self.commit("complete_transfer", event);
                        Ok(())
                    }
                    Err(err) => {
                        self.reject("complete_transfer", &err);
                        Err(err)
                    }
                });
            }

            RegistryMessage::WithdrawFees { caller, reply } => {
                let result = self.state.withdraw_fees(&caller);
                let _ = reply.send(match result {
                    Ok((amount, event)) => {
                        self.commit("withdraw_fees", event);
                        Ok(amount)
                    }
                    Err(err) => {
                        self.reject("withdraw_fees", &err);
                        Err(err)
                    }
                });
            }

            // Reads answer against the state the writer has fully applied;
            // a reader can never observe a mutation mid-flight.
            RegistryMessage::GetProperty { id, reply } => {
                let _ = reply.send(self.state.property(id));
            }
            RegistryMessage::GetOwner { identity, reply } => {
                let _ = reply.send(self.state.owner(&identity));
            }
            RegistryMessage::GetOfficial { employee_id, reply } => {
                let _ = reply.send(self.state.official(&employee_id));
            }
            RegistryMessage::GetVerificationRequest { id, reply } => {
                let _ = reply.send(self.state.verification_request(id));
            }
            RegistryMessage::GetTransferRequest { id, reply } => {
                let _ = reply.send(self.state.transfer_request(id));
            }
            RegistryMessage::GetOwnerProperties { identity, reply } => {
                let _ = reply.send(Ok(self.state.owner_properties(&identity)));
            }
            RegistryMessage::GetPendingVerifications { reply } => {
                let _ = reply.send(Ok(self.state.pending_verification_requests()));
            }
            RegistryMessage::GetPendingTransfers { reply } => {
                let _ = reply.send(Ok(self.state.pending_transfer_requests()));
            }
            RegistryMessage::GetTransferHistory { id, reply } => {
                let _ = reply.send(self.state.property_transfer_history(id));
            }
            RegistryMessage::SearchByLocation {
                state,
                district,
                reply,
            } => {
                let _ = reply.send(Ok(self.state.search_by_location(&state, &district)));
            }
            RegistryMessage::SearchByIdDocument { id_document, reply } => {
                let _ = reply.send(Ok(self.state.search_by_id_document(&id_document)));
            }
            RegistryMessage::GetFeeTotals { reply } => {
                let _ = reply.send(Ok(self.state.fee_totals()));
            }

            RegistryMessage::Shutdown => {
                // Handled in the run loop
            }
        }
    }
}

impl std::fmt::Debug for RegistryActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryActor")
            .field("state", &self.state)
            .field("audit_entries", &self.audit.len())
            .finish()
    }
}

fn decimal_to_f64(amount: Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    amount.to_f64().unwrap_or(0.0)
}

/// Handle for sending messages to the actor
#[derive(Clone, Debug)]
pub struct RegistryHandle {
    sender: mpsc::Sender<RegistryMessage>,
}

impl RegistryHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<RegistryMessage>) -> Self {
        Self { sender }
    }

    async fn call<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> RegistryMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::Concurrency("actor mailbox closed".to_string()))?;
        rx.await
            .map_err(|_| Error::Concurrency("reply channel closed".to_string()))?
    }

    /// Register the caller as an owner
    pub async fn register_owner(&self, caller: Identity, new: NewOwner) -> Result<()> {
        self.call(|reply| RegistryMessage::RegisterOwner { caller, new, reply })
            .await
    }

    /// Verify an owner's identity
    pub async fn verify_owner(&self, caller: Identity, identity: Identity) -> Result<()> {
        self.call(|reply| RegistryMessage::VerifyOwner {
            caller,
            identity,
            reply,
        })
        .await
    }

    /// Register an official (registrar only)
    pub async fn register_official(&self, caller: Identity, new: NewOfficial) -> Result<()> {
        self.call(|reply| RegistryMessage::RegisterOfficial { caller, new, reply })
            .await
    }

    /// Toggle an official's active flag (registrar only)
    pub async fn set_official_status(
        &self,
        caller: Identity,
        employee_id: EmployeeId,
        active: bool,
    ) -> Result<()> {
        self.call(|reply| RegistryMessage::SetOfficialStatus {
            caller,
            employee_id,
            active,
            reply,
        })
        .await
    }

    /// Register a property; returns the new id
    pub async fn register_property(&self, caller: Identity, new: NewProperty) -> Result<PropertyId> {
        self.call(|reply| RegistryMessage::RegisterProperty { caller, new, reply })
            .await
    }

    /// Replace a property's document reference
    pub async fn update_property_document(
        &self,
        caller: Identity,
        property_id: PropertyId,
        document: ContentRef,
    ) -> Result<()> {
        self.call(|reply| RegistryMessage::UpdatePropertyDocument {
            caller,
            property_id,
            document,
            reply,
        })
        .await
    }

    /// Open a verification request; returns the new id
    pub async fn request_property_verification(
        &self,
        caller: Identity,
        property_id: PropertyId,
        offered: Decimal,
    ) -> Result<VerificationId> {
        self.call(|reply| RegistryMessage::RequestPropertyVerification {
            caller,
            property_id,
            offered,
            reply,
        })
        .await
    }

    /// Resolve a verification request
    pub async fn verify_property(
        &self,
        caller: Identity,
        request_id: VerificationId,
        employee_id: EmployeeId,
        approve: bool,
        notes: Option<String>,
    ) -> Result<()> {
        self.call(|reply| RegistryMessage::VerifyProperty {
            caller,
            request_id,
            employee_id,
            approve,
            notes,
            reply,
        })
        .await
    }

    /// Open a transfer request; returns the new id
    pub async fn create_transfer_request(
        &self,
        caller: Identity,
        property_id: PropertyId,
        to: Identity,
        document: ContentRef,
        offered: Decimal,
    ) -> Result<TransferId> {
        self.call(|reply| RegistryMessage::CreateTransferRequest {
            caller,
            property_id,
            to,
            document,
            offered,
            reply,
        })
        .await
    }

    /// Approve a transfer request
    pub async fn approve_transfer_request(
        &self,
        caller: Identity,
        request_id: TransferId,
        employee_id: EmployeeId,
    ) -> Result<()> {
        self.call(|reply| RegistryMessage::ApproveTransferRequest {
            caller,
            request_id,
            employee_id,
            reply,
        })
        .await
    }

    /// Complete an approved transfer
    pub async fn complete_transfer(&self, caller: Identity, request_id: TransferId) -> Result<()> {
        self.call(|reply| RegistryMessage::CompleteTransfer {
            caller,
            request_id,
            reply,
        })
        .await
    }

    /// Drain the escrow balance; returns the withdrawn amount
    pub async fn withdraw_fees(&self, caller: Identity) -> Result<Decimal> {
        self.call(|reply| RegistryMessage::WithdrawFees { caller, reply })
            .await
    }

    /// Property record by id
    pub async fn property(&self, id: PropertyId) -> Result<Property> {
        self.call(|reply| RegistryMessage::GetProperty { id, reply })
            .await
    }

    /// Owner record by identity
    pub async fn owner(&self, identity: Identity) -> Result<Owner> {
        self.call(|reply| RegistryMessage::GetOwner { identity, reply })
            .await
    }

    /// Official record by employee id
    pub async fn official(&self, employee_id: EmployeeId) -> Result<Official> {
        self.call(|reply| RegistryMessage::GetOfficial { employee_id, reply })
            .await
    }

    /// Verification request by id
    pub async fn verification_request(&self, id: VerificationId) -> Result<VerificationRequest> {
        self.call(|reply| RegistryMessage::GetVerificationRequest { id, reply })
            .await
    }

    /// Transfer request by id
    pub async fn transfer_request(&self, id: TransferId) -> Result<TransferRequest> {
        self.call(|reply| RegistryMessage::GetTransferRequest { id, reply })
            .await
    }

    /// Property ids owned by an identity
    pub async fn owner_properties(&self, identity: Identity) -> Result<Vec<PropertyId>> {
        self.call(|reply| RegistryMessage::GetOwnerProperties { identity, reply })
            .await
    }

    /// Unresolved verification requests
    pub async fn pending_verification_requests(&self) -> Result<Vec<VerificationRequest>> {
        self.call(|reply| RegistryMessage::GetPendingVerifications { reply })
            .await
    }

    /// Unapproved transfer requests
    pub async fn pending_transfer_requests(&self) -> Result<Vec<TransferRequest>> {
        self.call(|reply| RegistryMessage::GetPendingTransfers { reply })
            .await
    }

    /// Completed transfer ids for a property
    pub async fn property_transfer_history(&self, id: PropertyId) -> Result<Vec<TransferId>> {
        self.call(|reply| RegistryMessage::GetTransferHistory { id, reply })
            .await
    }

    /// Property ids in a (state, district)
    pub async fn search_by_location(&self, state: String, district: String) -> Result<Vec<PropertyId>> {
        self.call(|reply| RegistryMessage::SearchByLocation {
            state,
            district,
            reply,
        })
        .await
    }

    /// Property ids owned by the holder of an id document
    pub async fn search_by_id_document(&self, id_document: IdDocument) -> Result<Vec<PropertyId>> {
        self.call(|reply| RegistryMessage::SearchByIdDocument { id_document, reply })
            .await
    }

    /// Fee ledger snapshot
    pub async fn fee_totals(&self) -> Result<FeeTotals> {
        self.call(|reply| RegistryMessage::GetFeeTotals { reply }).await
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(RegistryMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the registry actor
pub fn spawn_registry_actor(
    state: RegistryState,
    audit: Arc<AuditLog>,
    metrics: Metrics,
    mailbox_capacity: usize,
) -> RegistryHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity.max(1));
    let actor = RegistryActor::new(state, audit, metrics, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    RegistryHandle::new(tx)
}
