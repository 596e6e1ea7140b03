//! Append-only, hash-chained audit log
//!
//! Every accepted state change appends exactly one entry, inside the same
//! atomic unit as the change itself (the single-writer actor). The core never
//! reads the log back; it exists for external observers, which can either
//! replay the buffer or subscribe to the live broadcast. Each entry carries
//! the full resulting fields, so observers can reconstruct state without
//! re-reading the ledgers.

use crate::types::{
    ContentRef, EmployeeId, Identity, Official, Owner, Property, PropertyId, TransferId,
    TransferRequest, VerificationId, VerificationRequest,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

/// One accepted state transition, with enough fields to reconstruct the
/// resulting state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuditEvent {
    /// A new owner record was created
    OwnerRegistered {
        /// The record as stored
        owner: Owner,
    },
    /// An owner's verified flag flipped to true
    OwnerVerified {
        /// Owner identity
        identity: Identity,
        /// Verifier: employee id, or None when the registrar verified
        verified_by: Option<EmployeeId>,
    },
    /// A new official record was created
    OfficialRegistered {
        /// The record as stored
        official: Official,
    },
    /// An official's active flag was toggled
    OfficialStatusChanged {
        /// Employee id
        employee_id: EmployeeId,
        /// New active flag
        active: bool,
    },
    /// A new property record was created
    PropertyRegistered {
        /// The record as stored
        property: Property,
    },
    /// A property's document reference was replaced
    DocumentUpdated {
        /// Property id
        property_id: PropertyId,
        /// New content reference
        document: ContentRef,
    },
    /// A verification request was opened and its fee collected
    VerificationRequested {
        /// The request as stored
        request: VerificationRequest,
    },
    /// A verification request reached its terminal state
    VerificationResolved {
        /// Request id
        request_id: VerificationId,
        /// Property under verification
        property_id: PropertyId,
        /// Approved or rejected
        approved: bool,
        /// Resolving official
        resolved_by: EmployeeId,
        /// Resolution notes
        notes: Option<String>,
        /// Resolution timestamp
        resolved_at: DateTime<Utc>,
    },
    /// A transfer request was opened and its fee collected
    TransferRequested {
        /// The request as stored
        request: TransferRequest,
    },
    /// A transfer request was approved by an official
    TransferApproved {
        /// Request id
        request_id: TransferId,
        /// Property being transferred
        property_id: PropertyId,
        /// Approving official
        approved_by: EmployeeId,
    },
    /// Ownership was reassigned (terminal transfer state)
    TransferCompleted {
        /// Request id
        request_id: TransferId,
        /// Property id
        property_id: PropertyId,
        /// Previous owner
        from: Identity,
        /// New owner
        to: Identity,
        /// Completion timestamp
        completed_at: DateTime<Utc>,
    },
    /// The registrar drained the escrow balance
    FeesWithdrawn {
        /// Amount withdrawn
        amount: Decimal,
        /// Total withdrawn, all time, after this withdrawal
        total_withdrawn: Decimal,
    },
}

impl AuditEvent {
    /// Stable label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            AuditEvent::OwnerRegistered { .. } => "owner_registered",
            AuditEvent::OwnerVerified { .. } => "owner_verified",
            AuditEvent::OfficialRegistered { .. } => "official_registered",
            AuditEvent::OfficialStatusChanged { .. } => "official_status_changed",
            AuditEvent::PropertyRegistered { .. } => "property_registered",
            AuditEvent::DocumentUpdated { .. } => "document_updated",
            AuditEvent::VerificationRequested { .. } => "verification_requested",
            AuditEvent::VerificationResolved { .. } => "verification_resolved",
            AuditEvent::TransferRequested { .. } => "transfer_requested",
            AuditEvent::TransferApproved { .. } => "transfer_approved",
            AuditEvent::TransferCompleted { .. } => "transfer_completed",
            AuditEvent::FeesWithdrawn { .. } => "fees_withdrawn",
        }
    }
}

/// Immutable audit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry id (UUIDv7 for time-ordering)
    pub entry_id: Uuid,

    /// Dense sequence number, from 0
    pub sequence: u64,

    /// Entry timestamp
    pub recorded_at: DateTime<Utc>,

    /// Hash of the previous entry (all-zero for the first)
    pub prev_hash: [u8; 32],

    /// SHA-256 over (sequence, prev_hash, event)
    pub entry_hash: [u8; 32],

    /// The state transition itself
    pub event: AuditEvent,
}

/// Compute the chain hash for an entry
pub fn chain_hash(sequence: u64, prev_hash: &[u8; 32], event: &AuditEvent) -> [u8; 32] {
    use sha2::{Digest, Sha256};

    let payload =
        bincode::serialize(&(sequence, prev_hash, event)).expect("serialization cannot fail");
    let mut hasher = Sha256::new();
    hasher.update(&payload);
    hasher.finalize().into()
}

/// Append-only audit outbox
///
/// The replayable buffer is behind a `parking_lot` lock so observers read it
/// without going through the writer actor; the broadcast channel serves live
/// subscribers. Subscriber absence never affects the writer.
pub struct AuditLog {
    entries: RwLock<Vec<AuditEntry>>,
    live: broadcast::Sender<AuditEntry>,
}

impl AuditLog {
    /// Create an empty log
    pub fn new(broadcast_capacity: usize) -> Self {
        let (live, _) = broadcast::channel(broadcast_capacity.max(1));
        Self {
            entries: RwLock::new(Vec::new()),
            live,
        }
    }

    /// Append one event, chaining it to the previous entry
    ///
    /// Only the writer actor calls this, so sequences stay dense.
    pub fn append(&self, event: AuditEvent) -> AuditEntry {
        let mut entries = self.entries.write();

        let sequence = entries.len() as u64;
        let prev_hash = entries.last().map(|e| e.entry_hash).unwrap_or([0u8; 32]);
        let entry = AuditEntry {
            entry_id: Uuid::now_v7(),
            sequence,
            recorded_at: Utc::now(),
            prev_hash,
            entry_hash: chain_hash(sequence, &prev_hash, &event),
            event,
        };

        entries.push(entry.clone());
        drop(entries);

        tracing::debug!(sequence, event = entry.event.label(), "audit entry appended");

        // Lagging or absent subscribers are their own problem
        let _ = self.live.send(entry.clone());

        entry
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of all entries
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().clone()
    }

    /// Snapshot of entries with `sequence >= from`
    pub fn entries_from(&self, from: u64) -> Vec<AuditEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.sequence >= from)
            .cloned()
            .collect()
    }

    /// Subscribe to live entries
    pub fn subscribe(&self) -> broadcast::Receiver<AuditEntry> {
        self.live.subscribe()
    }

    /// Subscribe as a `Stream`
    pub fn stream(&self) -> BroadcastStream<AuditEntry> {
        BroadcastStream::new(self.live.subscribe())
    }

    /// Recompute the whole chain, returning the first broken sequence
    pub fn verify_chain(&self) -> std::result::Result<(), u64> {
        let entries = self.entries.read();
        let mut prev_hash = [0u8; 32];
        for (i, entry) in entries.iter().enumerate() {
            if entry.sequence != i as u64
                || entry.prev_hash != prev_hash
                || entry.entry_hash != chain_hash(entry.sequence, &entry.prev_hash, &entry.event)
            {
                return Err(i as u64);
            }
            prev_hash = entry.entry_hash;
        }
        Ok(())
    }
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog")
            .field("entries", &self.len())
            .finish()
    }
}
