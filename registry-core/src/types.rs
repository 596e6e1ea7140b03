//! Core domain types for the registry
//!
//! All types are designed for:
//! - Deterministic serialization (bincode, for audit hashing)
//! - Exact arithmetic (Decimal for fees)
//! - Newtyped identifiers so callers cannot mix up key spaces

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque caller identity (address-like token)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    /// Create new identity
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Government-issued identity document reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdDocument(String);

impl IdDocument {
    /// Create new document reference
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Official's employee identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(String);

impl EmployeeId {
    /// Create new employee id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque content reference for an externally stored document or photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef(String);

impl ContentRef {
    /// Create new content reference
    pub fn new(r: impl Into<String>) -> Self {
        Self(r.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequential property id (dense, starts at 1)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PropertyId(pub u64);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Sequential verification request id
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VerificationId(pub u64);

impl fmt::Display for VerificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0)
    }
}

/// Sequential transfer request id
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TransferId(pub u64);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Registered property owner
///
/// Created once per identity, never deleted. Everything except the
/// `verified` flag is immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    /// Caller identity this record belongs to
    pub identity: Identity,
    /// Legal name
    pub name: String,
    /// Identity-document reference
    pub id_document: IdDocument,
    /// Contact info (email, phone, ...)
    pub contact: String,
    /// Home state
    pub state: String,
    /// Home district
    pub district: String,
    /// Set by a verifier, one-way false -> true
    pub verified: bool,
    /// Registration timestamp
    pub registered_at: DateTime<Utc>,
}

/// Input for [`crate::Registry::register_owner`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOwner {
    /// Legal name
    pub name: String,
    /// Identity-document reference
    pub id_document: IdDocument,
    /// Contact info
    pub contact: String,
    /// Home state
    pub state: String,
    /// Home district
    pub district: String,
}

/// Verifying official, keyed by employee id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Official {
    /// Globally unique, immutable employee identifier
    pub employee_id: EmployeeId,
    /// Caller identity the official signs in with
    pub identity: Identity,
    /// Name
    pub name: String,
    /// Department
    pub department: String,
    /// Jurisdiction state
    pub state: String,
    /// Jurisdiction district
    pub district: String,
    /// Toggled by the registrar; inactive officials hold no privilege
    pub active: bool,
    /// Registration timestamp
    pub registered_at: DateTime<Utc>,
}

/// Input for [`crate::Registry::register_official`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOfficial {
    /// Employee identifier
    pub employee_id: EmployeeId,
    /// Caller identity the official will use
    pub identity: Identity,
    /// Name
    pub name: String,
    /// Department
    pub department: String,
    /// Jurisdiction state
    pub state: String,
    /// Jurisdiction district
    pub district: String,
}

/// Property classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Bare land
    Land,
    /// Residential building
    Residential,
    /// Commercial building
    Commercial,
    /// Agricultural land
    Agricultural,
    /// Industrial site
    Industrial,
}

impl PropertyKind {
    /// Canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Land => "land",
            PropertyKind::Residential => "residential",
            PropertyKind::Commercial => "commercial",
            PropertyKind::Agricultural => "agricultural",
            PropertyKind::Industrial => "industrial",
        }
    }

    /// Parse from label
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "land" => Some(PropertyKind::Land),
            "residential" => Some(PropertyKind::Residential),
            "commercial" => Some(PropertyKind::Commercial),
            "agricultural" => Some(PropertyKind::Agricultural),
            "industrial" => Some(PropertyKind::Industrial),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Property record
///
/// `owner` mutates only through a completed transfer; `verified` and
/// `transferable` only through a resolved verification request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Sequential id
    pub id: PropertyId,
    /// Street address
    pub address: String,
    /// District
    pub district: String,
    /// State
    pub state: String,
    /// Area in square units
    pub area: u64,
    /// Classification
    pub kind: PropertyKind,
    /// Survey number
    pub survey_number: String,
    /// Sub-division within the survey number
    pub subdivision: String,
    /// Current owner identity
    pub owner: Identity,
    /// Deed/document content reference
    pub document: ContentRef,
    /// Always true once registered
    pub registered: bool,
    /// Set by an approved verification
    pub verified: bool,
    /// Set together with `verified`; gates transfer-request creation
    pub transferable: bool,
    /// Registration timestamp
    pub registered_at: DateTime<Utc>,
    /// Timestamp of the last completed transfer
    pub last_transfer_at: Option<DateTime<Utc>>,
    /// Whether a verification fee has been collected for this property
    pub verification_fee_paid: bool,
    /// Completed transfer request ids, append-only
    pub transfer_history: Vec<TransferId>,
}

/// Input for [`crate::Registry::register_property`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProperty {
    /// Street address
    pub address: String,
    /// District
    pub district: String,
    /// State
    pub state: String,
    /// Area in square units
    pub area: u64,
    /// Classification
    pub kind: PropertyKind,
    /// Survey number
    pub survey_number: String,
    /// Sub-division
    pub subdivision: String,
    /// Deed/document content reference
    pub document: ContentRef,
}

/// Verification request state machine: Pending -> {Approved, Rejected}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// Awaiting an official's resolution
    Pending,
    /// Approved; the property became verified and transferable
    Approved,
    /// Rejected; the property stays unverified
    Rejected,
}

impl VerificationStatus {
    /// Terminal states can never re-open
    pub fn is_resolved(&self) -> bool {
        !matches!(self, VerificationStatus::Pending)
    }
}

/// Fee-gated request to verify a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Sequential id
    pub id: VerificationId,
    /// Property under verification
    pub property_id: PropertyId,
    /// Owner who requested and paid
    pub requester: Identity,
    /// Request timestamp
    pub requested_at: DateTime<Utc>,
    /// Fee amount collected into escrow
    pub fee_paid: Decimal,
    /// State machine position
    pub status: VerificationStatus,
    /// Official who resolved the request
    pub resolved_by: Option<EmployeeId>,
    /// Resolution notes
    pub notes: Option<String>,
    /// Resolution timestamp
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Transfer request state machine: Requested -> Approved -> Completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    /// Created by the current owner, awaiting official approval
    Requested,
    /// Approved by an official, awaiting completion by either party
    Approved,
    /// Ownership reassigned (terminal)
    Completed,
}

/// Two-phase ownership transfer request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Sequential id
    pub id: TransferId,
    /// Property being transferred
    pub property_id: PropertyId,
    /// Current owner at request time
    pub from: Identity,
    /// Recipient
    pub to: Identity,
    /// Request timestamp
    pub requested_at: DateTime<Utc>,
    /// State machine position
    pub status: TransferStatus,
    /// Transfer deed content reference
    pub document: ContentRef,
    /// Fee amount collected into escrow
    pub fee_paid: Decimal,
    /// Official who approved the request
    pub approved_by: Option<EmployeeId>,
    /// Completion timestamp
    pub completed_at: Option<DateTime<Utc>>,
}

/// Snapshot of the fee ledger for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeTotals {
    /// Total verification fees collected, all time
    pub collected_verification: Decimal,
    /// Total transfer fees collected, all time
    pub collected_transfer: Decimal,
    /// Current withdrawable balance
    pub escrow_balance: Decimal,
    /// Total withdrawn by the registrar, all time
    pub total_withdrawn: Decimal,
}
