//! DeedRail Registry Core
//!
//! Role-gated registry of property ownership: owner and official identities,
//! property records, fee-gated verification and two-phase transfer
//! workflows, escrow accounting, and a hash-chained audit log.
//!
//! # Architecture
//!
//! - **Single writer**: one actor task owns all ledgers; every operation is
//!   one message, applied exactly once and atomically
//! - **Check before mutate**: a rejected operation has zero side effects
//! - **Audit outbox**: every accepted state change appends one chained
//!   entry, consumed by external observers, read by nothing in the core
//!
//! # Invariants
//!
//! - At most one owner record per identity, ever
//! - Property ids are dense and monotonically increasing from 1
//! - A property id lives in exactly one owner's index at any time
//! - Request resolution/completion are one-way transitions
//! - Escrow balance == fees collected - fees withdrawn >= 0

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod actor;
pub mod audit;
pub mod authz;
pub mod config;
pub mod error;
pub mod fees;
pub mod metrics;
pub mod registry;
pub mod state;
pub mod types;

// Re-exports
pub use audit::{AuditEntry, AuditEvent, AuditLog};
pub use config::Config;
pub use error::{Error, Result};
pub use registry::Registry;
pub use types::{
    ContentRef, EmployeeId, FeeTotals, Identity, IdDocument, NewOfficial, NewOwner, NewProperty,
    Official, Owner, Property, PropertyId, PropertyKind, TransferId, TransferRequest,
    TransferStatus, VerificationId, VerificationRequest, VerificationStatus,
};
