//! Error types for the registry

use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Registry errors
///
/// Three classes: authorization failures, state-machine violations, and
/// payment/identity violations. Every precondition is checked before any
/// mutation, so a returned error always means zero side effects.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The identity already has an owner record, or the employee id is taken
    #[error("already registered: {0}")]
    AlreadyRegistered(String),

    /// Caller lacks the privilege the operation requires
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Entity lookup failed
    #[error("not found: {0}")]
    NotFound(String),

    /// Property registration requires an existing owner record
    #[error("owner not registered: {0}")]
    OwnerNotRegistered(String),

    /// Caller is not the record's owner (document update)
    #[error("not the owner of {0}")]
    NotOwner(String),

    /// Caller is not the property's current owner (workflow entry)
    #[error("not the property owner of {0}")]
    NotPropertyOwner(String),

    /// The property is already verified
    #[error("property already verified: {0}")]
    AlreadyVerified(String),

    /// Offered amount is below the required fee
    #[error("insufficient fee: offered {offered}, required {required}")]
    InsufficientFee {
        /// Amount the caller offered
        offered: rust_decimal::Decimal,
        /// Fee the operation requires
        required: rust_decimal::Decimal,
    },

    /// The verification request has already been resolved
    #[error("verification request already resolved: {0}")]
    AlreadyResolved(String),

    /// The property is not verified/transferable
    #[error("property not transferable: {0}")]
    PropertyNotTransferable(String),

    /// Transfer recipient equals the current owner
    #[error("self transfer of {0}")]
    SelfTransfer(String),

    /// The transfer request is past the Requested state
    #[error("transfer request already approved: {0}")]
    AlreadyApproved(String),

    /// Completion requires a prior approval
    #[error("transfer not approved: {0}")]
    TransferNotApproved(String),

    /// The transfer request is already completed
    #[error("transfer already completed: {0}")]
    AlreadyCompleted(String),

    /// Actor mailbox or reply channel closed
    #[error("concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Stable label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::AlreadyRegistered(_) => "already_registered",
            Error::Unauthorized(_) => "unauthorized",
            Error::NotFound(_) => "not_found",
            Error::OwnerNotRegistered(_) => "owner_not_registered",
            Error::NotOwner(_) => "not_owner",
            Error::NotPropertyOwner(_) => "not_property_owner",
            Error::AlreadyVerified(_) => "already_verified",
            Error::InsufficientFee { .. } => "insufficient_fee",
            Error::AlreadyResolved(_) => "already_resolved",
            Error::PropertyNotTransferable(_) => "property_not_transferable",
            Error::SelfTransfer(_) => "self_transfer",
            Error::AlreadyApproved(_) => "already_approved",
            Error::TransferNotApproved(_) => "transfer_not_approved",
            Error::AlreadyCompleted(_) => "already_completed",
            Error::Concurrency(_) => "concurrency",
            Error::Config(_) => "config",
        }
    }
}
