//! Fee escrow accounting
//!
//! Fees are collected at workflow entry (pay-then-act, one atomic unit) and
//! held in escrow until the registrar withdraws. Invariant:
//! `escrow_balance == collected - withdrawn >= 0` at all times.

use crate::config::FeeConfig;
use crate::error::{Error, Result};
use crate::types::FeeTotals;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which workflow a fee was collected for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeKind {
    /// Property verification request fee
    Verification,
    /// Ownership transfer request fee
    Transfer,
}

/// Fee ledger: fixed fee amounts plus escrow accounting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeLedger {
    verification_fee: Decimal,
    transfer_fee: Decimal,
    collected_verification: Decimal,
    collected_transfer: Decimal,
    escrow_balance: Decimal,
    total_withdrawn: Decimal,
}

impl FeeLedger {
    /// Create from configured fee amounts
    pub fn new(fees: &FeeConfig) -> Self {
        Self {
            verification_fee: fees.verification_fee,
            transfer_fee: fees.transfer_fee,
            collected_verification: Decimal::ZERO,
            collected_transfer: Decimal::ZERO,
            escrow_balance: Decimal::ZERO,
            total_withdrawn: Decimal::ZERO,
        }
    }

    /// Fee required for the given workflow
    pub fn required(&self, kind: FeeKind) -> Decimal {
        match kind {
            FeeKind::Verification => self.verification_fee,
            FeeKind::Transfer => self.transfer_fee,
        }
    }

    /// Check the offered amount covers the fee, without collecting
    ///
    /// Split from [`collect`](Self::collect) so callers can run all
    /// precondition checks before any mutation.
    pub fn check(&self, kind: FeeKind, offered: Decimal) -> Result<()> {
        let required = self.required(kind);
        if offered < required {
            return Err(Error::InsufficientFee { offered, required });
        }
        Ok(())
    }

    /// Credit the offered amount into escrow
    ///
    /// Callers must have passed [`check`](Self::check) first. The full
    /// offered amount is kept, matching the pay-then-act contract.
    pub fn collect(&mut self, kind: FeeKind, offered: Decimal) {
        match kind {
            FeeKind::Verification => self.collected_verification += offered,
            FeeKind::Transfer => self.collected_transfer += offered,
        }
        self.escrow_balance += offered;
    }

    /// Drain the full escrow balance, returning the withdrawn amount
    ///
    /// Post-condition: `escrow_balance == 0`.
    pub fn withdraw_all(&mut self) -> Decimal {
        let amount = self.escrow_balance;
        self.escrow_balance = Decimal::ZERO;
        self.total_withdrawn += amount;
        amount
    }

    /// Current withdrawable balance
    pub fn escrow_balance(&self) -> Decimal {
        self.escrow_balance
    }

    /// Reporting snapshot
    pub fn totals(&self) -> FeeTotals {
        FeeTotals {
            collected_verification: self.collected_verification,
            collected_transfer: self.collected_transfer,
            escrow_balance: self.escrow_balance,
            total_withdrawn: self.total_withdrawn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> FeeLedger {
        FeeLedger::new(&FeeConfig {
            verification_fee: Decimal::new(100, 0),
            transfer_fee: Decimal::new(250, 0),
        })
    }

    #[test]
    fn test_check_rejects_underpayment() {
        let fees = ledger();
        let err = fees
            .check(FeeKind::Verification, Decimal::new(99, 0))
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientFee { .. }));
        // An under-paid check never mutated anything
        assert_eq!(fees.escrow_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_collect_and_withdraw() {
        let mut fees = ledger();
        fees.check(FeeKind::Verification, Decimal::new(100, 0)).unwrap();
        fees.collect(FeeKind::Verification, Decimal::new(100, 0));
        fees.check(FeeKind::Transfer, Decimal::new(250, 0)).unwrap();
        fees.collect(FeeKind::Transfer, Decimal::new(250, 0));

        assert_eq!(fees.escrow_balance(), Decimal::new(350, 0));

        let amount = fees.withdraw_all();
        assert_eq!(amount, Decimal::new(350, 0));
        assert_eq!(fees.escrow_balance(), Decimal::ZERO);

        let totals = fees.totals();
        assert_eq!(totals.total_withdrawn, Decimal::new(350, 0));
        assert_eq!(totals.collected_verification, Decimal::new(100, 0));
        assert_eq!(totals.collected_transfer, Decimal::new(250, 0));
    }

    #[test]
    fn test_overpayment_kept_in_escrow() {
        let mut fees = ledger();
        fees.check(FeeKind::Verification, Decimal::new(120, 0)).unwrap();
        fees.collect(FeeKind::Verification, Decimal::new(120, 0));
        assert_eq!(fees.escrow_balance(), Decimal::new(120, 0));
    }

    #[test]
    fn test_withdraw_empty_escrow() {
        let mut fees = ledger();
        assert_eq!(fees.withdraw_all(), Decimal::ZERO);
        assert_eq!(fees.totals().total_withdrawn, Decimal::ZERO);
    }
}
