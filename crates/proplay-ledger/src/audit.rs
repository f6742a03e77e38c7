//! Supply conservation audit.
//!
//! Coins enter only through opening balances, approved deposits and match
//! payouts; they leave only through withdrawals and entry fees:
//! ```text
//! Σ balance == Σ opening + Σ approved deposits − Σ non-rejected withdrawals
//!              − Σ entry fees + Σ payouts
//! ```
//! A match the house won pays nothing, so its whole pool counts toward
//! `house_wins` instead of payouts.
//! A mismatch means a balance moved outside the cashier or match book.

use proplay_types::{ProplayError, Result, TransactionKind, TransactionStatus};
use rust_decimal::Decimal;

use crate::{Cashier, Ledger, MatchBook};

/// Totals behind one conservation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SupplyAudit {
    pub opening: Decimal,
    pub deposits: Decimal,
    pub withdrawals: Decimal,
    pub entry_fees: Decimal,
    pub payouts: Decimal,
    /// Platform cut retained from pools paid to a player.
    pub commission: Decimal,
    /// Pools kept whole because the house won.
    pub house_wins: Decimal,
    /// Sum of live balances.
    pub actual: Decimal,
}

impl SupplyAudit {
    /// Tally every flow recorded by the cashier and match book.
    ///
    /// `commission_rate` must be the rate the matches were settled at.
    #[must_use]
    pub fn compute(
        ledger: &Ledger,
        cashier: &Cashier,
        book: &MatchBook,
        commission_rate: Decimal,
    ) -> Self {
        let mut audit = Self {
            opening: ledger.total_opening_balance(),
            actual: ledger.total_balance(),
            ..Self::default()
        };

        for tx in cashier.transactions() {
            match (tx.kind, tx.status) {
                (TransactionKind::Deposit, TransactionStatus::Approved) => {
                    audit.deposits += tx.amount;
                }
                (TransactionKind::Withdraw, status) if status != TransactionStatus::Rejected => {
                    audit.withdrawals += tx.amount;
                }
                _ => {}
            }
        }

        for m in book.matches() {
            audit.entry_fees += m.entry_fee;
            if m.house_won() {
                audit.house_wins += m.total_pool;
            } else if m.is_completed() {
                let payout = m.net_payout(commission_rate);
                audit.payouts += payout;
                audit.commission += m.total_pool - payout;
            }
        }
        audit
    }

    /// Balance total implied by the recorded flows.
    #[must_use]
    pub fn expected(&self) -> Decimal {
        self.opening + self.deposits - self.withdrawals - self.entry_fees + self.payouts
    }

    /// # Errors
    /// Returns [`ProplayError::ConservationViolation`] if actual ≠ expected.
    pub fn verify(&self) -> Result<()> {
        let expected = self.expected();
        if self.actual != expected {
            return Err(ProplayError::ConservationViolation {
                reason: format!(
                    "actual supply {} != expected {expected} \
                     (opening={}, deposits={}, withdrawals={}, fees={}, payouts={})",
                    self.actual,
                    self.opening,
                    self.deposits,
                    self.withdrawals,
                    self.entry_fees,
                    self.payouts,
                ),
            });
        }
        Ok(())
    }
}

/// Compute and verify in one step.
///
/// # Errors
/// Returns [`ProplayError::ConservationViolation`] on mismatch.
pub fn verify_conservation(
    ledger: &Ledger,
    cashier: &Cashier,
    book: &MatchBook,
    commission_rate: Decimal,
) -> Result<SupplyAudit> {
    let audit = SupplyAudit::compute(ledger, cashier, book, commission_rate);
    if let Err(e) = audit.verify() {
        tracing::error!(error = %e, "Conservation check failed");
        return Err(e);
    }
    Ok(audit)
}
