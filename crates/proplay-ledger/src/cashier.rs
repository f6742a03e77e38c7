//! Cashier: the deposit / withdrawal workflow.
//!
//! Deposits are credited only when an admin approves them. Withdrawals are
//! debited optimistically the moment they are requested, so the user's
//! balance already reflects the pending payout; a rejection refunds it.
//!
//! ```text
//! request_deposit  → PENDING ─approve→ APPROVED (+amount)
//!                            └reject─→ REJECTED
//! request_withdraw → (−amount) PENDING ─approve→ APPROVED
//!                                      └reject─→ REJECTED (+amount)
//! ```

use std::collections::BTreeMap;

use chrono::Utc;
use proplay_types::{
    PaymentMethod, PaymentProof, ProplayError, Result, Transaction, TransactionId,
    TransactionKind, TransactionStatus, UserId, constants,
};
use rust_decimal::Decimal;

use crate::{Ledger, Resolution};

/// Pending-queue counters for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    pub pending: usize,
    pub pending_deposits: usize,
    pub pending_withdrawals: usize,
    pub pending_deposit_amount: Decimal,
    pub pending_withdraw_amount: Decimal,
}

/// Owns every cash request and drives its lifecycle against the [`Ledger`].
#[derive(Debug, Default)]
pub struct Cashier {
    /// All requests by id. UUIDv7 keys keep filing order.
    transactions: BTreeMap<TransactionId, Transaction>,
}

impl Cashier {
    /// Create an empty cashier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted requests.
    #[must_use]
    pub fn from_transactions(transactions: impl IntoIterator<Item = Transaction>) -> Self {
        Self {
            transactions: transactions.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    /// File a deposit. No balance change until approval.
    ///
    /// # Errors
    /// - `InvalidRequest` if `amount` is not in `(0, MAX_AMOUNT]` or `txn_id`
    ///   is blank
    /// - `UserNotFound` if the user doesn't exist
    pub fn request_deposit(
        &mut self,
        ledger: &Ledger,
        user_id: UserId,
        amount: Decimal,
        method: PaymentMethod,
        txn_id: &str,
    ) -> Result<TransactionId> {
        let proof = validate(amount, txn_id, "transaction id")?;
        ledger.user(user_id)?;

        let id = self.file(
            user_id,
            TransactionKind::Deposit,
            amount,
            method,
            PaymentProof::TxnId(proof),
        );
        tracing::info!(tx = %id, user = %user_id, %amount, %method, "Deposit requested");
        Ok(id)
    }

    /// File a withdrawal and debit it immediately.
    ///
    /// If the debit fails nothing is filed.
    ///
    /// # Errors
    /// - `InvalidRequest` if `amount` is not in `(0, MAX_AMOUNT]` or
    ///   `target_phone` is blank
    /// - `InsufficientBalance` if `amount` exceeds the balance
    /// - `UserNotFound` if the user doesn't exist
    pub fn request_withdraw(
        &mut self,
        ledger: &mut Ledger,
        user_id: UserId,
        amount: Decimal,
        method: PaymentMethod,
        target_phone: &str,
    ) -> Result<TransactionId> {
        let proof = validate(amount, target_phone, "target phone")?;
        ledger.debit(user_id, amount)?;

        let id = self.file(
            user_id,
            TransactionKind::Withdraw,
            amount,
            method,
            PaymentProof::TargetPhone(proof),
        );
        tracing::info!(tx = %id, user = %user_id, %amount, %method, "Withdrawal requested, balance debited");
        Ok(id)
    }

    /// Approve a pending request. Deposits are credited; withdrawals were
    /// already debited at request time.
    ///
    /// # Errors
    /// - `TransactionNotFound` if the id is unknown
    /// - `UserNotFound` if the owner of a deposit no longer exists
    /// - `InvalidRequest` if the credit would overflow the balance; the
    ///   request stays pending
    pub fn approve(&mut self, ledger: &mut Ledger, tx_id: TransactionId) -> Result<Resolution> {
        let tx = self
            .transactions
            .get_mut(&tx_id)
            .ok_or(ProplayError::TransactionNotFound(tx_id))?;
        if !tx.is_pending() {
            tracing::debug!(tx = %tx_id, status = %tx.status, "Approve ignored: already resolved");
            return Ok(Resolution::NoOp);
        }

        if tx.kind == TransactionKind::Deposit {
            ledger.credit(tx.user_id, tx.amount)?;
        }
        tx.resolve(TransactionStatus::Approved)?;

        tracing::info!(tx = %tx_id, kind = %tx.kind, user = %tx.user_id, amount = %tx.amount, "Transaction approved");
        Ok(Resolution::Applied)
    }

    /// Reject a pending request. Withdrawals are refunded; deposits were
    /// never credited.
    ///
    /// # Errors
    /// - `TransactionNotFound` if the id is unknown
    /// - `UserNotFound` if the owner of a withdrawal no longer exists
    pub fn reject(&mut self, ledger: &mut Ledger, tx_id: TransactionId) -> Result<Resolution> {
        let tx = self
            .transactions
            .get_mut(&tx_id)
            .ok_or(ProplayError::TransactionNotFound(tx_id))?;
        if !tx.is_pending() {
            tracing::debug!(tx = %tx_id, status = %tx.status, "Reject ignored: already resolved");
            return Ok(Resolution::NoOp);
        }

        if tx.kind == TransactionKind::Withdraw {
            ledger.credit(tx.user_id, tx.amount)?;
        }
        tx.resolve(TransactionStatus::Rejected)?;

        tracing::info!(tx = %tx_id, kind = %tx.kind, user = %tx.user_id, amount = %tx.amount, "Transaction rejected");
        Ok(Resolution::Applied)
    }

    /// Look up a request.
    #[must_use]
    pub fn get(&self, tx_id: &TransactionId) -> Option<&Transaction> {
        self.transactions.get(tx_id)
    }

    /// A user's requests, newest first.
    #[must_use]
    pub fn history(&self, user_id: UserId) -> Vec<&Transaction> {
        self.transactions
            .values()
            .rev()
            .filter(|t| t.user_id == user_id)
            .collect()
    }

    /// Requests awaiting review, oldest first.
    #[must_use]
    pub fn pending(&self) -> Vec<&Transaction> {
        self.transactions.values().filter(|t| t.is_pending()).collect()
    }

    /// Counters over the pending queue.
    #[must_use]
    pub fn queue_stats(&self) -> QueueStats {
        self.transactions
            .values()
            .filter(|t| t.is_pending())
            .fold(QueueStats::default(), |mut stats, t| {
                stats.pending += 1;
                match t.kind {
                    TransactionKind::Deposit => {
                        stats.pending_deposits += 1;
                        stats.pending_deposit_amount += t.amount;
                    }
                    TransactionKind::Withdraw => {
                        stats.pending_withdrawals += 1;
                        stats.pending_withdraw_amount += t.amount;
                    }
                }
                stats
            })
    }

    /// All requests in filing order.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.values()
    }

    /// Number of requests tracked.
    #[must_use]
    pub fn count(&self) -> usize {
        self.transactions.len()
    }

    fn file(
        &mut self,
        user_id: UserId,
        kind: TransactionKind,
        amount: Decimal,
        method: PaymentMethod,
        proof: PaymentProof,
    ) -> TransactionId {
        let id = TransactionId::new();
        self.transactions.insert(
            id,
            Transaction {
                id,
                user_id,
                kind,
                amount,
                method,
                status: TransactionStatus::Pending,
                proof,
                created_at: Utc::now(),
                resolved_at: None,
            },
        );
        id
    }
}

fn validate(amount: Decimal, proof: &str, field: &str) -> Result<String> {
    if amount <= Decimal::ZERO {
        return Err(ProplayError::InvalidRequest {
            reason: format!("amount must be positive, got {amount}"),
        });
    }
    if amount > Decimal::from(constants::MAX_AMOUNT) {
        return Err(ProplayError::InvalidRequest {
            reason: format!("amount {amount} exceeds the limit of {}", constants::MAX_AMOUNT),
        });
    }
    let proof = proof.trim();
    if proof.is_empty() {
        return Err(ProplayError::InvalidRequest {
            reason: format!("{field} is required"),
        });
    }
    Ok(proof.to_string())
}
