//! # Deposit / withdrawal requests
//!
//! Funds enter and leave the platform through manual mobile-money
//! verification. A user files a request, an admin checks the payment rail
//! and resolves it.
//!
//! ## State Machine
//!
//! ```text
//!   ┌─────────┐  approve   ┌──────────┐
//!   │ PENDING ├───────────▶│ APPROVED │
//!   └────┬────┘            └──────────┘
//!        │ reject
//!        ▼
//!   ┌──────────┐
//!   │ REJECTED │
//!   └──────────┘
//! ```
//!
//! Withdrawals debit the balance when *requested*; a rejection refunds.
//! Deposits credit only on approval.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{TransactionId, UserId};

/// Direction of a cash request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "DEPOSIT"),
            Self::Withdraw => write!(f, "WITHDRAW"),
        }
    }
}

/// Lifecycle status of a request.
///
/// Transitions happen at most once: `Pending → Approved | Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Awaiting admin review.
    Pending,
    /// Payment verified. Terminal.
    Approved,
    /// Payment refused. Terminal.
    Rejected,
}

impl TransactionStatus {
    /// Can a request in this status move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Pending, Self::Approved | Self::Rejected))
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Approved => write!(f, "APPROVED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Mobile-money rail used to move the funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "bKash")]
    BKash,
    #[serde(rename = "Nagad")]
    Nagad,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BKash => write!(f, "bKash"),
            Self::Nagad => write!(f, "Nagad"),
        }
    }
}

/// Evidence attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum PaymentProof {
    /// Deposits: the rail's transaction id, checked by the admin.
    TxnId(String),
    /// Withdrawals: the phone number to pay out to.
    TargetPhone(String),
}

/// A deposit or withdrawal request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Always positive.
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: TransactionStatus,
    pub proof: PaymentProof,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Transaction {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    /// Move to a terminal status.
    ///
    /// # Errors
    /// Returns `InvalidRequest` if the transition is not allowed; the
    /// workflow checks [`Transaction::is_pending`] first so this only fires
    /// on a logic error.
    pub fn resolve(&mut self, target: TransactionStatus) -> crate::Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(crate::ProplayError::InvalidRequest {
                reason: format!(
                    "Cannot transition {} from {} to {target}",
                    self.id, self.status
                ),
            });
        }
        self.status = target;
        self.resolved_at = Some(Utc::now());
        Ok(())
    }
}
