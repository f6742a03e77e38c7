//! Account records.
//!
//! A user carries a single wallet balance. The balance is only ever changed
//! through the ledger, and every change is paired with a causing event
//! (deposit approval, withdrawal request/refund, match entry, match payout).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PasswordDigest, UserId};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email, stored lower-case.
    pub email: String,
    /// Salted password digest. Accounts without one cannot log in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<PasswordDigest>,
    /// Mobile-money phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Current spendable balance. Never negative.
    pub balance: Decimal,
    /// Balance the account was created with.
    #[serde(default)]
    pub opening_balance: Decimal,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether `email` names this account. Both sides are trimmed and
    /// Unicode lower-cased, matching how emails are stored.
    #[must_use]
    pub fn has_email(&self, email: &str) -> bool {
        normalize_email(&self.email) == normalize_email(email)
    }
}

/// Canonical form of an email: trimmed and lower-cased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A placeholder user for testing.
/// **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl User {
    /// Create a non-admin user with the given name and balance. The email is
    /// derived from the name and the password is `"password"`.
    pub fn dummy(name: &str, balance: Decimal) -> Self {
        Self {
            id: UserId::new(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            password: Some(PasswordDigest::hash("password").expect("hashing a fixed password")),
            phone: Some("01711111111".to_string()),
            balance,
            opening_balance: balance,
            is_admin: false,
            created_at: Utc::now(),
        }
    }
}
