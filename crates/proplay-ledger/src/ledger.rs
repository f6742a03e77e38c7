//! The ledger: users and their balances.
//!
//! Balances never go negative. A debit larger than the balance fails with
//! `InsufficientBalance` and leaves the ledger unchanged; there is no clamp.

use std::collections::BTreeMap;

use chrono::Utc;
use proplay_types::{PasswordDigest, ProplayError, Result, User, UserId, normalize_email};
use rust_decimal::Decimal;

/// Fields for a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: Option<PasswordDigest>,
    pub phone: Option<String>,
    pub opening_balance: Decimal,
    pub is_admin: bool,
}

/// Authoritative record of users and balances.
///
/// The [`crate::Cashier`] and [`crate::MatchBook`] call into it to move
/// funds; nothing else touches a balance.
#[derive(Debug, Default)]
pub struct Ledger {
    /// Users by id. UUIDv7 keys keep registration order.
    users: BTreeMap<UserId, User>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted users.
    #[must_use]
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
        }
    }

    /// Create an account. Emails are unique (case-insensitive) and stored
    /// lower-case.
    ///
    /// # Errors
    /// - `EmailAlreadyExists` if another account uses the email
    /// - `InvalidRequest` if the opening balance is negative
    pub fn open_account(&mut self, account: NewAccount) -> Result<UserId> {
        let email = normalize_email(&account.email);
        if self.user_by_email(&email).is_some() {
            return Err(ProplayError::EmailAlreadyExists { email });
        }
        if account.opening_balance < Decimal::ZERO {
            return Err(ProplayError::InvalidRequest {
                reason: "opening balance must not be negative".into(),
            });
        }

        let id = UserId::new();
        let user = User {
            id,
            name: account.name.trim().to_string(),
            email,
            password: account.password,
            phone: account.phone,
            balance: account.opening_balance,
            opening_balance: account.opening_balance,
            is_admin: account.is_admin,
            created_at: Utc::now(),
        };
        self.users.insert(id, user);
        Ok(id)
    }

    /// Apply `delta` to one user's balance. Returns the new balance.
    ///
    /// # Errors
    /// - `UserNotFound` if the user doesn't exist
    /// - `InsufficientBalance` if the result would be negative
    /// - `InvalidRequest` if the result is not representable
    pub fn adjust_balance(&mut self, user_id: UserId, delta: Decimal) -> Result<Decimal> {
        let user = self
            .users
            .get_mut(&user_id)
            .ok_or(ProplayError::UserNotFound(user_id))?;

        let next = user
            .balance
            .checked_add(delta)
            .ok_or_else(|| ProplayError::InvalidRequest {
                reason: format!("balance overflow applying {delta}"),
            })?;
        if next < Decimal::ZERO {
            return Err(ProplayError::InsufficientBalance {
                needed: -delta,
                available: user.balance,
            });
        }

        user.balance = next;
        tracing::debug!(user = %user_id, %delta, balance = %next, "Balance adjusted");
        Ok(next)
    }

    /// Add `amount` to a user's balance.
    pub fn credit(&mut self, user_id: UserId, amount: Decimal) -> Result<Decimal> {
        self.adjust_balance(user_id, amount)
    }

    /// Take `amount` from a user's balance.
    pub fn debit(&mut self, user_id: UserId, amount: Decimal) -> Result<Decimal> {
        self.adjust_balance(user_id, -amount)
    }

    /// Look up a user.
    pub fn user(&self, user_id: UserId) -> Result<&User> {
        self.users
            .get(&user_id)
            .ok_or(ProplayError::UserNotFound(user_id))
    }

    /// Find a user by email (case-insensitive).
    #[must_use]
    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.has_email(email))
    }

    /// A user's balance.
    pub fn balance(&self, user_id: UserId) -> Result<Decimal> {
        self.user(user_id).map(|u| u.balance)
    }

    /// All users in registration order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Sum of all balances.
    #[must_use]
    pub fn total_balance(&self) -> Decimal {
        self.users.values().map(|u| u.balance).sum()
    }

    /// Sum of all opening balances.
    #[must_use]
    pub fn total_opening_balance(&self) -> Decimal {
        self.users.values().map(|u| u.opening_balance).sum()
    }
}
