//! Auth gate: credentials, registration and lockout.
//!
//! Failed logins are counted per account (lower-cased email), not through a
//! shared counter. Reaching the attempt limit locks that email for the
//! configured duration and appends one [`SecurityAlert`]. Lockouts are
//! evaluated lazily against the `now` passed in; there is no timer.
//! Failure state idle for longer than the lockout window is pruned on the
//! next failed attempt, so the map only holds recently active emails.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use proplay_types::{
    AlertId, AlertStatus, PasswordDigest, ProplayError, Result, SecurityAlert, UserId,
    WalletConfig, normalize_email,
};
use rust_decimal::Decimal;

use crate::{Ledger, NewAccount};

/// Sign-up form fields. All are required.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// Failure state for one email.
#[derive(Debug, Clone, Copy, Default)]
struct LoginGuard {
    failures: u32,
    last_failure: DateTime<Utc>,
    locked_until: Option<DateTime<Utc>>,
}

impl LoginGuard {
    /// Neither locked nor failed within `window` of `now`.
    fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        let locked = self.locked_until.is_some_and(|until| now < until);
        !locked && now - self.last_failure >= window
    }
}

/// Validates credentials against the ledger and enforces lockouts.
#[derive(Debug)]
pub struct AuthGate {
    /// `email → failure state`
    guards: HashMap<String, LoginGuard>,
    /// Lockout events, oldest first.
    alerts: Vec<SecurityAlert>,
    max_attempts: u32,
    lockout: Duration,
}

impl AuthGate {
    /// Create a gate locking after `max_attempts` failures for `lockout`.
    #[must_use]
    pub fn new(max_attempts: u32, lockout: Duration) -> Self {
        Self {
            guards: HashMap::new(),
            alerts: Vec::new(),
            max_attempts,
            lockout,
        }
    }

    #[must_use]
    pub fn from_config(config: &WalletConfig) -> Self {
        Self::new(config.max_login_attempts, config.lockout_duration())
    }

    /// Restore persisted alerts.
    #[must_use]
    pub fn with_alerts(mut self, alerts: Vec<SecurityAlert>) -> Self {
        self.alerts = alerts;
        self
    }

    /// Log in at the current time.
    pub fn login(&mut self, ledger: &Ledger, email: &str, password: &str) -> Result<UserId> {
        self.login_at(ledger, email, password, Utc::now())
    }

    /// Log in as of `now`.
    ///
    /// # Errors
    /// - `AccountLocked` while the email is locked out, and on the attempt
    ///   that triggers the lockout
    /// - `InvalidCredentials` for any other mismatch
    pub fn login_at(
        &mut self,
        ledger: &Ledger,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<UserId> {
        let key = normalize_email(email);
        if let Some(until) = self.active_lock(&key, now) {
            return Err(ProplayError::AccountLocked { email: key, until });
        }

        let verified = ledger
            .user_by_email(&key)
            .filter(|u| u.password.as_ref().is_some_and(|p| p.verify(password)))
            .map(|u| u.id);

        match verified {
            Some(user_id) => {
                self.guards.remove(&key);
                tracing::info!(user = %user_id, "Login succeeded");
                Ok(user_id)
            }
            None => Err(self.record_failure(key, now)),
        }
    }

    /// Create a non-admin account credited with `starting_balance`.
    ///
    /// # Errors
    /// - `InvalidRequest` if a field is blank or the email is malformed
    /// - `EmailAlreadyExists` if the email is taken (case-insensitive)
    pub fn register(
        &mut self,
        ledger: &mut Ledger,
        form: Registration,
        starting_balance: Decimal,
    ) -> Result<UserId> {
        let Registration {
            name,
            email,
            password,
            phone,
        } = form;
        if [&name, &email, &password, &phone]
            .iter()
            .any(|f| f.trim().is_empty())
        {
            return Err(ProplayError::InvalidRequest {
                reason: "please fill in all fields".into(),
            });
        }
        if !email.contains('@') {
            return Err(ProplayError::InvalidRequest {
                reason: format!("malformed email: {email}"),
            });
        }

        let key = normalize_email(&email);
        let user_id = ledger.open_account(NewAccount {
            name,
            email: key.clone(),
            password: Some(PasswordDigest::hash(&password)?),
            phone: Some(phone.trim().to_string()),
            opening_balance: starting_balance,
            is_admin: false,
        })?;
        self.guards.remove(&key);

        tracing::info!(user = %user_id, "Account registered");
        Ok(user_id)
    }

    /// When the email's lockout ends, if it is locked at `now`.
    #[must_use]
    pub fn locked_until(&self, email: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.guards
            .get(&normalize_email(email))
            .and_then(|g| g.locked_until)
            .filter(|until| now < *until)
    }

    /// Consecutive failures recorded for the email since its last success
    /// or lockout.
    #[must_use]
    pub fn failed_attempts(&self, email: &str) -> u32 {
        self.guards.get(&normalize_email(email)).map_or(0, |g| g.failures)
    }

    /// Emails with failure or lock state currently held.
    #[must_use]
    pub fn tracked_accounts(&self) -> usize {
        self.guards.len()
    }

    /// All lockout alerts, oldest first.
    #[must_use]
    pub fn alerts(&self) -> &[SecurityAlert] {
        &self.alerts
    }

    /// Returns the lock expiry if still locked; forgets an expired lock.
    fn active_lock(&mut self, key: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let until = self.guards.get(key)?.locked_until?;
        if now < until {
            return Some(until);
        }
        self.guards.remove(key);
        None
    }

    fn record_failure(&mut self, key: String, now: DateTime<Utc>) -> ProplayError {
        self.prune_stale(now);
        let guard = self.guards.entry(key.clone()).or_default();
        guard.failures += 1;
        guard.last_failure = now;
        let attempts = guard.failures;

        if attempts < self.max_attempts {
            tracing::warn!(email = %key, attempts, max = self.max_attempts, "Login failed");
            return ProplayError::InvalidCredentials;
        }

        let until = now + self.lockout;
        guard.failures = 0;
        guard.locked_until = Some(until);

        let alert_email = if key.is_empty() { "Anonymous".to_string() } else { key.clone() };
        self.alerts.push(SecurityAlert {
            id: AlertId::new(),
            email: alert_email,
            timestamp: now,
            attempts,
            status: AlertStatus::Locked,
        });
        tracing::warn!(email = %key, attempts, %until, "Too many failed logins, account locked");
        ProplayError::AccountLocked { email: key, until }
    }

    fn prune_stale(&mut self, now: DateTime<Utc>) {
        let before = self.guards.len();
        let window = self.lockout;
        self.guards.retain(|_, g| !g.is_stale(now, window));
        let pruned = before - self.guards.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Dropped stale login guards");
        }
    }
}
