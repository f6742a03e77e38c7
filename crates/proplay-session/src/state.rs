//! In-memory application state and its snapshot form.

use proplay_ledger::{AuthGate, Cashier, Ledger, MatchBook, NewAccount};
use proplay_types::{PasswordDigest, Result, Snapshot, UserId, WalletConfig, constants};

/// Everything a session mutates.
#[derive(Debug)]
pub struct AppState {
    pub ledger: Ledger,
    pub cashier: Cashier,
    pub book: MatchBook,
    pub gate: AuthGate,
    pub current_user: Option<UserId>,
}

impl AppState {
    /// Fresh state holding only the configured seed accounts.
    pub fn seeded(config: &WalletConfig) -> Result<Self> {
        let mut ledger = Ledger::new();
        for seed in &config.seed_accounts {
            let id = ledger.open_account(NewAccount {
                name: seed.name.clone(),
                email: seed.email.clone(),
                password: seed.password.as_deref().map(PasswordDigest::hash).transpose()?,
                phone: seed.phone.clone(),
                opening_balance: seed.balance,
                is_admin: seed.is_admin,
            })?;
            tracing::debug!(user = %id, admin = seed.is_admin, "Seed account created");
        }
        Ok(Self {
            ledger,
            cashier: Cashier::new(),
            book: MatchBook::new(),
            gate: AuthGate::from_config(config),
            current_user: None,
        })
    }

    /// Restore from a snapshot.
    ///
    /// A current user id that no longer resolves is dropped.
    ///
    /// # Errors
    /// `UnsupportedSnapshot` if the schema version is not this build's.
    pub fn from_snapshot(snapshot: Snapshot, config: &WalletConfig) -> Result<Self> {
        snapshot.check_version()?;
        let ledger = Ledger::from_users(snapshot.users);
        let current_user = snapshot
            .current_user_id
            .filter(|id| ledger.user(*id).is_ok());
        Ok(Self {
            ledger,
            cashier: Cashier::from_transactions(snapshot.transactions),
            book: MatchBook::from_matches(snapshot.matches),
            gate: AuthGate::from_config(config).with_alerts(snapshot.security_alerts),
            current_user,
        })
    }

    /// Capture the full persistent state. Lockout counters are not included.
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            schema_version: constants::SNAPSHOT_SCHEMA_VERSION,
            users: self.ledger.users().cloned().collect(),
            current_user_id: self.current_user,
            transactions: self.cashier.transactions().cloned().collect(),
            matches: self.book.matches().cloned().collect(),
            security_alerts: self.gate.alerts().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use proplay_types::{ProplayError, SeedAccount, User};
    use rust_decimal::Decimal;

    use super::*;

    fn admin_config() -> WalletConfig {
        WalletConfig {
            seed_accounts: vec![SeedAccount {
                name: "Admin".into(),
                email: "Admin@ProPlay.test".into(),
                password: Some("root".into()),
                phone: None,
                balance: Decimal::new(5000, 0),
                is_admin: true,
            }],
            ..WalletConfig::default()
        }
    }

    #[test]
    fn seeded_hashes_passwords() {
        let state = AppState::seeded(&admin_config()).unwrap();
        let admin = state.ledger.user_by_email("admin@proplay.test").unwrap();
        assert!(admin.is_admin);
        assert_eq!(admin.balance, Decimal::new(5000, 0));
        let digest = admin.password.as_ref().unwrap();
        assert_ne!(digest.as_str(), "root");
        assert!(digest.verify("root"));
    }

    #[test]
    fn default_config_seeds_nobody() {
        let state = AppState::seeded(&WalletConfig::default()).unwrap();
        assert!(state.ledger.is_empty());
    }

    #[test]
    fn snapshot_restores_state() {
        let mut state = AppState::seeded(&admin_config()).unwrap();
        let admin = state.ledger.user_by_email("admin@proplay.test").unwrap().id;
        state.current_user = Some(admin);

        let restored = AppState::from_snapshot(state.to_snapshot(), &admin_config()).unwrap();
        assert_eq!(restored.current_user, Some(admin));
        assert_eq!(restored.to_snapshot(), state.to_snapshot());
    }

    #[test]
    fn dangling_current_user_dropped() {
        let mut snapshot = Snapshot::empty();
        snapshot.users.push(User::dummy("Someone", Decimal::ZERO));
        snapshot.current_user_id = Some(UserId::new());
        let state = AppState::from_snapshot(snapshot, &WalletConfig::default()).unwrap();
        assert_eq!(state.current_user, None);
        assert_eq!(state.ledger.len(), 1);
    }

    #[test]
    fn future_schema_rejected() {
        let mut snapshot = Snapshot::empty();
        snapshot.schema_version = 2;
        let err = AppState::from_snapshot(snapshot, &WalletConfig::default()).unwrap_err();
        assert!(matches!(err, ProplayError::UnsupportedSnapshot { found: 2, expected: 1 }));
    }
}
