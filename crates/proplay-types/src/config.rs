//! Configuration for a ProPlay wallet instance.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Game, GameId, ProplayError, Result, constants};

/// Top-level wallet configuration.
///
/// Every field has a default, so a partial JSON document is enough:
/// `{"commissionRate": "0.05"}` overrides only the commission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WalletConfig {
    /// Fraction of each pool kept by the platform, in `[0, 1)`.
    pub commission_rate: Decimal,
    /// Balance credited to newly registered accounts.
    pub starting_balance: Decimal,
    /// Consecutive failed logins per account before lockout.
    pub max_login_attempts: u32,
    /// Lockout length in minutes.
    pub lockout_minutes: i64,
    /// Commentary used when the generator fails.
    pub fallback_commentary: String,
    /// Commentary used when the generator returns blank text.
    pub empty_commentary: String,
    /// Name of the house-run opponent.
    pub challenger_name: String,
    /// Game used when a match is hosted without one.
    pub default_game: GameId,
    /// Playable games.
    pub games: Vec<Game>,
    /// Accounts created when no snapshot exists yet.
    pub seed_accounts: Vec<SeedAccount>,
}

/// An account provisioned on first start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedAccount {
    pub name: String,
    pub email: String,
    /// Plaintext here only; hashed when the account is created.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default)]
    pub is_admin: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            commission_rate: Decimal::new(i64::from(constants::ADMIN_COMMISSION_PERCENT), 2),
            starting_balance: Decimal::new(constants::INITIAL_COINS, 0),
            max_login_attempts: constants::MAX_LOGIN_ATTEMPTS,
            lockout_minutes: constants::LOCKOUT_MINUTES,
            fallback_commentary: constants::FALLBACK_COMMENTARY.to_string(),
            empty_commentary: constants::EMPTY_COMMENTARY.to_string(),
            challenger_name: constants::CHALLENGER_NAME.to_string(),
            default_game: GameId::new(constants::DEFAULT_GAME_ID),
            games: Game::default_catalog(),
            seed_accounts: Vec::new(),
        }
    }
}

impl WalletConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| ProplayError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Check ranges and cross-field consistency.
    pub fn validate(&self) -> Result<()> {
        if self.commission_rate < Decimal::ZERO || self.commission_rate >= Decimal::ONE {
            return Err(ProplayError::Configuration(format!(
                "commissionRate must be in [0, 1), got {}",
                self.commission_rate
            )));
        }
        let max = Decimal::from(constants::MAX_AMOUNT);
        if self.starting_balance < Decimal::ZERO || self.starting_balance > max {
            return Err(ProplayError::Configuration(format!(
                "startingBalance must be in [0, {max}]"
            )));
        }
        if self.max_login_attempts == 0 {
            return Err(ProplayError::Configuration(
                "maxLoginAttempts must be at least 1".into(),
            ));
        }
        if self.lockout_minutes <= 0 {
            return Err(ProplayError::Configuration(
                "lockoutMinutes must be positive".into(),
            ));
        }
        if self.fallback_commentary.trim().is_empty() {
            return Err(ProplayError::Configuration(
                "fallbackCommentary must not be blank".into(),
            ));
        }
        if self.empty_commentary.trim().is_empty() {
            return Err(ProplayError::Configuration(
                "emptyCommentary must not be blank".into(),
            ));
        }
        if self.challenger_name.trim().is_empty() {
            return Err(ProplayError::Configuration(
                "challengerName must not be blank".into(),
            ));
        }
        if self.game(&self.default_game).is_none() {
            return Err(ProplayError::Configuration(format!(
                "defaultGame {} is not in the games catalog",
                self.default_game
            )));
        }
        if let Some(seed) = self
            .seed_accounts
            .iter()
            .find(|s| s.balance < Decimal::ZERO || s.balance > max)
        {
            return Err(ProplayError::Configuration(format!(
                "seed account {} balance must be in [0, {max}]",
                seed.email
            )));
        }
        Ok(())
    }

    /// Look up a catalog game.
    #[must_use]
    pub fn game(&self, id: &GameId) -> Option<&Game> {
        self.games.iter().find(|g| &g.id == id)
    }

    /// Lockout length as a chrono duration.
    #[must_use]
    pub fn lockout_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.lockout_minutes)
    }
}
