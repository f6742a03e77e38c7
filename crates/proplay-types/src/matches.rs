//! Wagered match records and the game catalog.
//!
//! A match is hosted by one player, who stakes the entry fee. The pool is
//! fixed at twice the fee: the opponent's stake is assumed rather than
//! collected. On completion the winner receives the pool net of commission;
//! if the house-run challenger wins, nobody is paid and the house keeps it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{GameId, MatchId, UserId, constants};

/// Lifecycle status of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Reserved for lobby matches awaiting an opponent. Never produced,
    /// accepted when reading snapshots.
    Waiting,
    /// Entry fee taken, awaiting a result.
    Active,
    /// Winner paid out. Terminal.
    Completed,
}

impl MatchStatus {
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "WAITING"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// A wagered match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub game_id: GameId,
    pub title: String,
    /// The hosting player, whose entry fee was debited.
    pub player_id: UserId,
    /// Set when a user other than the host wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_id: Option<UserId>,
    pub entry_fee: Decimal,
    /// `entry_fee × 2`.
    pub total_pool: Decimal,
    pub status: MatchStatus,
    /// Paid winner. `None` on a completed match means the house won.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Pool for a given entry fee, or `None` if it overflows.
    #[must_use]
    pub fn pool_for(entry_fee: Decimal) -> Option<Decimal> {
        entry_fee.checked_mul(Decimal::from(constants::POOL_MULTIPLIER))
    }

    /// Title used when the host leaves it blank.
    #[must_use]
    pub fn default_title(entry_fee: Decimal) -> String {
        format!("Quick Battle - ৳{}", entry_fee.normalize())
    }

    /// Winner payout at `commission_rate` (a fraction, e.g. `0.10`).
    #[must_use]
    pub fn net_payout(&self, commission_rate: Decimal) -> Decimal {
        self.total_pool * (Decimal::ONE - commission_rate)
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Completed without a paid winner.
    #[must_use]
    pub fn house_won(&self) -> bool {
        self.is_completed() && self.winner_id.is_none()
    }

    /// Whether `user_id` took part as host or recorded opponent.
    #[must_use]
    pub fn involves(&self, user_id: UserId) -> bool {
        self.player_id == user_id || self.opponent_id == Some(user_id)
    }
}

/// A catalog entry for a playable game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub active_players: u32,
}

impl Game {
    #[must_use]
    pub fn new(id: &str, name: &str, active_players: u32) -> Self {
        Self {
            id: GameId::new(id),
            name: name.to_string(),
            active_players,
        }
    }

    /// The built-in catalog.
    #[must_use]
    pub fn default_catalog() -> Vec<Self> {
        vec![
            Self::new("g1", "Ludo King", 1240),
            Self::new("g2", "Free Fire", 8500),
            Self::new("g3", "Cricket Star", 3200),
            Self::new("g4", "8 Ball Pool", 540),
        ]
    }
}
