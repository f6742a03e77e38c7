//! Match book: hosting and settling wagered matches.
//!
//! Hosting debits the entry fee and opens an ACTIVE match whose pool is
//! twice the fee. Only the host's stake is collected; the opponent's half
//! is assumed and never debited from anyone.
//! Completing pays the winner `pool × (1 − commission_rate)` exactly once.
//! A completion without a winner is a house win: nobody is credited and the
//! whole pool stays with the platform.

use std::collections::BTreeMap;

use chrono::Utc;
use proplay_types::{
    GameId, Match, MatchId, MatchStatus, ProplayError, Result, UserId, WalletConfig, constants,
};
use rust_decimal::Decimal;

use crate::{Ledger, Resolution};

/// Owns every match and settles payouts against the [`Ledger`].
#[derive(Debug, Default)]
pub struct MatchBook {
    /// All matches by id. UUIDv7 keys keep hosting order.
    matches: BTreeMap<MatchId, Match>,
}

impl MatchBook {
    /// Create an empty match book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted matches.
    #[must_use]
    pub fn from_matches(matches: impl IntoIterator<Item = Match>) -> Self {
        Self {
            matches: matches.into_iter().map(|m| (m.id, m)).collect(),
        }
    }

    /// Host a match: debit `entry_fee` and open it as ACTIVE.
    ///
    /// A blank title becomes `Quick Battle - ৳{fee}`; a missing game falls
    /// back to the configured default.
    ///
    /// # Errors
    /// - `InvalidRequest` if `entry_fee` is not in `(0, MAX_AMOUNT]`
    /// - `UnknownGame` if the game is not in the catalog
    /// - `InsufficientBalance` if the balance is below the fee
    /// - `UserNotFound` if the user doesn't exist
    pub fn create_match(
        &mut self,
        ledger: &mut Ledger,
        config: &WalletConfig,
        user_id: UserId,
        entry_fee: Decimal,
        title: Option<&str>,
        game_id: Option<GameId>,
    ) -> Result<MatchId> {
        if entry_fee <= Decimal::ZERO || entry_fee > Decimal::from(constants::MAX_AMOUNT) {
            return Err(ProplayError::InvalidRequest {
                reason: format!(
                    "entry fee must be in (0, {}], got {entry_fee}",
                    constants::MAX_AMOUNT
                ),
            });
        }
        let total_pool = Match::pool_for(entry_fee).ok_or_else(|| ProplayError::InvalidRequest {
            reason: format!("pool overflow for entry fee {entry_fee}"),
        })?;
        let game_id = game_id.unwrap_or_else(|| config.default_game.clone());
        if config.game(&game_id).is_none() {
            return Err(ProplayError::UnknownGame(game_id.0));
        }

        ledger.debit(user_id, entry_fee)?;

        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => Match::default_title(entry_fee),
        };
        let id = MatchId::new();
        self.matches.insert(
            id,
            Match {
                id,
                game_id: game_id.clone(),
                title,
                player_id: user_id,
                opponent_id: None,
                entry_fee,
                total_pool,
                status: MatchStatus::Active,
                winner_id: None,
                commentary: None,
                created_at: Utc::now(),
                completed_at: None,
            },
        );

        tracing::info!(%id, game = %game_id, host = %user_id, %entry_fee, pool = %total_pool, "Match created");
        Ok(id)
    }

    /// Settle a match: credit the winner net of commission and mark it
    /// COMPLETED. `None` records a house win and credits nobody. A second
    /// call is a no-op whatever the winner.
    ///
    /// # Errors
    /// - `MatchNotFound` if the id is unknown
    /// - `UserNotFound` if the winner doesn't exist (nothing changes)
    pub fn complete_match(
        &mut self,
        ledger: &mut Ledger,
        commission_rate: Decimal,
        match_id: MatchId,
        winner_id: Option<UserId>,
        commentary: String,
    ) -> Result<Resolution> {
        let m = self
            .matches
            .get_mut(&match_id)
            .ok_or(ProplayError::MatchNotFound(match_id))?;
        if m.is_completed() {
            tracing::debug!(id = %match_id, "Complete ignored: match already settled");
            return Ok(Resolution::NoOp);
        }

        match winner_id {
            Some(winner) => {
                let payout = m.net_payout(commission_rate);
                ledger.credit(winner, payout)?;
                if winner != m.player_id {
                    m.opponent_id = Some(winner);
                }
                tracing::info!(id = %match_id, %winner, %payout, "Match completed");
            }
            None => {
                tracing::info!(id = %match_id, pool = %m.total_pool, "Match completed, house keeps the pool");
            }
        }

        m.status = MatchStatus::Completed;
        m.winner_id = winner_id;
        m.commentary = Some(commentary);
        m.completed_at = Some(Utc::now());
        Ok(Resolution::Applied)
    }

    /// Look up a match.
    #[must_use]
    pub fn get(&self, match_id: &MatchId) -> Option<&Match> {
        self.matches.get(match_id)
    }

    /// Unfinished matches for a game, newest first.
    #[must_use]
    pub fn open_matches(&self, game_id: &GameId) -> Vec<&Match> {
        self.matches
            .values()
            .rev()
            .filter(|m| &m.game_id == game_id && m.status.is_open())
            .collect()
    }

    /// Settled matches for a game, newest first.
    #[must_use]
    pub fn completed_matches(&self, game_id: &GameId) -> Vec<&Match> {
        self.matches
            .values()
            .rev()
            .filter(|m| &m.game_id == game_id && m.is_completed())
            .collect()
    }

    /// Matches a user hosted or played in, newest first.
    #[must_use]
    pub fn player_matches(&self, user_id: UserId) -> Vec<&Match> {
        self.matches
            .values()
            .rev()
            .filter(|m| m.involves(user_id))
            .collect()
    }

    /// All matches in hosting order.
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    /// Number of matches tracked.
    #[must_use]
    pub fn count(&self) -> usize {
        self.matches.len()
    }
}
