//! The session controller.
//!
//! A [`Session`] owns the whole [`AppState`] plus its collaborators, answers
//! every operation on behalf of the logged-in user, and writes a full
//! snapshot after each successful mutation. Operations other than
//! `register` / `login` need a session user; the admin queue, user
//! listings and manual match settlement additionally need `is_admin`.

use chrono::{DateTime, Utc};
use proplay_ledger::{QueueStats, Registration, Resolution, SupplyAudit, verify_conservation};
use proplay_types::{
    Game, GameId, Match, MatchId, PaymentMethod, ProplayError, Result, SecurityAlert,
    Transaction, TransactionId, User, UserId, WalletConfig,
};
use rand::Rng;
use rust_decimal::Decimal;

use crate::{AppState, CommentaryProvider, SnapshotStore, commentary_or_fallback};

/// One running wallet instance.
pub struct Session<S, C> {
    config: WalletConfig,
    state: AppState,
    store: S,
    commentary: C,
}

impl<S: SnapshotStore, C: CommentaryProvider> Session<S, C> {
    /// Validate `config`, then restore from `store` or seed a fresh state.
    ///
    /// A snapshot with an unsupported schema version is discarded and the
    /// store is overwritten with freshly seeded state.
    pub fn open(config: WalletConfig, store: S, commentary: C) -> Result<Self> {
        config.validate()?;

        let (state, fresh) = match store.load()? {
            Some(snapshot) => match AppState::from_snapshot(snapshot, &config) {
                Ok(state) => (state, false),
                Err(e @ ProplayError::UnsupportedSnapshot { .. }) => {
                    tracing::warn!(error = %e, "Discarding snapshot, resetting to seeded state");
                    (AppState::seeded(&config)?, true)
                }
                Err(e) => return Err(e),
            },
            None => (AppState::seeded(&config)?, true),
        };

        let mut session = Self {
            config,
            state,
            store,
            commentary,
        };
        if fresh {
            session.persist()?;
        }
        tracing::info!(users = session.state.ledger.len(), fresh, "Session opened");
        Ok(session)
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ---------------------------------------------------------------
    // Session
    // ---------------------------------------------------------------

    /// Create an account and log into it.
    pub fn register(&mut self, form: Registration) -> Result<UserId> {
        let id = self.state.gate.register(
            &mut self.state.ledger,
            form,
            self.config.starting_balance,
        )?;
        self.state.current_user = Some(id);
        self.persist()?;
        Ok(id)
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<UserId> {
        self.login_at(email, password, Utc::now())
    }

    /// Log in as of `now`. A lockout raised by this attempt is persisted
    /// along with its alert.
    pub fn login_at(&mut self, email: &str, password: &str, now: DateTime<Utc>) -> Result<UserId> {
        let alerts_before = self.state.gate.alerts().len();
        match self
            .state
            .gate
            .login_at(&self.state.ledger, email, password, now)
        {
            Ok(id) => {
                self.state.current_user = Some(id);
                self.persist()?;
                Ok(id)
            }
            Err(e) => {
                if self.state.gate.alerts().len() > alerts_before {
                    self.persist()?;
                }
                Err(e)
            }
        }
    }

    pub fn logout(&mut self) -> Result<()> {
        if let Some(id) = self.state.current_user.take() {
            tracing::info!(user = %id, "Logged out");
            self.persist()?;
        }
        Ok(())
    }

    /// The logged-in user, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.state
            .current_user
            .and_then(|id| self.state.ledger.user(id).ok())
    }

    // ---------------------------------------------------------------
    // User operations
    // ---------------------------------------------------------------

    pub fn request_deposit(
        &mut self,
        amount: Decimal,
        method: PaymentMethod,
        txn_id: &str,
    ) -> Result<TransactionId> {
        let user = self.session_user()?;
        let id = self
            .state
            .cashier
            .request_deposit(&self.state.ledger, user, amount, method, txn_id)?;
        self.persist()?;
        Ok(id)
    }

    pub fn request_withdraw(
        &mut self,
        amount: Decimal,
        method: PaymentMethod,
        target_phone: &str,
    ) -> Result<TransactionId> {
        let user = self.session_user()?;
        let id = self.state.cashier.request_withdraw(
            &mut self.state.ledger,
            user,
            amount,
            method,
            target_phone,
        )?;
        self.persist()?;
        Ok(id)
    }

    pub fn host_match(
        &mut self,
        entry_fee: Decimal,
        title: Option<&str>,
        game: Option<GameId>,
    ) -> Result<MatchId> {
        let user = self.session_user()?;
        let id = self.state.book.create_match(
            &mut self.state.ledger,
            &self.config,
            user,
            entry_fee,
            title,
            game,
        )?;
        self.persist()?;
        Ok(id)
    }

    /// Admin settlement: award a match to `winner_id`, or to the house
    /// with `None`.
    ///
    /// Commentary names the host and the winner, with the configured
    /// challenger standing in whenever the host won or the house did. An
    /// already settled match returns `NoOp` without asking for commentary.
    pub async fn finish_match(
        &mut self,
        match_id: MatchId,
        winner_id: Option<UserId>,
    ) -> Result<Resolution> {
        self.admin_user()?;
        let Some(host_id) = self.open_match_host(match_id)? else {
            return Ok(Resolution::NoOp);
        };

        let host = self.state.ledger.user(host_id)?.name.clone();
        let challenger = self.config.challenger_name.clone();
        let (rival, winner) = match winner_id {
            Some(id) if id == host_id => (challenger, host.clone()),
            Some(id) => {
                let name = self.state.ledger.user(id)?.name.clone();
                (name.clone(), name)
            }
            None => (challenger.clone(), challenger),
        };
        self.settle(match_id, winner_id, &host, &rival, &winner).await
    }

    /// Simulate an arena bout; each side wins with probability one half.
    ///
    /// `opponent_id` names another player, or `None` for the house-run
    /// challenger. When the challenger wins the house keeps the pool. Only
    /// the host or an admin may start the bout.
    pub async fn play_match<R: Rng>(
        &mut self,
        match_id: MatchId,
        opponent_id: Option<UserId>,
        rng: &mut R,
    ) -> Result<Resolution> {
        let caller = self.session_user()?;
        let Some(host_id) = self.open_match_host(match_id)? else {
            return Ok(Resolution::NoOp);
        };
        if caller != host_id && self.admin_user().is_err() {
            return Err(ProplayError::AdminRequired);
        }
        if opponent_id == Some(host_id) {
            return Err(ProplayError::InvalidRequest {
                reason: "a host cannot play against themselves".into(),
            });
        }

        let host = self.state.ledger.user(host_id)?.name.clone();
        let rival = match opponent_id {
            Some(id) => self.state.ledger.user(id)?.name.clone(),
            None => self.config.challenger_name.clone(),
        };
        let (winner_id, winner) = if rng.gen_bool(0.5) {
            (Some(host_id), host.clone())
        } else {
            (opponent_id, rival.clone())
        };
        tracing::debug!(id = %match_id, %winner, house = winner_id.is_none(), "Arena bout decided");
        self.settle(match_id, winner_id, &host, &rival, &winner).await
    }

    /// The session user's requests, newest first.
    pub fn my_transactions(&self) -> Result<Vec<&Transaction>> {
        let user = self.session_user()?;
        Ok(self.state.cashier.history(user))
    }

    pub fn games(&self) -> Result<&[Game]> {
        self.session_user()?;
        Ok(&self.config.games)
    }

    pub fn open_matches(&self, game: &GameId) -> Result<Vec<&Match>> {
        self.session_user()?;
        Ok(self.state.book.open_matches(game))
    }

    pub fn completed_matches(&self, game: &GameId) -> Result<Vec<&Match>> {
        self.session_user()?;
        Ok(self.state.book.completed_matches(game))
    }

    pub fn get_match(&self, match_id: MatchId) -> Result<&Match> {
        self.session_user()?;
        self.state
            .book
            .get(&match_id)
            .ok_or(ProplayError::MatchNotFound(match_id))
    }

    // ---------------------------------------------------------------
    // Admin operations
    // ---------------------------------------------------------------

    pub fn approve(&mut self, tx_id: TransactionId) -> Result<Resolution> {
        self.admin_user()?;
        let res = self.state.cashier.approve(&mut self.state.ledger, tx_id)?;
        if res.is_applied() {
            self.persist()?;
        }
        Ok(res)
    }

    pub fn reject(&mut self, tx_id: TransactionId) -> Result<Resolution> {
        self.admin_user()?;
        let res = self.state.cashier.reject(&mut self.state.ledger, tx_id)?;
        if res.is_applied() {
            self.persist()?;
        }
        Ok(res)
    }

    /// The review queue, oldest first.
    pub fn pending_transactions(&self) -> Result<Vec<&Transaction>> {
        self.admin_user()?;
        Ok(self.state.cashier.pending())
    }

    pub fn queue_stats(&self) -> Result<QueueStats> {
        self.admin_user()?;
        Ok(self.state.cashier.queue_stats())
    }

    /// Every account, including credential digests and phone numbers.
    pub fn users(&self) -> Result<Vec<&User>> {
        self.admin_user()?;
        Ok(self.state.ledger.users().collect())
    }

    pub fn security_alerts(&self) -> Result<&[SecurityAlert]> {
        self.admin_user()?;
        Ok(self.state.gate.alerts())
    }

    /// Run the supply conservation check.
    pub fn audit(&self) -> Result<SupplyAudit> {
        self.admin_user()?;
        verify_conservation(
            &self.state.ledger,
            &self.state.cashier,
            &self.state.book,
            self.config.commission_rate,
        )
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn session_user(&self) -> Result<UserId> {
        self.current_user()
            .map(|u| u.id)
            .ok_or(ProplayError::NotAuthenticated)
    }

    fn admin_user(&self) -> Result<UserId> {
        let user = self.current_user().ok_or(ProplayError::NotAuthenticated)?;
        if user.is_admin {
            Ok(user.id)
        } else {
            Err(ProplayError::AdminRequired)
        }
    }

    /// Host of an unsettled match; `None` once it is completed.
    fn open_match_host(&self, match_id: MatchId) -> Result<Option<UserId>> {
        let m = self
            .state
            .book
            .get(&match_id)
            .ok_or(ProplayError::MatchNotFound(match_id))?;
        if m.is_completed() {
            tracing::debug!(id = %match_id, "Match already settled");
            return Ok(None);
        }
        Ok(Some(m.player_id))
    }

    async fn settle(
        &mut self,
        match_id: MatchId,
        winner_id: Option<UserId>,
        host: &str,
        rival: &str,
        winner: &str,
    ) -> Result<Resolution> {
        let text = commentary_or_fallback(
            &self.commentary,
            host,
            rival,
            winner,
            &self.config.fallback_commentary,
            &self.config.empty_commentary,
        )
        .await;
        let res = self.state.book.complete_match(
            &mut self.state.ledger,
            self.config.commission_rate,
            match_id,
            winner_id,
            text,
        )?;
        if res.is_applied() {
            self.persist()?;
        }
        Ok(res)
    }

    fn persist(&mut self) -> Result<()> {
        let snapshot = self.state.to_snapshot();
        self.store
            .save(&snapshot)
            .inspect_err(|e| tracing::error!(error = %e, "Failed to save snapshot"))
    }
}

#[cfg(test)]
mod tests {
    use proplay_types::{SeedAccount, constants::CHALLENGER_NAME};
    use rand::rngs::mock::StepRng;

    use super::*;
    use crate::{MemoryStore, StaticCommentary};

    fn config() -> WalletConfig {
        WalletConfig {
            seed_accounts: vec![SeedAccount {
                name: "Admin".into(),
                email: "admin@proplay.test".into(),
                password: Some("root".into()),
                phone: None,
                balance: Decimal::ZERO,
                is_admin: true,
            }],
            ..WalletConfig::default()
        }
    }

    fn open() -> Session<MemoryStore, StaticCommentary> {
        Session::open(config(), MemoryStore::new(), StaticCommentary).unwrap()
    }

    fn player(name: &str) -> Registration {
        Registration {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: "pw".into(),
            phone: "01711111111".into(),
        }
    }

    #[test]
    fn fresh_open_seeds_and_saves() {
        let session = open();
        assert_eq!(session.state().ledger.len(), 1);
        assert_eq!(session.store().saves(), 1);
        assert!(session.current_user().is_none());
    }

    #[test]
    fn user_ops_need_login() {
        let mut session = open();
        let err = session
            .request_deposit(Decimal::TEN, PaymentMethod::BKash, "X")
            .unwrap_err();
        assert!(matches!(err, ProplayError::NotAuthenticated));
        assert!(matches!(session.games().unwrap_err(), ProplayError::NotAuthenticated));
    }

    #[test]
    fn admin_ops_need_admin() {
        let mut session = open();
        session.register(player("Rahat")).unwrap();
        assert!(matches!(session.users().unwrap_err(), ProplayError::AdminRequired));
        assert!(matches!(
            session.approve(TransactionId::new()).unwrap_err(),
            ProplayError::AdminRequired
        ));
    }

    #[test]
    fn unknown_tx_is_not_found_for_admin() {
        let mut session = open();
        session.login("admin@proplay.test", "root").unwrap();
        let err = session.approve(TransactionId::new()).unwrap_err();
        assert!(matches!(err, ProplayError::TransactionNotFound(_)));
    }

    /// Register `name`, credit 100 coins and host a 50-coin match.
    fn hosted(session: &mut Session<MemoryStore, StaticCommentary>, name: &str) -> (UserId, MatchId) {
        let host = session.register(player(name)).unwrap();
        session.state.ledger.credit(host, Decimal::new(100, 0)).unwrap();
        let m = session.host_match(Decimal::new(50, 0), None, None).unwrap();
        (host, m)
    }

    #[tokio::test]
    async fn host_win_names_challenger() {
        let mut session = open();
        let (host, m) = hosted(&mut session, "Rahat");
        session.login("admin@proplay.test", "root").unwrap();

        let res = session.finish_match(m, Some(host)).await.unwrap();
        assert_eq!(res, Resolution::Applied);
        let text = session.get_match(m).unwrap().commentary.clone().unwrap();
        assert!(text.contains(CHALLENGER_NAME));
        assert_eq!(session.state().ledger.balance(host).unwrap(), Decimal::new(140, 0));
    }

    #[tokio::test]
    async fn finish_match_is_admin_only() {
        let mut session = open();
        let (host, m) = hosted(&mut session, "Rahat");
        let err = session.finish_match(m, Some(host)).await.unwrap_err();
        assert!(matches!(err, ProplayError::AdminRequired));
        assert!(!session.get_match(m).unwrap().is_completed());
        assert_eq!(session.current_user().unwrap().balance, Decimal::new(50, 0));
    }

    #[tokio::test]
    async fn admin_can_award_house() {
        let mut session = open();
        let (host, m) = hosted(&mut session, "Rahat");
        session.login("admin@proplay.test", "root").unwrap();

        session.finish_match(m, None).await.unwrap();
        let settled = session.get_match(m).unwrap();
        assert!(settled.house_won());
        assert!(settled.commentary.as_deref().unwrap().contains(CHALLENGER_NAME));
        assert_eq!(session.state().ledger.balance(host).unwrap(), Decimal::new(50, 0));
    }

    #[tokio::test]
    async fn only_host_or_admin_plays() {
        let mut session = open();
        let (_, m) = hosted(&mut session, "Rahat");
        session.register(player("Nosy")).unwrap();
        let err = session
            .play_match(m, None, &mut StepRng::new(0, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ProplayError::AdminRequired));
        assert!(!session.get_match(m).unwrap().is_completed());
    }

    #[tokio::test]
    async fn settled_match_is_noop() {
        let mut session = open();
        let (host, m) = hosted(&mut session, "Rahat");
        session.login("admin@proplay.test", "root").unwrap();
        session.finish_match(m, Some(host)).await.unwrap();
        let saves = session.store().saves();

        assert_eq!(session.finish_match(m, Some(host)).await.unwrap(), Resolution::NoOp);
        assert_eq!(
            session.play_match(m, None, &mut StepRng::new(0, 0)).await.unwrap(),
            Resolution::NoOp
        );
        assert_eq!(session.store().saves(), saves);
    }
}
