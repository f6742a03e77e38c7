//! Session-level scenarios: players and an admin driving the wallet end to
//! end through the controller, with persistence and commentary in the loop.

use std::future::Future;

use chrono::{Duration, Utc};
use proplay_ledger::{Registration, Resolution};
use proplay_session::{
    CommentaryProvider, JsonFileStore, MemoryStore, Session, SnapshotStore, StaticCommentary,
};
use proplay_types::*;
use rand::{SeedableRng, rngs::StdRng, rngs::mock::StepRng};
use rust_decimal::Decimal;

/// Provider that is always down.
struct Offline;

impl CommentaryProvider for Offline {
    fn generate(&self, _: &str, _: &str, _: &str) -> impl Future<Output = Result<String>> + Send {
        async {
            Err(ProplayError::CommentaryUnavailable {
                reason: "network unreachable".into(),
            })
        }
    }
}

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

fn form(name: &str) -> Registration {
    Registration {
        name: name.into(),
        email: format!("{}@example.com", name.to_lowercase()),
        password: "pw".into(),
        phone: "01711111111".into(),
    }
}

fn coins(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

/// Register `name`, deposit `amount`, have the admin approve it and log
/// back in as the player.
fn funded_player<S: SnapshotStore, C: CommentaryProvider>(
    session: &mut Session<S, C>,
    name: &str,
    amount: i64,
) -> UserId {
    let id = session.register(form(name)).unwrap();
    let tx = session
        .request_deposit(coins(amount), PaymentMethod::BKash, "9A8B7C")
        .unwrap();
    session.login("admin@proplay.test", "root").unwrap();
    session.approve(tx).unwrap();
    session
        .login(&format!("{}@example.com", name.to_lowercase()), "pw")
        .unwrap();
    id
}

#[tokio::test]
async fn deposit_host_finish_with_fallback_commentary() {
    let mut session = Session::open(config(), MemoryStore::new(), Offline).unwrap();
    let host = funded_player(&mut session, "Rahat", 1000);
    assert_eq!(session.current_user().unwrap().balance, coins(1000));

    let m = session.host_match(coins(100), Some("  "), None).unwrap();
    assert_eq!(session.current_user().unwrap().balance, coins(900));
    let open = session.open_matches(&GameId::new("g1")).unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].title, "Quick Battle - ৳100");
    assert_eq!(open[0].total_pool, coins(200));

    session.login("admin@proplay.test", "root").unwrap();
    assert_eq!(session.finish_match(m, Some(host)).await.unwrap(), Resolution::Applied);
    assert_eq!(session.state().ledger.balance(host).unwrap(), coins(1080));
    let settled = session.get_match(m).unwrap();
    assert_eq!(settled.status, MatchStatus::Completed);
    assert_eq!(
        settled.commentary.as_deref(),
        Some(constants::FALLBACK_COMMENTARY)
    );
    assert_eq!(session.completed_matches(&GameId::new("g1")).unwrap().len(), 1);

    let audit = session.audit().unwrap();
    assert_eq!(audit.commission, coins(20));
}

#[tokio::test]
async fn arena_winner_takes_pool() {
    let mut session = Session::open(config(), MemoryStore::new(), StaticCommentary).unwrap();
    let rival = session.register(form("Rival")).unwrap();
    let host = funded_player(&mut session, "Host", 500);

    // StepRng(0, 0) draws zero, so the host wins.
    let first = session.host_match(coins(100), None, None).unwrap();
    session
        .play_match(first, Some(rival), &mut StepRng::new(0, 0))
        .await
        .unwrap();
    assert_eq!(session.get_match(first).unwrap().winner_id, Some(host));
    assert_eq!(session.current_user().unwrap().balance, coins(580));

    // StepRng(MAX, 0) draws u64::MAX, so the rival wins.
    let second = session.host_match(coins(100), None, None).unwrap();
    session
        .play_match(second, Some(rival), &mut StepRng::new(u64::MAX, 0))
        .await
        .unwrap();
    let settled = session.get_match(second).unwrap();
    assert_eq!(settled.winner_id, Some(rival));
    assert_eq!(settled.opponent_id, Some(rival));
    let text = settled.commentary.clone().unwrap();
    assert!(text.contains("Host") && text.contains("Rival"));

    session.login("rival@example.com", "pw").unwrap();
    assert_eq!(session.current_user().unwrap().balance, coins(180));
}

#[tokio::test]
async fn seeded_arena_conserves_supply() {
    let mut session = Session::open(config(), MemoryStore::new(), StaticCommentary).unwrap();
    let rival = session.register(form("Rival")).unwrap();
    funded_player(&mut session, "Host", 1000);
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..5 {
        let m = session.host_match(coins(50), None, Some(GameId::new("g3"))).unwrap();
        session.play_match(m, Some(rival), &mut rng).await.unwrap();
    }
    assert_eq!(session.completed_matches(&GameId::new("g3")).unwrap().len(), 5);

    session.login("admin@proplay.test", "root").unwrap();
    let audit = session.audit().unwrap();
    assert_eq!(audit.entry_fees, coins(250));
    assert_eq!(audit.payouts, coins(450));
}

#[tokio::test]
async fn solo_host_loses_to_challenger_bot() {
    let mut session = Session::open(config(), MemoryStore::new(), StaticCommentary).unwrap();
    let host = funded_player(&mut session, "Solo", 300);

    let m = session.host_match(coins(100), None, None).unwrap();
    session
        .play_match(m, None, &mut StepRng::new(u64::MAX, 0))
        .await
        .unwrap();
    let settled = session.get_match(m).unwrap();
    assert!(settled.house_won());
    assert_eq!(settled.opponent_id, None);
    let text = settled.commentary.clone().unwrap();
    assert!(text.contains(constants::CHALLENGER_NAME));
    assert_eq!(session.current_user().unwrap().balance, coins(200));

    // Beating the bot pays out as usual.
    let next = session.host_match(coins(100), None, None).unwrap();
    session
        .play_match(next, None, &mut StepRng::new(0, 0))
        .await
        .unwrap();
    assert_eq!(session.get_match(next).unwrap().winner_id, Some(host));
    assert_eq!(session.current_user().unwrap().balance, coins(280));

    session.login("admin@proplay.test", "root").unwrap();
    let audit = session.audit().unwrap();
    assert_eq!(audit.house_wins, coins(200));
    assert_eq!(audit.payouts, coins(180));
}

#[tokio::test]
async fn blank_commentary_uses_empty_line() {
    struct Mute;

    impl CommentaryProvider for Mute {
        fn generate(&self, _: &str, _: &str, _: &str) -> impl Future<Output = Result<String>> + Send {
            async { Ok(String::new()) }
        }
    }

    let mut session = Session::open(config(), MemoryStore::new(), Mute).unwrap();
    funded_player(&mut session, "Quiet", 100);
    let m = session.host_match(coins(10), None, None).unwrap();
    session
        .play_match(m, None, &mut StepRng::new(0, 0))
        .await
        .unwrap();
    assert_eq!(
        session.get_match(m).unwrap().commentary.as_deref(),
        Some(constants::EMPTY_COMMENTARY)
    );
}

#[test]
fn huge_deposit_is_refused() {
    let mut session = Session::open(config(), MemoryStore::new(), StaticCommentary).unwrap();
    funded_player(&mut session, "Whale", 10);
    let err = session
        .request_deposit(Decimal::MAX, PaymentMethod::BKash, "X1")
        .unwrap_err();
    assert!(matches!(err, ProplayError::InvalidRequest { .. }));
    assert_eq!(session.my_transactions().unwrap().len(), 1);
}

#[test]
fn withdraw_reject_round_trip() {
    let mut session = Session::open(config(), MemoryStore::new(), StaticCommentary).unwrap();
    funded_player(&mut session, "Nadia", 500);

    let tx = session
        .request_withdraw(coins(300), PaymentMethod::Nagad, "01900000000")
        .unwrap();
    assert_eq!(session.current_user().unwrap().balance, coins(200));
    let history = session.my_transactions().unwrap();
    assert_eq!(history[0].id, tx);
    assert_eq!(history[0].status, TransactionStatus::Pending);

    session.login("admin@proplay.test", "root").unwrap();
    let stats = session.queue_stats().unwrap();
    assert_eq!(stats.pending_withdrawals, 1);
    assert_eq!(session.pending_transactions().unwrap()[0].id, tx);
    assert_eq!(session.reject(tx).unwrap(), Resolution::Applied);
    assert_eq!(session.reject(tx).unwrap(), Resolution::NoOp);
    assert!(session.pending_transactions().unwrap().is_empty());

    session.login("nadia@example.com", "pw").unwrap();
    assert_eq!(session.current_user().unwrap().balance, coins(500));
    assert_eq!(
        session.my_transactions().unwrap()[0].status,
        TransactionStatus::Rejected
    );
}

#[test]
fn duplicate_registration_any_case() {
    let mut session = Session::open(config(), MemoryStore::new(), StaticCommentary).unwrap();
    session.register(form("Rahat")).unwrap();
    let mut again = form("Rahat");
    again.email = "RAHAT@Example.com".into();
    let err = session.register(again).unwrap_err();
    assert!(matches!(err, ProplayError::EmailAlreadyExists { .. }));

    session.login("admin@proplay.test", "root").unwrap();
    assert_eq!(session.users().unwrap().len(), 2);
}

#[test]
fn lockout_is_persisted_and_visible_to_admin() {
    let mut session = Session::open(config(), MemoryStore::new(), StaticCommentary).unwrap();
    session.register(form("Victim")).unwrap();
    session.logout().unwrap();
    let t0 = Utc::now();

    for _ in 0..2 {
        let err = session.login_at("victim@example.com", "nope", t0).unwrap_err();
        assert!(matches!(err, ProplayError::InvalidCredentials));
    }
    let err = session.login_at("victim@example.com", "nope", t0).unwrap_err();
    assert!(matches!(err, ProplayError::AccountLocked { .. }));
    assert_eq!(session.store().snapshot().unwrap().security_alerts.len(), 1);
    assert!(session.current_user().is_none());

    let err = session
        .login_at("victim@example.com", "pw", t0 + Duration::minutes(5))
        .unwrap_err();
    assert!(matches!(err, ProplayError::AccountLocked { .. }));

    session.login_at("admin@proplay.test", "root", t0).unwrap();
    let alerts = session.security_alerts().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].attempts, 3);
    assert_eq!(alerts[0].email, "victim@example.com");

    session
        .login_at("victim@example.com", "pw", t0 + Duration::minutes(30))
        .unwrap();
}

#[test]
fn reopen_restores_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wallet.json");

    let (player, tx) = {
        let mut session =
            Session::open(config(), JsonFileStore::new(&path), StaticCommentary).unwrap();
        let player = funded_player(&mut session, "Keeper", 300);
        let tx = session
            .request_withdraw(coins(100), PaymentMethod::BKash, "01800000000")
            .unwrap();
        (player, tx)
    };

    let session = Session::open(config(), JsonFileStore::new(&path), StaticCommentary).unwrap();
    let me = session.current_user().unwrap();
    assert_eq!(me.id, player);
    assert_eq!(me.balance, coins(200));
    assert_eq!(session.my_transactions().unwrap()[0].id, tx);
    assert_eq!(session.state().ledger.len(), 2);
}

#[test]
fn unsupported_snapshot_resets_to_seed() {
    let mut stale = Snapshot::empty();
    stale.schema_version = 99;
    stale.users.push(User::dummy("Ghost", coins(10)));

    let session =
        Session::open(config(), MemoryStore::with_snapshot(stale), StaticCommentary).unwrap();
    let users: Vec<_> = session.state().ledger.users().map(|u| u.email.clone()).collect();
    assert_eq!(users, vec!["admin@proplay.test".to_string()]);

    let saved = session.store().snapshot().unwrap();
    assert_eq!(saved.schema_version, constants::SNAPSHOT_SCHEMA_VERSION);
    assert_eq!(saved.users.len(), 1);
}

#[test]
fn invalid_config_refuses_to_open() {
    let bad = WalletConfig {
        commission_rate: Decimal::ONE,
        ..config()
    };
    let err = Session::open(bad, MemoryStore::new(), StaticCommentary).err().unwrap();
    assert!(matches!(err, ProplayError::Configuration(_)));
}
