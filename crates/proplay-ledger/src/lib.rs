//! # proplay-ledger
//!
//! The money-moving core of the **ProPlay** wallet. Every balance change
//! goes through the [`Ledger`], and only two workflows are allowed to ask
//! for one:
//!
//! - [`Cashier`]: deposit / withdrawal requests and their admin review
//! - [`MatchBook`]: hosting a wagered match and paying out its winner
//!
//! Alongside them:
//!
//! - [`AuthGate`]: registration, login and per-account lockout
//! - [`audit`]: the supply conservation check over all of the above
//!
//! ## Flow of coins
//!
//! ```text
//!  deposit approved ──▶ ┌────────┐ ──▶ withdrawal requested
//!                       │ Ledger │
//!  match payout ──────▶ └────────┘ ──▶ entry fee
//! ```
//!
//! Repeated approvals, rejections and completions are idempotent: they
//! return [`Resolution::NoOp`] instead of moving money twice.

pub mod audit;
pub mod auth;
pub mod cashier;
pub mod ledger;
pub mod match_book;
pub mod resolution;

pub use audit::{SupplyAudit, verify_conservation};
pub use auth::{AuthGate, Registration};
pub use cashier::{Cashier, QueueStats};
pub use ledger::{Ledger, NewAccount};
pub use match_book::MatchBook;
pub use resolution::Resolution;
