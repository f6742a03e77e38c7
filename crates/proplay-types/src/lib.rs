//! # proplay-types
//!
//! Shared types, errors, and configuration for the **ProPlay** wallet core.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`UserId`], [`TransactionId`], [`MatchId`], [`AlertId`], [`GameId`]
//! - **Account model**: [`User`], [`PasswordDigest`]
//! - **Transaction model**: [`Transaction`], [`TransactionKind`], [`TransactionStatus`], [`PaymentMethod`], [`PaymentProof`]
//! - **Match model**: [`Match`], [`MatchStatus`], [`Game`]
//! - **Security model**: [`SecurityAlert`], [`AlertStatus`]
//! - **Persistence**: [`Snapshot`]
//! - **Configuration**: [`WalletConfig`], [`SeedAccount`]
//! - **Errors**: [`ProplayError`] with `PP_ERR_` prefix codes
//! - **Constants**: defaults and limits

pub mod alert;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod ids;
pub mod matches;
pub mod snapshot;
pub mod transaction;
pub mod user;

// Re-export all primary types at crate root for ergonomic imports:
//   use proplay_types::{User, Transaction, Match, ...};

pub use alert::*;
pub use config::*;
pub use credentials::*;
pub use error::*;
pub use ids::*;
pub use matches::*;
pub use snapshot::*;
pub use transaction::*;
pub use user::*;

// Constants are accessed via `proplay_types::constants::FOO`
// (not re-exported to avoid name collisions).
