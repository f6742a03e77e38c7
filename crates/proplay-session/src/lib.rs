//! # proplay-session
//!
//! Runs a **ProPlay** wallet for one user at a time.
//!
//! - [`Session`]: the controller; gates every operation on the logged-in
//!   user and persists after each mutation
//! - [`AppState`]: ledger, cashier, match book and auth gate in one value
//! - [`SnapshotStore`]: persistence seam, with [`MemoryStore`] and
//!   [`JsonFileStore`]
//! - [`CommentaryProvider`]: async commentary seam, with [`StaticCommentary`]
//! - [`telemetry`]: tracing subscriber setup
//!
//! ```text
//! Session ──▶ AppState ──▶ proplay-ledger
//!    │
//!    ├──▶ SnapshotStore      (after every mutation)
//!    └──▶ CommentaryProvider (on match completion, with fallback)
//! ```

pub mod commentary;
pub mod session;
pub mod state;
pub mod store;
pub mod telemetry;

pub use commentary::{CommentaryProvider, StaticCommentary, commentary_or_fallback};
pub use session::Session;
pub use state::AppState;
pub use store::{JsonFileStore, MemoryStore, SnapshotStore};
