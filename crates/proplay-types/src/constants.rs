//! System-wide constants for the ProPlay wallet core.

/// Platform commission taken from each match pool, in percent.
pub const ADMIN_COMMISSION_PERCENT: u32 = 10;

/// Balance credited to freshly registered accounts.
pub const INITIAL_COINS: i64 = 0;

/// Consecutive failed logins (per account) before a lockout.
pub const MAX_LOGIN_ATTEMPTS: u32 = 3;

/// Lockout duration after too many failed logins, in minutes.
pub const LOCKOUT_MINUTES: i64 = 30;

/// Multiplier applied to the entry fee to obtain the match pool.
/// Only the host's stake is collected; the opponent's is assumed.
pub const POOL_MULTIPLIER: i64 = 2;

/// Commentary used when the generator fails.
pub const FALLBACK_COMMENTARY: &str = "The match ended in a spectacular fashion!";

/// Commentary used when the generator succeeds but returns nothing.
pub const EMPTY_COMMENTARY: &str = "An incredible match concluded with a decisive victory!";

/// Upper bound for a single deposit, withdrawal or entry fee, in coins.
pub const MAX_AMOUNT: i64 = 1_000_000_000;

/// Display name of the house-run opponent. When it wins, the house keeps
/// the pool.
pub const CHALLENGER_NAME: &str = "Challenger Bot";

/// Game used when a match is hosted without naming one.
pub const DEFAULT_GAME_ID: &str = "g1";

/// Current persisted snapshot layout.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Product name.
pub const PRODUCT_NAME: &str = "ProPlay";
