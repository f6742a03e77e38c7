//! Security alerts raised by the auth gate. Append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AlertId;

/// Outcome recorded on an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    /// The account was locked out.
    Locked,
}

/// A lockout event visible to admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAlert {
    pub id: AlertId,
    /// The email that was attempted (may not belong to any account).
    pub email: String,
    pub timestamp: DateTime<Utc>,
    /// Consecutive failures that triggered the alert.
    pub attempts: u32,
    pub status: AlertStatus,
}
