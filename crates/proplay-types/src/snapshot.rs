//! Persisted full-state snapshot.
//!
//! The snapshot is rewritten after every mutation and read once at start.
//! `schemaVersion` must equal [`constants::SNAPSHOT_SCHEMA_VERSION`];
//! documents written before the field existed read as version 1.

use serde::{Deserialize, Serialize};

use crate::{Match, ProplayError, Result, SecurityAlert, Transaction, User, UserId, constants};

/// Everything needed to restore a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "legacy_schema_version")]
    pub schema_version: u32,
    pub users: Vec<User>,
    #[serde(default)]
    pub current_user_id: Option<UserId>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub security_alerts: Vec<SecurityAlert>,
}

fn legacy_schema_version() -> u32 {
    1
}

impl Snapshot {
    /// An empty snapshot at the current schema version.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            schema_version: constants::SNAPSHOT_SCHEMA_VERSION,
            users: Vec::new(),
            current_user_id: None,
            transactions: Vec::new(),
            matches: Vec::new(),
            security_alerts: Vec::new(),
        }
    }

    /// Fail with `UnsupportedSnapshot` unless this build can read it.
    pub fn check_version(&self) -> Result<()> {
        if self.schema_version == constants::SNAPSHOT_SCHEMA_VERSION {
            Ok(())
        } else {
            Err(ProplayError::UnsupportedSnapshot {
                found: self.schema_version,
                expected: constants::SNAPSHOT_SCHEMA_VERSION,
            })
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
