//! Wire types exchanged with the control plane (`GET /api/grants`,
//! `POST /api/agents/checkin`). Field names follow the control-plane JSON
//! contract exactly, which is why several Rust-side names don't match their
//! `serde` rename.

use serde::{Deserialize, Serialize};

/// One managed database server. `flavor` is kept as the raw wire string
/// rather than a closed enum so that an unrecognized value (e.g. `"oracle"`)
/// still deserializes — classification into a known dialect happens in the
/// connection registry, where it can be reported per-connection instead of
/// failing the whole fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub id: i64,
    pub name: String,
    #[serde(rename = "dbtype")]
    pub flavor: String,
    pub host: String,
    pub port: u16,
    pub master_username: String,
    /// Base64-encoded RSA-OAEP ciphertext.
    pub master_password: String,
    pub default_database: String,
    /// Test hook (spec §4.2 step 2): when set, the registry uses this value
    /// instead of decrypting `master_password`.
    #[serde(skip, default)]
    pub decrypted_master_password: Option<String>,
}

/// A connection to open against a [`Database`]. `db_name` is the *logical*
/// database to connect to, distinct from `Database::name`, which is only a
/// display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSpec {
    pub id: i64,
    pub database: Database,
    #[serde(rename = "name")]
    pub db_name: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "password")]
    pub encrypted_password: String,
    /// Test hook (spec §4.3 step 3): when set, reconciliation uses this
    /// value instead of decrypting `encrypted_password`.
    #[serde(skip, default)]
    pub decrypted_password: Option<String>,
    pub active: bool,
    pub username: String,
    pub database_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    pub id: i64,
    pub database_id: i64,
    pub connection_id: i64,
    #[serde(rename = "database_user_id")]
    pub user_id: i64,
    pub statements: Vec<String>,
    pub version: String,
    pub username: String,
}

/// The root object returned by `GET /api/grants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub connections: Vec<ConnectionSpec>,
    #[serde(rename = "database_users")]
    pub users: Vec<User>,
    pub grants: Vec<Grant>,
}

impl Specification {
    /// The connection marked `is_default` for the given database id, if any.
    /// Mirrors `GrantsResponse.defaultConnection` in the original agent:
    /// the first match wins, there is no duplicate check at this layer.
    #[must_use]
    pub fn default_connection(&self, database_id: i64) -> Option<&ConnectionSpec> {
        self.connections
            .iter()
            .find(|conn| conn.database.id == database_id && conn.is_default)
    }
}

/// Wire values are exact: `applied`, `unknown_error`, `revoked`,
/// `no_user_password`, `connection_issue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    UnknownError,
    Revoked,
    NoUserPassword,
    ConnectionIssue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResult {
    #[serde(rename = "database_user_id")]
    pub user_id: i64,
    pub result: Outcome,
    pub error: Option<String>,
}

impl UserResult {
    #[must_use]
    pub fn new(user_id: i64, result: Outcome) -> Self {
        Self {
            user_id,
            result,
            error: None,
        }
    }

    #[must_use]
    pub fn unknown_error(user_id: i64, error: impl ToString) -> Self {
        Self {
            user_id,
            result: Outcome::UnknownError,
            error: Some(error.to_string()),
        }
    }

    pub fn log(&self) {
        match &self.error {
            Some(err) => tracing::error!("error updating user {}: {}", self.user_id, err),
            None => tracing::debug!("user apply result for user {}: {:?}", self.user_id, self.result),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantResult {
    pub grant_id: i64,
    pub version: String,
    pub result: Outcome,
    pub error: Option<String>,
}

impl GrantResult {
    #[must_use]
    pub fn new(grant_id: i64, version: String, result: Outcome) -> Self {
        Self {
            grant_id,
            version,
            result,
            error: None,
        }
    }

    #[must_use]
    pub fn unknown_error(grant_id: i64, version: String, error: impl ToString) -> Self {
        Self {
            grant_id,
            version,
            result: Outcome::UnknownError,
            error: Some(error.to_string()),
        }
    }

    pub fn log(&self) {
        match &self.error {
            Some(err) => tracing::error!("error applying grant {}: {}", self.grant_id, err),
            None => tracing::debug!("grant apply result for grant {}: {:?}", self.grant_id, self.result),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkin {
    pub agent_version: String,
    pub user_results: Vec<UserResult>,
    pub grant_results: Vec<GrantResult>,
}
