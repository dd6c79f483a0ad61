//! Error types shared across the registry and dialect adapters.

use thiserror::Error;

/// Everything that can go wrong while building a [`crate::core::registry::ConnectionRegistry`]
/// entry: constructing the adapter, decrypting the master password,
/// connecting, or caching catalog data. Every variant here is non-fatal to
/// the cycle — the registry captures it per-connection (spec §4.2).
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown database type: {0}")]
    UnknownFlavor(String),

    #[error("failed to decrypt master password: {0}")]
    Decrypt(#[from] crate::crypto::DecryptError),

    #[error("error connecting to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("error caching catalog data: {0}")]
    Cache(#[source] sqlx::Error),
}

/// Errors from a single adapter operation (exists/create/drop/update/revoke).
/// Kept distinct from [`RegistryError`] because these happen per-user or
/// per-grant, well after the connection was established.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Sql(#[from] sqlx::Error),

    #[error(transparent)]
    InvalidPassword(#[from] crate::core::password::InvalidPasswordChars),
}
