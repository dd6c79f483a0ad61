//! Connection Registry (spec §4.2): builds one [`Adapter`] per connection in
//! a fetched [`Specification`], decrypting each database's master password
//! along the way. A failure connecting to one database never aborts the
//! cycle — it is captured against that connection's id and surfaced later as
//! `connection_issue` results for every user/grant that needed it.

use std::collections::HashMap;

use rsa::RsaPrivateKey;

use super::dialect::Adapter;
use super::error::RegistryError;
use super::model::{ConnectionSpec, Specification};

/// `connection_id -> Ok(adapter) | Err(why it couldn't be built)`.
pub struct ConnectionRegistry {
    entries: HashMap<i64, Result<Adapter, RegistryError>>,
}

impl ConnectionRegistry {
    /// Builds an adapter for every connection in `spec`, in order. Each
    /// connection's master password is decrypted independently, so one
    /// database's bad ciphertext doesn't affect another's.
    pub async fn build(spec: &Specification, private_key: &RsaPrivateKey) -> Self {
        let mut entries = HashMap::with_capacity(spec.connections.len());

        for connection in &spec.connections {
            let result = Self::build_one(connection, private_key).await;
            if let Err(err) = &result {
                tracing::warn!(
                    "connection {} to database {} failed: {}",
                    connection.id,
                    connection.database.name,
                    err
                );
            }
            entries.insert(connection.id, result);
        }

        Self { entries }
    }

    async fn build_one(connection: &ConnectionSpec, private_key: &RsaPrivateKey) -> Result<Adapter, RegistryError> {
        let master_password = if let Some(decrypted) = &connection.database.decrypted_master_password {
            decrypted.clone()
        } else {
            crate::crypto::decrypt_password(private_key, &connection.database.master_password)?
        };
        let mut adapter = Adapter::connect(&connection.database, connection, &master_password).await?;
        adapter.cache_global_context_data().await?;
        Ok(adapter)
    }

    /// Looks up the adapter for `connection_id`. Returns `None` when the id
    /// isn't in the registry at all (a spec invariant violation, distinct
    /// from a build failure), `Some(Err(_))` when the connection failed.
    pub fn get(&self, connection_id: i64) -> Option<Result<&Adapter, &RegistryError>> {
        self.entries.get(&connection_id).map(|r| r.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_connection_id_is_none() {
        let registry = ConnectionRegistry {
            entries: HashMap::new(),
        };
        assert!(registry.get(42).is_none());
    }

    #[test]
    fn present_error_entry_is_some_err() {
        let mut entries = HashMap::new();
        entries.insert(1, Err(RegistryError::UnknownFlavor("oracle".to_string())));
        let registry = ConnectionRegistry { entries };
        assert!(matches!(registry.get(1), Some(Err(RegistryError::UnknownFlavor(_)))));
    }
}
