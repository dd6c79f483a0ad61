//! The polymorphic per-flavor capability set (spec §4.1), implemented as a
//! tagged enum rather than a trait object — PostgreSQL, Redshift and MySQL
//! share little enough connection/query plumbing that a trait would mostly
//! add indirection, and the Design Notes explicitly allow either shape.

pub mod identifier;
pub mod mysql;
pub mod postgres;

use sqlx::{MySqlPool, PgPool};

use super::error::{AdapterError, RegistryError};
use super::model::{ConnectionSpec, Database};
use postgres::{PgCatalog, PgFlavor};

/// A live, connected adapter for one [`ConnectionSpec`] — the registry's
/// payload for a non-errored entry.
pub enum Adapter {
    Postgres {
        pool: PgPool,
        flavor: PgFlavor,
        label: String,
        catalog: PgCatalog,
    },
    Mysql {
        pool: MySqlPool,
        label: String,
    },
}

impl Adapter {
    /// Dispatches on `database.flavor` to the matching adapter, connects,
    /// and returns it uncached — the caller must still call
    /// [`Adapter::cache_global_context_data`].
    pub async fn connect(
        database: &Database,
        connection: &ConnectionSpec,
        master_password: &str,
    ) -> Result<Self, RegistryError> {
        match database.flavor.as_str() {
            "postgresql" => {
                let pool = postgres::connect(database, connection, master_password)
                    .await
                    .map_err(RegistryError::Connect)?;
                Ok(Adapter::Postgres {
                    pool,
                    flavor: PgFlavor::Native,
                    label: database.name.clone(),
                    catalog: PgCatalog::default(),
                })
            }
            "redshift" => {
                let pool = postgres::connect(database, connection, master_password)
                    .await
                    .map_err(RegistryError::Connect)?;
                Ok(Adapter::Postgres {
                    pool,
                    flavor: PgFlavor::Redshift,
                    label: database.name.clone(),
                    catalog: PgCatalog::default(),
                })
            }
            "mysql" => {
                let pool = mysql::connect(database, connection, master_password)
                    .await
                    .map_err(RegistryError::Connect)?;
                Ok(Adapter::Mysql {
                    pool,
                    label: database.name.clone(),
                })
            }
            other => Err(RegistryError::UnknownFlavor(other.to_string())),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Adapter::Postgres { label, .. } | Adapter::Mysql { label, .. } => label,
        }
    }

    /// PostgreSQL/Redshift: records `current_database()` and the non-system
    /// schema list. MySQL: no-op.
    pub async fn cache_global_context_data(&mut self) -> Result<(), RegistryError> {
        match self {
            Adapter::Postgres { pool, catalog, .. } => {
                let mut conn = pool.acquire().await.map_err(RegistryError::Cache)?;
                *catalog = postgres::cache_global_context_data(&mut conn)
                    .await
                    .map_err(RegistryError::Cache)?;
            }
            Adapter::Mysql { .. } => {}
        }
        Ok(())
    }

    pub async fn user_exists(&self, username: &str) -> Result<bool, AdapterError> {
        match self {
            Adapter::Postgres { pool, .. } => {
                let mut conn = pool.acquire().await?;
                Ok(postgres::user_exists(&mut conn, username).await?)
            }
            Adapter::Mysql { pool, .. } => {
                let mut conn = pool.acquire().await?;
                Ok(mysql::user_exists(&mut conn, username).await?)
            }
        }
    }

    pub async fn create_user(&self, username: &str, password: &str) -> Result<(), AdapterError> {
        match self {
            Adapter::Postgres { pool, flavor, .. } => {
                let mut conn = pool.acquire().await?;
                postgres::create_user(&mut conn, *flavor, username, password).await
            }
            Adapter::Mysql { pool, .. } => {
                let mut conn = pool.acquire().await?;
                mysql::create_user(&mut conn, username, password).await?;
                Ok(())
            }
        }
    }

    pub async fn update_password(&self, username: &str, password: &str) -> Result<(), AdapterError> {
        match self {
            Adapter::Postgres { pool, flavor, .. } => {
                let mut conn = pool.acquire().await?;
                postgres::update_password(&mut conn, *flavor, username, password).await
            }
            Adapter::Mysql { pool, .. } => {
                let mut conn = pool.acquire().await?;
                mysql::update_password(&mut conn, username, password).await?;
                Ok(())
            }
        }
    }

    pub async fn drop_user(&self, username: &str) -> Result<(), AdapterError> {
        match self {
            Adapter::Postgres { pool, .. } => {
                let mut conn = pool.acquire().await?;
                postgres::drop_user(&mut conn, username).await?;
                Ok(())
            }
            Adapter::Mysql { pool, .. } => {
                let mut conn = pool.acquire().await?;
                mysql::drop_user(&mut conn, username).await?;
                Ok(())
            }
        }
    }

    /// Opens a transaction for C4's revoke-then-apply sequence.
    pub async fn begin_grant_transaction(&self) -> Result<GrantTransaction<'_>, AdapterError> {
        match self {
            Adapter::Postgres { pool, catalog, .. } => {
                Ok(GrantTransaction::Postgres(pool.begin().await?, catalog.clone()))
            }
            Adapter::Mysql { pool, .. } => Ok(GrantTransaction::Mysql(pool.begin().await?)),
        }
    }
}

/// An open transaction for a single grant's revoke-then-apply sequence
/// (spec §4.4). Consumed by `commit`/`rollback`.
pub enum GrantTransaction<'c> {
    Postgres(sqlx::Transaction<'c, sqlx::Postgres>, PgCatalog),
    Mysql(sqlx::Transaction<'c, sqlx::MySql>),
}

impl<'c> GrantTransaction<'c> {
    pub async fn revoke_everything(&mut self, username: &str) -> Result<(), sqlx::Error> {
        match self {
            GrantTransaction::Postgres(tx, catalog) => postgres::revoke_everything(tx, username, catalog).await,
            GrantTransaction::Mysql(tx) => mysql::revoke_everything(tx, username).await,
        }
    }

    #[must_use]
    pub fn create_grant_context(&self, username: &str) -> tera::Context {
        match self {
            GrantTransaction::Postgres(_, catalog) => postgres::create_grant_context(catalog, username),
            GrantTransaction::Mysql(_) => mysql::create_grant_context(username),
        }
    }

    pub async fn execute_statement(&mut self, sql: &str) -> Result<(), sqlx::Error> {
        match self {
            GrantTransaction::Postgres(tx, _) => {
                sqlx::query(sql).execute(&mut **tx).await?;
            }
            GrantTransaction::Mysql(tx) => {
                sqlx::query(sql).execute(&mut **tx).await?;
            }
        }
        Ok(())
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        match self {
            GrantTransaction::Postgres(tx, _) => tx.commit().await,
            GrantTransaction::Mysql(tx) => tx.commit().await,
        }
    }

    pub async fn rollback(self) -> Result<(), sqlx::Error> {
        match self {
            GrantTransaction::Postgres(tx, _) => tx.rollback().await,
            GrantTransaction::Mysql(tx) => tx.rollback().await,
        }
    }
}
