//! PostgreSQL and Redshift share everything in this module except the two
//! statements that differ between them (`CREATE USER` / `ALTER USER`
//! password syntax), factored out as [`PgFlavor`].

use sqlx::Row;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgConnection, PgPool};

use crate::core::model::{ConnectionSpec, Database};
use crate::core::password::check_password_chars;

use super::identifier::quote_postgres_identifier;

/// The two statements that differ between native PostgreSQL and Redshift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PgFlavor {
    Native,
    Redshift,
}

/// Current database name and non-system schema list, cached once per
/// connection (spec §4.1 `cacheGlobalContextData`).
#[derive(Debug, Clone, Default)]
pub struct PgCatalog {
    pub database: String,
    pub schemas: Vec<String>,
}

pub async fn connect(
    database: &Database,
    connection: &ConnectionSpec,
    master_password: &str,
) -> Result<PgPool, sqlx::Error> {
    let options = PgConnectOptions::new()
        .host(&database.host)
        .port(database.port)
        .username(&database.master_username)
        .password(master_password)
        .database(&connection.db_name)
        .ssl_mode(sqlx::postgres::PgSslMode::Disable);

    PgPoolOptions::new().max_connections(5).connect_with(options).await
}

async fn discover_current_database(conn: &mut PgConnection) -> Result<String, sqlx::Error> {
    let row = sqlx::query("SELECT current_database()").fetch_one(&mut *conn).await?;
    row.try_get(0)
}

async fn discover_non_system_schemas(conn: &mut PgConnection) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query(
        r"
          SELECT schema_name
          FROM information_schema.schemata
          WHERE schema_name NOT LIKE 'pg\_%'
            AND schema_name != 'information_schema'
        ",
    )
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(|row| row.try_get(0)).collect()
}

pub async fn cache_global_context_data(conn: &mut PgConnection) -> Result<PgCatalog, sqlx::Error> {
    let database = discover_current_database(&mut *conn).await?;
    let schemas = discover_non_system_schemas(&mut *conn).await?;
    Ok(PgCatalog { database, schemas })
}

pub async fn user_exists(conn: &mut PgConnection, username: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT usename FROM pg_catalog.pg_user WHERE usename = $1")
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.is_some())
}

pub fn create_user_statement(flavor: PgFlavor, quoted_username: &str, password: &str) -> String {
    match flavor {
        PgFlavor::Native | PgFlavor::Redshift => {
            format!("CREATE USER {quoted_username} PASSWORD '{password}'")
        }
    }
}

pub fn update_password_statement(flavor: PgFlavor, quoted_username: &str, password: &str) -> String {
    match flavor {
        PgFlavor::Native => format!("ALTER USER {quoted_username} WITH ENCRYPTED PASSWORD '{password}'"),
        PgFlavor::Redshift => format!("ALTER USER {quoted_username} PASSWORD '{password}'"),
    }
}

pub async fn create_user(
    conn: &mut PgConnection,
    flavor: PgFlavor,
    username: &str,
    password: &str,
) -> Result<(), crate::core::error::AdapterError> {
    check_password_chars(password)?;
    let quoted = quote_postgres_identifier(username);
    sqlx::query(&create_user_statement(flavor, &quoted, password))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn update_password(
    conn: &mut PgConnection,
    flavor: PgFlavor,
    username: &str,
    password: &str,
) -> Result<(), crate::core::error::AdapterError> {
    check_password_chars(password)?;
    let quoted = quote_postgres_identifier(username);
    sqlx::query(&update_password_statement(flavor, &quoted, password))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub fn drop_user_statement(quoted_username: &str) -> String {
    format!("DROP USER {quoted_username}")
}

pub async fn drop_user(conn: &mut PgConnection, username: &str) -> Result<(), sqlx::Error> {
    revoke_everything(conn, username, &cache_global_context_data(conn).await?).await?;
    let quoted = quote_postgres_identifier(username);
    sqlx::query(&drop_user_statement(&quoted)).execute(&mut *conn).await?;
    Ok(())
}

/// Idempotent: removes every privilege the user currently holds on the
/// database and every cached non-system schema, so the grant's template
/// statements can re-establish a clean set afterward.
pub async fn revoke_everything(
    conn: &mut PgConnection,
    username: &str,
    catalog: &PgCatalog,
) -> Result<(), sqlx::Error> {
    let quoted_user = quote_postgres_identifier(username);
    let quoted_db = quote_postgres_identifier(&catalog.database);

    sqlx::query(&format!("REVOKE ALL ON DATABASE {quoted_db} FROM {quoted_user}"))
        .execute(&mut *conn)
        .await?;

    const SCHEMA_REVOKE_TEMPLATES: [&str; 4] = [
        "REVOKE ALL ON SCHEMA {schema} FROM {user}",
        "REVOKE ALL ON ALL TABLES IN SCHEMA {schema} FROM {user}",
        "REVOKE ALL ON ALL SEQUENCES IN SCHEMA {schema} FROM {user}",
        "REVOKE ALL ON ALL FUNCTIONS IN SCHEMA {schema} FROM {user}",
    ];

    for template in SCHEMA_REVOKE_TEMPLATES {
        for schema in &catalog.schemas {
            let quoted_schema = quote_postgres_identifier(schema);
            let stmt = template
                .replace("{schema}", &quoted_schema)
                .replace("{user}", &quoted_user);
            sqlx::query(&stmt).execute(&mut *conn).await?;
        }
    }

    Ok(())
}

/// The context exposed to grant templates: `{{database}}`, `{{schemas}}`,
/// `{{username}}`, all pre-quoted.
pub fn create_grant_context(catalog: &PgCatalog, username: &str) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("database", &quote_postgres_identifier(&catalog.database));
    context.insert(
        "schemas",
        &catalog
            .schemas
            .iter()
            .map(|s| quote_postgres_identifier(s))
            .collect::<Vec<_>>(),
    );
    context.insert("username", &quote_postgres_identifier(username));
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_and_redshift_create_user_statements_differ_only_in_syntax_alignment() {
        let native = create_user_statement(PgFlavor::Native, "\"bob\"", "secret1");
        let redshift = create_user_statement(PgFlavor::Redshift, "\"bob\"", "secret1");
        assert_eq!(native, "CREATE USER \"bob\" PASSWORD 'secret1'");
        assert_eq!(redshift, "CREATE USER \"bob\" PASSWORD 'secret1'");
    }

    #[test]
    fn native_update_password_uses_encrypted_keyword() {
        let stmt = update_password_statement(PgFlavor::Native, "\"bob\"", "secret1");
        assert_eq!(stmt, "ALTER USER \"bob\" WITH ENCRYPTED PASSWORD 'secret1'");
    }

    #[test]
    fn redshift_update_password_omits_encrypted_keyword() {
        let stmt = update_password_statement(PgFlavor::Redshift, "\"bob\"", "secret1");
        assert_eq!(stmt, "ALTER USER \"bob\" PASSWORD 'secret1'");
    }

    #[test]
    fn grant_context_quotes_database_schemas_and_username() {
        let catalog = PgCatalog {
            database: "dbrhino_agent_tests".to_string(),
            schemas: vec!["test_schema".to_string(), "public".to_string()],
        };
        let context = create_grant_context(&catalog, "testUser123");
        let value = context.into_json();
        assert_eq!(value["database"], "\"dbrhino_agent_tests\"");
        assert_eq!(value["username"], "\"testUser123\"");
        assert_eq!(value["schemas"][0], "\"test_schema\"");
        assert_eq!(value["schemas"][1], "\"public\"");
    }
}
