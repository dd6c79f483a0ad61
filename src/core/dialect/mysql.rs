//! MySQL dialect adapter. Unlike PostgreSQL/Redshift, `CREATE USER` and
//! `SET PASSWORD` accept the password as a bound parameter over sqlx's
//! prepared-statement protocol here, so it never needs to be spliced into
//! SQL text. Assumes MySQL 5.7+ / a server build that permits account-
//! management statements as prepared statements; 5.6 and earlier reject
//! them, which would surface as `unknown_error` for this dialect.

use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::{MySqlConnection, MySqlPool};

use crate::core::model::{ConnectionSpec, Database};

use super::identifier::quote_mysql_identifier;

/// MySQL user accounts are host-scoped; this agent always manages the
/// wildcard host. Whether this should become per-user configuration is an
/// open question (spec §9) left unresolved.
pub const USER_HOST: &str = "%";

pub async fn connect(
    database: &Database,
    _connection: &ConnectionSpec,
    master_password: &str,
) -> Result<MySqlPool, sqlx::Error> {
    let options = MySqlConnectOptions::new()
        .host(&database.host)
        .port(database.port)
        .username(&database.master_username)
        .password(master_password);

    MySqlPoolOptions::new().max_connections(5).connect_with(options).await
}

pub async fn user_exists(conn: &mut MySqlConnection, username: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT user, host FROM mysql.user WHERE user = ? AND host = ?")
        .bind(username)
        .bind(USER_HOST)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

pub async fn create_user(
    conn: &mut MySqlConnection,
    username: &str,
    password: &str,
) -> Result<(), sqlx::Error> {
    let quoted = quote_mysql_identifier(username);
    sqlx::query(&format!("CREATE USER {quoted}@'{USER_HOST}' IDENTIFIED BY ?"))
        .bind(password)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn update_password(
    conn: &mut MySqlConnection,
    username: &str,
    password: &str,
) -> Result<(), sqlx::Error> {
    let quoted = quote_mysql_identifier(username);
    sqlx::query(&format!("SET PASSWORD FOR {quoted}@'{USER_HOST}' = ?"))
        .bind(password)
        .execute(conn)
        .await?;
    Ok(())
}

pub fn drop_user_statement(quoted_username: &str) -> String {
    format!("DROP USER {quoted_username}@'{USER_HOST}'")
}

pub async fn drop_user(conn: &mut MySqlConnection, username: &str) -> Result<(), sqlx::Error> {
    revoke_everything(conn, username).await?;
    let quoted = quote_mysql_identifier(username);
    sqlx::query(&drop_user_statement(&quoted)).execute(conn).await?;
    Ok(())
}

/// Idempotent: `REVOKE ALL PRIVILEGES, GRANT OPTION` clears the user's
/// entire grant set in one statement, unlike PostgreSQL's per-schema reset.
pub async fn revoke_everything(conn: &mut MySqlConnection, username: &str) -> Result<(), sqlx::Error> {
    let quoted = quote_mysql_identifier(username);
    sqlx::query(&format!(
        "REVOKE ALL PRIVILEGES, GRANT OPTION FROM {quoted}@'{USER_HOST}'"
    ))
    .execute(conn)
    .await?;
    Ok(())
}

/// The context exposed to grant templates: `{{username}}` renders as
/// `` `name`@`%` ``, plus a `type` marker some operator templates branch on.
pub fn create_grant_context(username: &str) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("type", "mysql");
    context.insert(
        "username",
        &format!("{}@{}", quote_mysql_identifier(username), quote_mysql_identifier(USER_HOST)),
    );
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_user_statement_targets_wildcard_host() {
        assert_eq!(drop_user_statement("`bob`"), "DROP USER `bob`@'%'");
    }

    #[test]
    fn grant_context_renders_backtick_at_backtick_username() {
        let context = create_grant_context("testUser123");
        let value = context.into_json();
        assert_eq!(value["username"], "`testUser123`@`%`");
        assert_eq!(value["type"], "mysql");
    }

    #[test]
    fn grant_context_quotes_backtick_in_username() {
        let context = create_grant_context("weird`user");
        let value = context.into_json();
        assert_eq!(value["username"], "`weird``user`@`%`");
    }
}
