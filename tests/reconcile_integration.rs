//! End-to-end reconciliation scenarios (spec §8) against real database
//! servers. These are `#[ignore]`d by default — the same shape as the
//! original agent's `grants_test.go`/`mysql_test.go`/`postgresql_test.go`,
//! which also require live databases. Run with:
//!
//! ```text
//! DBRHINO_TEST_PG_HOST=localhost DBRHINO_TEST_PG_USER=buck \
//! DBRHINO_TEST_PG_PASSWORD=password DBRHINO_TEST_PG_DB=dbrhino_agent_tests \
//! cargo test --test reconcile_integration -- --ignored
//! ```
//!
//! The env vars carry connection details only; the scenarios below still
//! drive everything else (user/grant definitions, outcomes) through the
//! same `Specification`/`ConnectionRegistry`/`run_cycle` path production
//! code uses. Passwords use the `decrypted_*` test hooks (spec §4.2 step 2,
//! §4.3 step 3) so no real RSA keypair is involved.

use std::env;

use dbrhino_agent_lib::core::model::{ConnectionSpec, Database, Grant, Outcome, Specification, User};
use dbrhino_agent_lib::core::reconcile::checkin::run_cycle;
use dbrhino_agent_lib::core::registry::ConnectionRegistry;
use rsa::RsaPrivateKey;

fn test_private_key() -> RsaPrivateKey {
    // Unused by these scenarios (every password goes through a test hook),
    // but `run_cycle` needs one to exist.
    let mut rng = rand_core::OsRng;
    RsaPrivateKey::new(&mut rng, 2048).expect("key generation should succeed")
}

struct PgTarget {
    host: String,
    port: u16,
    username: String,
    password: String,
    db_name: String,
}

fn pg_target_from_env() -> Option<PgTarget> {
    let host = env::var("DBRHINO_TEST_PG_HOST").ok()?;
    Some(PgTarget {
        host,
        port: env::var("DBRHINO_TEST_PG_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5432),
        username: env::var("DBRHINO_TEST_PG_USER").unwrap_or_else(|_| "buck".to_string()),
        password: env::var("DBRHINO_TEST_PG_PASSWORD").unwrap_or_default(),
        db_name: env::var("DBRHINO_TEST_PG_DB").unwrap_or_else(|_| "dbrhino_agent_tests".to_string()),
    })
}

fn pg_spec_and_database(target: &PgTarget) -> (Specification, i64) {
    let database_id = 1;
    let database = Database {
        id: database_id,
        name: "dbrhino_agent_tests".to_string(),
        flavor: "postgresql".to_string(),
        host: target.host.clone(),
        port: target.port,
        master_username: target.username.clone(),
        master_password: String::new(),
        default_database: target.db_name.clone(),
        decrypted_master_password: Some(target.password.clone()),
    };

    let connection = ConnectionSpec {
        id: 1,
        database: database.clone(),
        db_name: target.db_name.clone(),
        is_default: true,
    };

    let spec = Specification {
        connections: vec![connection],
        users: vec![],
        grants: vec![],
    };

    (spec, database_id)
}

/// Scenario 1 (spec §8): PG create-and-grant.
#[tokio::test]
#[ignore = "requires a live PostgreSQL instance; set DBRHINO_TEST_PG_HOST"]
async fn pg_create_and_grant_applies_user_and_grant() {
    let Some(target) = pg_target_from_env() else {
        return;
    };
    let (mut spec, database_id) = pg_spec_and_database(&target);

    spec.users.push(User {
        id: 1,
        encrypted_password: String::new(),
        decrypted_password: Some("foobar1234".to_string()),
        active: true,
        username: "testUser123".to_string(),
        database_id,
    });
    spec.grants.push(Grant {
        id: 1,
        database_id,
        connection_id: 1,
        user_id: 1,
        statements: vec![
            "GRANT USAGE ON SCHEMA test_schema TO {{username}}".to_string(),
            "GRANT SELECT ON ALL TABLES IN SCHEMA test_schema TO {{username}}".to_string(),
        ],
        version: "abc".to_string(),
        username: "testUser123".to_string(),
    });

    let key = test_private_key();
    let registry = ConnectionRegistry::build(&spec, &key).await;
    let checkin = run_cycle(&spec, &registry, &key).await;

    assert_eq!(checkin.user_results.len(), 1);
    assert_eq!(checkin.user_results[0].result, Outcome::Applied);
    assert_eq!(checkin.grant_results.len(), 1);
    assert_eq!(checkin.grant_results[0].result, Outcome::Applied);
}

/// Scenario 2 (spec §8): PG revoke — same user, `active:false`.
#[tokio::test]
#[ignore = "requires a live PostgreSQL instance; set DBRHINO_TEST_PG_HOST"]
async fn pg_revoke_drops_the_user() {
    let Some(target) = pg_target_from_env() else {
        return;
    };
    let (mut spec, database_id) = pg_spec_and_database(&target);

    spec.users.push(User {
        id: 1,
        encrypted_password: String::new(),
        decrypted_password: Some("foobar1234".to_string()),
        active: false,
        username: "testUser123".to_string(),
        database_id,
    });

    let key = test_private_key();
    let registry = ConnectionRegistry::build(&spec, &key).await;
    let checkin = run_cycle(&spec, &registry, &key).await;

    assert_eq!(checkin.user_results.len(), 1);
    assert_eq!(checkin.user_results[0].result, Outcome::Revoked);
}

/// Scenario 5 (spec §8): unknown flavor errors the registry entry without
/// affecting other connections. This one needs no live database at all.
#[tokio::test]
async fn unknown_flavor_is_a_connection_issue_and_does_not_panic() {
    let database = Database {
        id: 1,
        name: "legacy".to_string(),
        flavor: "oracle".to_string(),
        host: "localhost".to_string(),
        port: 1521,
        master_username: "u".to_string(),
        master_password: String::new(),
        default_database: "d".to_string(),
        decrypted_master_password: Some("unused".to_string()),
    };
    let connection = ConnectionSpec {
        id: 1,
        database,
        db_name: "d".to_string(),
        is_default: true,
    };
    let spec = Specification {
        connections: vec![connection],
        users: vec![User {
            id: 1,
            encrypted_password: String::new(),
            decrypted_password: Some("whatever1".to_string()),
            active: true,
            username: "someone".to_string(),
            database_id: 1,
        }],
        grants: vec![],
    };

    let key = test_private_key();
    let registry = ConnectionRegistry::build(&spec, &key).await;
    let checkin = run_cycle(&spec, &registry, &key).await;

    assert_eq!(checkin.user_results.len(), 1);
    assert_eq!(checkin.user_results[0].result, Outcome::ConnectionIssue);
}
