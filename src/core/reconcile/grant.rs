//! Grant Applier (spec §4.4): revoke-then-apply, transactionally, per grant.
//!
//! Undefined template variables are a render error rather than rendering as
//! empty strings — tera's default behavior — which is one of the two
//! uniform policies the spec allows (§9) and the simpler one to reason
//! about: a template referencing a typo'd variable name fails loudly
//! instead of silently emitting a malformed statement.

use crate::core::model::{Grant, GrantResult, Outcome};
use crate::core::registry::ConnectionRegistry;

/// Splits a rendered template on `;`, trimming whitespace and dropping
/// empty fragments, in source order.
#[must_use]
pub fn split_sql_statements(rendered: &str) -> Vec<String> {
    rendered
        .split(';')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Applies one grant's revoke-then-apply sequence inside a single
/// transaction, committing only if every statement executes cleanly.
pub async fn apply_grant(grant: &Grant, registry: &ConnectionRegistry) -> GrantResult {
    let adapter = match registry.get(grant.connection_id) {
        None => {
            return GrantResult::unknown_error(
                grant.id,
                grant.version.clone(),
                "connection id missing from registry",
            );
        }
        Some(Err(_)) => return GrantResult::new(grant.id, grant.version.clone(), Outcome::ConnectionIssue),
        Some(Ok(adapter)) => adapter,
    };

    let mut txn = match adapter.begin_grant_transaction().await {
        Ok(txn) => txn,
        Err(err) => return GrantResult::unknown_error(grant.id, grant.version.clone(), err),
    };

    if let Err(err) = txn.revoke_everything(&grant.username).await {
        let _ = txn.rollback().await;
        return GrantResult::unknown_error(grant.id, grant.version.clone(), err);
    }

    let context = txn.create_grant_context(&grant.username);

    for template in &grant.statements {
        let rendered = match tera::Tera::one_off(template, &context, false) {
            Ok(rendered) => rendered,
            Err(err) => {
                let _ = txn.rollback().await;
                return GrantResult::unknown_error(
                    grant.id,
                    grant.version.clone(),
                    format!("could not render template << {template} >>: {err}"),
                );
            }
        };

        for statement in split_sql_statements(&rendered) {
            if let Err(err) = txn.execute_statement(&statement).await {
                let _ = txn.rollback().await;
                return GrantResult::unknown_error(grant.id, grant.version.clone(), err);
            }
        }
    }

    match txn.commit().await {
        Ok(()) => GrantResult::new(grant.id, grant.version.clone(), Outcome::Applied),
        Err(err) => GrantResult::unknown_error(grant.id, grant.version.clone(), err),
    }
}
