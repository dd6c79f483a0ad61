//! Checkin Assembler (spec §4.5): runs the reconciler over an entire
//! specification and assembles the report the transport collaborator posts.

use rsa::RsaPrivateKey;

use crate::core::model::{Checkin, Specification};
use crate::core::registry::ConnectionRegistry;

use super::grant::apply_grant;
use super::user::reconcile_user;

/// Runs one full cycle's worth of reconciliation: every user, then every
/// grant, both in input order, against an already-built registry.
pub async fn run_cycle(spec: &Specification, registry: &ConnectionRegistry, private_key: &RsaPrivateKey) -> Checkin {
    let mut user_results = Vec::with_capacity(spec.users.len());
    for user in &spec.users {
        let result = reconcile_user(user, spec, registry, private_key).await;
        result.log();
        user_results.push(result);
    }

    let mut grant_results = Vec::with_capacity(spec.grants.len());
    for grant in &spec.grants {
        let result = apply_grant(grant, registry).await;
        result.log();
        grant_results.push(result);
    }

    Checkin {
        agent_version: env!("CARGO_PKG_VERSION").to_string(),
        user_results,
        grant_results,
    }
}
