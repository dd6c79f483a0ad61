//! User Reconciler (spec §4.3): per-user create/update/drop/skip decision.

use rsa::RsaPrivateKey;

use crate::core::model::{Outcome, Specification, User, UserResult};
use crate::core::password::check_password_chars;
use crate::core::registry::ConnectionRegistry;

/// The pure half of the decision table in spec §4.3 — everything that
/// doesn't need a database round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    /// Doesn't exist, shouldn't exist: nothing to do.
    Noop,
    Drop,
    Create,
    Update,
}

#[must_use]
pub fn decide_user_action(exists: bool, active: bool) -> UserAction {
    match (exists, active) {
        (false, false) => UserAction::Noop,
        (true, false) => UserAction::Drop,
        (false, true) => UserAction::Create,
        (true, true) => UserAction::Update,
    }
}

/// Reconciles one user against the registry, returning its result. Never
/// panics or propagates — every failure mode is captured in the returned
/// [`UserResult`].
pub async fn reconcile_user(
    user: &User,
    spec: &Specification,
    registry: &ConnectionRegistry,
    private_key: &RsaPrivateKey,
) -> UserResult {
    let Some(connection) = spec.default_connection(user.database_id) else {
        return UserResult::unknown_error(user.id, "no default connection for this user's database");
    };

    let adapter = match registry.get(connection.id) {
        None => return UserResult::unknown_error(user.id, "connection id missing from registry"),
        Some(Err(_)) => return UserResult::new(user.id, Outcome::ConnectionIssue),
        Some(Ok(adapter)) => adapter,
    };

    let password = if let Some(decrypted) = &user.decrypted_password {
        decrypted.clone()
    } else if user.encrypted_password.is_empty() {
        return UserResult::new(user.id, Outcome::NoUserPassword);
    } else {
        match crate::crypto::decrypt_password(private_key, &user.encrypted_password) {
            Ok(plaintext) => plaintext,
            Err(err) => return UserResult::unknown_error(user.id, err),
        }
    };

    let exists = match adapter.user_exists(&user.username).await {
        Ok(exists) => exists,
        Err(err) => return UserResult::unknown_error(user.id, err),
    };

    match decide_user_action(exists, user.active) {
        UserAction::Noop => UserResult::new(user.id, Outcome::Applied),
        UserAction::Drop => match adapter.drop_user(&user.username).await {
            Ok(()) => UserResult::new(user.id, Outcome::Revoked),
            Err(err) => UserResult::unknown_error(user.id, err),
        },
        UserAction::Create => {
            if let Err(err) = check_password_chars(&password) {
                return UserResult::unknown_error(user.id, err);
            }
            match adapter.create_user(&user.username, &password).await {
                Ok(()) => UserResult::new(user.id, Outcome::Applied),
                Err(err) => UserResult::unknown_error(user.id, err),
            }
        }
        UserAction::Update => {
            if let Err(err) = check_password_chars(&password) {
                return UserResult::unknown_error(user.id, err);
            }
            match adapter.update_password(&user.username, &password).await {
                Ok(()) => UserResult::new(user.id, Outcome::Applied),
                Err(err) => UserResult::unknown_error(user.id, err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_table_matches_spec() {
        assert_eq!(decide_user_action(false, false), UserAction::Noop);
        assert_eq!(decide_user_action(true, false), UserAction::Drop);
        assert_eq!(decide_user_action(false, true), UserAction::Create);
        assert_eq!(decide_user_action(true, true), UserAction::Update);
    }
}
