//! Password character-class validation.
//!
//! The PostgreSQL driver does not permit bound parameters inside
//! `CREATE USER ... PASSWORD ...` / `ALTER USER ... PASSWORD ...`, so those
//! statements splice the password directly into SQL text. To keep that safe
//! without bound parameters, any password reaching those statements is
//! restricted to `[A-Za-z0-9 ]+` first; anything else is a fatal
//! `unknown_error` for that user and no SQL is executed.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static PASSWORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9 ]+$").expect("password regex is valid"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Passwords may only contain letters, numbers, and spaces")]
pub struct InvalidPasswordChars;

pub fn check_password_chars(password: &str) -> Result<(), InvalidPasswordChars> {
    if PASSWORD_REGEX.is_match(password) {
        Ok(())
    } else {
        Err(InvalidPasswordChars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_letters_numbers_and_spaces() {
        assert!(check_password_chars("foobar1234").is_ok());
        assert!(check_password_chars("Foo Bar 123").is_ok());
    }

    #[test]
    fn rejects_symbols() {
        let err = check_password_chars("bad;password").unwrap_err();
        assert_eq!(err.to_string(), "Passwords may only contain letters, numbers, and spaces");
    }

    #[test]
    fn rejects_empty_string() {
        assert!(check_password_chars("").is_err());
    }

    #[test]
    fn is_case_insensitive() {
        assert!(check_password_chars("ABC123xyz").is_ok());
    }
}
