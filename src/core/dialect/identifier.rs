//! Identifier quoting per dialect family. Pure and independently testable,
//! matching the teacher's `server::sql::quote_literal`/`quote_identifier`
//! pair.

/// PostgreSQL/Redshift identifier quoting: double-quote, doubling any
/// embedded double-quote.
#[must_use]
pub fn quote_postgres_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// MySQL identifier quoting: backtick, doubling any embedded backtick.
#[must_use]
pub fn quote_mysql_identifier(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_quoting_round_trips_embedded_quote() {
        let quoted = quote_postgres_identifier(r#"weird"user"#);
        assert_eq!(quoted, "\"weird\"\"user\"");
    }

    #[test]
    fn postgres_quoting_plain_name() {
        assert_eq!(quote_postgres_identifier("testUser123"), "\"testUser123\"");
    }

    #[test]
    fn mysql_quoting_round_trips_embedded_backtick() {
        let quoted = quote_mysql_identifier("weird`user");
        assert_eq!(quoted, "`weird``user`");
    }

    #[test]
    fn mysql_quoting_plain_name() {
        assert_eq!(quote_mysql_identifier("testUser123"), "`testUser123`");
    }
}
