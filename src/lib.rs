//! `dbrhino-agent`: fetches a declarative grant specification from a
//! control-plane service, reconciles it against PostgreSQL, Redshift and
//! MySQL servers, and reports the outcome back.
//!
//! [`core`] is the reconciliation engine and has no knowledge of HTTP,
//! configuration files, or the CLI — those live in the sibling modules and
//! depend on `core`, never the other way around.

pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod logging;
pub mod scheduler;
pub mod transport;
