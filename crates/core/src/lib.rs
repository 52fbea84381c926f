//! Domain layer for the lobby service.
//!
//! Holds everything that does not touch I/O: the error taxonomy, timestamp
//! types, presence constants, server-browser listing rules and party rules.
//! The `db` and `api` crates both build on these definitions.

pub mod error;
pub mod party;
pub mod presence;
pub mod server_browser;
pub mod types;
pub mod validation;
