//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Plain input structs consumed by the repositories
//! - `Deserialize` request bodies / query params used by the API handlers
//!
//! JSON uses camelCase field names throughout.

pub mod game_session;
pub mod party;
pub mod party_invitation;
