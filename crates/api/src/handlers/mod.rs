pub mod party;
pub mod servers;
pub mod session;
