//! Outbound adapters implementing the domain's driven ports.
//!
//! - `persistence`: PostgreSQL repositories via Diesel.
//! - `session`: Redis and in-memory session stores.
//! - `credentials`: Argon2 password hashing.
//! - `memory`: process-local repositories for development and tests.

pub mod credentials;
pub mod memory;
pub mod persistence;
pub mod session;
