//! Session store adapters.
//!
//! - [`RedisSessionStore`]: production store, one `session:<token>` key per
//!   session with a server-side expiry.
//! - [`InMemorySessionStore`]: single-process fallback used when no Redis URL
//!   is configured, and by the integration tests.

mod memory_session_store;
mod redis_session_store;

pub use memory_session_store::InMemorySessionStore;
pub use redis_session_store::{RedisSessionStore, SESSION_KEY_PREFIX};
