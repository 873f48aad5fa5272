//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from `CHIRP_*` environment variables, CLI flags, or a config
//! file. Leaving `database_url` or `redis_url` unset selects the in-memory
//! adapter for that concern.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use pagination::DEFAULT_MAX_LIMIT;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value}: {reason}")]
    BindAddr { value: String, reason: String },
    #[error("max_page_size must be at least 1")]
    ZeroPageSize,
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CHIRP")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Redis connection string for the session store.
    pub redis_url: Option<String>,
    /// Mark the session cookie `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// Hard upper bound on `limit`.
    pub max_page_size: Option<u32>,
    /// Connection pool size.
    pub db_max_connections: Option<u32>,
    /// Apply embedded migrations at startup.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl AppSettings {
    /// Parsed listen address.
    ///
    /// # Errors
    /// Returns [`SettingsError::BindAddr`] when the value is not `host:port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            reason: err.to_string(),
        })
    }

    /// Page ceiling, defaulting to [`DEFAULT_MAX_LIMIT`].
    ///
    /// # Errors
    /// Returns [`SettingsError::ZeroPageSize`] for an explicit zero.
    pub fn max_page_size(&self) -> Result<u32, SettingsError> {
        match self.max_page_size {
            Some(0) => Err(SettingsError::ZeroPageSize),
            Some(max) => Ok(max),
            None => Ok(DEFAULT_MAX_LIMIT),
        }
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "CHIRP_BIND_ADDR",
        "CHIRP_DATABASE_URL",
        "CHIRP_REDIS_URL",
        "CHIRP_COOKIE_SECURE",
        "CHIRP_MAX_PAGE_SIZE",
        "CHIRP_DB_MAX_CONNECTIONS",
        "CHIRP_RUN_MIGRATIONS",
    ];

    fn load(overrides: &[(&str, &str)]) -> AppSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        AppSettings::load_from_iter([OsString::from("chirp-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_select_in_memory_adapters() {
        let settings = load(&[]);
        assert!(settings.database_url.is_none());
        assert!(settings.redis_url.is_none());
        assert!(settings.cookie_secure);
        assert!(settings.run_migrations);
        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(settings.max_page_size(), Ok(DEFAULT_MAX_LIMIT));
        assert_eq!(settings.db_max_connections(), 10);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load(&[
            ("CHIRP_BIND_ADDR", "127.0.0.1:9000"),
            ("CHIRP_DATABASE_URL", "postgres://localhost/chirp"),
            ("CHIRP_REDIS_URL", "redis://localhost:6379"),
            ("CHIRP_COOKIE_SECURE", "false"),
            ("CHIRP_MAX_PAGE_SIZE", "50"),
            ("CHIRP_DB_MAX_CONNECTIONS", "4"),
        ]);
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/chirp")
        );
        assert_eq!(settings.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert!(!settings.cookie_secure);
        assert_eq!(settings.max_page_size(), Ok(50));
        assert_eq!(settings.db_max_connections(), 4);
        assert_eq!(settings.bind_addr().expect("address").port(), 9000);
    }

    #[rstest]
    #[case("not an address")]
    #[case("8080")]
    fn malformed_bind_address_is_rejected(#[case] raw: &str) {
        let settings = load(&[("CHIRP_BIND_ADDR", raw)]);
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }

    #[rstest]
    fn zero_page_size_is_rejected() {
        let settings = load(&[("CHIRP_MAX_PAGE_SIZE", "0")]);
        assert_eq!(settings.max_page_size(), Err(SettingsError::ZeroPageSize));
    }
}
