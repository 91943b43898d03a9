//! Server settings read from the environment.

use std::env;

use actix_web::cookie::Key;

const DEFAULT_DATABASE_URL: &str = "app.db";
const DEFAULT_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TEMPLATES_DIR: &str = "templates/**/*";

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub address: String,
    pub port: u16,
    /// Cookie signing secret; `None` makes the server generate a key per run.
    pub secret: Option<String>,
    /// Glob passed to Tera.
    pub templates_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            secret: None,
            templates_dir: DEFAULT_TEMPLATES_DIR.to_string(),
        }
    }
}

impl ServerConfig {
    /// Read the configuration from process environment variables.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
                log::warn!("Invalid PORT value '{raw}', using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => defaults.port,
        };

        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            address: lookup("ADDRESS").unwrap_or(defaults.address),
            port,
            secret: lookup("SECRET_KEY").filter(|secret| !secret.is_empty()),
            templates_dir: lookup("TEMPLATES_DIR").unwrap_or(defaults.templates_dir),
        }
    }

    /// Key used to sign flash message cookies.
    ///
    /// Secrets shorter than 64 bytes cannot seed a key and are replaced by a
    /// generated one.
    pub fn cookie_key(&self) -> Key {
        match self.secret.as_deref().map(|secret| Key::try_from(secret.as_bytes())) {
            Some(Ok(key)) => key,
            Some(Err(err)) => {
                log::warn!("SECRET_KEY is unusable ({err}), generating a random key");
                Key::generate()
            }
            None => Key::generate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| values.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[]));

        assert_eq!(config.database_url, "app.db");
        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.secret.is_none());
        assert_eq!(config.templates_dir, "templates/**/*");
    }

    #[test]
    fn values_are_read_from_environment() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "/tmp/catalogo.db"),
            ("ADDRESS", "0.0.0.0"),
            ("PORT", "9000"),
            ("SECRET_KEY", "secreto"),
        ]));

        assert_eq!(config.database_url, "/tmp/catalogo.db");
        assert_eq!(config.address, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.secret.as_deref(), Some("secreto"));
    }

    #[test]
    fn invalid_port_falls_back_to_default() {
        let config = ServerConfig::from_lookup(lookup_from(&[("PORT", "ochenta")]));

        assert_eq!(config.port, 8080);
    }
}
