//! Process configuration read from the environment.
//!
//! | Variable         | Default                                         |
//! | ---------------- | ----------------------------------------------- |
//! | `JWT_SECRET_KEY` | development-only key (logged as a warning)      |
//! | `DATABASE_URL`   | `sqlite://videmaison.db?mode=rwc`               |
//! | `HOST`           | `127.0.0.1`                                     |
//! | `PORT`           | `5000`                                          |
//! | `CORS_ORIGINS`   | `http://localhost:3000,http://127.0.0.1:3000`   |
//!
//! Mail settings (`MAIL_*`, `ADMIN_EMAIL`, `APP_NAME`) are read separately by
//! `MailerConfig`.

use crate::{JwtConfig, builder::VideMaisonBuilderError};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://videmaison.db?mode=rwc";
pub const DEFAULT_PORT: u16 = 5000;
const DEV_JWT_SECRET: &str = "jwt-dev-key-change-in-production";
const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, VideMaisonBuilderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, VideMaisonBuilderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = match non_empty("JWT_SECRET_KEY") {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET_KEY is not set, using the development key");
                defaults.jwt_secret
            }
        };

        let port = match non_empty("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                VideMaisonBuilderError::InvalidConfiguration(format!(
                    "PORT must be a port number, got {raw}"
                ))
            })?,
            None => defaults.port,
        };

        let cors_origins = match non_empty("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.cors_origins,
        };

        Ok(Self {
            jwt_secret,
            database_url: non_empty("DATABASE_URL").unwrap_or(defaults.database_url),
            host: non_empty("HOST").unwrap_or(defaults.host),
            port,
            cors_origins,
        })
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new_hs256(self.jwt_secret.as_bytes().to_vec())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
        assert_eq!(config.cors_origins.len(), 2);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET_KEY", "s3cret"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("CORS_ORIGINS", "https://videmaison.be, https://admin.videmaison.be"),
        ]))
        .unwrap();

        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(
            config.cors_origins,
            vec!["https://videmaison.be", "https://admin.videmaison.be"]
        );
    }

    #[test]
    fn test_invalid_port() {
        let err = AppConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: PORT must be a port number, got http"
        );
    }
}
