//! Process configuration.
//!
//! [`MarqueeConfig`] gathers everything the binary needs: the HTTP
//! listener settings defined here plus the library, catalog and generator
//! sections owned by their crates.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use marquee_catalog::CatalogConfig;
use marquee_library::LibraryConfig;
use marquee_recommend::GeneratorConfig;

/// A variable was set but could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("{key} has an invalid value '{value}'")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// Origins allowed to call the API from a browser.
    pub cors_origins: Vec<String>,
    /// Requests running longer are answered with 408. Recommendation
    /// requests wait on the generator, so keep this generous.
    pub request_timeout: Duration,
    /// Bound on session teardown after the listener stops.
    pub shutdown_timeout: Duration,
}

impl ServerConfig {
    /// | Env Var                 | Default                  |
    /// |-------------------------|--------------------------|
    /// | `HOST`                  | `0.0.0.0`                |
    /// | `PORT`                  | `3000`                   |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`  | `60`                     |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `10`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host: IpAddr = parse_or("HOST", env("HOST"), IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port: u16 = parse_or("PORT", env("PORT"), 3000)?;

        Ok(Self {
            listen: SocketAddr::new(host, port),
            cors_origins: split_origins(
                env("CORS_ORIGINS").as_deref().unwrap_or("http://localhost:5173"),
            ),
            request_timeout: Duration::from_secs(parse_or(
                "REQUEST_TIMEOUT_SECS",
                env("REQUEST_TIMEOUT_SECS"),
                60,
            )?),
            shutdown_timeout: Duration::from_secs(parse_or(
                "SHUTDOWN_TIMEOUT_SECS",
                env("SHUTDOWN_TIMEOUT_SECS"),
                10,
            )?),
        })
    }
}

/// Every section, loaded together at startup.
#[derive(Debug, Clone)]
pub struct MarqueeConfig {
    pub server: ServerConfig,
    pub library: LibraryConfig,
    pub catalog: CatalogConfig,
    pub generator: GeneratorConfig,
}

impl MarqueeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            library: LibraryConfig::from_env(),
            catalog: CatalogConfig::from_env(),
            generator: GeneratorConfig::from_env(),
        })
    }

    /// Settings that leave a collaborator unusable without stopping startup.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.catalog.api_token.is_empty() {
            missing.push("CATALOG_API_TOKEN");
        }
        if self.generator.api_key.is_empty() {
            missing.push("GENERATOR_API_KEY");
        }
        missing
    }
}

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse `raw` when present, otherwise fall back to `default`.
fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.trim().parse().map_err(|_| ConfigError { key, value }),
        None => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
