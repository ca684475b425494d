//! Application settings loaded via OrthoConfig.
//!
//! Every field can come from a `LIVEPOLL_*` environment variable, a CLI flag
//! or a configuration file. Absent optional integrations fall back to their
//! disabled adapters.

use std::net::SocketAddr;
use std::time::Duration;

use livepoll::domain::DEFAULT_ASSIST_TIMEOUT;
use livepoll::domain::mirror::DEFAULT_QUEUE_CAPACITY;
use livepoll::outbound::generative::{DEFAULT_GENERATIVE_ENDPOINT, DEFAULT_GENERATIVE_MODEL};
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    #[error("invalid {field} url {value:?}: {message}")]
    Url {
        field: &'static str,
        value: String,
        message: String,
    },
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LIVEPOLL")]
pub struct AppSettings {
    /// Socket address to listen on.
    #[ortho_config(default = "0.0.0.0:8080".into())]
    pub bind_addr: String,
    /// PostgreSQL connection string; the in-memory store is used without it.
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    /// Base URL of the realtime broadcast table store.
    pub mirror_url: Option<String>,
    pub mirror_api_key: Option<String>,
    pub mirror_queue_capacity: Option<usize>,
    /// API key for the generative text service.
    pub generative_api_key: Option<String>,
    pub generative_endpoint: Option<String>,
    pub generative_model: Option<String>,
    /// Deadline for one generation call, in milliseconds.
    pub assist_timeout_ms: Option<u64>,
    /// Copy broadcast store rows into the primary store before serving.
    #[ortho_config(default = false)]
    pub reconcile_on_start: bool,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty())
}

fn parse_url(field: &'static str, value: &str) -> Result<url::Url, SettingsError> {
    url::Url::parse(value).map_err(|err| SettingsError::Url {
        field,
        value: value.to_owned(),
        message: err.to_string(),
    })
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = match self.bind_addr.trim() {
            "" => DEFAULT_BIND_ADDR,
            configured => configured,
        };
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_ref())
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Mirror endpoint and key, when both are configured.
    pub fn mirror(&self) -> Result<Option<(url::Url, String)>, SettingsError> {
        match (
            non_blank(self.mirror_url.as_ref()),
            non_blank(self.mirror_api_key.as_ref()),
        ) {
            (Some(url), Some(key)) => Ok(Some((parse_url("mirror", url)?, key.to_owned()))),
            _ => Ok(None),
        }
    }

    pub fn mirror_queue_capacity(&self) -> usize {
        self.mirror_queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn generative_api_key(&self) -> Option<&str> {
        non_blank(self.generative_api_key.as_ref())
    }

    pub fn generative_endpoint(&self) -> Result<url::Url, SettingsError> {
        let raw = non_blank(self.generative_endpoint.as_ref()).unwrap_or(DEFAULT_GENERATIVE_ENDPOINT);
        parse_url("generative", raw)
    }

    pub fn generative_model(&self) -> &str {
        non_blank(self.generative_model.as_ref()).unwrap_or(DEFAULT_GENERATIVE_MODEL)
    }

    pub fn assist_timeout(&self) -> Duration {
        self.assist_timeout_ms
            .map_or(DEFAULT_ASSIST_TIMEOUT, Duration::from_millis)
    }
}
