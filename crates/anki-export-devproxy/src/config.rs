//! Configuration for the development proxy.
//!
//! Loaded with figment: an optional YAML file, then environment
//! variables prefixed `ANKI_EXPORT_PROXY_` (nested keys split on `__`).
//! Every field has a default, so running without a config file gives
//! the standard setup:
//!
//! ```yaml
//! listen: 127.0.0.1:5173
//! static_dir: dist
//! max_body_bytes: 67108864
//! routes:
//!   - prefix: /api/anki-export
//!     target: http://localhost:9000
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anki_export_form::EXPORT_PATH;
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::proxy::RouteTable;

/// Address of the separately run export backend.
pub const DEFAULT_BACKEND: &str = "http://localhost:9000";

/// Largest request body forwarded upstream (64 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Path to configuration file. A missing file means all defaults.
    #[arg(
        short = 'f',
        long,
        env = "ANKI_EXPORT_PROXY_CONFIG",
        default_value = "devproxy.yaml"
    )]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// One forwarding rule: requests whose path starts with `prefix` go to
/// `target`, with path and query unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRoute {
    pub prefix: String,
    pub target: String,
}

impl ProxyRoute {
    #[must_use]
    pub fn new(prefix: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the development server listens on.
    pub listen: SocketAddr,
    /// Directory of the built web app, served for unmatched paths.
    pub static_dir: PathBuf,
    /// Bodies larger than this are answered with 413 and not forwarded.
    pub max_body_bytes: usize,
    /// Forwarding rules, checked in order.
    pub routes: Vec<ProxyRoute>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 5173)),
            static_dir: PathBuf::from("dist"),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            routes: vec![ProxyRoute::new(EXPORT_PATH, DEFAULT_BACKEND)],
        }
    }
}

/// Errors that can occur while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file or environment could not be parsed.
    #[error(transparent)]
    Load(#[from] Box<figment::Error>),

    /// A forwarding rule is malformed.
    #[error("invalid route {prefix:?}: {reason}")]
    InvalidRoute { prefix: String, reason: String },
}

impl Config {
    pub fn figment(args: &Args) -> Figment {
        Figment::from(figment::providers::Serialized::defaults(Self::default()))
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("ANKI_EXPORT_PROXY_").split("__"))
    }

    /// Load and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] for unreadable or mistyped values
    /// and [`ConfigError::InvalidRoute`] for a bad forwarding rule.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(args).extract().map_err(Box::new)?;
        config.route_table()?;
        Ok(config)
    }

    /// The forwarding rules in matchable form.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRoute`] if a prefix does not start
    /// with `/` or a target is not an absolute `http`/`https` URL.
    pub fn route_table(&self) -> Result<RouteTable, ConfigError> {
        RouteTable::new(&self.routes)
    }
}
