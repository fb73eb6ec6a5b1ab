//! # Fray Generation Settings
//!
//! Read-only configuration handed by reference to every generation, length,
//! freeze and log query of the message engine. The engine never mutates it,
//! so a single instance can be shared across threads.
//!
//! ## Usage
//!
//! ```rust
//! use settings::Settings;
//!
//! let settings = Settings::default().with_seed(7).with_request_host("example.com");
//! assert_eq!(settings.seed, Some(7));
//! ```
//!
//! Settings can also be loaded from a TOML file with `FRAY__`-prefixed
//! environment overrides, see [`Settings::load`].

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable prefix for overrides (`FRAY__SEED=42`)
pub const ENV_PREFIX: &str = "FRAY";

/// Generation settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Host injected into requests that carry no explicit Host header
    pub request_host: Option<String>,

    /// Seed for random value content and random action offsets.
    /// When unset, every generator draws a fresh seed.
    pub seed: Option<u64>,
}

/// `FRAY__`-prefixed variables
///
/// Double underscore keeps snake_case keys like request_host intact.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Set the randomness seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the host used for implied Host headers
    pub fn with_request_host(mut self, host: impl Into<String>) -> Self {
        self.request_host = Some(host.into());
        self
    }

    /// Load settings from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading settings from {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(environment());

        let config = builder.build().context("Failed to build settings")?;
        let settings: Settings = config
            .try_deserialize()
            .context("Failed to deserialize settings")?;

        debug!(?settings, "settings loaded");
        Ok(settings)
    }

    /// Render as TOML, suitable for storing next to a frozen specification
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("Failed to serialize settings")
    }
}
