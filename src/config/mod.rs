mod basic;
mod retry;

pub use basic::BasicConfig;
pub use retry::RetryConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

use crate::error::DocProxyError;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Process-level settings (see `basic` table in docproxy.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Retry schedule applied to every proxied operation (see `retry` table).
    #[serde(default)]
    pub retry: RetryConfig,
}

const DEFAULT_CONFIG_FILE: &str = "docproxy.toml";
const ENV_PREFIX: &str = "DOCPROXY_";

impl Config {
    /// Builds a Figment that merges defaults, the config TOML file when
    /// present, and `DOCPROXY_`-prefixed environment variables
    /// (`DOCPROXY_RETRY__MAX_ATTEMPTS=3`).
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load() -> Result<Self, DocProxyError> {
        Self::figment()
            .extract()
            .map_err(|err| DocProxyError::Config(Box::new(err)))
    }

    /// Loads configuration, panicking on malformed input. Backs [`CONFIG`].
    pub fn from_optional_toml() -> Self {
        Self::load().unwrap_or_else(|err| {
            panic!(
                "failed to extract configuration (defaults + optional {DEFAULT_CONFIG_FILE}): {err}"
            )
        })
    }
}

/// Global, lazily-initialized configuration instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::from_optional_toml);
