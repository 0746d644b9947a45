use core::fmt::{Debug, Display};
use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "pra.toml";
pub const ENV_PREFIX: &str = "PRA_";

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PolicyConfig {
    pub max_reviews_per_reviewer: Option<usize>,
    pub max_outstanding_reviews: Option<usize>,
    pub require_auto_selected: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// default filter, `RUST_LOG` takes precedence
    pub log_filter: String,
    /// seeds the reviewer selection, random if unset
    pub rng_seed: Option<u64>,
    /// json file with the assignments to load, the built-in sample course if unset
    pub fixture: Option<PathBuf>,
    pub policy: PolicyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "info,peer_review_allocation_engine=debug".to_owned(),
            rng_seed: None,
            fixture: None,
            policy: PolicyConfig::default(),
        }
    }
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Defaults, then `pra.toml`, then `PRA_` environment variables. Nested keys are separated
/// by `__`, e.g. `PRA_POLICY__MAX_OUTSTANDING_REVIEWS`.
#[must_use]
pub fn figment() -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

pub fn get_config() -> Result<Config, ConfigError> {
    Ok(figment().extract()?)
}
