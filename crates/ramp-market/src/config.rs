//! Market and simulator configuration.
//!
//! [`SimConfig`] is layered from built-in defaults, an optional TOML file and
//! `RAMP_`-prefixed environment variables, later sources winning. Nested keys
//! use a double underscore: `RAMP_MARKET__COOLDOWN_SECS=60`.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};

use ramp_core::constants::{
    CONFIG_FILE_NAME, DEFAULT_BASE_PRICE, DEFAULT_COOLDOWN_SECS, DEFAULT_SLOPE, ENV_PREFIX,
};
use ramp_core::error::RampError;
use ramp_core::types::CurveParams;

/// Log formats accepted by `log_format`.
pub const LOG_FORMATS: [&str; 2] = ["text", "json"];

/// Curve parameters as they appear in config files.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct MarketConfig {
    pub slope: u64,
    pub base_price: u64,
    pub cooldown_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            slope: DEFAULT_SLOPE as u64,
            base_price: DEFAULT_BASE_PRICE as u64,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
        }
    }
}

impl MarketConfig {
    pub fn params(&self) -> CurveParams {
        CurveParams::linear(u128::from(self.slope))
            .with_base_price(u128::from(self.base_price))
            .with_cooldown(self.cooldown_secs)
    }
}

/// Effective configuration of the simulator binary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SimConfig {
    pub market: MarketConfig,
    /// Log level filter string (e.g. "info", "ramp_market=debug").
    pub log_level: String,
    /// `text` or `json`.
    pub log_format: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig::default(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl SimConfig {
    /// `<config dir>/ramp/ramp.toml`, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ramp").join(CONFIG_FILE_NAME))
    }

    /// Load from `path` (which must exist) or, when `None`, from the default
    /// path if present, then apply process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, RampError> {
        Self::load_with_env(path, None)
    }

    /// Like [`load`](Self::load) but reads overrides from `env` instead of the
    /// process environment when given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, RampError> {
        let (file, required) = match path {
            Some(p) => (Some(p.to_path_buf()), true),
            None => (Self::default_path(), false),
        };

        let mut builder = Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(
                File::from(file)
                    .format(FileFormat::Toml)
                    .required(required),
            );
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let cfg: SimConfig = builder
            .build()
            .and_then(|c| c.try_deserialize::<SimConfig>())
            .map_err(|e| RampError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), RampError> {
        if !LOG_FORMATS.contains(&self.log_format.as_str()) {
            return Err(RampError::Config(format!(
                "log_format must be one of {LOG_FORMATS:?}, got {:?}",
                self.log_format
            )));
        }
        Ok(())
    }
}
