//! SDK Settings Module
//!
//! Loads runtime settings for the trading SDK from an optional TOML file,
//! then applies `STORM_`-prefixed environment overrides on top.
//!
//! ```text
//! defaults → config/storm.toml (or explicit path) → STORM_* env vars
//! ```
//!
//! Field names map one-to-one onto environment variables:
//! `STORM_API_URL`, `STORM_ORACLE_URL`, `STORM_TRADER_ADDRESS`,
//! `STORM_MARKET_EXPIRATION_SECS` and so on.

use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use storm_types::Address;
use tracing::{debug, info, warn};

/// Default location of the settings file, relative to the working directory
pub const DEFAULT_SETTINGS_PATH: &str = "config/storm.toml";

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "STORM";

/// Market orders expire after 15 minutes unless told otherwise
pub const MARKET_ORDER_EXPIRATION_SECS: u32 = 15 * 60;

/// Limit, stop-limit and stop-market orders live 60 days by default
pub const LIMIT_ORDER_EXPIRATION_SECS: u32 = 60 * 24 * 60 * 60;

/// Runtime settings for one trader session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkSettings {
    /// Storm REST API base; the protocol config lives under `{api_url}/config`
    pub api_url: String,
    /// Oracle feed service base
    pub oracle_url: String,
    /// Indexer used for position-manager state and wallet lookups
    pub lite_api_url: String,
    /// Trader whose intents are encoded; must be set before building transactions
    pub trader_address: Option<Address>,
    /// Collateral paid in the chain's native currency
    pub native_asset: String,
    /// Collateral whose vault settles without a second price
    pub quote_asset: String,
    /// Referral attached to the order that initialises a position manager
    pub referral_id: Option<u64>,
    pub market_expiration_secs: u32,
    pub limit_expiration_secs: u32,
    pub log_level: String,
}

impl Default for SdkSettings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/api".to_string(),
            oracle_url: "http://localhost:3001".to_string(),
            lite_api_url: "http://localhost:3002".to_string(),
            trader_address: None,
            native_asset: "TON".to_string(),
            quote_asset: "USDT".to_string(),
            referral_id: None,
            market_expiration_secs: MARKET_ORDER_EXPIRATION_SECS,
            limit_expiration_secs: LIMIT_ORDER_EXPIRATION_SECS,
            log_level: "info".to_string(),
        }
    }
}

impl SdkSettings {
    /// Load settings with the default `STORM` prefix
    ///
    /// An explicit `path` must exist; without one, [`DEFAULT_SETTINGS_PATH`]
    /// is read only if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Same as [`SdkSettings::load`] with a custom environment prefix
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                info!("Loading SDK settings: {:?}", path);
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                let default_path = Path::new(DEFAULT_SETTINGS_PATH);
                if default_path.exists() {
                    info!("Loading SDK settings: {:?}", default_path);
                } else {
                    debug!("No settings file at {:?}, using defaults", default_path);
                }
                builder = builder.add_source(File::from(default_path).required(false));
            }
        }

        // Double underscore keeps snake_case keys whole: STORM_API_URL → api_url
        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build SDK settings")?;

        let mut settings: SdkSettings = config
            .try_deserialize()
            .context("Failed to deserialize SDK settings")?;
        settings.expand_env_vars()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Expand `$VAR` / `${VAR}` references inside endpoint URLs
    pub fn expand_env_vars(&mut self) -> Result<()> {
        for url in [&mut self.api_url, &mut self.oracle_url, &mut self.lite_api_url] {
            let expanded = shellexpand::env(url.as_str())
                .with_context(|| format!("Failed to expand URL {url}"))?
                .into_owned();
            *url = expanded;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.native_asset.is_empty() {
            anyhow::bail!("native_asset must not be empty");
        }
        if self.market_expiration_secs == 0 {
            warn!("market_expiration_secs is 0, market orders expire immediately");
        }
        if self.trader_address.is_none() {
            warn!("trader_address is not set");
        }
        Ok(())
    }

    /// Location of the protocol config document
    pub fn config_url(&self) -> String {
        format!("{}/config", self.api_url.trim_end_matches('/'))
    }

    /// Location of the asset index list
    pub fn assets_config_url(&self) -> String {
        format!("{}/assets", self.config_url())
    }

    /// Render as TOML, e.g. to seed a settings file
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render SDK settings as TOML")
    }

    pub fn is_native(&self, asset: &str) -> bool {
        asset == self.native_asset
    }
}
