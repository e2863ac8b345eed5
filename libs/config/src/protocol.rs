//! Protocol config document
//!
//! The Storm API publishes two JSON documents: the protocol config (assets,
//! opened markets, liquidity sources) and the asset index list used to
//! number base assets inside order bodies. [`ProtocolConfig`] holds both and
//! builds the lookup tables the SDK needs:
//!
//! ```text
//! asset name          → asset index        (asset index list)
//! "base:collateral"   → Market             (opened markets)
//! collateral name     → LiquiditySource    (vault per collateral)
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use storm_types::Address;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub name: String,
    pub decimals: u8,
    pub asset_id: String,
}

/// An opened perpetual market (one virtual AMM per base/settlement pair)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub address: Address,
    pub quote_asset: String,
    pub base_asset: String,
    pub name: String,
    pub ticker: String,
    pub quote_asset_id: String,
    pub settlement_token: String,
    #[serde(rename = "type")]
    pub market_type: String,
    pub vault_address: Address,
}

impl Market {
    pub fn key(&self) -> String {
        market_key(&self.base_asset, &self.settlement_token)
    }
}

/// Vault accepting one collateral asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquiditySource {
    pub asset: Asset,
    pub vault_address: Address,
    /// Token master of the collateral; not an address for native collateral
    pub quote_asset_id: String,
    pub lp_jetton_master: Address,
}

impl LiquiditySource {
    /// Collateral token master, if `quote_asset_id` holds an address
    pub fn jetton_master(&self) -> Option<Address> {
        self.quote_asset_id.parse().ok()
    }
}

/// The protocol config document as published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StormConfig {
    #[serde(default)]
    pub referral_collection_address: String,
    #[serde(default)]
    pub genesis_collection_address: String,
    pub assets: Vec<Asset>,
    pub opened_markets: Vec<Market>,
    pub liquidity_sources: Vec<LiquiditySource>,
    #[serde(default)]
    pub storm_jetton_master_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfigInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub index: u16,
}

pub fn market_key(base_asset: &str, collateral_asset: &str) -> String {
    format!("{base_asset}:{collateral_asset}")
}

/// Both documents plus their lookup tables
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    config: StormConfig,
    assets_config: Vec<AssetConfigInfo>,
    asset_index_by_name: HashMap<String, u16>,
    vault_by_asset: HashMap<String, LiquiditySource>,
    market_by_key: HashMap<String, Market>,
}

impl ProtocolConfig {
    pub fn new(config: StormConfig, assets_config: Vec<AssetConfigInfo>) -> Self {
        let asset_index_by_name: HashMap<_, _> = assets_config
            .iter()
            .map(|info| (info.name.clone(), info.index))
            .collect();
        if asset_index_by_name.len() != assets_config.len() {
            warn!("Asset index list contains duplicate names, last entry wins");
        }

        let vault_by_asset = config
            .liquidity_sources
            .iter()
            .map(|source| (source.asset.name.clone(), source.clone()))
            .collect();

        let market_by_key = config
            .opened_markets
            .iter()
            .map(|market| (market.key(), market.clone()))
            .collect();

        debug!(
            assets = assets_config.len(),
            markets = config.opened_markets.len(),
            vaults = config.liquidity_sources.len(),
            "Indexed protocol config"
        );

        Self {
            config,
            assets_config,
            asset_index_by_name,
            vault_by_asset,
            market_by_key,
        }
    }

    /// Parse both documents from their JSON bodies
    pub fn from_json(config_json: &str, assets_json: &str) -> Result<Self> {
        let config: StormConfig =
            serde_json::from_str(config_json).context("Failed to parse protocol config")?;
        let assets: Vec<AssetConfigInfo> =
            serde_json::from_str(assets_json).context("Failed to parse asset index list")?;
        Ok(Self::new(config, assets))
    }

    /// Read both documents from disk, e.g. a cached snapshot of the API
    pub fn from_files(config_path: &Path, assets_path: &Path) -> Result<Self> {
        info!("Loading protocol config: {:?}, {:?}", config_path, assets_path);
        let config_json = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let assets_json = fs::read_to_string(assets_path)
            .with_context(|| format!("Failed to read {}", assets_path.display()))?;
        Self::from_json(&config_json, &assets_json)
    }

    pub fn asset_index(&self, name: &str) -> Option<u16> {
        self.asset_index_by_name.get(name).copied()
    }

    pub fn market(&self, base_asset: &str, collateral_asset: &str) -> Option<&Market> {
        self.market_by_key.get(&market_key(base_asset, collateral_asset))
    }

    pub fn liquidity_source(&self, asset: &str) -> Option<&LiquiditySource> {
        self.vault_by_asset.get(asset)
    }

    pub fn config(&self) -> &StormConfig {
        &self.config
    }

    pub fn assets_config(&self) -> &[AssetConfigInfo] {
        &self.assets_config
    }

    pub fn asset(&self, name: &str) -> Option<&Asset> {
        self.config.assets.iter().find(|asset| asset.name == name)
    }
}
