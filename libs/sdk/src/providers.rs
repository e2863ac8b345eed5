//! Collaborator traits
//!
//! The SDK never talks to the network itself. Everything it needs from the
//! outside world comes through four seams:
//!
//! ```text
//! ConfigProvider   asset index, market, liquidity source   (sync, preloaded)
//! OracleProvider   latest signed price for a symbol        (async)
//! AddressResolver  token wallets, position managers        (async, memoised)
//! StateProvider    raw position-manager state cell         (async)
//! ```
//!
//! HTTP or lite-client implementations live with the application; tests use
//! in-memory mocks.

use async_trait::async_trait;
use storm_codec::{from_base64, Cell, CodecResult};
use storm_config::{LiquiditySource, Market, ProtocolConfig};
use storm_types::Address;

/// Protocol config lookups
///
/// Implemented for [`ProtocolConfig`] so a loaded document can be handed to
/// the SDK directly.
pub trait ConfigProvider: Send + Sync {
    fn asset_index(&self, name: &str) -> Option<u16>;

    fn market(&self, base_asset: &str, collateral_asset: &str) -> Option<Market>;

    fn liquidity_source(&self, asset: &str) -> Option<LiquiditySource>;
}

impl ConfigProvider for ProtocolConfig {
    fn asset_index(&self, name: &str) -> Option<u16> {
        ProtocolConfig::asset_index(self, name)
    }

    fn market(&self, base_asset: &str, collateral_asset: &str) -> Option<Market> {
        ProtocolConfig::market(self, base_asset, collateral_asset).cloned()
    }

    fn liquidity_source(&self, asset: &str) -> Option<LiquiditySource> {
        ProtocolConfig::liquidity_source(self, asset).cloned()
    }
}

/// Latest signed price as served by the oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OraclePrice {
    pub price_ref: Cell,
    pub signatures_ref: Cell,
}

impl OraclePrice {
    /// Build from the two base64 bag-of-cells strings of an oracle response
    pub fn from_base64(price_ref: &str, signatures_ref: &str) -> CodecResult<Self> {
        Ok(Self {
            price_ref: from_base64(price_ref)?,
            signatures_ref: from_base64(signatures_ref)?,
        })
    }
}

#[async_trait]
pub trait OracleProvider: Send + Sync {
    /// Latest price for a base or collateral asset symbol
    async fn latest_price(&self, symbol: &str) -> anyhow::Result<OraclePrice>;
}

#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Token wallet of `owner` under the token master `master`
    async fn jetton_wallet(&self, owner: Address, master: Address) -> anyhow::Result<Address>;

    /// Position manager of `trader` in `market`, as reported by `vault`
    async fn position_manager(
        &self,
        vault: Address,
        market: Address,
        trader: Address,
    ) -> anyhow::Result<Address>;
}

#[async_trait]
pub trait StateProvider: Send + Sync {
    /// Raw data cell of a position-manager contract; `None` when the contract
    /// is not deployed
    async fn position_manager_state(&self, address: Address) -> anyhow::Result<Option<Cell>>;
}
