//! # Trading Facade
//!
//! ## Purpose
//!
//! Turns a trading intent ("open 2x long BTC with 100 USDT") into the one
//! message a wallet has to sign. Every operation follows the same path:
//!
//! ```text
//! intent ─► config lookups ─► resolve addresses ─► oracle (margin only)
//!                               │ (memoised)            │
//!                               ▼                       ▼
//!                         codec request ─► storm_codec::create_*_tx ─► TxParams
//! ```
//!
//! ## Collateral Routing
//!
//! Orders, margin top-ups and liquidity deposits carry collateral and go to
//! the vault, directly for the native asset or through the trader's token
//! wallet otherwise. Stop-loss, take-profit, cancel and remove-margin go
//! straight to the trader's position manager. LP withdrawals go to the
//! trader's LP-token wallet.
//!
//! ## Oracle Payload Selection
//!
//! | collateral            | payload                                      |
//! |-----------------------|----------------------------------------------|
//! | quote asset (`USDT`)  | `Simple` with the base price                 |
//! | same as base          | `WithSettlement`, base price used twice      |
//! | anything else         | `WithSettlement` with the collateral's price |

use crate::address_book::{AddressBook, AddressKey};
use crate::error::{SdkError, SdkResult};
use crate::params::{
    AnyLimitOrder, CancelOrderParams, ClosePositionParams, LimitOrderParams, MarginParams,
    MarketOpenParams, ProvideLiquidityParams, SltpParams, StopLimitOrderParams,
    StopMarketOrderParams, WithdrawLiquidityParams,
};
use crate::providers::{AddressResolver, ConfigProvider, OraclePrice, OracleProvider, StateProvider};
use chrono::Utc;
use std::sync::Arc;
use storm_codec::{
    create_add_margin_tx, create_cancel_order_tx, create_limit_order_tx, create_market_order_tx,
    create_provide_liquidity_tx, create_remove_margin_tx, create_sltp_order_tx,
    create_withdraw_liquidity_tx, parse_position_manager_state, AddMarginRequest,
    CancelOrderRequest, Collateral, LimitOrderRequest, MarketOrderRequest, OraclePayload,
    RemoveMarginRequest, SltpOrderRequest, TxParams,
};
use storm_config::{LiquiditySource, Market, SdkSettings};
use storm_types::{Address, PositionManagerData, SltpKind, SltpOrder, ORDER_SLOTS};
use tracing::{debug, info, warn};

/// External services the SDK depends on
#[derive(Clone)]
pub struct Collaborators {
    pub config: Arc<dyn ConfigProvider>,
    pub oracle: Arc<dyn OracleProvider>,
    pub resolver: Arc<dyn AddressResolver>,
    pub state: Arc<dyn StateProvider>,
}

pub struct StormSdk {
    settings: SdkSettings,
    trader: Address,
    config: Arc<dyn ConfigProvider>,
    oracle: Arc<dyn OracleProvider>,
    resolver: Arc<dyn AddressResolver>,
    state: Arc<dyn StateProvider>,
    addresses: AddressBook,
}

impl StormSdk {
    /// Fails when `settings.trader_address` is unset
    pub fn new(settings: SdkSettings, collaborators: Collaborators) -> SdkResult<Self> {
        let trader = settings
            .trader_address
            .ok_or_else(|| SdkError::invalid_parameter("trader_address", "not configured"))?;
        info!(%trader, native = %settings.native_asset, "Storm SDK ready");
        Ok(Self {
            settings,
            trader,
            config: collaborators.config,
            oracle: collaborators.oracle,
            resolver: collaborators.resolver,
            state: collaborators.state,
            addresses: AddressBook::new(),
        })
    }

    pub fn trader(&self) -> Address {
        self.trader
    }

    pub fn settings(&self) -> &SdkSettings {
        &self.settings
    }

    pub fn addresses(&self) -> &AddressBook {
        &self.addresses
    }

    // ------------------------------------------------------------------
    // Config lookups
    // ------------------------------------------------------------------

    fn asset_index(&self, name: &str) -> SdkResult<u16> {
        self.config
            .asset_index(name)
            .ok_or_else(|| SdkError::asset_not_found(name))
    }

    fn market(&self, base: &str, collateral: &str) -> SdkResult<Market> {
        self.config
            .market(base, collateral)
            .ok_or_else(|| SdkError::market_not_found(base, collateral))
    }

    fn liquidity_source(&self, asset: &str) -> SdkResult<LiquiditySource> {
        self.config
            .liquidity_source(asset)
            .ok_or_else(|| SdkError::liquidity_source_not_found(asset))
    }

    fn expiration_or(&self, explicit: Option<u32>, lifetime_secs: u32) -> u32 {
        explicit.unwrap_or_else(|| unix_now().saturating_add(lifetime_secs))
    }

    // ------------------------------------------------------------------
    // Address resolution
    // ------------------------------------------------------------------

    /// Trader's position manager for the `base` market settled in `collateral`
    pub async fn position_manager_address(&self, base: &str, collateral: &str) -> SdkResult<Address> {
        let key = AddressKey::position_manager(base, collateral);
        if let Some(address) = self.addresses.get(&key) {
            return Ok(address);
        }

        let market = self.market(base, collateral)?;
        let vault = self.liquidity_source(collateral)?.vault_address;
        let address = self
            .resolver
            .position_manager(vault, market.address, self.trader)
            .await
            .map_err(|e| SdkError::provider("position manager lookup", e))?;

        debug!(%key, %address, "Resolved address");
        self.addresses.insert(key, address);
        Ok(address)
    }

    /// Trader's token wallet for a token collateral
    pub async fn jetton_wallet(&self, asset: &str) -> SdkResult<Address> {
        let key = AddressKey::jetton_wallet(asset);
        if let Some(address) = self.addresses.get(&key) {
            return Ok(address);
        }

        let master = self
            .liquidity_source(asset)?
            .jetton_master()
            .ok_or_else(|| SdkError::MissingJettonMaster {
                asset: asset.to_string(),
            })?;
        let address = self
            .resolver
            .jetton_wallet(self.trader, master)
            .await
            .map_err(|e| SdkError::provider("jetton wallet lookup", e))?;

        debug!(%key, %address, "Resolved address");
        self.addresses.insert(key, address);
        Ok(address)
    }

    /// Trader's LP-token wallet for a vault
    pub async fn lp_wallet(&self, asset: &str) -> SdkResult<Address> {
        let key = AddressKey::lp_wallet(asset);
        if let Some(address) = self.addresses.get(&key) {
            return Ok(address);
        }

        let master = self.liquidity_source(asset)?.lp_jetton_master;
        let address = self
            .resolver
            .jetton_wallet(self.trader, master)
            .await
            .map_err(|e| SdkError::provider("LP wallet lookup", e))?;

        debug!(%key, %address, "Resolved address");
        self.addresses.insert(key, address);
        Ok(address)
    }

    /// Resolve everything an order in this market will need
    pub async fn prefetch(&self, base: &str, collateral: &str) -> SdkResult<()> {
        let position_manager = self.position_manager_address(base, collateral).await?;
        self.is_position_manager_initialized(position_manager).await;
        if !self.settings.is_native(collateral) {
            self.jetton_wallet(collateral).await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Position state
    // ------------------------------------------------------------------

    /// Decoded position-manager state; `None` when nothing is deployed yet
    pub async fn position_manager_data(
        &self,
        position_manager: Address,
    ) -> SdkResult<Option<PositionManagerData>> {
        let cell = self
            .state
            .position_manager_state(position_manager)
            .await
            .map_err(|e| SdkError::provider("position manager state", e))?;
        Ok(parse_position_manager_state(cell.as_ref())?)
    }

    /// A position manager counts as initialised once its state carries
    /// referral data. Lookup or parse failures count as "not initialised",
    /// which makes the next order carry the initialisation flag.
    pub async fn is_position_manager_initialized(&self, position_manager: Address) -> bool {
        if self.addresses.is_initialized(&position_manager) {
            return true;
        }
        match self.position_manager_data(position_manager).await {
            Ok(Some(data)) if data.is_initialized() => {
                self.addresses.mark_initialized(position_manager);
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!(%position_manager, error = %e, "Position manager state unavailable");
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Collateral and oracle
    // ------------------------------------------------------------------

    async fn collateral(&self, asset: &str) -> SdkResult<Collateral> {
        let vault = self.liquidity_source(asset)?.vault_address;
        if self.settings.is_native(asset) {
            return Ok(Collateral::Native { vault });
        }
        Ok(Collateral::Jetton {
            vault,
            trader: self.trader,
            trader_wallet: self.jetton_wallet(asset).await?,
            query_id: 0,
        })
    }

    async fn latest_price(&self, symbol: &str) -> SdkResult<OraclePrice> {
        self.oracle
            .latest_price(symbol)
            .await
            .map_err(|e| SdkError::provider("oracle price", e))
    }

    /// Oracle payload for a margin change in `base` settled in `collateral`
    pub async fn oracle_payload(&self, base: &str, collateral: &str) -> SdkResult<OraclePayload> {
        if collateral == self.settings.quote_asset {
            let price = self.latest_price(base).await?;
            return Ok(OraclePayload::Simple {
                price_ref: price.price_ref,
                signatures_ref: price.signatures_ref,
                feed: None,
            });
        }

        let (price, settlement) = if collateral == base {
            let price = self.latest_price(base).await?;
            (price.clone(), price)
        } else {
            tokio::try_join!(self.latest_price(base), self.latest_price(collateral))?
        };

        Ok(OraclePayload::WithSettlement {
            price_ref: price.price_ref,
            signatures_ref: price.signatures_ref,
            settlement_price_ref: settlement.price_ref,
            settlement_signatures_ref: settlement.signatures_ref,
            feed: None,
        })
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    pub async fn create_market_open_order(&self, params: &MarketOpenParams) -> SdkResult<TxParams> {
        let (base, collateral_asset) = (params.base_asset.as_str(), params.collateral_asset.as_str());
        let position_manager = self.position_manager_address(base, collateral_asset).await?;
        let initialized = self.is_position_manager_initialized(position_manager).await;
        let collateral = self.collateral(collateral_asset).await?;

        let request = MarketOrderRequest {
            asset_id: self.asset_index(base)?,
            gas_to: None,
            init_position_manager: !initialized,
            referral_id: self.settings.referral_id,
            leverage: params.leverage,
            expiration: self.expiration_or(params.expiration, self.settings.market_expiration_secs),
            direction: params.direction,
            limit_price: 0,
            min_base_asset_amount: params.min_base_asset_amount.unwrap_or(0),
            stop_trigger_price: params.stop_trigger_price.unwrap_or(0),
            take_trigger_price: params.take_trigger_price.unwrap_or(0),
        };
        let tx = create_market_order_tx(&collateral, params.amount, &request)?;
        log_tx("market_open", base, collateral_asset, &tx);
        Ok(tx)
    }

    /// Market-close `size` of a position: a take-profit that triggers at any price
    pub async fn create_close_position_order(
        &self,
        params: &ClosePositionParams,
    ) -> SdkResult<TxParams> {
        self.create_sltp_order(
            SltpKind::TakeProfit,
            &SltpParams {
                base_asset: params.base_asset.clone(),
                collateral_asset: params.collateral_asset.clone(),
                direction: params.direction,
                amount: params.size,
                trigger_price: 0,
            },
        )
        .await
    }

    pub async fn create_stop_loss_order(&self, params: &SltpParams) -> SdkResult<TxParams> {
        self.create_sltp_order(SltpKind::StopLoss, params).await
    }

    pub async fn create_take_profit_order(&self, params: &SltpParams) -> SdkResult<TxParams> {
        self.create_sltp_order(SltpKind::TakeProfit, params).await
    }

    async fn create_sltp_order(&self, kind: SltpKind, params: &SltpParams) -> SdkResult<TxParams> {
        let position_manager = self
            .position_manager_address(&params.base_asset, &params.collateral_asset)
            .await?;
        let request = SltpOrderRequest {
            gas_to: None,
            order: SltpOrder {
                kind,
                expiration: 0,
                direction: params.direction,
                amount: params.amount,
                trigger_price: params.trigger_price,
            },
        };
        let tx = create_sltp_order_tx(position_manager, &request)?;
        log_tx("sltp", &params.base_asset, &params.collateral_asset, &tx);
        Ok(tx)
    }

    /// Plain limit order (no stop price)
    pub async fn create_limit_order(&self, params: &LimitOrderParams) -> SdkResult<TxParams> {
        self.create_any_limit_order(params.into()).await
    }

    pub async fn create_stop_limit_order(&self, params: &StopLimitOrderParams) -> SdkResult<TxParams> {
        self.create_any_limit_order(params.into()).await
    }

    /// Stop order that executes at market (no limit price)
    pub async fn create_stop_market_order(
        &self,
        params: &StopMarketOrderParams,
    ) -> SdkResult<TxParams> {
        self.create_any_limit_order(params.into()).await
    }

    async fn create_any_limit_order(&self, order: AnyLimitOrder<'_>) -> SdkResult<TxParams> {
        let position_manager = self
            .position_manager_address(order.base_asset, order.collateral_asset)
            .await?;
        let initialized = self.is_position_manager_initialized(position_manager).await;
        let collateral = self.collateral(order.collateral_asset).await?;

        let request = LimitOrderRequest {
            asset_id: self.asset_index(order.base_asset)?,
            gas_to: None,
            init_position_manager: !initialized,
            referral_id: self.settings.referral_id,
            leverage: order.leverage,
            expiration: self.expiration_or(order.expiration, self.settings.limit_expiration_secs),
            direction: order.direction,
            limit_price: order.limit_price,
            stop_price: order.stop_price,
            stop_trigger_price: order.stop_trigger_price.unwrap_or(0),
            take_trigger_price: order.take_trigger_price.unwrap_or(0),
        };
        let tx = create_limit_order_tx(&collateral, order.amount, &request)?;
        log_tx("limit", order.base_asset, order.collateral_asset, &tx);
        Ok(tx)
    }

    pub async fn cancel_order(&self, params: &CancelOrderParams) -> SdkResult<TxParams> {
        if params.slot >= ORDER_SLOTS {
            return Err(SdkError::invalid_parameter(
                "slot",
                format!("{} is not below {ORDER_SLOTS}", params.slot),
            ));
        }
        let position_manager = self
            .position_manager_address(&params.base_asset, &params.collateral_asset)
            .await?;
        let request = CancelOrderRequest {
            order_type: params.order_type,
            slot: params.slot,
            direction: params.direction,
            gas_to: None,
        };
        let tx = create_cancel_order_tx(position_manager, &request)?;
        log_tx("cancel", &params.base_asset, &params.collateral_asset, &tx);
        Ok(tx)
    }

    // ------------------------------------------------------------------
    // Margin
    // ------------------------------------------------------------------

    pub async fn add_margin(&self, params: &MarginParams) -> SdkResult<TxParams> {
        let (base, collateral_asset) = (params.base_asset.as_str(), params.collateral_asset.as_str());
        let collateral = self.collateral(collateral_asset).await?;
        let oracle = match &params.oracle {
            Some(payload) => payload.clone(),
            None => self.oracle_payload(base, collateral_asset).await?,
        };

        let request = AddMarginRequest {
            asset_id: self.asset_index(base)?,
            direction: params.direction,
            gas_to: None,
            oracle,
        };
        let tx = create_add_margin_tx(&collateral, params.amount, &request)?;
        log_tx("add_margin", base, collateral_asset, &tx);
        Ok(tx)
    }

    pub async fn remove_margin(&self, params: &MarginParams) -> SdkResult<TxParams> {
        let (base, collateral_asset) = (params.base_asset.as_str(), params.collateral_asset.as_str());
        let position_manager = self.position_manager_address(base, collateral_asset).await?;
        let oracle = match &params.oracle {
            Some(payload) => payload.clone(),
            None => self.oracle_payload(base, collateral_asset).await?,
        };

        let request = RemoveMarginRequest {
            direction: params.direction,
            gas_to: None,
            amount: params.amount,
            oracle,
        };
        let tx = create_remove_margin_tx(position_manager, &request)?;
        log_tx("remove_margin", base, collateral_asset, &tx);
        Ok(tx)
    }

    // ------------------------------------------------------------------
    // Liquidity
    // ------------------------------------------------------------------

    pub async fn provide_liquidity(&self, params: &ProvideLiquidityParams) -> SdkResult<TxParams> {
        let collateral = self.collateral(&params.asset).await?;
        let tx = create_provide_liquidity_tx(&collateral, params.amount, None)?;
        log_tx("provide_liquidity", &params.asset, &params.asset, &tx);
        Ok(tx)
    }

    pub async fn withdraw_liquidity(&self, params: &WithdrawLiquidityParams) -> SdkResult<TxParams> {
        let lp_wallet = self.lp_wallet(&params.asset).await?;
        let tx = create_withdraw_liquidity_tx(lp_wallet, params.lp_amount, self.trader, None)?;
        log_tx("withdraw_liquidity", &params.asset, &params.asset, &tx);
        Ok(tx)
    }
}

fn unix_now() -> u32 {
    u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX)
}

fn log_tx(action: &'static str, base: &str, collateral: &str, tx: &TxParams) {
    info!(action, base, collateral, to = %tx.to, value = %tx.value, "Built transaction");
}
