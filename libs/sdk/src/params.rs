//! Trading intents accepted by [`StormSdk`](crate::StormSdk)
//!
//! Assets are named as in the protocol config (`"BTC"`, `"TON"`, `"USDT"`).
//! Amounts are in the collateral's smallest unit; prices, sizes and leverage
//! carry 9 decimals. Expirations are absolute unix timestamps and fall back
//! to the configured lifetime when `None`.

use storm_codec::OraclePayload;
use storm_types::{Direction, OrderType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketOpenParams {
    pub base_asset: String,
    pub collateral_asset: String,
    pub direction: Direction,
    pub amount: u128,
    pub leverage: u64,
    pub min_base_asset_amount: Option<u128>,
    /// Stop-loss placed once the order fills
    pub stop_trigger_price: Option<u128>,
    /// Take-profit placed once the order fills
    pub take_trigger_price: Option<u128>,
    pub expiration: Option<u32>,
}

/// Close `size` of a position at market
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosePositionParams {
    pub base_asset: String,
    pub collateral_asset: String,
    pub direction: Direction,
    pub size: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitOrderParams {
    pub base_asset: String,
    pub collateral_asset: String,
    pub direction: Direction,
    pub amount: u128,
    pub leverage: u64,
    pub limit_price: u128,
    pub stop_trigger_price: Option<u128>,
    pub take_trigger_price: Option<u128>,
    pub expiration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopLimitOrderParams {
    pub base_asset: String,
    pub collateral_asset: String,
    pub direction: Direction,
    pub amount: u128,
    pub leverage: u64,
    /// Price at which the limit order is created
    pub stop_price: u128,
    pub limit_price: u128,
    pub stop_trigger_price: Option<u128>,
    pub take_trigger_price: Option<u128>,
    pub expiration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopMarketOrderParams {
    pub base_asset: String,
    pub collateral_asset: String,
    pub direction: Direction,
    pub amount: u128,
    pub leverage: u64,
    pub stop_price: u128,
    pub stop_trigger_price: Option<u128>,
    pub take_trigger_price: Option<u128>,
    pub expiration: Option<u32>,
}

/// Stop-loss or take-profit on an open position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SltpParams {
    pub base_asset: String,
    pub collateral_asset: String,
    pub direction: Direction,
    pub amount: u128,
    pub trigger_price: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOrderParams {
    pub base_asset: String,
    pub collateral_asset: String,
    pub direction: Direction,
    pub order_type: OrderType,
    pub slot: u8,
}

/// Add or remove margin; the oracle payload is fetched when not supplied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarginParams {
    pub base_asset: String,
    pub collateral_asset: String,
    pub direction: Direction,
    pub amount: u128,
    pub oracle: Option<OraclePayload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvideLiquidityParams {
    pub asset: String,
    pub amount: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawLiquidityParams {
    pub asset: String,
    /// LP tokens to burn
    pub lp_amount: u128,
}

/// Shared shape of limit, stop-limit and stop-market orders
#[derive(Debug, Clone)]
pub(crate) struct AnyLimitOrder<'a> {
    pub base_asset: &'a str,
    pub collateral_asset: &'a str,
    pub direction: Direction,
    pub amount: u128,
    pub leverage: u64,
    pub limit_price: u128,
    pub stop_price: u128,
    pub stop_trigger_price: Option<u128>,
    pub take_trigger_price: Option<u128>,
    pub expiration: Option<u32>,
}

impl<'a> From<&'a LimitOrderParams> for AnyLimitOrder<'a> {
    fn from(p: &'a LimitOrderParams) -> Self {
        Self {
            base_asset: &p.base_asset,
            collateral_asset: &p.collateral_asset,
            direction: p.direction,
            amount: p.amount,
            leverage: p.leverage,
            limit_price: p.limit_price,
            stop_price: 0,
            stop_trigger_price: p.stop_trigger_price,
            take_trigger_price: p.take_trigger_price,
            expiration: p.expiration,
        }
    }
}

impl<'a> From<&'a StopLimitOrderParams> for AnyLimitOrder<'a> {
    fn from(p: &'a StopLimitOrderParams) -> Self {
        Self {
            base_asset: &p.base_asset,
            collateral_asset: &p.collateral_asset,
            direction: p.direction,
            amount: p.amount,
            leverage: p.leverage,
            limit_price: p.limit_price,
            stop_price: p.stop_price,
            stop_trigger_price: p.stop_trigger_price,
            take_trigger_price: p.take_trigger_price,
            expiration: p.expiration,
        }
    }
}

impl<'a> From<&'a StopMarketOrderParams> for AnyLimitOrder<'a> {
    fn from(p: &'a StopMarketOrderParams) -> Self {
        Self {
            base_asset: &p.base_asset,
            collateral_asset: &p.collateral_asset,
            direction: p.direction,
            amount: p.amount,
            leverage: p.leverage,
            limit_price: 0,
            stop_price: p.stop_price,
            stop_trigger_price: p.stop_trigger_price,
            take_trigger_price: p.take_trigger_price,
            expiration: p.expiration,
        }
    }
}
