//! Order kinds stored by the position manager
//!
//! The four order kinds share a 4-bit type tag on the wire, but their field
//! sets differ. Each kind therefore gets its own struct and `OrderData` is a
//! plain sum type over them; there is no "one struct with optional fields"
//! representation anywhere in the workspace.
//!
//! All prices, amounts and leverage are 9-decimal fixed-point integers.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

/// 4-bit order type tag
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
pub enum OrderType {
    StopLoss = 0,
    TakeProfit = 1,
    Limit = 2,
    Market = 3,
}

impl OrderType {
    /// Whether this tag addresses a position's SL/TP slot set
    pub fn is_sltp(self) -> bool {
        matches!(self, OrderType::StopLoss | OrderType::TakeProfit)
    }
}

/// 1-bit position direction
#[repr(u8)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize,
    Deserialize,
)]
pub enum Direction {
    #[default]
    Long = 0,
    Short = 1,
}

impl Direction {
    /// Decode from a single wire bit
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Direction::Short
        } else {
            Direction::Long
        }
    }

    /// Encode as a single wire bit
    pub fn as_bit(self) -> bool {
        matches!(self, Direction::Short)
    }
}

/// Subset of order types that close part of an existing position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SltpKind {
    StopLoss,
    TakeProfit,
}

impl From<SltpKind> for OrderType {
    fn from(kind: SltpKind) -> Self {
        match kind {
            SltpKind::StopLoss => OrderType::StopLoss,
            SltpKind::TakeProfit => OrderType::TakeProfit,
        }
    }
}

/// Stop-loss or take-profit order attached to a position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SltpOrder {
    pub kind: SltpKind,
    /// Expiration, unix seconds (0 = never)
    pub expiration: u32,
    pub direction: Direction,
    /// Position size to close
    pub amount: u128,
    pub trigger_price: u128,
}

/// Resting limit (or stop-limit) order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrder {
    pub expiration: u32,
    pub direction: Direction,
    /// Margin to open with
    pub amount: u128,
    pub leverage: u64,
    pub limit_price: u128,
    /// Price that arms the order; 0 for a plain limit order
    pub stop_price: u128,
    pub stop_trigger_price: u128,
    pub take_trigger_price: u128,
}

/// Resting market (or stop-market) order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOrder {
    pub expiration: u32,
    pub direction: Direction,
    pub amount: u128,
    pub leverage: u64,
    pub limit_price: u128,
    pub min_base_asset_amount: u128,
    pub stop_trigger_price: u128,
    pub take_trigger_price: u128,
}

/// Any order the position manager can hold in one of its slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderData {
    StopLoss(SltpOrder),
    TakeProfit(SltpOrder),
    Limit(LimitOrder),
    Market(MarketOrder),
}

impl OrderData {
    pub fn order_type(&self) -> OrderType {
        match self {
            OrderData::StopLoss(_) => OrderType::StopLoss,
            OrderData::TakeProfit(_) => OrderType::TakeProfit,
            OrderData::Limit(_) => OrderType::Limit,
            OrderData::Market(_) => OrderType::Market,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            OrderData::StopLoss(o) | OrderData::TakeProfit(o) => o.direction,
            OrderData::Limit(o) => o.direction,
            OrderData::Market(o) => o.direction,
        }
    }

    pub fn expiration(&self) -> u32 {
        match self {
            OrderData::StopLoss(o) | OrderData::TakeProfit(o) => o.expiration,
            OrderData::Limit(o) => o.expiration,
            OrderData::Market(o) => o.expiration,
        }
    }

    /// Build the SL/TP variant matching `order.kind`
    pub fn sltp(order: SltpOrder) -> Self {
        match order.kind {
            SltpKind::StopLoss => OrderData::StopLoss(order),
            SltpKind::TakeProfit => OrderData::TakeProfit(order),
        }
    }
}
