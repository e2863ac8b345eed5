//! Position-manager state
//!
//! Decoded view of a trader's position-manager contract: one optional record
//! per direction, resting limit orders, and referral terms. Absent sub-cells
//! are always `None` here regardless of how the contract encoded absence.

use crate::common::address::Address;
use crate::common::fixed_point::ratio_from_nano;
use crate::order::{Direction, OrderData};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of order slots per position and per limit-order book
pub const ORDER_SLOTS: u8 = 8;

/// Fixed-layout position accounting record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PositionData {
    /// Signed position size, 9 decimals
    pub size: i128,
    pub direction: Direction,
    pub margin: u128,
    pub open_notional: u128,
    pub last_updated_cumulative_premium: i64,
    pub fee: u32,
    pub discount: u32,
    pub rebate: u32,
    /// Unix seconds
    pub last_updated_timestamp: u32,
}

/// One direction's position plus its SL/TP orders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Set while a state-changing request is in flight
    pub is_locked: bool,
    /// Redirect target as stored; see [`PositionRecord::active_redirect`]
    pub redirect_address: Option<Address>,
    pub orders_bitset: u8,
    /// Slot index 0..7 → order
    pub orders: BTreeMap<u8, OrderData>,
    pub position: PositionData,
}

impl PositionRecord {
    /// Slots flagged as occupied in the bitset
    pub fn occupied_slots(&self) -> Vec<u8> {
        occupied_slots(self.orders_bitset)
    }

    /// Where the in-flight request is processed. The stored address is
    /// meaningful only while the record is locked.
    pub fn active_redirect(&self) -> Option<Address> {
        self.redirect_address.filter(|_| self.is_locked)
    }
}

/// Referral terms attached to a position manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionReferralData {
    pub referral_address: Option<Address>,
    /// Raw 9-decimal discount
    pub discount: u32,
    /// Raw 9-decimal rebate
    pub rebate: u32,
}

impl PositionReferralData {
    pub fn discount_ratio(&self) -> Decimal {
        ratio_from_nano(self.discount)
    }

    pub fn rebate_ratio(&self) -> Decimal {
        ratio_from_nano(self.rebate)
    }
}

/// Full decoded position-manager state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionManagerData {
    pub trader_address: Address,
    pub vault_address: Address,
    pub market_address: Address,
    pub long_position: Option<PositionRecord>,
    pub short_position: Option<PositionRecord>,
    pub limit_orders: BTreeMap<u8, OrderData>,
    pub limit_orders_bitset: u8,
    pub referral: Option<PositionReferralData>,
}

impl PositionManagerData {
    /// The contract writes referral data on its first processed order, so its
    /// presence marks an initialised position manager
    pub fn is_initialized(&self) -> bool {
        self.referral.is_some()
    }

    pub fn position(&self, direction: Direction) -> Option<&PositionRecord> {
        match direction {
            Direction::Long => self.long_position.as_ref(),
            Direction::Short => self.short_position.as_ref(),
        }
    }
}

/// Expand an 8-bit slot bitset into slot indices, lowest first
pub fn occupied_slots(bitset: u8) -> Vec<u8> {
    (0..ORDER_SLOTS).filter(|i| bitset & (1 << i) != 0).collect()
}
