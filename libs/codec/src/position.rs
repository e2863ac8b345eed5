//! # Position State Parser
//!
//! ## Purpose
//!
//! Decodes the state a trader's position-manager contract reports into
//! [`PositionManagerData`], and builds the same blob back for fixtures.
//!
//! ## Layout
//!
//! ```text
//! manager   trader:addr vault:addr market:addr
//!           long:maybe ^Record short:maybe ^Record orders:maybe ^Dict referral:maybe ^Referral
//!           orders_bitset:8
//! Record    locked:1 redirect:addr? orders_bitset:8 orders:HashmapE(3, ^Order) ^Position
//! Position  size:i128 dir:1 margin:coins notional:coins premium:i64
//!           fee:32 discount:32 rebate:32 timestamp:32
//! Referral  referrer:addr? discount:32 rebate:32
//! ```
//!
//! The contract marks an empty sub-cell either with a null reference or with
//! a zero-bit, zero-ref cell. Both are turned into `None` as soon as they are
//! read, so nothing downstream sees the difference.

use crate::cell::{Cell, CellBuilder, CellSlice};
use crate::dict::{build_dict, parse_dict};
use crate::error::CodecResult;
use crate::order::{pack_order_data, unpack_order_data, ORDER_SLOT_BITS};
use std::collections::BTreeMap;
use storm_types::{
    Direction, OrderData, PositionData, PositionManagerData, PositionRecord, PositionReferralData,
};
use tracing::{debug, trace};

/// Drop the empty sentinel so absence has one representation
fn present(cell: Option<&Cell>) -> Option<&Cell> {
    cell.filter(|c| !c.is_empty())
}

pub fn unpack_position_data(slice: &mut CellSlice<'_>) -> CodecResult<PositionData> {
    Ok(PositionData {
        size: slice.load_int(128)?,
        direction: Direction::from_bit(slice.load_bit()?),
        margin: slice.load_coins()?,
        open_notional: slice.load_coins()?,
        last_updated_cumulative_premium: slice.load_int(64)? as i64,
        fee: slice.load_uint(32)? as u32,
        discount: slice.load_uint(32)? as u32,
        rebate: slice.load_uint(32)? as u32,
        last_updated_timestamp: slice.load_uint(32)? as u32,
    })
}

pub fn pack_position_data(data: &PositionData) -> CodecResult<Cell> {
    let mut b = CellBuilder::new();
    b.store_int(data.size, 128)?
        .store_bit(data.direction.as_bit())?
        .store_coins(data.margin)?
        .store_coins(data.open_notional)?
        .store_int(i128::from(data.last_updated_cumulative_premium), 64)?
        .store_uint(u128::from(data.fee), 32)?
        .store_uint(u128::from(data.discount), 32)?
        .store_uint(u128::from(data.rebate), 32)?
        .store_uint(u128::from(data.last_updated_timestamp), 32)?;
    Ok(b.end_cell())
}

/// Order slot values are each a reference to a stored order
fn unpack_orders(entries: BTreeMap<u64, CellSlice<'_>>) -> CodecResult<BTreeMap<u8, OrderData>> {
    let mut orders = BTreeMap::new();
    for (slot, mut value) in entries {
        let order = unpack_order_data(&mut value.load_ref()?.parse())?;
        // 3-bit keys cannot exceed 7
        orders.insert(slot as u8, order);
    }
    Ok(orders)
}

fn pack_orders(orders: &BTreeMap<u8, OrderData>) -> CodecResult<Option<Cell>> {
    let mut entries = BTreeMap::new();
    for (slot, order) in orders {
        let mut value = CellBuilder::new();
        value.store_ref(pack_order_data(order)?)?;
        entries.insert(u64::from(*slot), value);
    }
    build_dict(ORDER_SLOT_BITS, &entries)
}

/// Decode one direction's position record; absent or empty ⇒ `None`
pub fn unpack_position_record(cell: Option<&Cell>) -> CodecResult<Option<PositionRecord>> {
    let Some(cell) = present(cell) else {
        return Ok(None);
    };
    let mut slice = cell.parse();

    let is_locked = slice.load_bit()?;
    let redirect = slice.load_address_or_null()?;
    let orders_bitset = slice.load_uint(8)? as u8;
    let orders = unpack_orders(slice.load_dict(ORDER_SLOT_BITS)?)?;
    let position = unpack_position_data(&mut slice.load_ref()?.parse())?;

    if !is_locked && redirect.is_some() {
        trace!("stale redirect address on unlocked position");
    }

    Ok(Some(PositionRecord {
        is_locked,
        redirect_address: redirect,
        orders_bitset,
        orders,
        position,
    }))
}

pub fn pack_position_record(record: &PositionRecord) -> CodecResult<Cell> {
    let mut b = CellBuilder::new();
    b.store_bit(record.is_locked)?
        .store_address_or_null(record.redirect_address.as_ref())?
        .store_uint(u128::from(record.orders_bitset), 8)?
        .store_maybe_ref(pack_orders(&record.orders)?)?
        .store_ref(pack_position_data(&record.position)?)?;
    Ok(b.end_cell())
}

/// Decode referral terms; absent or empty ⇒ `None`
pub fn unpack_referral_data(cell: Option<&Cell>) -> CodecResult<Option<PositionReferralData>> {
    let Some(cell) = present(cell) else {
        return Ok(None);
    };
    let mut slice = cell.parse();
    Ok(Some(PositionReferralData {
        referral_address: slice.load_address_or_null()?,
        discount: slice.load_uint(32)? as u32,
        rebate: slice.load_uint(32)? as u32,
    }))
}

pub fn pack_referral_data(referral: &PositionReferralData) -> CodecResult<Cell> {
    let mut b = CellBuilder::new();
    b.store_address_or_null(referral.referral_address.as_ref())?
        .store_uint(u128::from(referral.discount), 32)?
        .store_uint(u128::from(referral.rebate), 32)?;
    Ok(b.end_cell())
}

/// Decode a position-manager state blob
///
/// `None` input means the contract is not deployed and yields `Ok(None)`;
/// that is a normal state, not an error.
pub fn parse_position_manager_state(
    state: Option<&Cell>,
) -> CodecResult<Option<PositionManagerData>> {
    let Some(state) = state else {
        debug!("position manager has no state");
        return Ok(None);
    };
    let mut slice = state.parse();

    let trader_address = slice.load_address()?;
    let vault_address = slice.load_address()?;
    let market_address = slice.load_address()?;

    let long = present(slice.load_maybe_ref()?);
    let short = present(slice.load_maybe_ref()?);
    let limit_orders = present(slice.load_maybe_ref()?);
    let referral = present(slice.load_maybe_ref()?);
    let limit_orders_bitset = slice.load_uint(8)? as u8;

    let limit_orders = match limit_orders {
        Some(root) => unpack_orders(parse_dict(root, ORDER_SLOT_BITS)?)?,
        None => BTreeMap::new(),
    };

    let data = PositionManagerData {
        trader_address,
        vault_address,
        market_address,
        long_position: unpack_position_record(long)?,
        short_position: unpack_position_record(short)?,
        limit_orders,
        limit_orders_bitset,
        referral: unpack_referral_data(referral)?,
    };

    debug!(
        trader = %data.trader_address,
        long = data.long_position.is_some(),
        short = data.short_position.is_some(),
        limit_orders = data.limit_orders.len(),
        initialized = data.is_initialized(),
        "parsed position manager state"
    );
    Ok(Some(data))
}

/// Build a position-manager state blob; absent sub-cells are null references
pub fn pack_position_manager_state(data: &PositionManagerData) -> CodecResult<Cell> {
    let long = data
        .long_position
        .as_ref()
        .map(pack_position_record)
        .transpose()?;
    let short = data
        .short_position
        .as_ref()
        .map(pack_position_record)
        .transpose()?;
    let referral = data.referral.as_ref().map(pack_referral_data).transpose()?;

    let mut b = CellBuilder::new();
    b.store_address(&data.trader_address)?
        .store_address(&data.vault_address)?
        .store_address(&data.market_address)?
        .store_maybe_ref(long)?
        .store_maybe_ref(short)?
        .store_maybe_ref(pack_orders(&data.limit_orders)?)?
        .store_maybe_ref(referral)?
        .store_uint(u128::from(data.limit_orders_bitset), 8)?;
    Ok(b.end_cell())
}
