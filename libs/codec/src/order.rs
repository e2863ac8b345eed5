//! # Order Codec
//!
//! ## Purpose
//!
//! Encodes order-creation and cancellation requests, and the stored form of
//! orders the position manager keeps in its slots.
//!
//! ## Wire Shapes
//!
//! ```text
//! create (limit/market)   op:32 asset:16 type:4 gas:addr? init:1 ^params [referral:maybe u64]
//!   ^params               leverage:64 expiration:32 dir:1 coins x4
//! create (sl/tp)          op:32 type:4 gas:addr? ^{type:4 expiration:32 dir:1 amount trigger}
//! cancel                  op:32 type:4 slot:3 dir:1 gas:addr?
//! stored (sl/tp)          type:4 expiration:32 dir:1 amount trigger
//! stored (limit/market)   type:4 expiration:32 dir:1 amount leverage:64 limit_price
//!                         (stop_price | min_base_amount) stop_trigger take_trigger
//! ```
//!
//! The referral id sits after the params reference in the outer cell, and
//! only when `init_position_manager` is set. Stored limit and market orders
//! are told apart by the type tag alone; the field after `limit_price` means
//! something different in each.

use crate::cell::{Cell, CellBuilder, CellSlice};
use crate::error::{CodecError, CodecResult};
use crate::protocol_constants::{position_manager, vault};
use storm_types::{
    Address, Direction, LimitOrder, MarketOrder, OrderData, OrderType, SltpKind, SltpOrder,
};
use tracing::trace;

/// Width of the order type tag
pub const ORDER_TYPE_BITS: usize = 4;

/// Width of an order slot index
pub const ORDER_SLOT_BITS: usize = 3;

/// Market order sent to the vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketOrderRequest {
    pub asset_id: u16,
    /// Where excess gas is returned; `None` returns it to the sender
    pub gas_to: Option<Address>,
    /// Deploy the trader's position manager along with this order
    pub init_position_manager: bool,
    /// Only written when `init_position_manager` is set
    pub referral_id: Option<u64>,
    pub leverage: u64,
    pub expiration: u32,
    pub direction: Direction,
    pub limit_price: u128,
    pub min_base_asset_amount: u128,
    pub stop_trigger_price: u128,
    pub take_trigger_price: u128,
}

/// Limit or stop order sent to the vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitOrderRequest {
    pub asset_id: u16,
    pub gas_to: Option<Address>,
    pub init_position_manager: bool,
    pub referral_id: Option<u64>,
    pub leverage: u64,
    pub expiration: u32,
    pub direction: Direction,
    pub limit_price: u128,
    pub stop_price: u128,
    pub stop_trigger_price: u128,
    pub take_trigger_price: u128,
}

/// Stop-loss or take-profit sent straight to the position manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SltpOrderRequest {
    pub gas_to: Option<Address>,
    pub order: SltpOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelOrderRequest {
    pub order_type: OrderType,
    /// Slot index 0..7
    pub slot: u8,
    pub direction: Direction,
    pub gas_to: Option<Address>,
}

/// Outer cell shared by limit and market creation requests
fn pack_create_order(
    order_type: OrderType,
    asset_id: u16,
    gas_to: Option<&Address>,
    init_position_manager: bool,
    referral_id: Option<u64>,
    params: Cell,
) -> CodecResult<Cell> {
    let mut body = CellBuilder::new();
    body.store_uint(u128::from(vault::REQUEST_CREATE_ORDER), 32)?
        .store_uint(u128::from(asset_id), 16)?
        .store_uint(u128::from(u8::from(order_type)), ORDER_TYPE_BITS)?
        .store_address_or_null(gas_to)?
        .store_bit(init_position_manager)?
        .store_ref(params)?;

    if init_position_manager {
        body.store_maybe_uint(referral_id.map(u128::from), 64)?;
    }

    trace!(
        opcode = vault::REQUEST_CREATE_ORDER,
        asset_id,
        order_type = ?order_type,
        bits = body.bits_used(),
        "packed create-order request"
    );
    Ok(body.end_cell())
}

pub fn pack_market_order(request: &MarketOrderRequest) -> CodecResult<Cell> {
    let mut params = CellBuilder::new();
    params
        .store_uint(u128::from(request.leverage), 64)?
        .store_uint(u128::from(request.expiration), 32)?
        .store_bit(request.direction.as_bit())?
        .store_coins(request.limit_price)?
        .store_coins(request.min_base_asset_amount)?
        .store_coins(request.stop_trigger_price)?
        .store_coins(request.take_trigger_price)?;

    pack_create_order(
        OrderType::Market,
        request.asset_id,
        request.gas_to.as_ref(),
        request.init_position_manager,
        request.referral_id,
        params.end_cell(),
    )
}

pub fn pack_limit_order(request: &LimitOrderRequest) -> CodecResult<Cell> {
    let mut params = CellBuilder::new();
    params
        .store_uint(u128::from(request.leverage), 64)?
        .store_uint(u128::from(request.expiration), 32)?
        .store_bit(request.direction.as_bit())?
        .store_coins(request.limit_price)?
        .store_coins(request.stop_price)?
        .store_coins(request.stop_trigger_price)?
        .store_coins(request.take_trigger_price)?;

    pack_create_order(
        OrderType::Limit,
        request.asset_id,
        request.gas_to.as_ref(),
        request.init_position_manager,
        request.referral_id,
        params.end_cell(),
    )
}

pub fn pack_sltp_order(request: &SltpOrderRequest) -> CodecResult<Cell> {
    let order = &request.order;
    let order_type = OrderType::from(order.kind);

    let mut body = CellBuilder::new();
    body.store_uint(u128::from(position_manager::CREATE_ORDER), 32)?
        .store_uint(u128::from(u8::from(order_type)), ORDER_TYPE_BITS)?
        .store_address_or_null(request.gas_to.as_ref())?
        .store_ref(pack_sltp_fields(order)?.end_cell())?;
    Ok(body.end_cell())
}

pub fn pack_cancel_order(request: &CancelOrderRequest) -> CodecResult<Cell> {
    let mut body = CellBuilder::new();
    body.store_uint(u128::from(position_manager::CANCEL_ORDER), 32)?
        .store_uint(u128::from(u8::from(request.order_type)), ORDER_TYPE_BITS)?
        .store_uint(u128::from(request.slot), ORDER_SLOT_BITS)?
        .store_bit(request.direction.as_bit())?
        .store_address_or_null(request.gas_to.as_ref())?;
    Ok(body.end_cell())
}

fn pack_sltp_fields(order: &SltpOrder) -> CodecResult<CellBuilder> {
    let mut b = CellBuilder::new();
    b.store_uint(u128::from(u8::from(OrderType::from(order.kind))), ORDER_TYPE_BITS)?
        .store_uint(u128::from(order.expiration), 32)?
        .store_bit(order.direction.as_bit())?
        .store_coins(order.amount)?
        .store_coins(order.trigger_price)?;
    Ok(b)
}

/// Stored form of an order, as kept in a position-manager slot
pub fn pack_order_data(order: &OrderData) -> CodecResult<Cell> {
    let b = match order {
        OrderData::StopLoss(o) | OrderData::TakeProfit(o) => pack_sltp_fields(o)?,
        OrderData::Limit(o) => {
            let mut b = CellBuilder::new();
            b.store_uint(u128::from(u8::from(OrderType::Limit)), ORDER_TYPE_BITS)?
                .store_uint(u128::from(o.expiration), 32)?
                .store_bit(o.direction.as_bit())?
                .store_coins(o.amount)?
                .store_uint(u128::from(o.leverage), 64)?
                .store_coins(o.limit_price)?
                .store_coins(o.stop_price)?
                .store_coins(o.stop_trigger_price)?
                .store_coins(o.take_trigger_price)?;
            b
        }
        OrderData::Market(o) => {
            let mut b = CellBuilder::new();
            b.store_uint(u128::from(u8::from(OrderType::Market)), ORDER_TYPE_BITS)?
                .store_uint(u128::from(o.expiration), 32)?
                .store_bit(o.direction.as_bit())?
                .store_coins(o.amount)?
                .store_uint(u128::from(o.leverage), 64)?
                .store_coins(o.limit_price)?
                .store_coins(o.min_base_asset_amount)?
                .store_coins(o.stop_trigger_price)?
                .store_coins(o.take_trigger_price)?;
            b
        }
    };
    Ok(b.end_cell())
}

/// Decode a stored order, dispatching on its peeked type tag
pub fn unpack_order_data(slice: &mut CellSlice<'_>) -> CodecResult<OrderData> {
    let tag = slice.preload_uint(ORDER_TYPE_BITS)? as u8;
    let order_type = OrderType::try_from(tag).map_err(|_| CodecError::UnknownOrderType(tag))?;

    match order_type {
        OrderType::StopLoss | OrderType::TakeProfit => unpack_sltp(slice).map(OrderData::sltp),
        OrderType::Limit | OrderType::Market => unpack_limit_market(slice),
    }
}

fn unpack_sltp(slice: &mut CellSlice<'_>) -> CodecResult<SltpOrder> {
    let kind = match slice.load_uint(ORDER_TYPE_BITS)? as u8 {
        0 => SltpKind::StopLoss,
        1 => SltpKind::TakeProfit,
        tag => return Err(CodecError::UnknownOrderType(tag)),
    };
    Ok(SltpOrder {
        kind,
        expiration: slice.load_uint(32)? as u32,
        direction: Direction::from_bit(slice.load_bit()?),
        amount: slice.load_coins()?,
        trigger_price: slice.load_coins()?,
    })
}

fn unpack_limit_market(slice: &mut CellSlice<'_>) -> CodecResult<OrderData> {
    let tag = slice.load_uint(ORDER_TYPE_BITS)? as u8;
    let expiration = slice.load_uint(32)? as u32;
    let direction = Direction::from_bit(slice.load_bit()?);
    let amount = slice.load_coins()?;
    let leverage = slice.load_uint(64)? as u64;
    let limit_price = slice.load_coins()?;

    match OrderType::try_from(tag) {
        Ok(OrderType::Limit) => Ok(OrderData::Limit(LimitOrder {
            expiration,
            direction,
            amount,
            leverage,
            limit_price,
            stop_price: slice.load_coins()?,
            stop_trigger_price: slice.load_coins()?,
            take_trigger_price: slice.load_coins()?,
        })),
        Ok(OrderType::Market) => Ok(OrderData::Market(MarketOrder {
            expiration,
            direction,
            amount,
            leverage,
            limit_price,
            min_base_asset_amount: slice.load_coins()?,
            stop_trigger_price: slice.load_coins()?,
            take_trigger_price: slice.load_coins()?,
        })),
        _ => Err(CodecError::UnknownOrderType(tag)),
    }
}
