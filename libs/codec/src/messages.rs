//! Contract-call bodies for margin, liquidity and collateral envelopes
//!
//! Order bodies live in [`crate::order`]. The two envelope packers here wrap
//! any inner body for delivery: [`pack_jetton_transfer`] for token
//! collateral, [`pack_native_payload`] for native collateral.

use crate::cell::{Cell, CellBuilder};
use crate::error::CodecResult;
use crate::fees::DEFAULT_JETTON_FORWARD;
use crate::oracle::{pack_oracle_payload, OraclePayload};
use crate::protocol_constants::{amm, jetton, position_manager, vault};
use storm_types::{Address, Direction};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddMarginRequest {
    pub asset_id: u16,
    pub direction: Direction,
    pub gas_to: Option<Address>,
    pub oracle: OraclePayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveMarginRequest {
    pub direction: Direction,
    pub gas_to: Option<Address>,
    pub amount: u128,
    pub oracle: OraclePayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawLiquidityRequest {
    /// LP tokens to burn
    pub amount: u128,
    /// Receives the withdrawn collateral
    pub user_address: Address,
}

/// Standard token transfer carrying an inner protocol body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JettonTransfer {
    pub query_id: u64,
    pub amount: u128,
    pub destination: Address,
    /// Receives excess gas
    pub response: Option<Address>,
    pub custom_payload: Option<Cell>,
    /// Value forwarded with the transfer notification; 0.001 when `None`
    pub forward_value: Option<u128>,
    pub forward_payload: Option<Cell>,
}

pub fn pack_add_margin(request: &AddMarginRequest) -> CodecResult<Cell> {
    let mut b = CellBuilder::new();
    b.store_uint(u128::from(amm::ADD_MARGIN), 32)?
        .store_uint(u128::from(request.asset_id), 16)?
        .store_bit(request.direction.as_bit())?
        .store_address_or_null(request.gas_to.as_ref())?
        .store_ref(pack_oracle_payload(&request.oracle)?)?;
    Ok(b.end_cell())
}

/// Remove-margin rides inside a provide-position envelope addressed to the
/// position manager, which forwards it to the market
pub fn pack_remove_margin(request: &RemoveMarginRequest) -> CodecResult<Cell> {
    let mut b = CellBuilder::new();
    b.store_uint(u128::from(position_manager::PROVIDE_POSITION), 32)?
        .store_bit(request.direction.as_bit())?
        .store_address_or_null(request.gas_to.as_ref())?
        .store_uint(u128::from(amm::REMOVE_MARGIN), 32)?
        .store_coins(request.amount)?
        .store_ref(pack_oracle_payload(&request.oracle)?)?;
    Ok(b.end_cell())
}

pub fn pack_provide_liquidity() -> CodecResult<Cell> {
    let mut b = CellBuilder::new();
    b.store_uint(u128::from(vault::PROVIDE_LIQUIDITY), 32)?;
    Ok(b.end_cell())
}

/// LP token burn; the zero is the burn's query id
pub fn pack_withdraw_liquidity(request: &WithdrawLiquidityRequest) -> CodecResult<Cell> {
    let mut b = CellBuilder::new();
    b.store_uint(u128::from(vault::WITHDRAW_LIQUIDITY), 32)?
        .store_uint(0, 64)?
        .store_coins(request.amount)?
        .store_address(&request.user_address)?;
    Ok(b.end_cell())
}

pub fn pack_jetton_transfer(transfer: &JettonTransfer) -> CodecResult<Cell> {
    let forward_value = transfer
        .forward_value
        .unwrap_or(DEFAULT_JETTON_FORWARD.raw_value());

    let mut b = CellBuilder::new();
    b.store_uint(u128::from(jetton::TRANSFER), 32)?
        .store_uint(u128::from(transfer.query_id), 64)?
        .store_coins(transfer.amount)?
        .store_address(&transfer.destination)?
        .store_address_or_null(transfer.response.as_ref())?
        .store_maybe_ref(transfer.custom_payload.clone())?
        .store_coins(forward_value)?
        .store_maybe_ref(transfer.forward_payload.clone())?;

    trace!(
        query_id = transfer.query_id,
        amount = %transfer.amount,
        forward_value = %forward_value,
        bits = b.bits_used(),
        "packed jetton transfer"
    );
    Ok(b.end_cell())
}

/// Splice a principal amount in after the inner body's opcode
///
/// `op:32 rest...` becomes `op:32 amount:coins rest...`, refs included.
pub fn pack_native_payload(amount: u128, payload: &Cell) -> CodecResult<Cell> {
    let mut inner = payload.parse();
    let opcode = inner.load_uint(32)?;

    let mut b = CellBuilder::new();
    b.store_uint(opcode, 32)?
        .store_coins(amount)?
        .store_slice(&inner)?;
    Ok(b.end_cell())
}
