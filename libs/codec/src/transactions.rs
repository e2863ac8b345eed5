//! # Transaction Builders
//!
//! ## Purpose
//!
//! Turn a packed request into the message a wallet must send: destination,
//! body and attached native value. This is where the fee schedule and the
//! collateral envelope are applied.
//!
//! ## Envelopes
//!
//! ```text
//! Native collateral   wallet ──(fee + amount)──► vault
//!                     body = op · amount · rest of request
//!
//! Token collateral    wallet ──(fee)──► trader token wallet ──transfer──► vault
//!                     body = transfer(amount, forward = fee.forward, payload = request)
//!
//! Position manager    wallet ──(fee)──► position manager (SL/TP, cancel, remove margin)
//! LP wallet           wallet ──(fee)──► LP token wallet (withdraw)
//! ```

use crate::cell::Cell;
use crate::error::{CodecError, CodecResult};
use crate::fees::{self, Fee};
use crate::messages::{
    pack_add_margin, pack_jetton_transfer, pack_native_payload, pack_provide_liquidity,
    pack_remove_margin, pack_withdraw_liquidity, AddMarginRequest, JettonTransfer,
    RemoveMarginRequest, WithdrawLiquidityRequest,
};
use crate::order::{
    pack_cancel_order, pack_limit_order, pack_market_order, pack_sltp_order, CancelOrderRequest,
    LimitOrderRequest, MarketOrderRequest, SltpOrderRequest,
};
use storm_types::Address;
use tracing::debug;

/// Message ready for signing and sending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxParams {
    pub to: Address,
    pub body: Cell,
    /// Attached native value in nanos
    pub value: u128,
}

/// How collateral reaches the vault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collateral {
    /// Native currency sent straight to the vault with the message
    Native { vault: Address },
    /// Tokens moved by a transfer from the trader's token wallet
    Jetton {
        vault: Address,
        trader: Address,
        trader_wallet: Address,
        query_id: u64,
    },
}

impl Collateral {
    pub fn vault(&self) -> Address {
        match self {
            Collateral::Native { vault } | Collateral::Jetton { vault, .. } => *vault,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Collateral::Native { .. })
    }
}

fn wrap_collateral(
    action: &'static str,
    collateral: &Collateral,
    amount: u128,
    inner: Cell,
    fee: Fee,
    response: Option<Address>,
) -> CodecResult<TxParams> {
    let tx = match collateral {
        Collateral::Native { vault } => {
            let value = fee
                .msg_value
                .raw_value()
                .checked_add(amount)
                .ok_or_else(|| CodecError::value_out_of_range(128, "fee plus principal"))?;
            TxParams {
                to: *vault,
                body: pack_native_payload(amount, &inner)?,
                value,
            }
        }
        Collateral::Jetton {
            vault,
            trader,
            trader_wallet,
            query_id,
        } => {
            let body = pack_jetton_transfer(&JettonTransfer {
                query_id: *query_id,
                amount,
                destination: *vault,
                response: Some(response.unwrap_or(*trader)),
                custom_payload: None,
                forward_value: Some(fee.forward_or_zero().raw_value()),
                forward_payload: Some(inner),
            })?;
            TxParams {
                to: *trader_wallet,
                body,
                value: fee.msg_value.raw_value(),
            }
        }
    };

    debug!(
        action,
        native = collateral.is_native(),
        to = %tx.to,
        value = %tx.value,
        bits = tx.body.bit_len(),
        "built transaction"
    );
    Ok(tx)
}

fn direct(action: &'static str, to: Address, body: Cell, fee: Fee) -> TxParams {
    debug!(action, to = %to, value = %fee.msg_value, bits = body.bit_len(), "built transaction");
    TxParams {
        to,
        body,
        value: fee.msg_value.raw_value(),
    }
}

/// `amount` is the collateral committed to the order
pub fn create_market_order_tx(
    collateral: &Collateral,
    amount: u128,
    request: &MarketOrderRequest,
) -> CodecResult<TxParams> {
    let inner = pack_market_order(request)?;
    wrap_collateral("market_order", collateral, amount, inner, fees::CREATE_ORDER, None)
}

pub fn create_limit_order_tx(
    collateral: &Collateral,
    amount: u128,
    request: &LimitOrderRequest,
) -> CodecResult<TxParams> {
    let inner = pack_limit_order(request)?;
    wrap_collateral("limit_order", collateral, amount, inner, fees::CREATE_ORDER, None)
}

pub fn create_sltp_order_tx(
    position_manager: Address,
    request: &SltpOrderRequest,
) -> CodecResult<TxParams> {
    let body = pack_sltp_order(request)?;
    Ok(direct("sltp_order", position_manager, body, fees::CREATE_ORDER))
}

pub fn create_cancel_order_tx(
    position_manager: Address,
    request: &CancelOrderRequest,
) -> CodecResult<TxParams> {
    let body = pack_cancel_order(request)?;
    Ok(direct("cancel_order", position_manager, body, fees::CANCEL_ORDER))
}

pub fn create_add_margin_tx(
    collateral: &Collateral,
    amount: u128,
    request: &AddMarginRequest,
) -> CodecResult<TxParams> {
    let inner = pack_add_margin(request)?;
    wrap_collateral("add_margin", collateral, amount, inner, fees::ADD_MARGIN, None)
}

pub fn create_remove_margin_tx(
    position_manager: Address,
    request: &RemoveMarginRequest,
) -> CodecResult<TxParams> {
    let body = pack_remove_margin(request)?;
    Ok(direct("remove_margin", position_manager, body, fees::REMOVE_MARGIN))
}

/// `response` overrides the trader as receiver of excess gas on the token path
pub fn create_provide_liquidity_tx(
    collateral: &Collateral,
    amount: u128,
    response: Option<Address>,
) -> CodecResult<TxParams> {
    let inner = pack_provide_liquidity()?;
    wrap_collateral(
        "provide_liquidity",
        collateral,
        amount,
        inner,
        fees::PROVIDE_LIQUIDITY,
        response,
    )
}

/// Burn `amount` LP tokens; collateral goes to `response` when given,
/// otherwise to `user`
pub fn create_withdraw_liquidity_tx(
    lp_wallet: Address,
    amount: u128,
    user: Address,
    response: Option<Address>,
) -> CodecResult<TxParams> {
    let body = pack_withdraw_liquidity(&WithdrawLiquidityRequest {
        amount,
        user_address: response.unwrap_or(user),
    })?;
    Ok(direct("withdraw_liquidity", lp_wallet, body, fees::WITHDRAW_LIQUIDITY))
}
