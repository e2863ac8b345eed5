//! Margin changes with oracle payload selection, and vault liquidity

mod common;

use common::*;
use std::sync::atomic::Ordering;
use storm_codec::protocol_constants::{amm, jetton, position_manager as pm_ops, vault};
use storm_codec::{unpack_oracle_payload, OracleKind, OraclePayload};
use storm_sdk::{MarginParams, ProvideLiquidityParams, SdkError, WithdrawLiquidityParams};
use storm_types::Direction;

fn margin(collateral: &str) -> MarginParams {
    MarginParams {
        base_asset: "BTC".to_string(),
        collateral_asset: collateral.to_string(),
        direction: Direction::Long,
        amount: 2_000_000,
        oracle: None,
    }
}

#[tokio::test]
async fn test_quote_collateral_uses_simple_payload() {
    let h = harness();
    let payload = h.sdk.oracle_payload("BTC", "USDT").await.unwrap();

    assert_eq!(payload.kind(), OracleKind::Simple);
    assert_eq!(*h.oracle.calls.lock().unwrap(), vec!["BTC".to_string()]);
}

#[tokio::test]
async fn test_same_asset_collateral_reuses_price() {
    let h = harness();
    let payload = h.sdk.oracle_payload("TON", "TON").await.unwrap();

    match payload {
        OraclePayload::WithSettlement {
            price_ref,
            settlement_price_ref,
            ..
        } => {
            assert_eq!(price_ref, price_cell("TON"));
            assert_eq!(settlement_price_ref, price_cell("TON"));
        }
        other => panic!("expected settlement payload, got {other:?}"),
    }
    assert_eq!(h.oracle.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_other_collateral_fetches_settlement_price() {
    let h = harness();
    let payload = h.sdk.oracle_payload("BTC", "NOT").await.unwrap();

    match payload {
        OraclePayload::WithSettlement {
            price_ref,
            settlement_price_ref,
            feed,
            ..
        } => {
            assert_eq!(price_ref, price_cell("BTC"));
            assert_eq!(settlement_price_ref, price_cell("NOT"));
            assert!(feed.is_none());
        }
        other => panic!("expected settlement payload, got {other:?}"),
    }
    let mut calls = h.oracle.calls.lock().unwrap().clone();
    calls.sort();
    assert_eq!(calls, vec!["BTC".to_string(), "NOT".to_string()]);
}

#[tokio::test]
async fn test_oracle_failure_is_provider_error() {
    let h = harness();
    let err = h.sdk.oracle_payload("DOWN", "USDT").await.unwrap_err();
    assert!(matches!(err, SdkError::Provider { operation: "oracle price", .. }));
}

#[tokio::test]
async fn test_add_margin_jetton_collateral() {
    let h = harness();
    let tx = h.sdk.add_margin(&margin("USDT")).await.unwrap();

    assert_eq!(tx.to, wallet_of(usdt_master()));
    assert_eq!(tx.value, 350_000_000);

    let mut body = tx.body.parse();
    assert_eq!(body.load_uint(32).unwrap(), u128::from(jetton::TRANSFER));
    body.load_uint(64).unwrap();
    assert_eq!(body.load_coins().unwrap(), 2_000_000);
    assert_eq!(body.load_address().unwrap(), vault_usdt());
    body.load_address_or_null().unwrap();
    body.load_maybe_ref().unwrap();
    assert_eq!(body.load_coins().unwrap(), 305_000_000);

    let mut inner = body.load_maybe_ref().unwrap().unwrap().parse();
    assert_eq!(inner.load_uint(32).unwrap(), u128::from(amm::ADD_MARGIN));
    assert_eq!(inner.load_uint(16).unwrap(), u128::from(BTC_INDEX));
    assert!(!inner.load_bit().unwrap());
    assert_eq!(inner.load_address_or_null().unwrap(), None);

    let mut oracle = inner.load_ref().unwrap().parse();
    let parts = unpack_oracle_payload(&mut oracle).unwrap();
    assert_eq!(parts.kind, OracleKind::Simple);
    assert_eq!(parts.refs[0], price_cell("BTC"));
}

#[tokio::test]
async fn test_add_margin_native_with_supplied_payload() {
    let h = harness();
    let mut params = margin("TON");
    params.oracle = Some(OraclePayload::Simple {
        price_ref: price_cell("CACHED"),
        signatures_ref: price_cell("SIG"),
        feed: None,
    });

    let tx = h.sdk.add_margin(&params).await.unwrap();
    assert_eq!(tx.to, vault_ton());
    assert_eq!(tx.value, 350_000_000 + 2_000_000);

    let mut body = tx.body.parse();
    assert_eq!(body.load_uint(32).unwrap(), u128::from(amm::ADD_MARGIN));
    assert_eq!(body.load_coins().unwrap(), 2_000_000);
    // the supplied payload is used as is
    assert!(h.oracle.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_margin_goes_to_position_manager() {
    let h = harness();
    let tx = h.sdk.remove_margin(&margin("NOT")).await.unwrap();

    assert_eq!(tx.to, position_manager());
    assert_eq!(tx.value, 350_000_000);

    let mut body = tx.body.parse();
    assert_eq!(body.load_uint(32).unwrap(), u128::from(pm_ops::PROVIDE_POSITION));
    assert!(!body.load_bit().unwrap());
    assert_eq!(body.load_address_or_null().unwrap(), None);
    assert_eq!(body.load_uint(32).unwrap(), u128::from(amm::REMOVE_MARGIN));
    assert_eq!(body.load_coins().unwrap(), 2_000_000);

    let mut oracle = body.load_ref().unwrap().parse();
    let parts = unpack_oracle_payload(&mut oracle).unwrap();
    assert_eq!(parts.kind, OracleKind::WithSettlement);
    assert_eq!(parts.refs.len(), 4);
    // removing margin needs no token wallet
    assert_eq!(h.resolver.wallet_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_provide_liquidity_native() {
    let h = harness();
    let tx = h
        .sdk
        .provide_liquidity(&ProvideLiquidityParams {
            asset: "TON".to_string(),
            amount: 100_000_000_000,
        })
        .await
        .unwrap();

    assert_eq!(tx.to, vault_ton());
    assert_eq!(tx.value, 350_000_000 + 100_000_000_000);
    let mut body = tx.body.parse();
    assert_eq!(body.load_uint(32).unwrap(), u128::from(vault::PROVIDE_LIQUIDITY));
    assert_eq!(body.load_coins().unwrap(), 100_000_000_000);
    assert!(body.is_exhausted());
}

#[tokio::test]
async fn test_provide_liquidity_jetton_resolves_wallet_once() {
    let h = harness();
    let params = ProvideLiquidityParams {
        asset: "NOT".to_string(),
        amount: 1_000,
    };
    let first = h.sdk.provide_liquidity(&params).await.unwrap();
    let second = h.sdk.provide_liquidity(&params).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to, wallet_of(not_master()));
    assert_eq!(h.resolver.wallet_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_withdraw_liquidity_burns_lp_tokens() {
    let h = harness();
    let tx = h
        .sdk
        .withdraw_liquidity(&WithdrawLiquidityParams {
            asset: "TON".to_string(),
            lp_amount: 42_000_000_000,
        })
        .await
        .unwrap();

    assert_eq!(tx.to, wallet_of(ton_lp_master()));
    assert_eq!(tx.value, 300_000_000);

    let mut body = tx.body.parse();
    assert_eq!(body.load_uint(32).unwrap(), u128::from(vault::WITHDRAW_LIQUIDITY));
    assert_eq!(body.load_uint(64).unwrap(), 0);
    assert_eq!(body.load_coins().unwrap(), 42_000_000_000);
    assert_eq!(body.load_address().unwrap(), trader());
}

#[tokio::test]
async fn test_native_asset_has_no_token_master() {
    let h = harness();
    let err = h.sdk.jetton_wallet("TON").await.unwrap_err();
    assert!(matches!(err, SdkError::MissingJettonMaster { .. }));
    assert!(err.is_config_lookup());
}
