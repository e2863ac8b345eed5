//! # Wire Format Scenarios
//!
//! Fixed scenarios the contracts depend on, checked bit by bit:
//! - SL/TP body prefix (position-manager opcode then type 0)
//! - Coins zero and nullable-address cursor movement
//! - Referral id placement on market orders
//! - Empty-sentinel position sub-cells
//! - Oracle payload structure with and without a signed feed
//! - Bit/ref budgets of every packer at maximal field values

use storm_codec::protocol_constants::{
    position_manager, vault, ADDRESS_BITS, MAX_CELL_BITS, MAX_CELL_REFS,
};
use storm_codec::{
    create_add_margin_tx, create_cancel_order_tx, create_limit_order_tx, create_market_order_tx,
    create_provide_liquidity_tx, create_remove_margin_tx, create_sltp_order_tx,
    create_withdraw_liquidity_tx, pack_oracle_payload, pack_position_record, pack_referral_data,
    pack_sltp_order, parse_position_manager_state, unpack_oracle_payload, AddMarginRequest,
    CancelOrderRequest, Cell, CellBuilder, Collateral, FeedLayout, FeedPayload, FeedRecord,
    LimitOrderRequest, MarketOrderRequest, OracleKind, OraclePayload, RemoveMarginRequest,
    SignedFeedMessage, SltpOrderRequest, TxParams,
};
use storm_types::{
    Address, Direction, OrderType, PositionData, PositionRecord, PositionReferralData, SltpKind,
    SltpOrder,
};

/// Largest amount the coins encoding can carry
const MAX_COINS: u128 = (1 << 120) - 1;

fn addr(byte: u8) -> Address {
    Address::new(0, [byte; 32])
}

fn leaf(tag: u128) -> Cell {
    let mut b = CellBuilder::new();
    b.store_uint(tag, 32).unwrap();
    b.end_cell()
}

fn market_request(init: bool, referral_id: Option<u64>) -> MarketOrderRequest {
    MarketOrderRequest {
        asset_id: u16::MAX,
        gas_to: Some(addr(0xee)),
        init_position_manager: init,
        referral_id,
        leverage: u64::MAX,
        expiration: u32::MAX,
        direction: Direction::Short,
        limit_price: MAX_COINS,
        min_base_asset_amount: MAX_COINS,
        stop_trigger_price: MAX_COINS,
        take_trigger_price: MAX_COINS,
    }
}

fn double_feed() -> SignedFeedMessage {
    let record = FeedRecord {
        price: u64::MAX,
        exponent: i16::MIN,
    };
    SignedFeedMessage {
        r: [0xff; 32],
        s: [0xff; 32],
        v: 28,
        payload_len: u16::MAX,
        timestamp: u64::MAX,
        channel: 3,
        payload: FeedPayload::Double {
            feed_id: u32::MAX,
            feed: record,
            settlement_feed_id: u32::MAX,
            settlement_feed: record,
        },
    }
}

fn settlement_oracle() -> OraclePayload {
    OraclePayload::WithSettlement {
        price_ref: leaf(1),
        signatures_ref: leaf(2),
        settlement_price_ref: leaf(3),
        settlement_signatures_ref: leaf(4),
        feed: Some(double_feed()),
    }
}

fn assert_within_budget(cell: &Cell) {
    assert!(cell.bit_len() <= MAX_CELL_BITS, "{} bits", cell.bit_len());
    assert!(cell.refs().len() <= MAX_CELL_REFS);
    for child in cell.refs() {
        assert_within_budget(child);
    }
}

#[test]
fn sltp_body_starts_with_position_manager_opcode_and_type_zero() {
    let body = pack_sltp_order(&SltpOrderRequest {
        gas_to: None,
        order: SltpOrder {
            kind: SltpKind::StopLoss,
            expiration: 0,
            direction: Direction::Long,
            amount: 1_000_000_000,
            trigger_price: 1_000_000,
        },
    })
    .unwrap();

    let mut slice = body.parse();
    assert_eq!(slice.load_uint(32).unwrap(), 0xa398_43f4);
    assert_eq!(slice.load_uint(4).unwrap(), 0);
}

#[test]
fn sltp_nested_cell_repeats_type() {
    let body = pack_sltp_order(&SltpOrderRequest {
        gas_to: Some(addr(7)),
        order: SltpOrder {
            kind: SltpKind::TakeProfit,
            expiration: 99,
            direction: Direction::Short,
            amount: 1_000_000_000,
            trigger_price: 1_000_000,
        },
    })
    .unwrap();

    let mut slice = body.parse();
    assert_eq!(slice.load_uint(32).unwrap() as u32, position_manager::CREATE_ORDER);
    assert_eq!(slice.load_uint(4).unwrap(), 1);
    assert_eq!(slice.load_address_or_null().unwrap(), Some(addr(7)));

    let mut nested = slice.load_ref().unwrap().parse();
    assert_eq!(nested.load_uint(4).unwrap(), 1);
    assert_eq!(nested.load_uint(32).unwrap(), 99);
    assert!(nested.load_bit().unwrap());
    assert_eq!(nested.load_coins().unwrap(), 1_000_000_000);
    assert_eq!(nested.load_coins().unwrap(), 1_000_000);
    assert!(nested.is_exhausted());
}

#[test]
fn coins_zero_advances_exactly_four_bits() {
    let mut b = CellBuilder::new();
    b.store_coins(0).unwrap().store_uint(0b1011, 4).unwrap();
    let cell = b.end_cell();

    let mut slice = cell.parse();
    assert_eq!(slice.load_coins().unwrap(), 0);
    assert_eq!(slice.remaining_bits(), 4);
    assert_eq!(slice.load_uint(4).unwrap(), 0b1011);
}

#[test]
fn null_address_is_two_bits_present_address_is_full_width() {
    let mut b = CellBuilder::new();
    b.store_address_or_null(None)
        .unwrap()
        .store_address_or_null(Some(&Address::new(-1, [0xab; 32])))
        .unwrap();
    let cell = b.end_cell();
    assert_eq!(cell.bit_len(), 2 + ADDRESS_BITS);

    let mut slice = cell.parse();
    assert_eq!(slice.load_address_or_null().unwrap(), None);
    assert_eq!(slice.remaining_bits(), ADDRESS_BITS);
    assert_eq!(
        slice.load_address_or_null().unwrap(),
        Some(Address::new(-1, [0xab; 32]))
    );
    assert_eq!(slice.remaining_bits(), 0);
}

#[test]
fn market_order_referral_follows_nested_cell() {
    let collateral = Collateral::Native { vault: addr(1) };
    let mut request = market_request(true, Some(42));
    request.gas_to = None;
    let body = storm_codec::pack_market_order(&request).unwrap();

    let mut slice = body.parse();
    assert_eq!(slice.load_uint(32).unwrap() as u32, vault::REQUEST_CREATE_ORDER);
    assert_eq!(slice.load_uint(16).unwrap(), u128::from(u16::MAX));
    assert_eq!(slice.load_uint(4).unwrap(), u128::from(u8::from(OrderType::Market)));
    assert_eq!(slice.load_address_or_null().unwrap(), None);
    assert!(slice.load_bit().unwrap());

    let params = slice.load_ref().unwrap();
    // 64 + 32 + 1 + four coins of 4 + 120 bits
    assert_eq!(params.bit_len(), 97 + 4 * 124);
    assert!(params.refs().is_empty());

    assert_eq!(slice.load_maybe_uint(64).unwrap(), Some(42));
    assert!(slice.is_exhausted());

    // Same order through the native envelope keeps the referral at the tail
    let tx = create_market_order_tx(&collateral, 1, &request).unwrap();
    let mut slice = tx.body.parse();
    slice.skip(32).unwrap();
    assert_eq!(slice.load_coins().unwrap(), 1);
    slice.skip(16 + 4 + 2 + 1).unwrap();
    assert_eq!(slice.load_maybe_uint(64).unwrap(), Some(42));
}

#[test]
fn market_order_without_init_has_no_referral_field() {
    let with = storm_codec::pack_market_order(&market_request(true, None)).unwrap();
    let without = storm_codec::pack_market_order(&market_request(false, Some(42))).unwrap();
    assert_eq!(with.bit_len(), without.bit_len() + 1);
}

#[test]
fn empty_sentinel_long_position_is_none() {
    let short = PositionRecord {
        is_locked: false,
        redirect_address: None,
        orders_bitset: 0,
        orders: Default::default(),
        position: PositionData {
            size: -2_000_000_000,
            direction: Direction::Short,
            ..PositionData::default()
        },
    };
    let referral = PositionReferralData {
        referral_address: Some(addr(9)),
        discount: 100_000_000,
        rebate: 50_000_000,
    };

    let mut b = CellBuilder::new();
    b.store_address(&addr(1)).unwrap();
    b.store_address(&addr(2)).unwrap();
    b.store_address(&addr(3)).unwrap();
    b.store_maybe_ref(Some(Cell::empty())).unwrap();
    b.store_maybe_ref(Some(pack_position_record(&short).unwrap()))
        .unwrap();
    b.store_maybe_ref(Some(Cell::empty())).unwrap();
    b.store_maybe_ref(Some(pack_referral_data(&referral).unwrap()))
        .unwrap();
    b.store_uint(0, 8).unwrap();
    let state = b.end_cell();

    let data = parse_position_manager_state(Some(&state)).unwrap().unwrap();
    assert_eq!(data.long_position, None);
    assert_eq!(data.short_position, Some(short));
    assert!(data.limit_orders.is_empty());
    assert_eq!(data.referral, Some(referral));
    assert!(data.is_initialized());
}

#[test]
fn oracle_payload_parts_survive_roundtrip() {
    let simple = OraclePayload::Simple {
        price_ref: leaf(10),
        signatures_ref: leaf(11),
        feed: None,
    };
    let parts = unpack_oracle_payload(&mut pack_oracle_payload(&simple).unwrap().parse()).unwrap();
    assert_eq!(parts.kind, OracleKind::Simple);
    assert_eq!(parts.refs, vec![leaf(10), leaf(11)]);
    assert_eq!(parts.decode_feed(FeedLayout::Single).unwrap(), None);

    let settled = settlement_oracle();
    let cell = pack_oracle_payload(&settled).unwrap();
    let mut slice = cell.parse();
    let parts = unpack_oracle_payload(&mut slice).unwrap();
    assert!(slice.is_exhausted());
    assert_eq!(parts.kind, OracleKind::WithSettlement);
    assert_eq!(parts.refs, vec![leaf(1), leaf(2), leaf(3), leaf(4)]);
    assert_eq!(
        parts.decode_feed(FeedLayout::Double).unwrap(),
        Some(double_feed())
    );
}

#[test]
fn every_packer_stays_within_cell_budget() {
    let native = Collateral::Native { vault: addr(1) };
    let jetton = Collateral::Jetton {
        vault: addr(1),
        trader: addr(2),
        trader_wallet: addr(3),
        query_id: u64::MAX,
    };
    let limit = LimitOrderRequest {
        asset_id: u16::MAX,
        gas_to: Some(addr(4)),
        init_position_manager: true,
        referral_id: Some(u64::MAX),
        leverage: u64::MAX,
        expiration: u32::MAX,
        direction: Direction::Short,
        limit_price: MAX_COINS,
        stop_price: MAX_COINS,
        stop_trigger_price: MAX_COINS,
        take_trigger_price: MAX_COINS,
    };
    let add_margin = AddMarginRequest {
        asset_id: u16::MAX,
        direction: Direction::Short,
        gas_to: Some(addr(4)),
        oracle: settlement_oracle(),
    };

    let amount = MAX_COINS - 1_000_000_000;
    let market = market_request(true, Some(u64::MAX));

    let mut txs: Vec<TxParams> = Vec::new();
    for collateral in [&native, &jetton] {
        txs.push(create_market_order_tx(collateral, amount, &market).unwrap());
        txs.push(create_limit_order_tx(collateral, amount, &limit).unwrap());
        txs.push(create_add_margin_tx(collateral, amount, &add_margin).unwrap());
        txs.push(create_provide_liquidity_tx(collateral, amount, Some(addr(5))).unwrap());
    }
    txs.push(
        create_sltp_order_tx(
            addr(6),
            &SltpOrderRequest {
                gas_to: Some(addr(4)),
                order: SltpOrder {
                    kind: SltpKind::TakeProfit,
                    expiration: u32::MAX,
                    direction: Direction::Short,
                    amount: MAX_COINS,
                    trigger_price: MAX_COINS,
                },
            },
        )
        .unwrap(),
    );
    txs.push(
        create_cancel_order_tx(
            addr(6),
            &CancelOrderRequest {
                order_type: OrderType::Market,
                slot: 7,
                direction: Direction::Short,
                gas_to: Some(addr(4)),
            },
        )
        .unwrap(),
    );
    txs.push(
        create_remove_margin_tx(
            addr(6),
            &RemoveMarginRequest {
                direction: Direction::Short,
                gas_to: Some(addr(4)),
                amount: MAX_COINS,
                oracle: settlement_oracle(),
            },
        )
        .unwrap(),
    );
    txs.push(create_withdraw_liquidity_tx(addr(7), MAX_COINS, addr(8), None).unwrap());

    for tx in &txs {
        assert_within_budget(&tx.body);
    }
}
