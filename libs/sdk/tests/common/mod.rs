//! In-memory collaborators shared by the SDK integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use storm_codec::{pack_position_manager_state, Cell, CellBuilder};
use storm_config::{ProtocolConfig, SdkSettings};
use storm_sdk::{
    AddressResolver, Collaborators, OraclePrice, OracleProvider, StateProvider, StormSdk,
};
use storm_types::{Address, PositionManagerData, PositionReferralData};

pub const BTC_INDEX: u16 = 3;

pub fn addr(byte: u8) -> Address {
    Address::new(0, [byte; 32])
}

pub fn trader() -> Address {
    addr(0x01)
}

pub fn vault_ton() -> Address {
    addr(0x11)
}

pub fn vault_usdt() -> Address {
    addr(0x22)
}

pub fn vault_not() -> Address {
    addr(0x44)
}

pub fn position_manager() -> Address {
    addr(0xEE)
}

/// Token wallets are derived from the master's first hash byte
pub fn wallet_of(master: Address) -> Address {
    addr(master.hash[0].wrapping_add(1))
}

pub fn usdt_master() -> Address {
    addr(0x33)
}

pub fn not_master() -> Address {
    addr(0x77)
}

pub fn ton_lp_master() -> Address {
    addr(0x55)
}

fn raw(address: Address) -> String {
    address.to_raw_string()
}

fn market_json(base: &str, collateral: &str, market_byte: u8, vault: Address) -> String {
    format!(
        r#"{{ "address": "{}", "quoteAsset": "USD", "baseAsset": "{base}", "name": "{base}/USD",
             "ticker": "{base}", "quoteAssetId": "{collateral}", "settlementToken": "{collateral}",
             "type": "crypto", "vaultAddress": "{}" }}"#,
        raw(addr(market_byte)),
        raw(vault)
    )
}

fn source_json(asset: &str, decimals: u8, vault: Address, quote_id: &str, lp: Address) -> String {
    format!(
        r#"{{ "asset": {{ "name": "{asset}", "decimals": {decimals}, "assetId": "{asset}" }},
             "vaultAddress": "{}", "quoteAssetId": "{quote_id}", "lpJettonMaster": "{}" }}"#,
        raw(vault),
        raw(lp)
    )
}

pub fn protocol_config() -> ProtocolConfig {
    let config = format!(
        r#"{{ "assets": [], "openedMarkets": [{}, {}, {}], "liquiditySources": [{}, {}, {}] }}"#,
        market_json("BTC", "TON", 0x81, vault_ton()),
        market_json("BTC", "USDT", 0x82, vault_usdt()),
        market_json("BTC", "NOT", 0x83, vault_not()),
        source_json("TON", 9, vault_ton(), "TON", ton_lp_master()),
        source_json("USDT", 6, vault_usdt(), &raw(usdt_master()), addr(0x66)),
        source_json("NOT", 9, vault_not(), &raw(not_master()), addr(0x88)),
    );
    let assets = format!(
        r#"[{{ "name": "ETH", "type": "crypto", "index": 0 }},
            {{ "name": "BTC", "type": "crypto", "index": {BTC_INDEX} }}]"#
    );
    ProtocolConfig::from_json(&config, &assets).expect("fixture config parses")
}

/// Price cells carry the symbol so tests can tell which price went where
pub fn price_cell(symbol: &str) -> Cell {
    let mut b = CellBuilder::new();
    b.store_bytes(symbol.as_bytes()).unwrap();
    b.end_cell()
}

#[derive(Default)]
pub struct MockOracle {
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl OracleProvider for MockOracle {
    async fn latest_price(&self, symbol: &str) -> anyhow::Result<OraclePrice> {
        self.calls.lock().unwrap().push(symbol.to_string());
        if symbol == "DOWN" {
            anyhow::bail!("feed {symbol} unavailable");
        }
        Ok(OraclePrice {
            price_ref: price_cell(symbol),
            signatures_ref: CellBuilder::new().end_cell(),
        })
    }
}

#[derive(Default)]
pub struct MockResolver {
    pub position_manager_calls: AtomicUsize,
    pub wallet_calls: AtomicUsize,
    pub fail: bool,
}

#[async_trait]
impl AddressResolver for MockResolver {
    async fn jetton_wallet(&self, owner: Address, master: Address) -> anyhow::Result<Address> {
        self.wallet_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(owner, trader());
        Ok(wallet_of(master))
    }

    async fn position_manager(
        &self,
        _vault: Address,
        _market: Address,
        owner: Address,
    ) -> anyhow::Result<Address> {
        self.position_manager_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("lite server timeout");
        }
        assert_eq!(owner, trader());
        Ok(position_manager())
    }
}

#[derive(Default)]
pub struct MockState {
    pub state: Mutex<Option<Cell>>,
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl MockState {
    pub fn initialized() -> Self {
        let data = PositionManagerData {
            trader_address: trader(),
            vault_address: vault_ton(),
            market_address: addr(0x81),
            long_position: None,
            short_position: None,
            limit_orders: BTreeMap::new(),
            limit_orders_bitset: 0,
            referral: Some(PositionReferralData {
                referral_address: None,
                discount: 0,
                rebate: 0,
            }),
        };
        let cell = pack_position_manager_state(&data).unwrap();
        Self {
            state: Mutex::new(Some(cell)),
            ..Self::default()
        }
    }
}

#[async_trait]
impl StateProvider for MockState {
    async fn position_manager_state(&self, _address: Address) -> anyhow::Result<Option<Cell>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("indexer unavailable");
        }
        Ok(self.state.lock().unwrap().clone())
    }
}

pub struct Harness {
    pub sdk: StormSdk,
    pub oracle: Arc<MockOracle>,
    pub resolver: Arc<MockResolver>,
    pub state: Arc<MockState>,
}

pub fn settings() -> SdkSettings {
    SdkSettings {
        trader_address: Some(trader()),
        ..SdkSettings::default()
    }
}

pub fn harness_with(resolver: MockResolver, state: MockState) -> Harness {
    let oracle = Arc::new(MockOracle::default());
    let resolver = Arc::new(resolver);
    let state = Arc::new(state);
    let sdk = StormSdk::new(
        settings(),
        Collaborators {
            config: Arc::new(protocol_config()),
            oracle: oracle.clone(),
            resolver: resolver.clone(),
            state: state.clone(),
        },
    )
    .unwrap();
    Harness {
        sdk,
        oracle,
        resolver,
        state,
    }
}

pub fn harness() -> Harness {
    harness_with(MockResolver::default(), MockState::default())
}

pub fn unix_now() -> u32 {
    chrono::Utc::now().timestamp() as u32
}
