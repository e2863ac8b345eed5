//! Memo of derived contract addresses
//!
//! Token-wallet, LP-wallet and position-manager addresses are derived by
//! on-chain getters and never change for a given trader, so each is resolved
//! once and kept here. Position managers additionally move from
//! "not yet initialised" to "initialised" exactly once; only that transition
//! is remembered, a negative answer is always re-checked.

use dashmap::{DashMap, DashSet};
use std::fmt;
use storm_types::Address;

/// What a memoised address is
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AddressKey {
    /// Trader's token wallet for a collateral asset
    JettonWallet { asset: String },
    /// Trader's LP-token wallet for a vault's collateral asset
    LpWallet { asset: String },
    /// Trader's position manager in the market `base` settled in `collateral`
    PositionManager { base: String, collateral: String },
}

impl AddressKey {
    pub fn jetton_wallet(asset: &str) -> Self {
        Self::JettonWallet {
            asset: asset.to_string(),
        }
    }

    pub fn lp_wallet(asset: &str) -> Self {
        Self::LpWallet {
            asset: asset.to_string(),
        }
    }

    pub fn position_manager(base: &str, collateral: &str) -> Self {
        Self::PositionManager {
            base: base.to_string(),
            collateral: collateral.to_string(),
        }
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressKey::JettonWallet { asset } => write!(f, "jetton wallet {asset}"),
            AddressKey::LpWallet { asset } => write!(f, "LP wallet {asset}"),
            AddressKey::PositionManager { base, collateral } => {
                write!(f, "position manager {base}:{collateral}")
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct AddressBook {
    entries: DashMap<AddressKey, Address>,
    initialized: DashSet<Address>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &AddressKey) -> Option<Address> {
        self.entries.get(key).map(|entry| *entry.value())
    }

    pub fn insert(&self, key: AddressKey, address: Address) {
        self.entries.insert(key, address);
    }

    pub fn mark_initialized(&self, position_manager: Address) {
        self.initialized.insert(position_manager);
    }

    pub fn is_initialized(&self, position_manager: &Address) -> bool {
        self.initialized.contains(position_manager)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.initialized.clear();
    }
}
