//! Protocol constants for the Storm contract suite
//!
//! Opcodes, tags and magic numbers fixed by the deployed contracts. These
//! values are interpreted bit-for-bit on-chain and must never change.

/// Maximum data bits in a single cell
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum child references in a single cell
pub const MAX_CELL_REFS: usize = 4;

/// Maximum byte length expressible by the coins length nibble
pub const MAX_COINS_BYTES: usize = 15;

/// Bits occupied by a present standard address
pub const ADDRESS_BITS: usize = 267;

/// 2-bit tag for an absent address (`addr_none`)
pub const ADDR_NONE_TAG: u128 = 0b00;

/// 2-bit tag for a standard address (`addr_std`)
pub const ADDR_STD_TAG: u128 = 0b10;

/// Vault opcodes
pub mod vault {
    /// Jetton burn on the LP wallet, processed by the vault as a withdrawal
    pub const WITHDRAW_LIQUIDITY: u32 = 0x595f_07bc;
    pub const REQUEST_CREATE_ORDER: u32 = 0xe0db_7753;
    pub const PROVIDE_LIQUIDITY: u32 = 0xc89a_3ee4;
}

/// Market (AMM) opcodes
pub mod amm {
    pub const ADD_MARGIN: u32 = 0xb9e8_10e2;
    pub const REMOVE_MARGIN: u32 = 0xecde_d426;
}

/// Position-manager opcodes
pub mod position_manager {
    pub const CREATE_ORDER: u32 = 0xa398_43f4;
    pub const CANCEL_ORDER: u32 = 0x6713_4629;
    pub const PROVIDE_POSITION: u32 = 0x1307_6670;
}

/// Standard fungible-token (jetton) opcodes
pub mod jetton {
    pub const TRANSFER: u32 = 0x0f8a_7ea5;
}

/// Oracle payload discriminants
pub mod oracle {
    pub const KIND_SIMPLE: u8 = 0;
    pub const KIND_WITH_SETTLEMENT: u8 = 1;
}

/// Secondary signed price feed constants
pub mod signed_feed {
    /// Envelope magic
    pub const MESSAGE_MAGIC: u32 = 2_593_727_018;
    /// Inner payload magic
    pub const PAYLOAD_MAGIC: u32 = 2_479_346_549;
    /// Properties per feed record (price, exponent)
    pub const PROPERTY_COUNT: u8 = 2;
    pub const PRICE_PROPERTY_ID: u8 = 0;
    pub const EXPONENT_PROPERTY_ID: u8 = 4;
}

/// Bag-of-cells serialization constants
pub mod boc {
    pub const MAGIC: u32 = 0xb5ee_9c72;
}
