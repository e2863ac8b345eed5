//! # Storm Types
//!
//! Plain data types shared by the Storm codec and SDK crates.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: every amount, price and leverage is a 9-decimal
//!   scaled integer; `Decimal` appears only at display boundaries
//! - **Sum Types for Wire Variants**: order kinds whose wire shape differs are
//!   separate structs joined by `OrderData`, never one struct with optionals
//! - **Normalised Absence**: optional position state is `Option`, whatever
//!   physical form the contract used to encode "nothing here"
//!
//! ## Quick Start
//!
//! ```rust
//! use storm_types::{Address, Direction, Nano};
//!
//! let vault: Address = "0:83dfd552e63729b472fcbcc8c45ebcc6691702558b68ec7527e1ba403a0f31a8"
//!     .parse()
//!     .unwrap();
//! let margin = Nano::from_decimal_str("12.5").unwrap();
//! assert_eq!(margin.raw_value(), 12_500_000_000);
//! assert_eq!(Direction::Short as u8, 1);
//! # let _ = vault;
//! ```
//!
//! ## Architecture Role
//!
//! ```text
//! storm-types → storm-codec → storm-sdk
//!     ↑             ↓             ↓
//! Pure Data    Cell Encoding   Intents → TxParams
//! Structures   Wire Rules      Collaborators
//! ```

pub mod common;
pub mod order;
pub mod position;

pub use common::address::{Address, FriendlyAddress};
pub use common::errors::{AddressError, FixedPointError};
pub use common::fixed_point::{ratio_from_nano, Nano, NANO_DECIMALS};
pub use order::{Direction, LimitOrder, MarketOrder, OrderData, OrderType, SltpKind, SltpOrder};
pub use position::{
    occupied_slots, PositionData, PositionManagerData, PositionRecord, PositionReferralData,
    ORDER_SLOTS,
};
