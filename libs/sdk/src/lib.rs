//! # Storm Trading SDK
//!
//! ## Purpose
//!
//! Builds ready-to-sign transactions for the Storm perpetuals protocol from
//! high-level trading intents. The SDK owns the orchestration (config
//! lookups, address memoisation, oracle payload choice, default expirations)
//! and delegates every byte on the wire to `storm_codec`.
//!
//! ## Architecture Role
//!
//! ```text
//! storm_config ──► [storm_sdk] ◄── collaborators (oracle, resolver, state)
//!                      │
//!                      ▼
//!                 storm_codec ──► TxParams { to, body, value }
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - HTTP or lite-client implementations of the collaborator traits
//! - Key management, signing or broadcasting
//!
//! ## Example
//!
//! ```rust,no_run
//! use storm_sdk::{Collaborators, MarketOpenParams, StormSdk};
//! use storm_types::Direction;
//!
//! # async fn run(settings: storm_config::SdkSettings, collaborators: Collaborators)
//! #     -> Result<(), storm_sdk::SdkError> {
//! let sdk = StormSdk::new(settings, collaborators)?;
//! let tx = sdk
//!     .create_market_open_order(&MarketOpenParams {
//!         base_asset: "BTC".into(),
//!         collateral_asset: "TON".into(),
//!         direction: Direction::Long,
//!         amount: 10_000_000_000,
//!         leverage: 2_000_000_000,
//!         min_base_asset_amount: None,
//!         stop_trigger_price: None,
//!         take_trigger_price: None,
//!         expiration: None,
//!     })
//!     .await?;
//! println!("send {} nanos to {}", tx.value, tx.to);
//! # Ok(())
//! # }
//! ```

pub mod address_book;
pub mod error;
pub mod params;
pub mod providers;
pub mod sdk;
pub mod telemetry;

pub use address_book::{AddressBook, AddressKey};
pub use error::{SdkError, SdkResult};
pub use params::{
    CancelOrderParams, ClosePositionParams, LimitOrderParams, MarginParams, MarketOpenParams,
    ProvideLiquidityParams, SltpParams, StopLimitOrderParams, StopMarketOrderParams,
    WithdrawLiquidityParams,
};
pub use providers::{AddressResolver, ConfigProvider, OraclePrice, OracleProvider, StateProvider};
pub use sdk::{Collaborators, StormSdk};
pub use telemetry::init_tracing;

pub use storm_codec::TxParams;
