//! # Storm SDK Configuration
//!
//! Runtime settings and the protocol config document for the Storm trading
//! SDK.
//!
//! ## Features
//!
//! - **SDK Settings**: endpoints, trader address, native/quote collateral
//!   names and default order lifetimes, layered from TOML and `STORM_*` env
//! - **Protocol Config**: assets, opened markets and liquidity sources as
//!   published by the Storm API, with name-based lookups
//!
//! ## Usage
//!
//! ```rust,no_run
//! use storm_config::{ProtocolConfig, SdkSettings};
//! use std::path::Path;
//!
//! let settings = SdkSettings::load(None)?;
//! let protocol = ProtocolConfig::from_files(
//!     Path::new("config/protocol.json"),
//!     Path::new("config/assets.json"),
//! )?;
//! let vault = protocol.liquidity_source(&settings.native_asset);
//! # let _ = vault;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod protocol;
pub mod settings;

pub use protocol::{
    market_key, Asset, AssetConfigInfo, LiquiditySource, Market, ProtocolConfig, StormConfig,
};
pub use settings::{
    SdkSettings, DEFAULT_SETTINGS_PATH, ENV_PREFIX, LIMIT_ORDER_EXPIRATION_SECS,
    MARKET_ORDER_EXPIRATION_SECS,
};
