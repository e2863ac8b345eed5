//! # Storm Protocol Codec
//!
//! ## Purpose
//!
//! The "rules" layer between plain data (`storm_types`) and whatever sends
//! messages to the chain. It reproduces, bit for bit, the binary formats the
//! Storm perpetuals contracts accept and emit:
//! - Cell primitives: builder, slice and the frozen cell tree
//! - Order, oracle and margin/liquidity message bodies
//! - Collateral envelopes and the fixed fee schedule
//! - Position-manager state parsing
//! - Bag-of-cells transport encoding
//!
//! ## Architecture Role
//!
//! ```text
//! storm_types → [storm_codec] → storm_sdk
//!      ↑              ↓              ↓
//!  Plain data    Cells, bodies   Collaborators,
//!  Orders        TxParams        address memo
//!  Positions     State parsing   intent → TxParams
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Network access of any kind (config, oracle and indexer clients live
//!   behind traits in `storm_sdk`)
//! - Contract-address derivation or caching
//! - Key management, signing or broadcasting
//!
//! ## Concurrency
//!
//! Every function is synchronous and pure. Builders are owned by the call
//! that fills them; frozen cells are immutable and can be shared across
//! threads; slices are independent cursors.
//!
//! ## Example
//!
//! ```rust
//! use storm_codec::order::{pack_sltp_order, SltpOrderRequest};
//! use storm_codec::protocol_constants::position_manager;
//! use storm_types::{Direction, SltpKind, SltpOrder};
//!
//! let body = pack_sltp_order(&SltpOrderRequest {
//!     gas_to: None,
//!     order: SltpOrder {
//!         kind: SltpKind::StopLoss,
//!         expiration: 0,
//!         direction: Direction::Long,
//!         amount: 1_000_000_000,
//!         trigger_price: 1_000_000,
//!     },
//! })?;
//!
//! let mut slice = body.parse();
//! assert_eq!(slice.load_uint(32)? as u32, position_manager::CREATE_ORDER);
//! assert_eq!(slice.load_uint(4)?, 0);
//! # Ok::<(), storm_codec::CodecError>(())
//! ```

pub mod boc;
pub mod cell;
pub mod dict;
pub mod error;
pub mod fees;
pub mod messages;
pub mod oracle;
pub mod order;
pub mod position;
pub mod protocol_constants;
pub mod transactions;

pub use boc::{deserialize_boc, from_base64, serialize_boc, to_base64};
pub use cell::{Cell, CellBuilder, CellSlice};
pub use dict::{build_dict, parse_dict};
pub use error::{CodecError, CodecResult};
pub use fees::Fee;
pub use messages::{
    pack_add_margin, pack_jetton_transfer, pack_native_payload, pack_provide_liquidity,
    pack_remove_margin, pack_withdraw_liquidity, AddMarginRequest, JettonTransfer,
    RemoveMarginRequest, WithdrawLiquidityRequest,
};
pub use oracle::{
    pack_oracle_payload, pack_signed_feed, unpack_oracle_payload, unpack_signed_feed, FeedLayout,
    FeedPayload, FeedRecord, OracleKind, OraclePayload, OraclePayloadParts, SignedFeedMessage,
};
pub use order::{
    pack_cancel_order, pack_limit_order, pack_market_order, pack_order_data, pack_sltp_order,
    unpack_order_data, CancelOrderRequest, LimitOrderRequest, MarketOrderRequest,
    SltpOrderRequest,
};
pub use position::{
    pack_position_data, pack_position_manager_state, pack_position_record, pack_referral_data,
    parse_position_manager_state, unpack_position_data, unpack_position_record,
    unpack_referral_data,
};
pub use transactions::{
    create_add_margin_tx, create_cancel_order_tx, create_limit_order_tx, create_market_order_tx,
    create_provide_liquidity_tx, create_remove_margin_tx, create_sltp_order_tx,
    create_withdraw_liquidity_tx, Collateral, TxParams,
};
