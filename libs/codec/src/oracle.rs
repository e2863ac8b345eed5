//! # Oracle Payload Codec
//!
//! ## Purpose
//!
//! Price attestations travel with margin changes so the market can check
//! the trader's collateral against a signed price. A payload carries the
//! index price and, when the collateral differs from the base asset, the
//! settlement price as well.
//!
//! ## Wire Shape
//!
//! ```text
//! kind:8 ^{price, signatures [, settlement_price, settlement_signatures]} feed:maybe ^SignedFeed
//!
//! SignedFeed  magic:32 r:256 s:256 v:8 payload_len:16
//!             payload_magic:32 timestamp:64 channel:8 feed_count:8
//!             feed_id:32 FeedRecord [settlement_feed_id:32 FeedRecord]
//! FeedRecord  props:8(=2) price_id:8(=0) price:64 exponent_id:8(=4) exponent:i16
//! ```
//!
//! A double-feed message is a single-feed message with two more fields on the
//! end, so the wire bytes alone cannot say which one was sent. Decoding takes
//! the layout from the caller as a [`FeedLayout`].

use crate::cell::{Cell, CellBuilder, CellSlice};
use crate::error::{CodecError, CodecResult};
use crate::protocol_constants::signed_feed;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use tracing::debug;

/// Oracle payload discriminant byte
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
pub enum OracleKind {
    Simple = 0,
    WithSettlement = 1,
}

impl OracleKind {
    /// Price/signature references carried by this kind
    pub fn ref_count(self) -> usize {
        match self {
            OracleKind::Simple => 2,
            OracleKind::WithSettlement => 4,
        }
    }
}

/// Signed price attestation attached to margin-changing requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OraclePayload {
    Simple {
        price_ref: Cell,
        signatures_ref: Cell,
        feed: Option<SignedFeedMessage>,
    },
    WithSettlement {
        price_ref: Cell,
        signatures_ref: Cell,
        settlement_price_ref: Cell,
        settlement_signatures_ref: Cell,
        feed: Option<SignedFeedMessage>,
    },
}

impl OraclePayload {
    pub fn kind(&self) -> OracleKind {
        match self {
            OraclePayload::Simple { .. } => OracleKind::Simple,
            OraclePayload::WithSettlement { .. } => OracleKind::WithSettlement,
        }
    }

    pub fn feed(&self) -> Option<&SignedFeedMessage> {
        match self {
            OraclePayload::Simple { feed, .. } | OraclePayload::WithSettlement { feed, .. } => {
                feed.as_ref()
            }
        }
    }

    fn price_refs(&self) -> Vec<&Cell> {
        match self {
            OraclePayload::Simple {
                price_ref,
                signatures_ref,
                ..
            } => vec![price_ref, signatures_ref],
            OraclePayload::WithSettlement {
                price_ref,
                signatures_ref,
                settlement_price_ref,
                settlement_signatures_ref,
                ..
            } => vec![
                price_ref,
                signatures_ref,
                settlement_price_ref,
                settlement_signatures_ref,
            ],
        }
    }
}

/// One feed's price and decimal exponent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedRecord {
    pub price: u64,
    pub exponent: i16,
}

/// Feed list of a signed feed message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPayload {
    Single {
        feed_id: u32,
        feed: FeedRecord,
    },
    Double {
        feed_id: u32,
        feed: FeedRecord,
        settlement_feed_id: u32,
        settlement_feed: FeedRecord,
    },
}

impl FeedPayload {
    pub fn layout(&self) -> FeedLayout {
        match self {
            FeedPayload::Single { .. } => FeedLayout::Single,
            FeedPayload::Double { .. } => FeedLayout::Double,
        }
    }
}

/// How many feeds the caller expects in a signed feed message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedLayout {
    Single,
    Double,
}

impl FeedLayout {
    fn feed_count(self) -> u8 {
        match self {
            FeedLayout::Single => 1,
            FeedLayout::Double => 2,
        }
    }
}

/// Secondary signed price feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedFeedMessage {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// Recovery id
    pub v: u8,
    /// Length in bytes of the signed payload, as issued by the feed
    pub payload_len: u16,
    /// Microseconds since the epoch
    pub timestamp: u64,
    pub channel: u8,
    pub payload: FeedPayload,
}

/// Fields of an oracle payload the codec reads back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OraclePayloadParts {
    pub kind: OracleKind,
    /// Price and signature references in wire order
    pub refs: Vec<Cell>,
    pub feed_cell: Option<Cell>,
}

impl OraclePayloadParts {
    /// Decode the attached feed cell with the layout the caller expects
    pub fn decode_feed(&self, layout: FeedLayout) -> CodecResult<Option<SignedFeedMessage>> {
        self.feed_cell
            .as_ref()
            .map(|cell| unpack_signed_feed(&mut cell.parse(), layout))
            .transpose()
    }
}

pub fn pack_oracle_payload(payload: &OraclePayload) -> CodecResult<Cell> {
    let mut refs = CellBuilder::new();
    for cell in payload.price_refs() {
        refs.store_ref(cell.clone())?;
    }

    let feed = payload.feed().map(pack_signed_feed).transpose()?;

    let mut b = CellBuilder::new();
    b.store_uint(u128::from(u8::from(payload.kind())), 8)?
        .store_ref(refs.end_cell())?
        .store_maybe_ref(feed)?;
    Ok(b.end_cell())
}

pub fn unpack_oracle_payload(slice: &mut CellSlice<'_>) -> CodecResult<OraclePayloadParts> {
    let tag = slice.load_uint(8)? as u8;
    let kind = OracleKind::try_from(tag)
        .map_err(|_| CodecError::malformed_tag(u64::from(tag), 8, "oracle payload kind"))?;

    let mut nested = slice.load_ref()?.parse();
    let mut refs = Vec::with_capacity(kind.ref_count());
    for _ in 0..kind.ref_count() {
        refs.push(nested.load_ref()?.clone());
    }

    let feed_cell = slice.load_maybe_ref()?.cloned();
    Ok(OraclePayloadParts {
        kind,
        refs,
        feed_cell,
    })
}

fn store_feed_record(b: &mut CellBuilder, record: &FeedRecord) -> CodecResult<()> {
    b.store_uint(u128::from(signed_feed::PROPERTY_COUNT), 8)?
        .store_uint(u128::from(signed_feed::PRICE_PROPERTY_ID), 8)?
        .store_uint(u128::from(record.price), 64)?
        .store_uint(u128::from(signed_feed::EXPONENT_PROPERTY_ID), 8)?
        .store_int(i128::from(record.exponent), 16)?;
    Ok(())
}

fn load_feed_record(slice: &mut CellSlice<'_>) -> CodecResult<FeedRecord> {
    expect_byte(slice, signed_feed::PROPERTY_COUNT, "feed property count")?;
    expect_byte(slice, signed_feed::PRICE_PROPERTY_ID, "price property id")?;
    let price = slice.load_uint(64)? as u64;
    expect_byte(slice, signed_feed::EXPONENT_PROPERTY_ID, "exponent property id")?;
    let exponent = slice.load_int(16)? as i16;
    Ok(FeedRecord { price, exponent })
}

fn expect_byte(slice: &mut CellSlice<'_>, expected: u8, context: &str) -> CodecResult<()> {
    let got = slice.load_uint(8)? as u8;
    if got != expected {
        return Err(CodecError::malformed_tag(u64::from(got), 8, context));
    }
    Ok(())
}

pub fn pack_signed_feed(message: &SignedFeedMessage) -> CodecResult<Cell> {
    let layout = message.payload.layout();
    let mut b = CellBuilder::new();
    b.store_uint(u128::from(signed_feed::MESSAGE_MAGIC), 32)?
        .store_u256(&message.r)?
        .store_u256(&message.s)?
        .store_uint(u128::from(message.v), 8)?
        .store_uint(u128::from(message.payload_len), 16)?
        .store_uint(u128::from(signed_feed::PAYLOAD_MAGIC), 32)?
        .store_uint(u128::from(message.timestamp), 64)?
        .store_uint(u128::from(message.channel), 8)?
        .store_uint(u128::from(layout.feed_count()), 8)?;

    match &message.payload {
        FeedPayload::Single { feed_id, feed } => {
            b.store_uint(u128::from(*feed_id), 32)?;
            store_feed_record(&mut b, feed)?;
        }
        FeedPayload::Double {
            feed_id,
            feed,
            settlement_feed_id,
            settlement_feed,
        } => {
            b.store_uint(u128::from(*feed_id), 32)?;
            store_feed_record(&mut b, feed)?;
            b.store_uint(u128::from(*settlement_feed_id), 32)?;
            store_feed_record(&mut b, settlement_feed)?;
        }
    }
    Ok(b.end_cell())
}

/// Decode a signed feed message laid out as `layout`
pub fn unpack_signed_feed(
    slice: &mut CellSlice<'_>,
    layout: FeedLayout,
) -> CodecResult<SignedFeedMessage> {
    let magic = slice.load_uint(32)? as u32;
    if magic != signed_feed::MESSAGE_MAGIC {
        return Err(CodecError::malformed_tag(u64::from(magic), 32, "signed feed magic"));
    }
    let r = slice.load_u256()?;
    let s = slice.load_u256()?;
    let v = slice.load_uint(8)? as u8;
    let payload_len = slice.load_uint(16)? as u16;

    let payload_magic = slice.load_uint(32)? as u32;
    if payload_magic != signed_feed::PAYLOAD_MAGIC {
        return Err(CodecError::malformed_tag(
            u64::from(payload_magic),
            32,
            "signed feed payload magic",
        ));
    }
    let timestamp = slice.load_uint(64)? as u64;
    let channel = slice.load_uint(8)? as u8;
    let feed_count = slice.load_uint(8)? as u8;
    if feed_count != layout.feed_count() {
        debug!(
            feed_count,
            expected = layout.feed_count(),
            "signed feed count differs from requested layout"
        );
    }

    let feed_id = slice.load_uint(32)? as u32;
    let feed = load_feed_record(slice)?;
    let payload = match layout {
        FeedLayout::Single => FeedPayload::Single { feed_id, feed },
        FeedLayout::Double => FeedPayload::Double {
            feed_id,
            feed,
            settlement_feed_id: slice.load_uint(32)? as u32,
            settlement_feed: load_feed_record(slice)?,
        },
    };

    Ok(SignedFeedMessage {
        r,
        s,
        v,
        payload_len,
        timestamp,
        channel,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tag: u128) -> Cell {
        let mut b = CellBuilder::new();
        b.store_uint(tag, 16).unwrap();
        b.end_cell()
    }

    fn feed(payload: FeedPayload) -> SignedFeedMessage {
        SignedFeedMessage {
            r: [0xaa; 32],
            s: [0x55; 32],
            v: 27,
            payload_len: 63,
            timestamp: 1_700_000_000_000_000,
            channel: 1,
            payload,
        }
    }

    const BTC: FeedRecord = FeedRecord {
        price: 6_512_345_000_000,
        exponent: -8,
    };

    #[test]
    fn test_simple_payload_shape() {
        let payload = OraclePayload::Simple {
            price_ref: leaf(1),
            signatures_ref: leaf(2),
            feed: None,
        };
        let cell = pack_oracle_payload(&payload).unwrap();
        assert_eq!(cell.bit_len(), 9);
        assert_eq!(cell.refs().len(), 1);

        let parts = unpack_oracle_payload(&mut cell.parse()).unwrap();
        assert_eq!(parts.kind, OracleKind::Simple);
        assert_eq!(parts.refs, vec![leaf(1), leaf(2)]);
        assert!(parts.feed_cell.is_none());
    }

    #[test]
    fn test_kind_bytes() {
        use crate::protocol_constants::oracle;
        assert_eq!(u8::from(OracleKind::Simple), oracle::KIND_SIMPLE);
        assert_eq!(u8::from(OracleKind::WithSettlement), oracle::KIND_WITH_SETTLEMENT);
    }

    #[test]
    fn test_unknown_kind() {
        let mut b = CellBuilder::new();
        b.store_uint(7, 8).unwrap().store_ref(Cell::empty()).unwrap();
        let cell = b.end_cell();
        let err = unpack_oracle_payload(&mut cell.parse()).unwrap_err();
        assert!(err.is_malformed_tag());
    }

    #[test]
    fn test_double_feed_is_single_feed_plus_suffix() {
        let single = pack_signed_feed(&feed(FeedPayload::Single {
            feed_id: 1,
            feed: BTC,
        }))
        .unwrap();
        let double = pack_signed_feed(&feed(FeedPayload::Double {
            feed_id: 1,
            feed: BTC,
            settlement_feed_id: 8,
            settlement_feed: FeedRecord {
                price: 100_000_000,
                exponent: -8,
            },
        }))
        .unwrap();

        assert_eq!(single.bit_len(), 816);
        assert_eq!(double.bit_len(), 816 + 136);

        // Only the feed count byte differs inside the shared prefix
        let mut a = single.parse();
        let mut b = double.parse();
        a.skip(32 + 256 + 256 + 8 + 16 + 32 + 64 + 8).unwrap();
        b.skip(32 + 256 + 256 + 8 + 16 + 32 + 64 + 8).unwrap();
        assert_eq!(a.load_uint(8).unwrap(), 1);
        assert_eq!(b.load_uint(8).unwrap(), 2);
    }

    #[test]
    fn test_signed_feed_decodes_with_caller_layout() {
        let message = feed(FeedPayload::Single {
            feed_id: 3,
            feed: BTC,
        });
        let cell = pack_signed_feed(&message).unwrap();
        let mut slice = cell.parse();
        assert_eq!(
            unpack_signed_feed(&mut slice, FeedLayout::Single).unwrap(),
            message
        );
        assert!(slice.is_exhausted());

        // Asking for two feeds from a single-feed cell runs out of bits
        assert!(matches!(
            unpack_signed_feed(&mut cell.parse(), FeedLayout::Double),
            Err(CodecError::BufferUnderrun { .. })
        ));
    }

    #[test]
    fn test_bad_magic() {
        let mut b = CellBuilder::new();
        b.store_uint(0xdeadbeef, 32).unwrap();
        let cell = b.end_cell();
        assert!(unpack_signed_feed(&mut cell.parse(), FeedLayout::Single)
            .unwrap_err()
            .is_malformed_tag());
    }
}
