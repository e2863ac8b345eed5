//! Cell builder: bit-level writer with budget enforcement
//!
//! All `store_*` methods check the 1023-bit / 4-ref budget before touching
//! the buffer and return `&mut Self`, so bodies read as one chain:
//!
//! ```rust
//! use storm_codec::cell::CellBuilder;
//!
//! let mut body = CellBuilder::new();
//! body.store_uint(0xa398_43f4, 32)?
//!     .store_uint(0, 4)?
//!     .store_address_or_null(None)?;
//! let cell = body.end_cell();
//! assert_eq!(cell.bit_len(), 38);
//! # Ok::<(), storm_codec::CodecError>(())
//! ```

use super::{Cell, CellSlice};
use crate::error::{CodecError, CodecResult};
use crate::protocol_constants::{
    ADDRESS_BITS, ADDR_NONE_TAG, ADDR_STD_TAG, MAX_CELL_BITS, MAX_CELL_REFS, MAX_COINS_BYTES,
};
use storm_types::Address;

/// Widest integer the uint/int writers accept
const MAX_INT_WIDTH: usize = 256;

/// Mutable accumulator of bits and child references
#[derive(Debug, Clone, Default)]
pub struct CellBuilder {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<Cell>,
}

impl CellBuilder {
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(MAX_CELL_BITS.div_ceil(8)),
            bit_len: 0,
            refs: Vec::with_capacity(MAX_CELL_REFS),
        }
    }

    /// Data bits written so far
    pub fn bits_used(&self) -> usize {
        self.bit_len
    }

    /// References attached so far
    pub fn refs_used(&self) -> usize {
        self.refs.len()
    }

    /// Data bits still available
    pub fn bits_left(&self) -> usize {
        MAX_CELL_BITS - self.bit_len
    }

    /// Reference slots still available
    pub fn refs_left(&self) -> usize {
        MAX_CELL_REFS - self.refs.len()
    }

    fn ensure_bits(&self, n: usize) -> CodecResult<()> {
        if self.bit_len + n > MAX_CELL_BITS {
            return Err(CodecError::CellOverflow {
                bits: self.bit_len + n,
                limit: MAX_CELL_BITS,
            });
        }
        Ok(())
    }

    fn ensure_refs(&self, n: usize) -> CodecResult<()> {
        if self.refs.len() + n > MAX_CELL_REFS {
            return Err(CodecError::TooManyRefs {
                limit: MAX_CELL_REFS,
            });
        }
        Ok(())
    }

    /// Append one bit; budget must already be checked
    #[inline]
    fn push_bit(&mut self, bit: bool) {
        let byte = self.bit_len / 8;
        if byte == self.data.len() {
            self.data.push(0);
        }
        if bit {
            self.data[byte] |= 0x80 >> (self.bit_len % 8);
        }
        self.bit_len += 1;
    }

    pub fn store_bit(&mut self, bit: bool) -> CodecResult<&mut Self> {
        self.ensure_bits(1)?;
        self.push_bit(bit);
        Ok(self)
    }

    /// Big-endian unsigned integer of exactly `width` bits
    ///
    /// Widths above 128 zero-extend the value. Fails with `ValueOutOfRange`
    /// when `value >= 2^width` or `width > 256`.
    pub fn store_uint(&mut self, value: u128, width: usize) -> CodecResult<&mut Self> {
        if width > MAX_INT_WIDTH || (width < 128 && value >> width != 0) {
            return Err(CodecError::value_out_of_range(
                width,
                format!("unsigned value {value}"),
            ));
        }
        self.ensure_bits(width)?;
        for i in (0..width).rev() {
            self.push_bit(i < 128 && (value >> i) & 1 == 1);
        }
        Ok(self)
    }

    /// Two's-complement signed integer of exactly `width` bits
    ///
    /// Widths above 128 sign-extend the value. Fails with `ValueOutOfRange`
    /// when the value lies outside `[-2^(width-1), 2^(width-1))`.
    pub fn store_int(&mut self, value: i128, width: usize) -> CodecResult<&mut Self> {
        let fits = match width {
            0 => value == 0,
            w if w < 128 => {
                let bound = 1i128 << (w - 1);
                (-bound..bound).contains(&value)
            }
            w => w <= MAX_INT_WIDTH,
        };
        if !fits {
            return Err(CodecError::value_out_of_range(
                width,
                format!("signed value {value}"),
            ));
        }
        self.ensure_bits(width)?;
        for i in (0..width).rev() {
            let bit = if i >= 128 {
                value < 0
            } else {
                (value >> i) & 1 == 1
            };
            self.push_bit(bit);
        }
        Ok(self)
    }

    /// Raw 256-bit big-endian value (signature halves, account ids)
    pub fn store_u256(&mut self, value: &[u8; 32]) -> CodecResult<&mut Self> {
        self.store_bytes(value)
    }

    pub fn store_bytes(&mut self, bytes: &[u8]) -> CodecResult<&mut Self> {
        self.store_bits_from(bytes, bytes.len() * 8)
    }

    /// Append the first `bit_len` bits of a big-endian buffer
    pub fn store_bits_from(&mut self, bytes: &[u8], bit_len: usize) -> CodecResult<&mut Self> {
        if bit_len > bytes.len() * 8 {
            return Err(CodecError::bits_underrun(bit_len, bytes.len() * 8));
        }
        self.ensure_bits(bit_len)?;
        for i in 0..bit_len {
            self.push_bit((bytes[i / 8] >> (7 - i % 8)) & 1 == 1);
        }
        Ok(self)
    }

    /// Variable-length amount: 4-bit byte count, then the minimal big-endian
    /// bytes. Zero is the bare nibble `0000`.
    pub fn store_coins(&mut self, value: u128) -> CodecResult<&mut Self> {
        let len = (128 - value.leading_zeros() as usize).div_ceil(8);
        if len > MAX_COINS_BYTES {
            return Err(CodecError::value_out_of_range(
                MAX_COINS_BYTES * 8,
                format!("coins amount {value}"),
            ));
        }
        self.ensure_bits(4 + len * 8)?;
        self.store_uint(len as u128, 4)?;
        self.store_uint(value, len * 8)
    }

    /// Present standard address: tag `10`, no anycast, workchain, account id
    pub fn store_address(&mut self, address: &Address) -> CodecResult<&mut Self> {
        self.ensure_bits(ADDRESS_BITS)?;
        self.store_uint(ADDR_STD_TAG, 2)?
            .store_bit(false)?
            .store_int(i128::from(address.workchain), 8)?
            .store_u256(&address.hash)
    }

    /// Nullable address: tag `00` alone when absent
    pub fn store_address_or_null(&mut self, address: Option<&Address>) -> CodecResult<&mut Self> {
        match address {
            Some(address) => self.store_address(address),
            None => self.store_uint(ADDR_NONE_TAG, 2),
        }
    }

    pub fn store_ref(&mut self, cell: Cell) -> CodecResult<&mut Self> {
        self.ensure_refs(1)?;
        self.refs.push(cell);
        Ok(self)
    }

    /// Presence bit, then the reference only when present
    pub fn store_maybe_ref(&mut self, cell: Option<Cell>) -> CodecResult<&mut Self> {
        match cell {
            Some(cell) => {
                self.ensure_refs(1)?;
                self.store_bit(true)?.store_ref(cell)
            }
            None => self.store_bit(false),
        }
    }

    /// Presence bit, then the value only when present
    pub fn store_maybe_uint(&mut self, value: Option<u128>, width: usize) -> CodecResult<&mut Self> {
        match value {
            Some(value) => {
                self.ensure_bits(1 + width)?;
                self.store_bit(true)?.store_uint(value, width)
            }
            None => self.store_bit(false),
        }
    }

    /// Append everything a slice has not consumed yet
    pub fn store_slice(&mut self, slice: &CellSlice<'_>) -> CodecResult<&mut Self> {
        self.ensure_bits(slice.remaining_bits())?;
        self.ensure_refs(slice.remaining_refs())?;
        for i in 0..slice.remaining_bits() {
            self.push_bit(slice.bit_from_cursor(i));
        }
        self.refs.extend(slice.remaining_ref_cells().iter().cloned());
        Ok(self)
    }

    /// Append another builder's bits and refs
    pub fn store_builder(&mut self, other: &CellBuilder) -> CodecResult<&mut Self> {
        self.ensure_bits(other.bit_len)?;
        self.ensure_refs(other.refs.len())?;
        for i in 0..other.bit_len {
            self.push_bit((other.data[i / 8] >> (7 - i % 8)) & 1 == 1);
        }
        self.refs.extend(other.refs.iter().cloned());
        Ok(self)
    }

    /// Freeze into an immutable cell; the builder is consumed
    pub fn end_cell(self) -> Cell {
        Cell::from_parts(self.data, self.bit_len, self.refs)
    }
}
