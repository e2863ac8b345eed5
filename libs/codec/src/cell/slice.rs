//! Cell slice: read cursor over one cell
//!
//! Loads consume bits/refs, preloads peek. Every load checks what remains
//! first and fails with `BufferUnderrun` rather than reading past the end.

use super::Cell;
use crate::error::{CodecError, CodecResult};
use crate::protocol_constants::{ADDRESS_BITS, ADDR_NONE_TAG, ADDR_STD_TAG};
use storm_types::Address;

/// Widest integer the uint/int readers return
const MAX_LOAD_WIDTH: usize = 128;

/// Independent read cursor over a borrowed cell
#[derive(Debug, Clone)]
pub struct CellSlice<'a> {
    cell: &'a Cell,
    bit_pos: usize,
    ref_pos: usize,
}

impl<'a> CellSlice<'a> {
    pub fn new(cell: &'a Cell) -> Self {
        Self {
            cell,
            bit_pos: 0,
            ref_pos: 0,
        }
    }

    /// The cell being read
    pub fn cell(&self) -> &'a Cell {
        self.cell
    }

    pub fn remaining_bits(&self) -> usize {
        self.cell.bit_len() - self.bit_pos
    }

    pub fn remaining_refs(&self) -> usize {
        self.cell.refs().len() - self.ref_pos
    }

    /// No bits and no refs left
    pub fn is_exhausted(&self) -> bool {
        self.remaining_bits() == 0 && self.remaining_refs() == 0
    }

    fn ensure_bits(&self, n: usize) -> CodecResult<()> {
        if n > self.remaining_bits() {
            return Err(CodecError::bits_underrun(n, self.remaining_bits()));
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn bit_from_cursor(&self, offset: usize) -> bool {
        self.cell.bit(self.bit_pos + offset)
    }

    pub(crate) fn remaining_ref_cells(&self) -> &'a [Cell] {
        &self.cell.refs()[self.ref_pos..]
    }

    /// Advance past `n` bits
    pub fn skip(&mut self, n: usize) -> CodecResult<&mut Self> {
        self.ensure_bits(n)?;
        self.bit_pos += n;
        Ok(self)
    }

    pub fn load_bit(&mut self) -> CodecResult<bool> {
        let bit = self.preload_bit()?;
        self.bit_pos += 1;
        Ok(bit)
    }

    pub fn preload_bit(&self) -> CodecResult<bool> {
        self.ensure_bits(1)?;
        Ok(self.bit_from_cursor(0))
    }

    /// Peek a big-endian unsigned integer without consuming it
    pub fn preload_uint(&self, width: usize) -> CodecResult<u128> {
        if width > MAX_LOAD_WIDTH {
            return Err(CodecError::value_out_of_range(
                width,
                "integer loads return at most 128 bits",
            ));
        }
        self.ensure_bits(width)?;
        Ok((0..width).fold(0u128, |acc, i| {
            (acc << 1) | u128::from(self.bit_from_cursor(i))
        }))
    }

    pub fn load_uint(&mut self, width: usize) -> CodecResult<u128> {
        let value = self.preload_uint(width)?;
        self.bit_pos += width;
        Ok(value)
    }

    /// Two's-complement signed integer of `width` bits
    pub fn load_int(&mut self, width: usize) -> CodecResult<i128> {
        let raw = self.load_uint(width)?;
        Ok(match width {
            0 => 0,
            MAX_LOAD_WIDTH => raw as i128,
            w if raw >> (w - 1) & 1 == 1 => raw as i128 - (1i128 << w),
            _ => raw as i128,
        })
    }

    /// Raw 256-bit big-endian value
    pub fn load_u256(&mut self) -> CodecResult<[u8; 32]> {
        let mut out = [0u8; 32];
        self.ensure_bits(256)?;
        for byte in out.iter_mut() {
            *byte = self.load_uint(8)? as u8;
        }
        Ok(out)
    }

    pub fn load_bytes(&mut self, n: usize) -> CodecResult<Vec<u8>> {
        self.ensure_bits(n * 8)?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.load_uint(8)? as u8);
        }
        Ok(out)
    }

    /// Variable-length amount: 4-bit byte count then that many bytes
    pub fn load_coins(&mut self) -> CodecResult<u128> {
        let len = self.preload_uint(4)? as usize;
        self.ensure_bits(4 + len * 8)?;
        self.bit_pos += 4;
        self.load_uint(len * 8)
    }

    /// Non-nullable standard address
    pub fn load_address(&mut self) -> CodecResult<Address> {
        self.ensure_bits(ADDRESS_BITS)?;
        let tag = self.preload_uint(2)?;
        if tag != ADDR_STD_TAG {
            return Err(CodecError::malformed_tag(tag as u64, 2, "standard address"));
        }
        self.bit_pos += 2;
        if self.load_bit()? {
            return Err(CodecError::malformed_tag(1, 1, "address anycast"));
        }
        let workchain = self.load_int(8)? as i8;
        let hash = self.load_u256()?;
        Ok(Address::new(workchain, hash))
    }

    /// Nullable address: `00` is absent (2 bits consumed), `10` is present
    /// (267 bits consumed), anything else is a protocol violation
    pub fn load_address_or_null(&mut self) -> CodecResult<Option<Address>> {
        match self.preload_uint(2)? {
            ADDR_NONE_TAG => {
                self.bit_pos += 2;
                Ok(None)
            }
            ADDR_STD_TAG => self.load_address().map(Some),
            tag => Err(CodecError::malformed_tag(
                tag as u64,
                2,
                "nullable address",
            )),
        }
    }

    pub fn load_ref(&mut self) -> CodecResult<&'a Cell> {
        let cell = self
            .cell
            .reference(self.ref_pos)
            .ok_or_else(|| CodecError::refs_underrun(1, 0))?;
        self.ref_pos += 1;
        Ok(cell)
    }

    /// Presence bit, then a reference only when present
    pub fn load_maybe_ref(&mut self) -> CodecResult<Option<&'a Cell>> {
        if self.load_bit()? {
            self.load_ref().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Presence bit, then a `width`-bit value only when present
    pub fn load_maybe_uint(&mut self, width: usize) -> CodecResult<Option<u128>> {
        if self.load_bit()? {
            self.load_uint(width).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellBuilder;

    #[test]
    fn test_load_uint_and_preload() {
        let mut b = CellBuilder::new();
        b.store_uint(0xdead, 16).unwrap().store_uint(3, 2).unwrap();
        let cell = b.end_cell();
        let mut s = cell.parse();
        assert_eq!(s.preload_uint(16).unwrap(), 0xdead);
        assert_eq!(s.remaining_bits(), 18);
        assert_eq!(s.load_uint(16).unwrap(), 0xdead);
        assert_eq!(s.load_uint(2).unwrap(), 3);
        assert!(s.is_exhausted());
    }

    #[test]
    fn test_load_int_sign() {
        let mut b = CellBuilder::new();
        b.store_int(-5, 16).unwrap();
        b.store_int(i128::MIN, 128).unwrap();
        b.store_int(7, 4).unwrap();
        let cell = b.end_cell();
        let mut s = cell.parse();
        assert_eq!(s.load_int(16).unwrap(), -5);
        assert_eq!(s.load_int(128).unwrap(), i128::MIN);
        assert_eq!(s.load_int(4).unwrap(), 7);
    }

    #[test]
    fn test_underrun() {
        let mut b = CellBuilder::new();
        b.store_uint(1, 7).unwrap();
        let cell = b.end_cell();
        let mut s = cell.parse();
        assert_eq!(s.load_uint(8).unwrap_err(), CodecError::bits_underrun(8, 7));
        assert_eq!(s.load_ref().unwrap_err(), CodecError::refs_underrun(1, 0));
        assert_eq!(s.skip(8).unwrap_err(), CodecError::bits_underrun(8, 7));
        // Failed loads leave the cursor where it was
        assert_eq!(s.remaining_bits(), 7);
    }

    #[test]
    fn test_coins_zero_consumes_four_bits() {
        let mut b = CellBuilder::new();
        b.store_coins(0).unwrap().store_bit(true).unwrap();
        let cell = b.end_cell();
        let mut s = cell.parse();
        assert_eq!(s.load_coins().unwrap(), 0);
        assert_eq!(s.remaining_bits(), 1);
    }

    #[test]
    fn test_coins_truncated_body() {
        let mut b = CellBuilder::new();
        b.store_uint(2, 4).unwrap().store_uint(0xff, 8).unwrap();
        let cell = b.end_cell();
        assert_eq!(
            cell.parse().load_coins().unwrap_err(),
            CodecError::bits_underrun(20, 12)
        );
    }

    #[test]
    fn test_address_or_null() {
        let addr = Address::new(0, [7; 32]);
        let mut b = CellBuilder::new();
        b.store_address_or_null(None).unwrap();
        b.store_address_or_null(Some(&addr)).unwrap();
        let cell = b.end_cell();

        let mut s = cell.parse();
        assert_eq!(s.load_address_or_null().unwrap(), None);
        assert_eq!(s.remaining_bits(), ADDRESS_BITS);
        assert_eq!(s.load_address_or_null().unwrap(), Some(addr));
        assert!(s.is_exhausted());
    }

    #[test]
    fn test_address_bad_tags() {
        for tag in [0b01u128, 0b11] {
            let mut b = CellBuilder::new();
            b.store_uint(tag, 2).unwrap().store_uint(0, 265).unwrap();
            let cell = b.end_cell();
            let err = cell.parse().load_address_or_null().unwrap_err();
            assert!(err.is_malformed_tag(), "{err}");
        }

        let mut b = CellBuilder::new();
        b.store_uint(0b101, 3).unwrap().store_uint(0, 264).unwrap();
        let cell = b.end_cell();
        assert!(cell.parse().load_address().unwrap_err().is_malformed_tag());
    }

    #[test]
    fn test_slices_are_independent() {
        let mut b = CellBuilder::new();
        b.store_uint(0xab, 8).unwrap().store_ref(Cell::empty()).unwrap();
        let cell = b.end_cell();

        let mut first = cell.parse();
        let second = cell.parse();
        first.load_uint(4).unwrap();
        first.load_ref().unwrap();
        assert_eq!(second.remaining_bits(), 8);
        assert_eq!(second.remaining_refs(), 1);
        assert_eq!(second.preload_uint(8).unwrap(), 0xab);
    }

    #[test]
    fn test_maybe_ref_and_uint() {
        let mut b = CellBuilder::new();
        b.store_maybe_ref(None).unwrap();
        b.store_maybe_ref(Some(Cell::empty())).unwrap();
        b.store_maybe_uint(Some(42), 64).unwrap();
        b.store_maybe_uint(None, 64).unwrap();
        let cell = b.end_cell();

        let mut s = cell.parse();
        assert!(s.load_maybe_ref().unwrap().is_none());
        assert!(s.load_maybe_ref().unwrap().unwrap().is_empty());
        assert_eq!(s.load_maybe_uint(64).unwrap(), Some(42));
        assert_eq!(s.load_maybe_uint(64).unwrap(), None);
        assert!(s.is_exhausted());
    }
}
