//! # Bag of Cells
//!
//! ## Purpose
//!
//! Byte serialization of a cell tree. Oracle price and signature cells and
//! raw contract state arrive as base64 bags of cells; this module turns them
//! into [`Cell`] trees and back.
//!
//! ## Layout
//!
//! ```text
//! magic:u32 = b5ee9c72
//! flags:u8  has_idx:1 has_crc32c:1 has_cache_bits:1 reserved:2 size_bytes:3
//! off_bytes:u8
//! cells roots absent:size_bytes  total_cells_size:off_bytes
//! root_index:size_bytes * roots
//! [index:off_bytes * cells]
//! cell*       d1:u8 d2:u8 data:ceil(bits/8) ref_index:size_bytes * refs
//! [crc32c:u32 little-endian]
//! ```
//!
//! `d1 = refs`, `d2 = floor(bits/8) + ceil(bits/8)`. A partial last byte
//! carries a completion tag: a `1` bit right after the data, zeros after it.
//! Cells are ordered so every reference points at a later cell.
//!
//! Serialization writes a single root with no index and no checksum.
//! Deserialization accepts the index and checksum flags and verifies the
//! checksum when present. Exotic cells are rejected.

use crate::cell::{Cell, CellBuilder};
use crate::error::{CodecError, CodecResult};
use crate::protocol_constants::{boc, MAX_CELL_REFS};
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use crc::{Crc, CRC_32_ISCSI};
use std::collections::{HashMap, HashSet};
use tracing::trace;

const FLAG_HAS_IDX: u8 = 0x80;
const FLAG_HAS_CRC32C: u8 = 0x40;
const SIZE_BYTES_MASK: u8 = 0x07;
const D1_EXOTIC: u8 = 0x08;
const D1_WITH_HASHES: u8 = 0x10;

/// Minimal big-endian width of `value`, at least one byte
fn byte_width(value: usize) -> usize {
    let bits = (usize::BITS - value.leading_zeros()) as usize;
    bits.div_ceil(8).max(1)
}

fn push_be(out: &mut Vec<u8>, value: usize, width: usize) {
    for i in (0..width).rev() {
        out.push((value >> (8 * i)) as u8);
    }
}

/// Parents before children, shared subtrees once
fn topological_order(root: &Cell) -> (Vec<Cell>, HashMap<*const (), usize>) {
    fn visit(cell: &Cell, seen: &mut HashSet<*const ()>, post: &mut Vec<Cell>) {
        if !seen.insert(cell.identity()) {
            return;
        }
        for child in cell.refs() {
            visit(child, seen, post);
        }
        post.push(cell.clone());
    }

    let mut seen = HashSet::new();
    let mut post = Vec::new();
    visit(root, &mut seen, &mut post);
    post.reverse();

    let index = post
        .iter()
        .enumerate()
        .map(|(i, c)| (c.identity(), i))
        .collect();
    (post, index)
}

fn cell_repr(cell: &Cell, index: &HashMap<*const (), usize>, size_bytes: usize) -> Vec<u8> {
    let bits = cell.bit_len();
    let full = bits / 8;
    let total = bits.div_ceil(8);

    let mut out = Vec::with_capacity(2 + total + size_bytes * cell.refs().len());
    out.push(cell.refs().len() as u8);
    out.push((full + total) as u8);
    out.extend_from_slice(&cell.data()[..total]);
    if bits % 8 != 0 {
        if let Some(last) = out.last_mut() {
            *last |= 0x80 >> (bits % 8);
        }
    }
    for child in cell.refs() {
        push_be(&mut out, index[&child.identity()], size_bytes);
    }
    out
}

pub fn serialize_boc(root: &Cell) -> Vec<u8> {
    let (cells, index) = topological_order(root);
    let size_bytes = byte_width(cells.len());

    let mut body = Vec::new();
    for cell in &cells {
        body.extend(cell_repr(cell, &index, size_bytes));
    }
    let off_bytes = byte_width(body.len());

    let mut out = Vec::with_capacity(6 + 4 * size_bytes + off_bytes + body.len());
    out.extend_from_slice(&boc::MAGIC.to_be_bytes());
    out.push(size_bytes as u8);
    out.push(off_bytes as u8);
    push_be(&mut out, cells.len(), size_bytes);
    push_be(&mut out, 1, size_bytes);
    push_be(&mut out, 0, size_bytes);
    push_be(&mut out, body.len(), off_bytes);
    push_be(&mut out, 0, size_bytes);
    out.extend(body);

    trace!(cells = cells.len(), bytes = out.len(), "serialized bag of cells");
    out
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> CodecResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| CodecError::invalid_boc(format!("truncated at byte {}", self.pos)))?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn u8(&mut self) -> CodecResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn uint(&mut self, width: usize) -> CodecResult<usize> {
        Ok(self
            .take(width)?
            .iter()
            .fold(0usize, |acc, b| (acc << 8) | usize::from(*b)))
    }
}

struct RawCell<'a> {
    data: &'a [u8],
    bit_len: usize,
    refs: Vec<usize>,
}

fn read_cell<'a>(r: &mut Reader<'a>, size_bytes: usize) -> CodecResult<RawCell<'a>> {
    let d1 = r.u8()?;
    let d2 = r.u8()?;
    if d1 & (D1_EXOTIC | D1_WITH_HASHES) != 0 {
        return Err(CodecError::invalid_boc(format!(
            "unsupported cell descriptor {d1:#04x}"
        )));
    }
    let ref_count = usize::from(d1 & 0x07);
    if ref_count > MAX_CELL_REFS {
        return Err(CodecError::invalid_boc(format!("{ref_count} refs in one cell")));
    }

    let data = r.take(usize::from(d2).div_ceil(2))?;
    let bit_len = if d2 % 2 == 0 {
        data.len() * 8
    } else {
        let last = data.last().copied().unwrap_or(0);
        if last == 0 {
            return Err(CodecError::invalid_boc("missing completion tag"));
        }
        data.len() * 8 - last.trailing_zeros() as usize - 1
    };

    let refs = (0..ref_count)
        .map(|_| r.uint(size_bytes))
        .collect::<CodecResult<Vec<_>>>()?;
    Ok(RawCell {
        data,
        bit_len,
        refs,
    })
}

/// Decode a bag of cells and return its first root
pub fn deserialize_boc(bytes: &[u8]) -> CodecResult<Cell> {
    let mut r = Reader { bytes, pos: 0 };

    let magic = u32::from_be_bytes([r.u8()?, r.u8()?, r.u8()?, r.u8()?]);
    if magic != boc::MAGIC {
        return Err(CodecError::invalid_boc(format!("unknown magic {magic:#010x}")));
    }

    let flags = r.u8()?;
    let size_bytes = usize::from(flags & SIZE_BYTES_MASK);
    if size_bytes == 0 || size_bytes > 4 {
        return Err(CodecError::invalid_boc(format!("size_bytes {size_bytes}")));
    }
    let off_bytes = usize::from(r.u8()?);
    if off_bytes == 0 || off_bytes > 8 {
        return Err(CodecError::invalid_boc(format!("off_bytes {off_bytes}")));
    }

    let cell_count = r.uint(size_bytes)?;
    let root_count = r.uint(size_bytes)?;
    let _absent = r.uint(size_bytes)?;
    let _total_size = r.uint(off_bytes)?;
    if root_count == 0 || root_count > cell_count {
        return Err(CodecError::invalid_boc(format!(
            "{root_count} roots for {cell_count} cells"
        )));
    }
    let root = r.uint(size_bytes)?;
    for _ in 1..root_count {
        r.uint(size_bytes)?;
    }
    if flags & FLAG_HAS_IDX != 0 {
        r.take(cell_count.saturating_mul(off_bytes))?;
    }

    let mut raw = Vec::with_capacity(cell_count.min(bytes.len()));
    for _ in 0..cell_count {
        raw.push(read_cell(&mut r, size_bytes)?);
    }

    if flags & FLAG_HAS_CRC32C != 0 {
        let body_end = r.pos;
        let stored = r.take(4)?;
        let stored = u32::from_le_bytes([stored[0], stored[1], stored[2], stored[3]]);
        let actual = crc32c(&bytes[..body_end]);
        if stored != actual {
            return Err(CodecError::invalid_boc(format!(
                "crc32c mismatch: stored {stored:#010x}, computed {actual:#010x}"
            )));
        }
    }

    // Children always come later, so build from the back
    let mut built: Vec<Option<Cell>> = vec![None; cell_count];
    for (i, cell) in raw.iter().enumerate().rev() {
        let mut b = CellBuilder::new();
        b.store_bits_from(cell.data, cell.bit_len)?;
        for &child in &cell.refs {
            let child_cell = built
                .get(child)
                .filter(|_| child > i)
                .and_then(|cell| cell.clone())
                .ok_or_else(|| {
                    CodecError::invalid_boc(format!("cell {i} references cell {child}"))
                })?;
            b.store_ref(child_cell)?;
        }
        built[i] = Some(b.end_cell());
    }

    built
        .get(root)
        .and_then(|cell| cell.clone())
        .ok_or_else(|| CodecError::invalid_boc(format!("root index {root} out of range")))
}

pub fn to_base64(root: &Cell) -> String {
    STANDARD.encode(serialize_boc(root))
}

/// Accepts the standard or the url-safe alphabet
pub fn from_base64(text: &str) -> CodecResult<Cell> {
    let text = text.trim();
    let bytes = STANDARD
        .decode(text)
        .or_else(|_| URL_SAFE.decode(text))
        .map_err(|e| CodecError::invalid_boc(format!("base64: {e}")))?;
    deserialize_boc(&bytes)
}

/// CRC-32C (Castagnoli), as used by the bag-of-cells checksum
const CASTAGNOLI: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

fn crc32c(bytes: &[u8]) -> u32 {
    CASTAGNOLI.checksum(bytes)
}
