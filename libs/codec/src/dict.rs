//! Fixed-width-key dictionary (`Hashmap n X`) codec
//!
//! Contract state keeps sparse maps (order slots) as binary Patricia trees.
//! Each node starts with a label holding the next run of key bits, in one of
//! three encodings:
//!
//! ```text
//! hml_short$0  len:(Unary) bits:(len * Bit)
//! hml_long$10  len:(#<= m) bits:(len * Bit)
//! hml_same$11  v:Bit len:(#<= m)
//! ```
//!
//! where `m` is the number of key bits not yet consumed. If the label
//! exhausts the key the rest of the cell is the value, otherwise the node is
//! a fork with the `0` branch in ref 0 and the `1` branch in ref 1.

use crate::cell::{Cell, CellBuilder, CellSlice};
use crate::error::{CodecError, CodecResult};
use std::collections::BTreeMap;

/// Widest key the dictionary codec supports
pub const MAX_KEY_BITS: usize = 64;

/// Bits needed to write a length in `0..=max`
fn len_bits(max: usize) -> usize {
    (usize::BITS - max.leading_zeros()) as usize
}

fn check_key_bits(key_bits: usize) -> CodecResult<()> {
    if key_bits == 0 || key_bits > MAX_KEY_BITS {
        return Err(CodecError::value_out_of_range(
            MAX_KEY_BITS,
            format!("dictionary key width {key_bits}"),
        ));
    }
    Ok(())
}

/// Parse a dictionary from its root node cell
///
/// Returns each key with a slice positioned at the start of its value.
pub fn parse_dict(root: &Cell, key_bits: usize) -> CodecResult<BTreeMap<u64, CellSlice<'_>>> {
    check_key_bits(key_bits)?;
    let mut entries = BTreeMap::new();
    walk(root, key_bits, 0, &mut entries)?;
    Ok(entries)
}

fn walk<'a>(
    cell: &'a Cell,
    remaining: usize,
    prefix: u128,
    entries: &mut BTreeMap<u64, CellSlice<'a>>,
) -> CodecResult<()> {
    let mut slice = cell.parse();
    let (label, label_len) = load_label(&mut slice, remaining)?;
    let prefix = (prefix << label_len) | label;
    let remaining = remaining - label_len;

    if remaining == 0 {
        entries.insert(prefix as u64, slice);
        return Ok(());
    }

    let left = slice.load_ref()?;
    let right = slice.load_ref()?;
    walk(left, remaining - 1, prefix << 1, entries)?;
    walk(right, remaining - 1, (prefix << 1) | 1, entries)
}

fn load_label(slice: &mut CellSlice<'_>, max_len: usize) -> CodecResult<(u128, usize)> {
    let too_long = |len: usize| {
        CodecError::malformed_tag(len as u64, len_bits(max_len), "dictionary label length")
    };

    if !slice.load_bit()? {
        // hml_short: unary length
        let mut len = 0;
        while slice.load_bit()? {
            len += 1;
            if len > max_len {
                return Err(too_long(len));
            }
        }
        return Ok((slice.load_uint(len)?, len));
    }

    if !slice.load_bit()? {
        // hml_long
        let len = slice.load_uint(len_bits(max_len))? as usize;
        if len > max_len {
            return Err(too_long(len));
        }
        return Ok((slice.load_uint(len)?, len));
    }

    // hml_same
    let same = slice.load_bit()?;
    let len = slice.load_uint(len_bits(max_len))? as usize;
    if len > max_len {
        return Err(too_long(len));
    }
    let bits = if same { low_mask(len) } else { 0 };
    Ok((bits, len))
}

fn low_mask(len: usize) -> u128 {
    if len == 0 {
        0
    } else {
        u128::MAX >> (128 - len)
    }
}

impl<'a> CellSlice<'a> {
    /// Optional dictionary (`HashmapE`): presence bit, then root reference
    pub fn load_dict(&mut self, key_bits: usize) -> CodecResult<BTreeMap<u64, CellSlice<'a>>> {
        match self.load_maybe_ref()? {
            Some(root) => parse_dict(root, key_bits),
            None => {
                check_key_bits(key_bits)?;
                Ok(BTreeMap::new())
            }
        }
    }
}

/// Serialize a dictionary; `None` for an empty map
///
/// Each value builder is appended after its leaf label. Labels use the
/// shortest of the three encodings.
pub fn build_dict(
    key_bits: usize,
    entries: &BTreeMap<u64, CellBuilder>,
) -> CodecResult<Option<Cell>> {
    check_key_bits(key_bits)?;
    if entries.is_empty() {
        return Ok(None);
    }
    let mut sorted = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let key = u128::from(*key);
        if key >> key_bits != 0 {
            return Err(CodecError::value_out_of_range(
                key_bits,
                format!("dictionary key {key}"),
            ));
        }
        sorted.push((key, value));
    }
    build_node(&sorted, key_bits).map(Some)
}

fn build_node(entries: &[(u128, &CellBuilder)], remaining: usize) -> CodecResult<Cell> {
    let first = entries[0].0 & low_mask(remaining);
    let last = entries[entries.len() - 1].0 & low_mask(remaining);
    let diff_bits = 128 - (first ^ last).leading_zeros() as usize;
    let label_len = remaining - diff_bits;
    let label = first >> (remaining - label_len) & low_mask(label_len);

    let mut node = CellBuilder::new();
    store_label(&mut node, label, label_len, remaining)?;

    if label_len == remaining {
        node.store_builder(entries[0].1)?;
        return Ok(node.end_cell());
    }

    let rest = remaining - label_len - 1;
    let split = entries.partition_point(|(key, _)| (key >> rest) & 1 == 0);
    let left = build_node(&entries[..split], rest)?;
    let right = build_node(&entries[split..], rest)?;
    node.store_ref(left)?.store_ref(right)?;
    Ok(node.end_cell())
}

fn store_label(node: &mut CellBuilder, label: u128, len: usize, max_len: usize) -> CodecResult<()> {
    let k = len_bits(max_len);
    let short_len = 1 + (len + 1) + len;
    let long_len = 2 + k + len;
    let same = if label == 0 {
        Some(false)
    } else if label == low_mask(len) {
        Some(true)
    } else {
        None
    };
    let same_len = if same.is_some() { 3 + k } else { usize::MAX };

    if short_len <= long_len && short_len <= same_len {
        node.store_bit(false)?;
        for _ in 0..len {
            node.store_bit(true)?;
        }
        node.store_bit(false)?.store_uint(label, len)?;
    } else if long_len <= same_len {
        node.store_uint(0b10, 2)?
            .store_uint(len as u128, k)?
            .store_uint(label, len)?;
    } else {
        node.store_uint(0b11, 2)?
            .store_bit(same == Some(true))?
            .store_uint(len as u128, k)?;
    }
    Ok(())
}
