//! # Bit-Cell Primitives
//!
//! ## Purpose
//!
//! The storage unit of the ledger: an immutable node holding at most 1023
//! data bits and at most 4 ordered child cells. Every message body and every
//! piece of contract state is a tree of these.
//!
//! ## Architecture
//!
//! ```text
//! CellBuilder ──end_cell()──► Cell ──parse()──► CellSlice
//!  (owned, mutable)        (Arc, immutable)   (borrowing cursor)
//! ```
//!
//! - `CellBuilder` is exclusively owned by the call constructing a message
//!   and is consumed when frozen.
//! - `Cell` clones share one allocation; nothing mutates a cell after
//!   creation, so clones can cross threads freely.
//! - `CellSlice` borrows a cell and keeps its own bit/ref cursor; any number
//!   of slices may read the same cell at once.

mod builder;
mod slice;

pub use builder::CellBuilder;
pub use slice::CellSlice;

use std::fmt;
use std::sync::Arc;

/// Immutable cell: bounded bit buffer plus ordered child references
#[derive(Clone)]
pub struct Cell {
    inner: Arc<CellData>,
}

struct CellData {
    /// Big-endian bit buffer; bits past `bit_len` are always zero
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<Cell>,
}

impl Cell {
    /// Only `CellBuilder::end_cell` constructs cells
    pub(crate) fn from_parts(data: Vec<u8>, bit_len: usize, refs: Vec<Cell>) -> Self {
        Self {
            inner: Arc::new(CellData {
                data,
                bit_len,
                refs,
            }),
        }
    }

    /// Zero-bit, zero-ref cell; contracts use it as an "empty" sentinel
    pub fn empty() -> Self {
        Self::from_parts(Vec::new(), 0, Vec::new())
    }

    /// Whether this cell is the empty sentinel
    pub fn is_empty(&self) -> bool {
        self.inner.bit_len == 0 && self.inner.refs.is_empty()
    }

    /// Number of data bits
    pub fn bit_len(&self) -> usize {
        self.inner.bit_len
    }

    /// Raw data bytes, last byte zero-padded
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    /// Ordered child references
    pub fn refs(&self) -> &[Cell] {
        &self.inner.refs
    }

    /// Child reference by index
    pub fn reference(&self, index: usize) -> Option<&Cell> {
        self.inner.refs.get(index)
    }

    /// Start reading this cell from the beginning
    pub fn parse(&self) -> CellSlice<'_> {
        CellSlice::new(self)
    }

    /// Longest path to a leaf; a leaf has depth 0
    pub fn depth(&self) -> usize {
        self.inner
            .refs
            .iter()
            .map(|r| r.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    #[inline]
    pub(crate) fn bit(&self, index: usize) -> bool {
        (self.inner.data[index / 8] >> (7 - index % 8)) & 1 == 1
    }

    /// Allocation identity, shared by clones of one cell
    pub(crate) fn identity(&self) -> *const () {
        Arc::as_ptr(&self.inner) as *const ()
    }

    /// Whether two handles point at the same allocation
    pub fn ptr_eq(&self, other: &Cell) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.inner.bit_len == other.inner.bit_len
                && self.inner.data == other.inner.data
                && self.inner.refs == other.inner.refs)
    }
}

impl Eq for Cell {}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("bits", &self.inner.bit_len)
            .field("data", &hex::encode(&self.inner.data))
            .field("refs", &self.inner.refs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sentinel() {
        let empty = Cell::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.bit_len(), 0);
        assert_eq!(empty, CellBuilder::new().end_cell());
        assert_eq!(empty.depth(), 0);
    }

    #[test]
    fn test_structural_equality() {
        let mut a = CellBuilder::new();
        a.store_uint(0xabc, 12).unwrap();
        let mut b = CellBuilder::new();
        b.store_uint(0xabc, 12).unwrap();
        let a = a.end_cell();
        let b = b.end_cell();
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert!(a.ptr_eq(&a.clone()));

        let mut c = CellBuilder::new();
        c.store_uint(0xabc, 13).unwrap();
        assert_ne!(a, c.end_cell());
    }

    #[test]
    fn test_depth_follows_refs() {
        let leaf = Cell::empty();
        let mut mid = CellBuilder::new();
        mid.store_ref(leaf.clone()).unwrap();
        let mid = mid.end_cell();
        let mut root = CellBuilder::new();
        root.store_ref(leaf).unwrap().store_ref(mid).unwrap();
        let root = root.end_cell();
        assert_eq!(root.depth(), 2);
        assert_eq!(root.refs().len(), 2);
        assert!(root.reference(2).is_none());
    }
}
