//! Store batch
//!
//! An ordered list of physical writes committed as one unit.

use bytes::Bytes;

/// A single physical write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Put a key-value pair
    Put { key: Bytes, value: Bytes },

    /// Delete a key
    Delete { key: Bytes },
}

impl BatchOp {
    pub fn key(&self) -> &[u8] {
        match self {
            BatchOp::Put { key, .. } | BatchOp::Delete { key } => key,
        }
    }

    /// The written value, `None` for a delete
    pub fn value(&self) -> Option<&[u8]> {
        match self {
            BatchOp::Put { value, .. } => Some(value),
            BatchOp::Delete { .. } => None,
        }
    }
}

/// Ops staged for one atomic [`Store::write`](super::Store::write)
///
/// Op order is commit order: a later op on the same key wins.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    ops: Vec<BatchOp>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.push(BatchOp::Put {
            key: Bytes::copy_from_slice(key),
            value: Bytes::copy_from_slice(value),
        });
    }

    pub fn delete(&mut self, key: &[u8]) {
        self.push(BatchOp::Delete {
            key: Bytes::copy_from_slice(key),
        });
    }

    pub(crate) fn push(&mut self, op: BatchOp) {
        self.ops.push(op);
    }

    /// Keep only the first `len` ops
    pub(crate) fn truncate(&mut self, len: usize) {
        self.ops.truncate(len);
    }

    /// Drop all staged ops
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
