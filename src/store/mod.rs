//! Store Module
//!
//! The ordered key-value store that every namespace shares.
//!
//! ## Responsibilities
//! - Point reads and writes on physical keys
//! - Atomic multi-op commit through [`Batch`]
//! - Seekable bidirectional iteration in byte order
//!
//! Durability, compaction and on-disk layout belong to the implementation
//! behind [`Store`]. This crate ships [`MemoryStore`] as the reference
//! backend; anything ordered by raw byte comparison can be plugged in.
//!
//! ## Contract
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Store                                                    │
//! │   get(k)          → Ok(Some(v)) | Ok(None) | Err         │
//! │   put(k, v)       → single atomic write                  │
//! │   delete(k)       → single atomic write                  │
//! │   write(&Batch)   → all ops or none, in op order         │
//! │   iter()          → StoreIterator (released on Drop)     │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod batch;
mod memory;

pub use batch::{Batch, BatchOp};
pub use memory::{MemoryIterator, MemoryStore};

use crate::error::Result;

/// An ordered byte-key/byte-value store
///
/// Implementations must be safe for concurrent callers: each point op and
/// each batch commit is individually atomic.
///
/// Backends with real I/O can return `std::io::Error` with `?`; it converts
/// to [`KeyspaceError::Io`](crate::KeyspaceError::Io). Other failures go
/// through [`KeyspaceError::Store`](crate::KeyspaceError::Store).
pub trait Store: Send + Sync {
    /// Cursor type returned by [`Store::iter`]
    type Iter<'a>: StoreIterator
    where
        Self: 'a;

    /// Read the value at `key`, `Ok(None)` if absent
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Write a single key
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove a single key (no error if absent)
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Create an empty batch for this store
    fn new_batch(&self) -> Batch {
        Batch::new()
    }

    /// Apply every op in `batch` atomically, in order
    fn write(&self, batch: &Batch) -> Result<()>;

    /// Open a cursor over the whole key space. Starts unpositioned.
    fn iter(&self) -> Self::Iter<'_>;
}

/// A seekable, bidirectional cursor over a [`Store`]
///
/// Mirrors the LevelDB/RocksDB raw iterator: every movement may leave the
/// cursor invalid, and `key`/`value` return `None` while invalid.
pub trait StoreIterator {
    /// Position at the smallest key
    fn seek_to_first(&mut self);

    /// Position at the largest key
    fn seek_to_last(&mut self);

    /// Position at the first key `>= target`
    fn seek(&mut self, target: &[u8]);

    /// Advance one entry. No-op while invalid.
    fn next(&mut self);

    /// Step back one entry. No-op while invalid.
    fn prev(&mut self);

    fn valid(&self) -> bool;

    fn key(&self) -> Option<&[u8]>;

    fn value(&self) -> Option<&[u8]>;

    /// Any error the cursor hit while moving
    fn status(&self) -> Result<()>;
}
