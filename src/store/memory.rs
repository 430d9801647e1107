//! In-memory store
//!
//! BTreeMap-based [`Store`] with RwLock for concurrency.
//!
//! ## Snapshots
//! The map lives behind an `Arc`. Iterators clone the `Arc` and keep
//! reading that version; the next write copies the map if an iterator still
//! holds it (`Arc::make_mut`). Writers never wait on open iterators, so a
//! hook may write while its caller is iterating.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::Result;

use super::{Batch, BatchOp, Store, StoreIterator};

type Table = BTreeMap<Bytes, Bytes>;

/// Ordered in-memory key-value store
///
/// ## Concurrency:
/// - Reads take the read lock only long enough to look up or clone the `Arc`
/// - `put`/`delete`/`write` take the write lock; a batch is applied under a
///   single acquisition so readers never see half of it
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Arc<Table>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physical keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    fn snapshot(&self) -> Arc<Table> {
        Arc::clone(&self.data.read())
    }
}

impl Store for MemoryStore {
    type Iter<'a> = MemoryIterator
    where
        Self: 'a;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).map(|v| v.to_vec()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut data = self.data.write();
        Arc::make_mut(&mut data).insert(Bytes::copy_from_slice(key), Bytes::copy_from_slice(value));
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        let mut data = self.data.write();
        if data.contains_key(key) {
            Arc::make_mut(&mut data).remove(key);
        }
        Ok(())
    }

    fn write(&self, batch: &Batch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut data = self.data.write();
        let table = Arc::make_mut(&mut data);
        for op in batch.ops() {
            match op {
                BatchOp::Put { key, value } => {
                    table.insert(key.clone(), value.clone());
                }
                BatchOp::Delete { key } => {
                    table.remove(key.as_ref());
                }
            }
        }
        tracing::trace!(ops = batch.len(), "applied batch");
        Ok(())
    }

    fn iter(&self) -> Self::Iter<'_> {
        MemoryIterator::new(self.snapshot())
    }
}

/// Cursor over a point-in-time snapshot of a [`MemoryStore`]
pub struct MemoryIterator {
    snapshot: Arc<Table>,
    current: Option<(Bytes, Bytes)>,
}

impl MemoryIterator {
    fn new(snapshot: Arc<Table>) -> Self {
        Self {
            snapshot,
            current: None,
        }
    }

    fn first_in(&self, lower: Bound<&[u8]>) -> Option<(Bytes, Bytes)> {
        self.snapshot
            .range::<[u8], _>((lower, Bound::Unbounded))
            .next()
            .map(|(k, v)| (k.clone(), v.clone()))
    }

    fn last_in(&self, upper: Bound<&[u8]>) -> Option<(Bytes, Bytes)> {
        self.snapshot
            .range::<[u8], _>((Bound::Unbounded, upper))
            .next_back()
            .map(|(k, v)| (k.clone(), v.clone()))
    }
}

impl StoreIterator for MemoryIterator {
    fn seek_to_first(&mut self) {
        self.current = self.first_in(Bound::Unbounded);
    }

    fn seek_to_last(&mut self) {
        self.current = self.last_in(Bound::Unbounded);
    }

    fn seek(&mut self, target: &[u8]) {
        self.current = self.first_in(Bound::Included(target));
    }

    fn next(&mut self) {
        if let Some((key, _)) = self.current.take() {
            self.current = self.first_in(Bound::Excluded(key.as_ref()));
        }
    }

    fn prev(&mut self) {
        if let Some((key, _)) = self.current.take() {
            self.current = self.last_in(Bound::Excluded(key.as_ref()));
        }
    }

    fn valid(&self) -> bool {
        self.current.is_some()
    }

    fn key(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|(k, _)| k.as_ref())
    }

    fn value(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|(_, v)| v.as_ref())
    }

    fn status(&self) -> Result<()> {
        Ok(())
    }
}
