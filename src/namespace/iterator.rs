//! Namespace Iterator
//!
//! Prefix-bounded cursor over one namespace's keys.
//!
//! The store cursor knows nothing about namespaces, so every movement
//! re-checks that the current physical key still carries the prefix. Once a
//! move leaves the range the cursor stays invalid until the next seek.

use bytes::Bytes;

use crate::error::Result;
use crate::store::{Store, StoreIterator};

/// Cursor over the logical keys of one namespace, in byte order
pub struct NamespaceIterator<'a, S: Store + 'a> {
    inner: S::Iter<'a>,
    prefix: Bytes,
    valid: bool,
}

impl<'a, S: Store + 'a> NamespaceIterator<'a, S> {
    pub(super) fn new(inner: S::Iter<'a>, prefix: Bytes) -> Self {
        Self {
            inner,
            prefix,
            valid: false,
        }
    }

    /// Position at the namespace's smallest key
    pub fn seek_to_first(&mut self) {
        self.inner.seek(&self.prefix);
        self.check_valid();
    }

    /// Position at the namespace's largest key
    ///
    /// Seeks to the prefix with its terminator bumped to 1, the first key
    /// past the namespace, and steps back from there.
    pub fn seek_to_last(&mut self) {
        let mut upper = self.prefix.to_vec();
        if let Some(last) = upper.last_mut() {
            *last += 1;
        }
        self.inner.seek(&upper);
        if self.inner.valid() {
            self.inner.prev();
        } else {
            // Nothing at or past the bound: this namespace ends the store
            self.inner.seek_to_last();
        }
        self.check_valid();
    }

    /// Position at the first logical key `>= key`
    pub fn seek(&mut self, key: &[u8]) {
        let mut target = Vec::with_capacity(self.prefix.len() + key.len());
        target.extend_from_slice(&self.prefix);
        target.extend_from_slice(key);
        self.inner.seek(&target);
        self.check_valid();
    }

    pub fn next(&mut self) {
        if !self.valid {
            return;
        }
        self.inner.next();
        self.check_valid();
    }

    pub fn prev(&mut self) {
        if !self.valid {
            return;
        }
        self.inner.prev();
        self.check_valid();
    }

    pub fn valid(&self) -> bool {
        self.valid && self.inner.valid()
    }

    /// Logical key at the cursor
    pub fn key(&self) -> Option<&[u8]> {
        if !self.valid {
            return None;
        }
        self.inner.key().map(|key| &key[self.prefix.len()..])
    }

    pub fn value(&self) -> Option<&[u8]> {
        if !self.valid {
            return None;
        }
        self.inner.value()
    }

    /// Error state of the underlying store cursor
    pub fn status(&self) -> Result<()> {
        self.inner.status()
    }

    /// Collect every `(key, value)` from the current position to the end
    pub fn collect_forward(&mut self) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut entries = Vec::new();
        while let (Some(key), Some(value)) = (self.key(), self.value()) {
            entries.push((key.to_vec(), value.to_vec()));
            self.next();
        }
        entries
    }

    fn check_valid(&mut self) {
        self.valid = self
            .inner
            .key()
            .is_some_and(|key| key.starts_with(&self.prefix));
    }
}
