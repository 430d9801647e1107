//! Hook Context
//!
//! Per-write cascade state shared by every pre-hook one top-level write
//! triggers.
//!
//! ## Lifecycle
//! ```text
//!  put/delete/simulate/write batch
//!          │
//!          ▼
//!  HookContext::seeded ──► origin pre-hooks ──► put_in/delete_in ──► target pre-hooks ...
//!          │                    (staged ops land in one Batch, in staging order)
//!          ▼
//!  commit: Batch present? ── yes ──► Store::write(batch)
//!                          └─ no ──► Store::put/delete(prefix ++ key)
//!          │
//!          ▼
//!  dispatch: origin, then each touched namespace, runs its post-hooks
//! ```
//!
//! The batch doubles as the log post-dispatch scans: each namespace sees
//! exactly the ops whose physical key carries its prefix, in commit order.

use std::sync::Arc;

use bytes::Bytes;

use crate::error::{KeyspaceError, Result};
use crate::store::{Batch, BatchOp, Store};

use super::Namespace;

/// Callback run before commit. `value == None` means delete.
pub type PreHook<S> =
    Box<dyn Fn(&[u8], Option<&[u8]>, &mut HookContext<'_, S>) -> Result<()> + Send + Sync>;

/// Callback run after a successful commit, once per committed key of its
/// namespace. The namespace handle is passed so the hook can read back.
pub type PostHook<S> = Box<dyn Fn(&[u8], Option<&[u8]>, &Namespace<S>) -> Result<()> + Send + Sync>;

/// The top-level write a context was seeded with
struct Seed {
    key: Bytes,
    value: Option<Bytes>,
}

/// Cascade state for one top-level write
///
/// Created by the namespace for each `put`, `delete`, `simulate` and
/// [`WriteBatch`](super::WriteBatch); pre-hooks stage derived writes through it.
pub struct HookContext<'a, S: Store> {
    /// Namespace the top-level write was issued against
    origin: &'a Namespace<S>,

    /// Original write, kept aside until a hook forces a batch
    seed: Option<Seed>,

    /// Physical batch, created on the first staged write
    batch: Option<Batch>,

    /// Namespaces (other than the origin handle) that received a staged
    /// write, one per prefix
    touched: Vec<Arc<Namespace<S>>>,

    /// Nesting of namespace pre-hook rounds, 0 at top level
    depth: usize,
}

impl<'a, S: Store> HookContext<'a, S> {
    /// Context for a single put/delete, fast path still open
    pub(crate) fn seeded(origin: &'a Namespace<S>, key: &[u8], value: Option<&[u8]>) -> Self {
        Self {
            origin,
            seed: Some(Seed {
                key: Bytes::copy_from_slice(key),
                value: value.map(Bytes::copy_from_slice),
            }),
            batch: None,
            touched: Vec::new(),
            depth: 0,
        }
    }

    /// Context for an explicit write batch, batch exists from the start
    pub(crate) fn batched(origin: &'a Namespace<S>) -> Self {
        Self {
            origin,
            seed: None,
            batch: Some(origin.store().new_batch()),
            touched: Vec::new(),
            depth: 0,
        }
    }

    // =========================================================================
    // Staging API (for pre-hooks)
    // =========================================================================

    /// Stage `origin.prefix ++ key = value` without running any hooks
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        let op = self.origin.batch_op(key, Some(value));
        self.ensure_batch().push(op);
    }

    /// Stage a delete of `origin.prefix ++ key` without running any hooks
    pub fn delete(&mut self, key: &[u8]) {
        let op = self.origin.batch_op(key, None);
        self.ensure_batch().push(op);
    }

    /// Stage a put into `target` and run `target`'s pre-hooks on it
    pub fn put_in(&mut self, target: &Arc<Namespace<S>>, key: &[u8], value: &[u8]) -> Result<()> {
        self.ensure_batch();
        self.touch(target);
        self.stage_nested(target, key, Some(value))
    }

    /// Stage a delete in `target` and run `target`'s pre-hooks on it
    pub fn delete_in(&mut self, target: &Arc<Namespace<S>>, key: &[u8]) -> Result<()> {
        self.ensure_batch();
        self.touch(target);
        self.stage_nested(target, key, None)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn origin(&self) -> &Namespace<S> {
        self.origin
    }

    /// Physical ops staged so far, empty while the fast path is open
    pub fn staged(&self) -> &[BatchOp] {
        self.batch.as_ref().map(Batch::ops).unwrap_or(&[])
    }

    /// Current pre-hook nesting level
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Names of namespaces touched so far, in first-touch order
    pub fn touched(&self) -> impl Iterator<Item = &str> {
        self.touched.iter().map(|ns| ns.name())
    }

    // =========================================================================
    // Crate-internal protocol
    // =========================================================================

    /// Stage one op of an explicit write batch and run origin's pre-hooks
    ///
    /// On error the batch is rolled back to where it was before this call.
    pub(crate) fn stage_top_level(&mut self, key: &[u8], value: Option<&[u8]>) -> Result<()> {
        let origin = self.origin;
        let mark = self.ensure_batch().len();
        self.ensure_batch().push(origin.batch_op(key, value));

        let result = origin.run_pre_hooks(key, value, self);
        if result.is_err() {
            self.ensure_batch().truncate(mark);
        }
        result
    }

    /// Number of ops that will be committed
    pub(crate) fn pending_ops(&self) -> usize {
        match (&self.batch, &self.seed) {
            (Some(batch), _) => batch.len(),
            (None, Some(_)) => 1,
            (None, None) => 0,
        }
    }

    /// Commit the cascade to the store
    ///
    /// With a batch, commits it atomically. Without one, issues the seeded
    /// single-key write unless `fast_path` is false (simulation).
    pub(crate) fn commit(&self, fast_path: bool) -> Result<()> {
        let origin = self.origin;
        match (&self.batch, &self.seed) {
            (Some(batch), _) => {
                origin.store().write(batch)?;
                tracing::debug!(
                    namespace = origin.name(),
                    ops = batch.len(),
                    touched = self.touched.len(),
                    "committed cascade batch"
                );
            }
            (None, Some(seed)) if fast_path => {
                let physical = origin.physical_key(&seed.key);
                match &seed.value {
                    Some(value) => origin.store().put(&physical, value)?,
                    None => origin.store().delete(&physical)?,
                }
                tracing::trace!(namespace = origin.name(), "committed single write");
            }
            _ => {}
        }
        Ok(())
    }

    /// Run post-hooks for origin and then every touched namespace
    ///
    /// Stops at the first failing hook; later namespaces are not notified.
    pub(crate) fn dispatch(&self) -> Result<()> {
        self.origin.run_post_hooks(self)?;
        for namespace in &self.touched {
            namespace.run_post_hooks(self)?;
        }
        Ok(())
    }

    /// Entries a namespace's post-hooks should see, as `(logical key, value)`
    pub(crate) fn committed_for<'n>(
        &'n self,
        namespace: &'n Namespace<S>,
    ) -> Vec<(&'n [u8], Option<&'n [u8]>)> {
        match (&self.batch, &self.seed) {
            (Some(batch), _) => batch
                .ops()
                .iter()
                .filter_map(|op| namespace.logical_key(op.key()).map(|key| (key, op.value())))
                .collect(),
            (None, Some(seed)) if namespace.prefix() == self.origin.prefix() => {
                vec![(seed.key.as_ref(), seed.value.as_deref())]
            }
            _ => Vec::new(),
        }
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Materialize the batch, folding the seeded write in first
    fn ensure_batch(&mut self) -> &mut Batch {
        let origin = self.origin;
        let seed = &mut self.seed;
        self.batch.get_or_insert_with(|| {
            let mut batch = origin.store().new_batch();
            if let Some(seed) = seed.take() {
                batch.push(origin.batch_op(&seed.key, seed.value.as_deref()));
            }
            batch
        })
    }

    /// Origin is excluded by handle: another handle on the origin's name
    /// carries its own hooks and is dispatched like any other namespace.
    fn touch(&mut self, target: &Arc<Namespace<S>>) {
        if std::ptr::eq(Arc::as_ptr(target), self.origin)
            || self.touched.iter().any(|ns| ns.prefix() == target.prefix())
        {
            return;
        }
        self.touched.push(Arc::clone(target));
    }

    fn stage_nested(&mut self, target: &Namespace<S>, key: &[u8], value: Option<&[u8]>) -> Result<()> {
        tracing::trace!(
            origin = self.origin.name(),
            target = target.name(),
            delete = value.is_none(),
            depth = self.depth,
            "staging cascade write"
        );
        self.ensure_batch().push(target.batch_op(key, value));

        if !target.has_pre_hooks() {
            return Ok(());
        }

        self.depth += 1;
        if let Some(limit) = self.origin.config().max_cascade_depth {
            if self.depth > limit {
                let depth = self.depth;
                self.depth -= 1;
                tracing::warn!(
                    origin = self.origin.name(),
                    target = target.name(),
                    depth,
                    limit,
                    "cascade depth limit reached"
                );
                return Err(KeyspaceError::CascadeDepthExceeded { depth, limit });
            }
        }
        let result = target.run_pre_hooks(key, value, self);
        self.depth -= 1;
        result
    }
}
