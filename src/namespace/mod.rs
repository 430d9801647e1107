//! Namespace Module
//!
//! Isolated logical key spaces carved out of one shared [`Store`].
//!
//! ## Responsibilities
//! - Translate logical keys to physical keys (`name ++ 0x00 ++ key`)
//! - Run pre-hooks, commit once, then run post-hooks for every write
//! - Bound iteration to the namespace's own key range
//! - Group several writes into one atomic [`WriteBatch`]
//!
//! ## Key Layout
//! ```text
//! ┌──────────────────────┬─────┬────────────────────────────┐
//! │ namespace name (UTF8)│ 0x00│ logical key (any bytes)    │
//! └──────────────────────┴─────┴────────────────────────────┘
//!   "foo"    → 66 6f 6f 00 ...
//!   "foobar" → 66 6f 6f 62 61 72 00 ...   (never overlaps "foo")
//! ```

mod batch;
mod hook;
mod iterator;

use std::sync::Arc;

use bytes::Bytes;

use crate::config::Config;
use crate::error::{KeyspaceError, Result};
use crate::store::{BatchOp, MemoryStore, Store};

pub use batch::WriteBatch;
pub use hook::{HookContext, PostHook, PreHook};
pub use iterator::NamespaceIterator;

/// Byte appended to the namespace name to form its prefix
pub const TERMINATOR: u8 = 0;

/// A logical key space over a shared store
///
/// ## Hooks
/// Pre-hooks and post-hooks are append-only configuration: register them
/// with `&mut self` before the namespace is shared (typically behind an
/// `Arc`), after which they are frozen. Hooks run in registration order.
///
/// ## Concurrency
/// No locking is added here. Each call runs pre-hooks, one store commit
/// and post-hooks on the caller's thread; concurrent cascades that
/// read-modify-write the same derived key race at the store.
pub struct Namespace<S: Store = MemoryStore> {
    /// Shared physical store
    store: Arc<S>,

    /// Namespace name as given at open
    name: String,

    /// `name ++ TERMINATOR`
    prefix: Bytes,

    /// Handle configuration
    config: Config,

    pre_hooks: Vec<PreHook<S>>,

    post_hooks: Vec<PostHook<S>>,
}

impl<S: Store> Namespace<S> {
    /// Open a namespace with default config
    pub fn open(store: Arc<S>, name: &str) -> Result<Self> {
        Self::open_with_config(store, name, Config::default())
    }

    /// Open a namespace
    ///
    /// Opening the same name twice yields two handles on the same keys;
    /// hooks belong to the handle, not to the name.
    pub fn open_with_config(store: Arc<S>, name: &str, config: Config) -> Result<Self> {
        if name.as_bytes().contains(&TERMINATOR) {
            return Err(KeyspaceError::InvalidNamespace(format!(
                "{:?} contains a NUL byte",
                name
            )));
        }
        config.validate()?;

        let mut prefix = Vec::with_capacity(name.len() + 1);
        prefix.extend_from_slice(name.as_bytes());
        prefix.push(TERMINATOR);

        tracing::debug!(namespace = name, "opened namespace");

        Ok(Self {
            store,
            name: name.to_string(),
            prefix: Bytes::from(prefix),
            config,
            pre_hooks: Vec::new(),
            post_hooks: Vec::new(),
        })
    }

    // =========================================================================
    // Hook Registration
    // =========================================================================

    /// Append a hook run before every write to this namespace
    pub fn register_pre_hook<F>(&mut self, hook: F)
    where
        F: Fn(&[u8], Option<&[u8]>, &mut HookContext<'_, S>) -> Result<()> + Send + Sync + 'static,
    {
        self.pre_hooks.push(Box::new(hook));
    }

    /// Append a hook run after every committed write to this namespace
    pub fn register_post_hook<F>(&mut self, hook: F)
    where
        F: Fn(&[u8], Option<&[u8]>, &Namespace<S>) -> Result<()> + Send + Sync + 'static,
    {
        self.post_hooks.push(Box::new(hook));
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get a value by logical key. No hooks fire.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.store.get(&self.physical_key(key))
    }

    /// Open a cursor confined to this namespace. Starts unpositioned.
    pub fn iter(&self) -> NamespaceIterator<'_, S> {
        NamespaceIterator::new(self.store.iter(), self.prefix.clone())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Run pre-hooks (may stage writes into other namespaces)
    /// 2. Commit: the cascade batch if one was staged, else a single put
    /// 3. Run post-hooks for this and every touched namespace
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.apply(key, Some(value), true)
    }

    /// Delete a key, same steps as [`Namespace::put`]
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.apply(key, None, true)
    }

    /// Re-run the cascade for a change that is already applied
    ///
    /// Pre-hooks run and anything they stage is committed, but the key
    /// itself is not written when no hook staged a batch. Post-hooks always
    /// run.
    pub fn simulate(&self, key: &[u8], value: Option<&[u8]>) -> Result<()> {
        self.apply(key, value, false)
    }

    /// Start a batch of writes against this namespace
    pub fn new_write_batch(&self) -> WriteBatch<'_, S> {
        WriteBatch::new(HookContext::batched(self))
    }

    /// Commit a write batch atomically, then run post-hooks
    pub fn write(&self, batch: WriteBatch<'_, S>) -> Result<()> {
        let ctx = batch.into_context();
        if ctx.origin().prefix() != self.prefix() {
            return Err(KeyspaceError::ForeignBatch {
                expected: self.name.clone(),
                found: ctx.origin().name().to_string(),
            });
        }
        self.finish(ctx, true)
    }

    // =========================================================================
    // Key Translation
    // =========================================================================

    /// `prefix ++ key`
    pub fn physical_key(&self, key: &[u8]) -> Vec<u8> {
        let mut physical = Vec::with_capacity(self.prefix.len() + key.len());
        physical.extend_from_slice(&self.prefix);
        physical.extend_from_slice(key);
        physical
    }

    /// Strip this namespace's prefix, `None` if the key belongs elsewhere
    pub fn logical_key<'k>(&self, physical: &'k [u8]) -> Option<&'k [u8]> {
        physical.strip_prefix(&self.prefix[..])
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical prefix, `name ++ 0x00`
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// The shared store all namespaces write to
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pre_hook_count(&self) -> usize {
        self.pre_hooks.len()
    }

    pub fn post_hook_count(&self) -> usize {
        self.post_hooks.len()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn apply(&self, key: &[u8], value: Option<&[u8]>, fast_path: bool) -> Result<()> {
        tracing::trace!(
            namespace = %self.name,
            delete = value.is_none(),
            simulate = !fast_path,
            "write"
        );
        let mut ctx = HookContext::seeded(self, key, value);
        self.run_pre_hooks(key, value, &mut ctx)?;
        self.finish(ctx, fast_path)
    }

    fn finish(&self, ctx: HookContext<'_, S>, fast_path: bool) -> Result<()> {
        if let Err(e) = ctx.commit(fast_path) {
            tracing::warn!(
                namespace = %self.name,
                ops = ctx.pending_ops(),
                error = %e,
                "commit failed, skipping post-hooks"
            );
            return Err(e);
        }
        ctx.dispatch()
    }

    pub(crate) fn has_pre_hooks(&self) -> bool {
        !self.pre_hooks.is_empty()
    }

    pub(crate) fn batch_op(&self, key: &[u8], value: Option<&[u8]>) -> BatchOp {
        let key = Bytes::from(self.physical_key(key));
        match value {
            Some(value) => BatchOp::Put {
                key,
                value: Bytes::copy_from_slice(value),
            },
            None => BatchOp::Delete { key },
        }
    }

    pub(crate) fn run_pre_hooks(
        &self,
        key: &[u8],
        value: Option<&[u8]>,
        ctx: &mut HookContext<'_, S>,
    ) -> Result<()> {
        for hook in &self.pre_hooks {
            hook(key, value, &mut *ctx).inspect_err(|e| {
                tracing::warn!(namespace = %self.name, error = %e, "pre-hook failed");
            })?;
        }
        Ok(())
    }

    pub(crate) fn run_post_hooks(&self, ctx: &HookContext<'_, S>) -> Result<()> {
        if self.post_hooks.is_empty() {
            return Ok(());
        }
        for (key, value) in ctx.committed_for(self) {
            for hook in &self.post_hooks {
                hook(key, value, self).inspect_err(|e| {
                    tracing::warn!(namespace = %self.name, error = %e, "post-hook failed");
                })?;
            }
        }
        Ok(())
    }
}

impl<S: Store> std::fmt::Debug for Namespace<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Namespace")
            .field("name", &self.name)
            .field("pre_hooks", &self.pre_hooks.len())
            .field("post_hooks", &self.post_hooks.len())
            .finish()
    }
}
