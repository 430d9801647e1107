//! Write Batch
//!
//! Several logical writes against one namespace, committed as one unit.

use crate::error::Result;
use crate::store::Store;

use super::HookContext;

/// A caller-assembled batch of writes
///
/// Each `put`/`delete` runs the namespace's pre-hooks immediately, so
/// derived writes accumulate in the same physical batch. Nothing touches
/// the store until [`Namespace::write`](super::Namespace::write); dropping
/// the batch discards it.
pub struct WriteBatch<'a, S: Store> {
    ctx: HookContext<'a, S>,
}

impl<'a, S: Store> WriteBatch<'a, S> {
    pub(super) fn new(ctx: HookContext<'a, S>) -> Self {
        Self { ctx }
    }

    /// Stage a put. A failing pre-hook leaves the batch unchanged.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.ctx.stage_top_level(key, Some(value))
    }

    /// Stage a delete. A failing pre-hook leaves the batch unchanged.
    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.ctx.stage_top_level(key, None)
    }

    /// Physical ops staged so far, derived writes included
    pub fn len(&self) -> usize {
        self.ctx.pending_ops()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the namespace this batch commits to
    pub fn namespace(&self) -> &str {
        self.ctx.origin().name()
    }

    pub(super) fn into_context(self) -> HookContext<'a, S> {
        self.ctx
    }
}
