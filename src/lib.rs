//! # keyspace
//!
//! Logical namespaces over one shared ordered key-value store, with:
//! - Prefix partitioning (`name ++ 0x00 ++ key`) so namespaces never collide
//! - Prefix-bounded bidirectional iteration
//! - Pre-hooks that fold derived writes into other namespaces into the
//!   same atomic batch as the triggering write
//! - Post-hooks notified per namespace after the batch commits
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Namespace ("input", "output", ...)            │
//! │        get / put / delete / simulate / iter / write          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Hook Context                             │
//! │   pre-hooks ──► staged Batch ──► commit ──► post-hooks       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Point ops / │          │  Iterator   │
//!   │ Batch write │          │  (seekable) │
//!   └──────┬──────┘          └──────┬──────┘
//!          └────────────┬───────────┘
//!                       ▼
//!               ┌───────────────┐
//!               │     Store     │
//!               │ (MemoryStore) │
//!               └───────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use keyspace::{MemoryStore, Namespace};
//!
//! let store = Arc::new(MemoryStore::new());
//!
//! let index = Arc::new(Namespace::open(store.clone(), "index").unwrap());
//! let mut users = Namespace::open(store.clone(), "users").unwrap();
//!
//! let target = Arc::clone(&index);
//! users.register_pre_hook(move |key, value, ctx| match value {
//!     Some(value) => ctx.put_in(&target, value, key),
//!     None => Ok(()),
//! });
//!
//! users.put(b"u1", b"alice").unwrap();
//! assert_eq!(index.get(b"alice").unwrap(), Some(b"u1".to_vec()));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod namespace;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KeyspaceError, Result};
pub use config::Config;
pub use namespace::{HookContext, Namespace, NamespaceIterator, WriteBatch};
pub use store::{Batch, BatchOp, MemoryIterator, MemoryStore, Store, StoreIterator};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of keyspace
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
