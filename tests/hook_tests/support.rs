//! Shared fixtures for hook tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use keyspace::{
    Batch, HookContext, KeyspaceError, MemoryIterator, MemoryStore, Namespace, Result, Store,
};

// =============================================================================
// Instrumented Store
// =============================================================================

/// MemoryStore wrapper that counts commits and can be told to fail them
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
    puts: AtomicUsize,
    deletes: AtomicUsize,
    batches: AtomicUsize,
}

impl CountingStore {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    fn check(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KeyspaceError::Store("disk full".to_string()));
        }
        Ok(())
    }
}

impl Store for CountingStore {
    type Iter<'a> = MemoryIterator
    where
        Self: 'a;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.check()?;
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.check()?;
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key)
    }

    fn write(&self, batch: &Batch) -> Result<()> {
        self.check()?;
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.inner.write(batch)
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.inner.iter()
    }
}

pub type Ns = Namespace<CountingStore>;

// =============================================================================
// Helper Functions
// =============================================================================

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn setup_store() -> Arc<CountingStore> {
    init_tracing();
    Arc::new(CountingStore::default())
}

pub fn open(store: &Arc<CountingStore>, name: &str) -> Ns {
    Namespace::open(Arc::clone(store), name).unwrap()
}

/// Pre-hook mirroring every write into `target` under `tag ++ key`
pub fn mirror(
    target: Arc<Ns>,
    tag: &'static str,
) -> impl Fn(&[u8], Option<&[u8]>, &mut HookContext<'_, CountingStore>) -> Result<()>
       + Send
       + Sync
       + 'static {
    move |key: &[u8], value: Option<&[u8]>, ctx: &mut HookContext<'_, CountingStore>| -> Result<()> {
        let mut derived = tag.as_bytes().to_vec();
        derived.extend_from_slice(key);
        match value {
            Some(value) => ctx.put_in(&target, &derived, value),
            None => ctx.delete_in(&target, &derived),
        }
    }
}

/// Post-hook that counts calls and checks the store already holds `value`
pub fn counting_reader(
    counter: Arc<AtomicUsize>,
) -> impl Fn(&[u8], Option<&[u8]>, &Ns) -> Result<()> + Send + Sync + 'static {
    move |key: &[u8], value: Option<&[u8]>, ns: &Ns| -> Result<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        let stored = ns.get(key)?;
        if stored.as_deref() != value {
            return Err(KeyspaceError::hook(
                ns.name(),
                format!("read {:?}, hook saw {:?}", stored, value),
            ));
        }
        Ok(())
    }
}

/// input → output (D_ prefix) → output2 (X_ prefix), with counting
/// post-hooks on input and output2
pub struct Chain {
    pub store: Arc<CountingStore>,
    pub input: Ns,
    pub output: Arc<Ns>,
    pub output2: Arc<Ns>,
    pub input_posts: Arc<AtomicUsize>,
    pub output2_posts: Arc<AtomicUsize>,
}

pub fn chain() -> Chain {
    let store = setup_store();
    let input_posts = Arc::new(AtomicUsize::new(0));
    let output2_posts = Arc::new(AtomicUsize::new(0));

    let mut output2 = open(&store, "output2");
    output2.register_post_hook(counting_reader(Arc::clone(&output2_posts)));
    let output2 = Arc::new(output2);

    let mut output = open(&store, "output");
    output.register_pre_hook(mirror(Arc::clone(&output2), "X_"));
    let output = Arc::new(output);

    let mut input = open(&store, "input");
    input.register_pre_hook(mirror(Arc::clone(&output), "D_"));
    input.register_post_hook(counting_reader(Arc::clone(&input_posts)));

    Chain {
        store,
        input,
        output,
        output2,
        input_posts,
        output2_posts,
    }
}

pub fn count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}
