//! Post-hook tests
//!
//! Tests verify:
//! - Each post-hook fires exactly once per committed key
//! - Post-hooks read the value that was just committed
//! - Deletes arrive as `None`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::support::{chain, count, counting_reader, mirror, open, setup_store};

#[test]
fn test_post_hook_counts_across_chain() {
    let chain = chain();

    chain.input.put(b"Name", b"Horst").unwrap();
    assert_eq!(count(&chain.input_posts), 1);
    assert_eq!(count(&chain.output2_posts), 1);

    chain.input.delete(b"Name").unwrap();
    assert_eq!(count(&chain.input_posts), 2);
    assert_eq!(count(&chain.output2_posts), 2);

    chain.input.put(b"Color", b"Red").unwrap();
    assert_eq!(count(&chain.input_posts), 3);
    assert_eq!(count(&chain.output2_posts), 3);
}

#[test]
fn test_multiple_post_hooks_each_fire_once() {
    let store = setup_store();
    let counters: Vec<Arc<AtomicUsize>> = (0..5).map(|_| Arc::new(AtomicUsize::new(0))).collect();

    let mut sink = open(&store, "sink");
    for counter in &counters[3..] {
        sink.register_post_hook(counting_reader(Arc::clone(counter)));
    }
    let sink = Arc::new(sink);

    let mut source = open(&store, "source");
    source.register_pre_hook(mirror(Arc::clone(&sink), "copy_"));
    for counter in &counters[..3] {
        source.register_post_hook(counting_reader(Arc::clone(counter)));
    }

    source.put(b"k", b"v").unwrap();

    for counter in &counters {
        assert_eq!(count(counter), 1);
    }
}

#[test]
fn test_post_hook_sees_delete_as_none() {
    let store = setup_store();
    let deletes = Arc::new(AtomicUsize::new(0));

    let mut ns = open(&store, "ns");
    let deletes_in_hook = Arc::clone(&deletes);
    ns.register_post_hook(move |_, value, ns| {
        if value.is_none() {
            deletes_in_hook.fetch_add(1, Ordering::SeqCst);
            assert_eq!(ns.get(b"k")?, None);
        }
        Ok(())
    });

    ns.put(b"k", b"v").unwrap();
    ns.delete(b"k").unwrap();

    assert_eq!(count(&deletes), 1);
}

#[test]
fn test_post_hook_observes_committed_state() {
    let chain = chain();

    // counting_reader fails the write if the store disagrees with the hook
    for i in 0..10 {
        let key = format!("key{}", i);
        chain.input.put(key.as_bytes(), b"value").unwrap();
    }
    chain.input.delete(b"key3").unwrap();

    assert_eq!(count(&chain.input_posts), 11);
    assert_eq!(count(&chain.output2_posts), 11);
}

#[test]
fn test_namespace_without_post_hooks_is_skipped() {
    let chain = chain();

    chain.input.put(b"k", b"v").unwrap();

    // output is touched but has no post-hooks; input and output2 still fire
    assert_eq!(chain.output.post_hook_count(), 0);
    assert_eq!(count(&chain.input_posts), 1);
    assert_eq!(count(&chain.output2_posts), 1);
}
