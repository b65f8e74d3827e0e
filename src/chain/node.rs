//! # Signal node: one append-once cell of a broadcast chain.
//!
//! A [`Node`] is immutable once created except for a single transition:
//! its `next` slot is linked exactly once, and at that moment its `ready`
//! gate fires. Any number of listeners may wait on the same gate; none of
//! them holds a lock while waiting.
//!
//! ## Shape of a chain
//! ```text
//!  [empty] ──► [v=1] ──► [v=2] ──► [empty] ──► [v=3] ──► [last]
//!     │           │         │          │          │
//!   ready       ready     ready      ready      ready     (never fires)
//!   fired       fired     fired      fired      fired
//! ```
//!
//! ## Rules
//! - `next` goes from empty to linked at most once and never changes again.
//! - `ready` fires exactly when `next` is linked and stays fired.
//! - A `last` node is never followed; appends that reach it return it unchanged.
//! - A node never carries a value and the `last` flag at the same time.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

/// One cell of the chain.
pub(crate) struct Node<T> {
    value: Option<T>,
    last: bool,
    next: OnceLock<Arc<Node<T>>>,
    /// Fired once, right after `next` is linked.
    ready: CancellationToken,
}

impl<T> Node<T> {
    /// Creates an empty, unlinked node.
    pub(crate) fn empty() -> Arc<Self> {
        Arc::new(Self::with(None, false))
    }

    /// Creates a terminal node.
    pub(crate) fn terminal() -> Arc<Self> {
        Arc::new(Self::with(None, true))
    }

    fn with(value: Option<T>, last: bool) -> Self {
        Self {
            value,
            last,
            next: OnceLock::new(),
            ready: CancellationToken::new(),
        }
    }

    /// Value carried by this node, if any.
    #[inline]
    pub(crate) fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// True if this node marks the end of the stream.
    #[inline]
    pub(crate) fn is_last(&self) -> bool {
        self.last
    }

    /// Successor, if it has been linked already.
    #[inline]
    pub(crate) fn next(&self) -> Option<&Arc<Node<T>>> {
        self.next.get()
    }

    /// Gate that fires once a successor is linked.
    ///
    /// Returns a clone so waiters can own it (`cancelled_owned`).
    #[inline]
    pub(crate) fn ready(&self) -> CancellationToken {
        self.ready.clone()
    }

    /// Appends a value-carrying node after the true tail reachable from `self`.
    pub(crate) fn push(self: &Arc<Self>, value: T) -> Arc<Node<T>> {
        self.link(Self::with(Some(value), false))
    }

    /// Appends an empty node; used as a forget/reset boundary.
    pub(crate) fn mark_reset(self: &Arc<Self>) -> Arc<Node<T>> {
        self.link(Self::with(None, false))
    }

    /// Appends a terminal node. Every later append becomes a no-op.
    pub(crate) fn mark_close(self: &Arc<Self>) -> Arc<Node<T>> {
        self.link(Self::with(None, true))
    }

    /// Links `fresh` after the true tail and fires that tail's gate.
    ///
    /// Walks `next` until an unlinked node is found. If a terminal node is met
    /// on the way, `fresh` is discarded and the terminal node is returned.
    fn link(self: &Arc<Self>, fresh: Node<T>) -> Arc<Node<T>> {
        let mut fresh = Arc::new(fresh);
        let mut cur = Arc::clone(self);
        loop {
            if cur.last {
                return cur;
            }
            if let Some(next) = cur.next.get() {
                cur = Arc::clone(next);
                continue;
            }
            match cur.next.set(Arc::clone(&fresh)) {
                Ok(()) => {
                    cur.ready.cancel();
                    return fresh;
                }
                // Lost a race against another appender; keep walking.
                Err(back) => fresh = back,
            }
        }
    }
}

impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        // Unlink successors iteratively so long chains do not recurse.
        let mut next = self.next.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut owned) => next = owned.next.take(),
                Err(_) => break,
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("value", &self.value)
            .field("last", &self.last)
            .field("linked", &self.next.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(from: &Arc<Node<u32>>) -> Vec<u32> {
        let mut out = Vec::new();
        let mut cur = Some(Arc::clone(from));
        while let Some(node) = cur {
            out.extend(node.value().copied());
            cur = node.next().cloned();
        }
        out
    }

    #[test]
    fn test_push_links_and_fires_ready() {
        let head = Node::<u32>::empty();
        let ready = head.ready();
        assert!(!ready.is_cancelled());
        assert!(head.next().is_none());

        let tail = head.push(1);
        assert!(ready.is_cancelled());
        assert_eq!(tail.value(), Some(&1));
        assert!(Arc::ptr_eq(head.next().unwrap(), &tail));
        assert!(!tail.ready().is_cancelled());
    }

    #[test]
    fn test_push_from_stale_node_walks_to_tail() {
        let head = Node::<u32>::empty();
        head.push(1).push(2);

        // Appending through the head still lands after the true tail.
        let tail = head.push(3);
        assert_eq!(tail.value(), Some(&3));
        assert_eq!(values(&head), vec![1, 2, 3]);
    }

    #[test]
    fn test_mark_reset_is_empty() {
        let head = Node::<u32>::empty();
        let boundary = head.push(7).mark_reset();
        assert!(boundary.value().is_none());
        assert!(!boundary.is_last());
        assert_eq!(values(&head), vec![7]);
    }

    #[test]
    fn test_append_after_close_is_noop() {
        let head = Node::<u32>::empty();
        let last = head.push(1).mark_close();
        assert!(last.is_last());
        assert!(last.value().is_none());

        assert!(Arc::ptr_eq(&head.push(2), &last));
        assert!(Arc::ptr_eq(&head.mark_reset(), &last));
        assert!(Arc::ptr_eq(&last.mark_close(), &last));
        assert!(last.next().is_none());
        assert!(!last.ready().is_cancelled());
        assert_eq!(values(&head), vec![1]);
    }

    #[test]
    fn test_terminal_and_empty_constructors() {
        let t = Node::<u32>::terminal();
        assert!(t.is_last());
        assert!(Arc::ptr_eq(&t.push(1), &t));

        let e = Node::<u32>::empty();
        assert!(!e.is_last());
        assert!(e.value().is_none());
    }

    #[test]
    fn test_concurrent_appenders_never_lose_nodes() {
        let head = Node::<u32>::empty();
        std::thread::scope(|s| {
            for t in 0..4u32 {
                let head = &head;
                s.spawn(move || {
                    for i in 0..250 {
                        head.push(t * 1000 + i);
                    }
                });
            }
        });

        let mut seen = values(&head);
        assert_eq!(seen.len(), 1000);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_drop_long_chain_does_not_overflow() {
        let head = Node::<u64>::empty();
        let mut tail = Arc::clone(&head);
        for i in 0..1_000_000 {
            tail = tail.push(i);
        }
        drop(tail);
        drop(head);
    }

    #[test]
    fn test_drop_stops_at_shared_node() {
        let head = Node::<u32>::empty();
        let mid = head.push(1);
        mid.push(2);
        drop(head);

        // `mid` is still owned here, so its successors must survive.
        assert_eq!(values(&mid), vec![1, 2]);
    }
}
