//! # Shared base: write frontier, lock discipline and lazy initialization.
//!
//! [`Base`] is embedded by every flow. It owns the chain's write frontier
//! (`tail`) plus a policy-specific anchor, guarded by a reader/writer lock,
//! and creates the first node lazily on first use.
//!
//! ## Lock discipline
//! ```text
//! push / reset / close ──► Frontier::mutate      (write lock)
//!                              └─► Chain::append_all / reset_boundary / close_boundary
//!
//! listen               ──► Frontier::read_scoped (read lock)
//!                              └─► clone tail/anchor as cursor, release
//!                                  (traversal afterwards is lock-free)
//! ```
//!
//! ## Rules
//! - `tail` only moves forward along one chain; it is never rewound.
//! - Initialization runs exactly once; concurrent callers block until done.
//! - The read lock is held only while capturing a cursor, never while waiting.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use super::node::Node;

/// Lazily initialized shared state of one flow.
///
/// `A` is the policy-specific anchor: `()` when new listeners start at the
/// tail, `Arc<Node<T>>` when they replay from a retained starting point.
pub(crate) struct Base<T, A> {
    frontier: OnceLock<Frontier<T, A>>,
}

impl<T, A> Base<T, A> {
    /// Creates an uninitialized base. No allocation happens until first use.
    pub(crate) const fn new() -> Self {
        Self {
            frontier: OnceLock::new(),
        }
    }

    /// Returns the frontier if some caller has initialized it already.
    #[inline]
    pub(crate) fn get(&self) -> Option<&Frontier<T, A>> {
        self.frontier.get()
    }

    /// Returns the initialized frontier, creating the first node on first call.
    ///
    /// `on_first_init` runs exactly once across all callers, receiving the
    /// freshly created head so the policy can derive its anchor from it.
    pub(crate) fn initialize(
        &self,
        on_first_init: impl FnOnce(&Arc<Node<T>>) -> A,
    ) -> &Frontier<T, A> {
        self.frontier.get_or_init(|| {
            let head = Node::empty();
            let anchor = on_first_init(&head);
            tracing::trace!("flow initialized");
            Frontier {
                chain: RwLock::new(Chain { tail: head, anchor }),
            }
        })
    }
}

/// Lock around the mutable chain pointers.
pub(crate) struct Frontier<T, A> {
    chain: RwLock<Chain<T, A>>,
}

impl<T, A> Frontier<T, A> {
    /// Runs `f` under the write lock.
    ///
    /// A poisoned lock is recovered: every step of `f` leaves the chain linked.
    pub(crate) fn mutate<R>(&self, f: impl FnOnce(&mut Chain<T, A>) -> R) -> R {
        let mut chain = self.chain.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut chain)
    }

    /// Runs `f` under the read lock.
    pub(crate) fn read_scoped<R>(&self, f: impl FnOnce(&Chain<T, A>) -> R) -> R {
        let chain = self.chain.read().unwrap_or_else(PoisonError::into_inner);
        f(&chain)
    }
}

/// The mutable pointers into the chain. Only reachable through [`Frontier`].
pub(crate) struct Chain<T, A> {
    /// Most recently appended node.
    pub(crate) tail: Arc<Node<T>>,
    /// Policy-specific starting point for new listeners.
    pub(crate) anchor: A,
}

impl<T, A> Chain<T, A> {
    /// Appends every value in order, advancing `tail`. Returns how many were linked.
    pub(crate) fn append_all(&mut self, values: impl IntoIterator<Item = T>) -> usize {
        let mut linked = 0;
        for value in values {
            if self.tail.is_last() {
                break;
            }
            self.tail = self.tail.push(value);
            linked += 1;
        }
        linked
    }

    /// Appends an empty boundary node and moves `tail` onto it.
    pub(crate) fn reset_boundary(&mut self) {
        self.tail = self.tail.mark_reset();
    }

    /// Appends the terminal node and moves `tail` onto it.
    pub(crate) fn close_boundary(&mut self) {
        self.tail = self.tail.mark_close();
    }

    /// True once the terminal node has been appended.
    #[inline]
    pub(crate) fn is_closed(&self) -> bool {
        self.tail.is_last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn collect(from: &Arc<Node<u32>>) -> Vec<u32> {
        let mut out = Vec::new();
        let mut cur = Some(Arc::clone(from));
        while let Some(node) = cur {
            out.extend(node.value().copied());
            cur = node.next().cloned();
        }
        out
    }

    #[test]
    fn test_initialize_runs_once() {
        let base: Base<u32, ()> = Base::new();
        let calls = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    base.initialize(|_| {
                        calls.fetch_add(1, Ordering::SeqCst);
                    });
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_get_before_and_after_initialize() {
        let base: Base<u32, ()> = Base::new();
        assert!(base.get().is_none());

        base.initialize(|_| ());
        let frontier = base.get().expect("initialized");
        frontier.read_scoped(|chain| assert!(!chain.is_closed()));
    }

    #[test]
    fn test_anchor_seeded_from_head() {
        let base: Base<u32, Arc<Node<u32>>> = Base::new();
        let frontier = base.initialize(Arc::clone);
        frontier.read_scoped(|chain| assert!(Arc::ptr_eq(&chain.tail, &chain.anchor)));
    }

    #[test]
    fn test_append_all_in_order() {
        let base: Base<u32, Arc<Node<u32>>> = Base::new();
        let frontier = base.initialize(Arc::clone);

        let linked = frontier.mutate(|chain| chain.append_all([1, 2, 3]));
        assert_eq!(linked, 3);

        let (tail, anchor) = frontier.read_scoped(|c| (c.tail.clone(), c.anchor.clone()));
        assert_eq!(tail.value(), Some(&3));
        assert_eq!(collect(&anchor), vec![1, 2, 3]);
    }

    #[test]
    fn test_boundaries_and_close() {
        let base: Base<u32, ()> = Base::new();
        let frontier = base.initialize(|_| ());

        frontier.mutate(|chain| {
            chain.append_all([1]);
            chain.reset_boundary();
            assert!(chain.tail.value().is_none());
            assert!(!chain.is_closed());

            chain.close_boundary();
            assert!(chain.is_closed());

            assert_eq!(chain.append_all([2, 3]), 0);
            chain.reset_boundary();
            assert!(chain.is_closed());
        });
    }

    #[test]
    fn test_mutate_recovers_from_poison() {
        let base: Base<u32, ()> = Base::new();
        let frontier = base.initialize(|_| ());

        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            frontier.mutate(|chain| -> usize {
                chain.append_all([1]);
                panic!("boom")
            })
        }));
        assert!(res.is_err());

        let linked = frontier.mutate(|chain| chain.append_all([2]));
        assert_eq!(linked, 1);
        frontier.read_scoped(|chain| assert_eq!(chain.tail.value(), Some(&2)));
    }
}
