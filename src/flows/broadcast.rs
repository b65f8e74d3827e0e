//! # Broadcast: a flow without history.
//!
//! [`Broadcast`] hands each pushed value to the listeners that were already
//! subscribed when it was pushed. A listener that subscribes later starts
//! after those values and only sees what is pushed from then on.
//!
//! ## How history is forgotten
//! Every push ends with an empty boundary node, and the tail moves onto it.
//! New listeners start at the tail, i.e. after the boundary:
//! ```text
//!  listener A (subscribed earlier)
//!     ▼
//!  [empty] ──► [a] ──► [b] ──► [boundary]
//!                                  ▲
//!                        listener B (subscribed after push)
//! ```
//! A receives `a, b`; B receives neither. Nodes before the earliest live
//! cursor are freed as soon as no listener references them.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::chain::{Base, Node};
use crate::flows::{Close, Listen, Push};
use crate::listener::Listener;

/// Non-replaying broadcast flow.
///
/// ### Properties
/// - **Lazy**: no allocation until first use; `new` is `const` so it can back a `static`.
/// - **Non-blocking**: `push`/`close` only extend the chain, whatever listeners are doing.
/// - **Closed is final**: after `close`, further `push`/`close` calls are ignored.
///
/// ## Example
/// ```rust
/// use flowcast::Broadcast;
/// use tokio_util::sync::CancellationToken;
///
/// let flow = Broadcast::new();
/// let mut early = flow.listen(CancellationToken::new());
///
/// flow.push(["a", "b"]);
/// let mut late = flow.listen(CancellationToken::new());
///
/// assert_eq!(early.try_recv(), Ok("a"));
/// assert_eq!(early.try_recv(), Ok("b"));
/// assert!(late.try_recv().is_err());
/// ```
pub struct Broadcast<T> {
    base: Base<T, ()>,
}

impl<T> Broadcast<T> {
    /// Creates an empty, open flow.
    pub const fn new() -> Self {
        Self { base: Base::new() }
    }

    /// Appends `values`, then a boundary so later listeners skip them.
    ///
    /// Listeners already subscribed receive the values in order.
    pub fn push(&self, values: impl IntoIterator<Item = T>) {
        self.base.initialize(|_| ()).mutate(|chain| {
            if chain.is_closed() {
                tracing::debug!("broadcast push ignored: flow closed");
                return;
            }
            let linked = chain.append_all(values);
            chain.reset_boundary();
            tracing::trace!(linked, "broadcast push");
        });
    }

    /// Appends final `values` and closes the flow. Only the first call has an effect.
    pub fn close(&self, values: impl IntoIterator<Item = T>) {
        self.base.initialize(|_| ()).mutate(|chain| {
            if chain.is_closed() {
                tracing::debug!("broadcast close ignored: already closed");
                return;
            }
            let linked = chain.append_all(values);
            chain.close_boundary();
            tracing::debug!(linked, "broadcast closed");
        });
    }

    /// Subscribes to values pushed from now on.
    ///
    /// On a closed flow the listener ends immediately.
    pub fn listen(&self, token: CancellationToken) -> Listener<T> {
        let start: Arc<Node<T>> = self
            .base
            .initialize(|_| ())
            .read_scoped(|chain| Arc::clone(&chain.tail));
        Listener::new(start, token)
    }

    /// True once [`close`](Self::close) has been called.
    ///
    /// Does not initialize the flow; an unused flow reports `false`.
    pub fn is_closed(&self) -> bool {
        self.base
            .get()
            .is_some_and(|frontier| frontier.read_scoped(|chain| chain.is_closed()))
    }
}

impl<T> Default for Broadcast<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcast")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T> Listen<T> for Broadcast<T> {
    fn listen(&self, token: CancellationToken) -> Listener<T> {
        Broadcast::listen(self, token)
    }
}

impl<T> Push<T> for Broadcast<T> {
    fn push<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        Broadcast::push(self, values)
    }
}

impl<T> Close<T> for Broadcast<T> {
    fn close<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        Broadcast::close(self, values)
    }
}
