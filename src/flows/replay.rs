//! # Replay: a flow that keeps its history until reset.
//!
//! [`Replay`] retains every value pushed since creation or the last
//! [`reset`](Replay::reset). A listener that subscribes late first replays
//! that history, then continues live, then ends on close.
//!
//! ## Anchor
//! The flow keeps an `anchor` node next to the write `tail`. Listeners start
//! at the anchor, not the tail. Pushes leave the anchor in place; a reset
//! writes a boundary, appends its values and moves the anchor onto the new tail:
//! ```text
//!  anchor (before reset)                    anchor (after reset([8, 9]))
//!     ▼                                                       ▼
//!  [empty] ──► [1] ──► [2] ──► [boundary] ──► [8] ──────────► [9] ──► ...
//!                                                              ▲
//!                                                             tail
//! ```
//! A reset with several values therefore replays only the last of them; a
//! reset without values anchors on the boundary and replays nothing.
//!
//! ## Rules
//! - Everything from the anchor onward stays in memory; there is no bound.
//! - Listeners that captured an older anchor keep walking the old chain.
//! - A reset that lands on a closed chain leaves the anchor alone, so a
//!   closed flow cannot be revived and no listener loses the terminal node.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::chain::{Base, Node};
use crate::flows::{Close, Listen, Push, Reset};
use crate::listener::Listener;

/// Replaying broadcast flow.
///
/// ### Properties
/// - **Lazy**: no allocation until first use; `new` is `const` so it can back a `static`.
/// - **Non-blocking**: `push`/`reset`/`close` only extend the chain.
/// - **Closed is final**: after `close`, further `push`/`reset`/`close` calls are ignored.
///
/// ## Example
/// ```rust
/// use flowcast::Replay;
/// use tokio_util::sync::CancellationToken;
///
/// let flow = Replay::new();
/// flow.push([1, 2]);
///
/// let mut late = flow.listen(CancellationToken::new());
/// flow.push([3]);
///
/// assert_eq!(late.try_recv(), Ok(1));
/// assert_eq!(late.try_recv(), Ok(2));
/// assert_eq!(late.try_recv(), Ok(3));
/// ```
pub struct Replay<T> {
    base: Base<T, Arc<Node<T>>>,
}

impl<T> Replay<T> {
    /// Creates an empty, open flow.
    pub const fn new() -> Self {
        Self { base: Base::new() }
    }

    /// Appends `values` to the retained history.
    pub fn push(&self, values: impl IntoIterator<Item = T>) {
        self.base.initialize(Arc::clone).mutate(|chain| {
            if chain.is_closed() {
                tracing::debug!("replay push ignored: flow closed");
                return;
            }
            let linked = chain.append_all(values);
            tracing::trace!(linked, "replay push");
        });
    }

    /// Drops the retained history and restarts it at the last of `values`.
    ///
    /// Listeners created afterwards start at the new tail: the last value of
    /// `values` (if any) and what follows.
    /// Existing listeners are unaffected. No effect on a closed flow.
    pub fn reset(&self, values: impl IntoIterator<Item = T>) {
        self.base.initialize(Arc::clone).mutate(|chain| {
            chain.reset_boundary();
            let linked = chain.append_all(values);
            // Decided after appending: a closed chain must keep its anchor.
            if chain.is_closed() {
                tracing::debug!("replay reset ignored: flow closed");
                return;
            }
            chain.anchor = Arc::clone(&chain.tail);
            tracing::trace!(linked, "replay reset");
        });
    }

    /// Appends final `values` and closes the flow. Only the first call has an effect.
    pub fn close(&self, values: impl IntoIterator<Item = T>) {
        self.base.initialize(Arc::clone).mutate(|chain| {
            if chain.is_closed() {
                tracing::debug!("replay close ignored: already closed");
                return;
            }
            let linked = chain.append_all(values);
            chain.close_boundary();
            tracing::debug!(linked, "replay closed");
        });
    }

    /// Subscribes from the anchor: retained history first, then live values.
    ///
    /// On a closed flow the listener drains the retained history and ends.
    pub fn listen(&self, token: CancellationToken) -> Listener<T> {
        let start = self
            .base
            .initialize(Arc::clone)
            .read_scoped(|chain| Arc::clone(&chain.anchor));
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

impl<T> Default for Replay<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Replay<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Replay")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T> Listen<T> for Replay<T> {
    fn listen(&self, token: CancellationToken) -> Listener<T> {
        Replay::listen(self, token)
    }
}

impl<T> Push<T> for Replay<T> {
    fn push<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        Replay::push(self, values)
    }
}

impl<T> Close<T> for Replay<T> {
    fn close<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        Replay::close(self, values)
    }
}

impl<T> Reset<T> for Replay<T> {
    fn reset<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        Replay::reset(self, values)
    }
}
