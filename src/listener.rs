//! # Listener: one independent, cancellable traversal of a chain.
//!
//! A [`Listener`] owns a cursor into a flow's chain and walks it node by node.
//! It is a [`Stream`] of cloned values that ends when either:
//! - its [`CancellationToken`] is cancelled (immediately, nothing more is yielded), or
//! - the terminal node is reached (the flow was closed).
//!
//! ## Traversal
//! ```text
//! loop {
//!   ├─► token cancelled or node terminal ─► end
//!   ├─► node carries a value not yet yielded ─► yield clone
//!   ├─► successor linked ─► advance
//!   └─► wait on (token.cancelled | node.ready) ─► repeat
//! }
//! ```
//!
//! ## Rules
//! - No lock is held while waiting; each listener waits on the node's own gate.
//! - Cancellation is checked before every yield, so a value the consumer has
//!   not taken yet is dropped once the token fires.
//! - Listeners never interfere with each other or with producers.
//! - A listener that is neither polled nor dropped keeps its cursor (and every
//!   node after it) alive. Drop it or cancel its token when done.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::StreamExt;
use futures::stream::{FusedStream, Stream};
use tokio_util::sync::{CancellationToken, ReusableBoxFuture};

use crate::chain::Node;
use crate::error::{RecvError, TryRecvError};

/// Outcome of one non-blocking traversal step.
enum Step<T> {
    Item(T),
    Ended,
    Wait,
}

/// Ordered stream of values observed from a flow.
///
/// Created by [`Listen::listen`](crate::Listen::listen). Values are cloned out
/// of shared nodes, so every listener sees every value it is positioned for.
pub struct Listener<T> {
    /// Current node; `None` once the listener has ended.
    cursor: Option<Arc<Node<T>>>,
    /// True while the cursor's own value has not been yielded.
    pending: bool,
    token: CancellationToken,
    /// Completes when `token` is cancelled.
    cancelled: ReusableBoxFuture<'static, ()>,
    /// Completes when the cursor's successor is linked.
    ready: ReusableBoxFuture<'static, ()>,
}

impl<T> Listener<T> {
    /// Starts a traversal at `start`, yielding `start`'s own value first.
    pub(crate) fn new(start: Arc<Node<T>>, token: CancellationToken) -> Self {
        let cancelled = ReusableBoxFuture::new(token.clone().cancelled_owned());
        let ready = ReusableBoxFuture::new(start.ready().cancelled_owned());
        Self {
            cursor: Some(start),
            pending: true,
            token,
            cancelled,
            ready,
        }
    }

    /// True once the listener has ended and will yield nothing more.
    ///
    /// Only observed on the next receive attempt: a token cancelled in the
    /// meantime is not reflected until then.
    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.cursor.is_none()
    }

    /// Token this listener is bound to.
    #[inline]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    fn advance(&mut self, next: Arc<Node<T>>) {
        self.ready.set(next.ready().cancelled_owned());
        self.cursor = Some(next);
        self.pending = true;
    }

    fn finish(&mut self, reason: &'static str) {
        if self.cursor.take().is_some() {
            tracing::trace!(reason, "listener ended");
        }
    }
}

impl<T: Clone> Listener<T> {
    /// Walks as far as possible without waiting.
    fn step(&mut self) -> Step<T> {
        loop {
            let Some(node) = self.cursor.as_ref() else {
                return Step::Ended;
            };
            if self.token.is_cancelled() {
                self.finish("cancelled");
                return Step::Ended;
            }
            if node.is_last() {
                self.finish("closed");
                return Step::Ended;
            }
            if self.pending {
                self.pending = false;
                if let Some(value) = node.value() {
                    return Step::Item(value.clone());
                }
            }
            match node.next().cloned() {
                Some(next) => self.advance(next),
                None => return Step::Wait,
            }
        }
    }

    /// Receives the next value, waiting if none is available yet.
    ///
    /// Returns `None` once the flow is closed or the token is cancelled.
    pub async fn recv(&mut self) -> Option<T> {
        self.next().await
    }

    /// Receives the next value without waiting.
    ///
    /// # Errors
    /// - [`TryRecvError::Empty`] if nothing new has been pushed yet;
    /// - [`TryRecvError::Closed`] if the listener has ended.
    pub fn try_recv(&mut self) -> Result<T, TryRecvError> {
        match self.step() {
            Step::Item(value) => Ok(value),
            Step::Ended => Err(TryRecvError::Closed),
            Step::Wait => Err(TryRecvError::Empty),
        }
    }

    /// Receives the next value, waiting at most `timeout`.
    ///
    /// Must be called within a tokio runtime with the time driver enabled.
    ///
    /// # Errors
    /// - [`RecvError::Timeout`] if nothing arrived in time (the listener stays usable);
    /// - [`RecvError::Closed`] if the listener has ended.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Result<T, RecvError> {
        match tokio::time::timeout(timeout, self.recv()).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(RecvError::Closed),
            Err(_) => Err(RecvError::Timeout { timeout }),
        }
    }
}

impl<T: Clone> Stream for Listener<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        // Every field is Unpin.
        let this = self.get_mut();
        loop {
            match this.step() {
                Step::Item(value) => return Poll::Ready(Some(value)),
                Step::Ended => return Poll::Ready(None),
                Step::Wait => {}
            }
            if this.cancelled.poll(cx).is_ready() {
                this.finish("cancelled");
                return Poll::Ready(None);
            }
            if this.ready.poll(cx).is_pending() {
                return Poll::Pending;
            }
            // Successor is linked now; the next step advances onto it.
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.cursor {
            Some(_) => (0, None),
            None => (0, Some(0)),
        }
    }
}

impl<T: Clone> FusedStream for Listener<T> {
    fn is_terminated(&self) -> bool {
        self.cursor.is_none()
    }
}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("terminated", &self.cursor.is_none())
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUARD: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_yields_in_order_then_ends_on_close() {
        let head = Node::<u32>::empty();
        let mut l = Listener::new(Arc::clone(&head), CancellationToken::new());

        head.push(1).push(2).mark_close();

        let got: Vec<u32> = tokio::time::timeout(GUARD, l.by_ref().collect())
            .await
            .expect("listener hung");
        assert_eq!(got, vec![1, 2]);
        assert!(l.is_terminated());
        assert_eq!(l.recv().await, None);
    }

    #[tokio::test]
    async fn test_start_node_value_is_yielded() {
        let head = Node::<u32>::empty();
        let start = head.push(9);
        let mut l = Listener::new(Arc::clone(&start), CancellationToken::new());
        start.push(10);

        assert_eq!(l.try_recv(), Ok(9));
        assert_eq!(l.try_recv(), Ok(10));
        assert_eq!(l.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_try_recv_empty_then_closed() {
        let head = Node::<u32>::empty();
        let mut l = Listener::new(Arc::clone(&head), CancellationToken::new());

        assert_eq!(l.try_recv(), Err(TryRecvError::Empty));
        head.push(5);
        assert_eq!(l.try_recv(), Ok(5));
        head.mark_close();
        assert_eq!(l.try_recv(), Err(TryRecvError::Closed));
        assert!(l.is_terminated());
    }

    #[tokio::test]
    async fn test_wakes_on_later_push() {
        let head = Node::<u32>::empty();
        let mut l = Listener::new(Arc::clone(&head), CancellationToken::new());

        let producer = Arc::clone(&head);
        let task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            producer.push(42);
        });

        let got = tokio::time::timeout(GUARD, l.recv()).await.expect("listener hung");
        assert_eq!(got, Some(42));
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_drops_unread_values() {
        let head = Node::<u32>::empty();
        let token = CancellationToken::new();
        let mut l = Listener::new(Arc::clone(&head), token.clone());

        head.push(1).push(2);
        token.cancel();

        assert_eq!(l.recv().await, None);
        assert!(l.is_terminated());
    }

    #[tokio::test]
    async fn test_cancel_wakes_waiting_listener() {
        let head = Node::<u32>::empty();
        let token = CancellationToken::new();
        let mut l = Listener::new(Arc::clone(&head), token.clone());

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let got = tokio::time::timeout(GUARD, l.recv()).await.expect("listener hung");
        assert_eq!(got, None);
        // Producer is unaffected.
        assert_eq!(head.push(1).value(), Some(&1));
    }

    #[tokio::test]
    async fn test_recv_timeout() {
        let head = Node::<u32>::empty();
        let mut l = Listener::new(Arc::clone(&head), CancellationToken::new());

        let err = l.recv_timeout(Duration::from_millis(10)).await.unwrap_err();
        assert_eq!(
            err,
            RecvError::Timeout {
                timeout: Duration::from_millis(10)
            }
        );
        assert!(!l.is_terminated());

        head.push(3).mark_close();
        assert_eq!(l.recv_timeout(GUARD).await, Ok(3));
        assert_eq!(l.recv_timeout(GUARD).await, Err(RecvError::Closed));
    }

    #[tokio::test]
    async fn test_skips_empty_boundaries() {
        let head = Node::<u32>::empty();
        let l = Listener::new(Arc::clone(&head), CancellationToken::new());

        head.mark_reset()
            .push(1)
            .mark_reset()
            .mark_reset()
            .push(2)
            .mark_close();

        let got: Vec<u32> = tokio::time::timeout(GUARD, l.collect())
            .await
            .expect("listener hung");
        assert_eq!(got, vec![1, 2]);
    }
}
