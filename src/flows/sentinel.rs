//! Degenerate flows with no shared state.
//!
//! - [`Never`] yields nothing; its listeners end only when their token is cancelled.
//! - [`Empty`] is already finished; its listeners end immediately.
//!
//! Both hand out a listener over a private node: an unlinked one for `Never`,
//! a terminal one for `Empty`.

use std::fmt;
use std::marker::PhantomData;

use tokio_util::sync::CancellationToken;

use crate::chain::Node;
use crate::flows::Listen;
use crate::listener::Listener;

/// A flow that never produces a value.
pub struct Never<T>(PhantomData<fn() -> T>);

impl<T> Never<T> {
    /// Creates a flow whose listeners wait only for their token.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Listen<T> for Never<T> {
    fn listen(&self, token: CancellationToken) -> Listener<T> {
        Listener::new(Node::empty(), token)
    }
}

/// A flow that is already closed.
pub struct Empty<T>(PhantomData<fn() -> T>);

impl<T> Empty<T> {
    /// Creates a flow whose listeners end immediately.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Listen<T> for Empty<T> {
    fn listen(&self, token: CancellationToken) -> Listener<T> {
        Listener::new(Node::terminal(), token)
    }
}

impl<T> Default for Never<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Default for Empty<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Never<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Never<T> {}

impl<T> Clone for Empty<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Empty<T> {}

impl<T> fmt::Debug for Never<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Never")
    }
}

impl<T> fmt::Debug for Empty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Empty")
    }
}
