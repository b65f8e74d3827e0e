//! # Flows and the capabilities they expose.
//!
//! A flow is a single-producer, many-listener broadcast of values. Callers
//! depend on just the capabilities they need:
//!
//! | Capability  | Meaning                                                   | Broadcast | Replay | Never / Empty |
//! |-------------|-----------------------------------------------------------|:---------:|:------:|:-------------:|
//! | [`Listen`]  | subscribe; receive an ordered, cancellable [`Listener`]   | ✓         | ✓      | ✓             |
//! | [`Push`]    | append values                                             | ✓         | ✓      |               |
//! | [`Close`]   | append final values and end the flow (first call wins)    | ✓         | ✓      |               |
//! | [`Reset`]   | forget retained history and restart (no-op once closed)   |           | ✓      |               |
//!
//! [`Flow`] bundles all four.
//!
//! ## Policies
//! - [`Broadcast`] keeps no history: a listener sees only values pushed after it subscribed.
//! - [`Replay`] keeps history since creation or the last reset: a new listener replays it first.
//! - [`Never`] never yields and ends only on cancellation; [`Empty`] ends immediately.
//!
//! ## Example
//! ```rust
//! use flowcast::{Close, Push, Replay};
//! use futures::StreamExt;
//! use tokio_util::sync::CancellationToken;
//!
//! fn produce(flow: &(impl Push<u32> + Close<u32>)) {
//!     flow.push([1, 2]);
//!     flow.close([3]);
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let flow = Replay::new();
//! produce(&flow);
//!
//! let got: Vec<u32> = flow.listen(CancellationToken::new()).collect().await;
//! assert_eq!(got, vec![1, 2, 3]);
//! # }
//! ```

mod broadcast;
mod replay;
mod sentinel;

pub use broadcast::Broadcast;
pub use replay::Replay;
pub use sentinel::{Empty, Never};

use tokio_util::sync::CancellationToken;

use crate::listener::Listener;

/// Subscribe to a flow.
pub trait Listen<T> {
    /// Starts an independent listener.
    ///
    /// The listener yields values in push order and ends when the flow is
    /// closed or `token` is cancelled. Dropping it releases its position.
    fn listen(&self, token: CancellationToken) -> Listener<T>;
}

/// Append values to a flow.
pub trait Push<T> {
    /// Appends `values` in order. Never waits for listeners.
    ///
    /// Has no effect once the flow is closed.
    fn push<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>;
}

/// End a flow.
pub trait Close<T> {
    /// Appends final `values` (if any) and marks the flow closed.
    ///
    /// Every listener ends after receiving the final values. Safe to call
    /// more than once; only the first call appends anything.
    fn close<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>;
}

/// Restart a flow's retained history.
pub trait Reset<T> {
    /// Forgets what new listeners would replay and pushes `values` as the
    /// new starting point. Has no effect once the flow is closed.
    fn reset<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>;
}

/// All four capabilities together.
pub trait Flow<T>: Listen<T> + Push<T> + Close<T> + Reset<T> {}

impl<T, F> Flow<T> for F where F: Listen<T> + Push<T> + Close<T> + Reset<T> + ?Sized {}

impl<T, F: Listen<T> + ?Sized> Listen<T> for std::sync::Arc<F> {
    fn listen(&self, token: CancellationToken) -> Listener<T> {
        (**self).listen(token)
    }
}

impl<T, F: Push<T> + ?Sized> Push<T> for std::sync::Arc<F> {
    fn push<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        (**self).push(values)
    }
}

impl<T, F: Close<T> + ?Sized> Close<T> for std::sync::Arc<F> {
    fn close<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        (**self).close(values)
    }
}

impl<T, F: Reset<T> + ?Sized> Reset<T> for std::sync::Arc<F> {
    fn reset<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        (**self).reset(values)
    }
}
