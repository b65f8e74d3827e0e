//! # flowcast
//!
//! **flowcast** is a small multi-listener broadcast library for Rust.
//!
//! A single producer pushes a sequence of values into a *flow*; any number of
//! independent listeners each receive an ordered view of that sequence,
//! starting from a point determined by the flow's policy, and end cleanly on
//! close or on their own cancellation.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   producer ── push / reset / close ──┐
//!                                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Flow (Broadcast | Replay)                                        │
//! │  - Base: lazily created first node, RwLock over {tail, anchor}    │
//! │  - write lock: extend the chain, move tail (and anchor on reset)  │
//! │  - read lock:  capture a starting node for a new listener         │
//! └───────────────────────────────┬───────────────────────────────────┘
//!                                 ▼
//!   [empty] ──► [v1] ──► [v2] ──► [boundary] ──► [v3] ──► [last]
//!      ▲                  ▲                        ▲
//!      │                  │                        │
//!   Listener 1         Listener 2               Listener N
//!   (own cursor,       (own cursor,             (own cursor,
//!    own token)         own token)               own token)
//! ```
//!
//! Each node is linked to its successor exactly once and fires a one-shot
//! `ready` gate at that moment. Listeners wait on the gate of the node they
//! stand on, without holding any lock, racing their own cancellation token.
//!
//! ### Listener loop
//! ```text
//! loop {
//!   ├─► token cancelled            ─► end (nothing more is yielded)
//!   ├─► node is terminal           ─► end
//!   ├─► node carries a value       ─► yield a clone
//!   └─► wait: node.ready | token.cancelled
//!         └─► ready ─► advance to node.next
//! }
//! ```
//!
//! ## Features
//! | Area             | Description                                                        | Key types / traits                       |
//! |------------------|--------------------------------------------------------------------|------------------------------------------|
//! | **Flows**        | No-history and replaying broadcast policies                        | [`Broadcast`], [`Replay`]                |
//! | **Sentinels**    | Flows that never produce / are already finished                    | [`Never`], [`Empty`]                     |
//! | **Capabilities** | Depend only on what you use                                        | [`Listen`], [`Push`], [`Close`], [`Reset`], [`Flow`] |
//! | **Listening**    | Cancellable ordered `Stream`, plus `recv` / `try_recv` / timeouts  | [`Listener`]                             |
//! | **Errors**       | Typed receive outcomes                                             | [`TryRecvError`], [`RecvError`]          |
//!
//! ## Guarantees
//! - Every listener sees a contiguous run of the true push order: no reordering,
//!   no duplicates, no gaps (unless its token fires).
//! - Producers never wait for listeners; values are kept in the chain until
//!   every listener positioned before them has moved past or gone away.
//! - `close` is idempotent; after it, `push` and `reset` are ignored.
//!
//! ## Example
//! ```rust
//! use futures::StreamExt;
//! use tokio_util::sync::CancellationToken;
//! use flowcast::{Broadcast, Replay};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     // No history: only listeners subscribed before a push see it.
//!     let live = Broadcast::new();
//!     let early = live.listen(CancellationToken::new());
//!     live.push(["tick"]);
//!     let late = live.listen(CancellationToken::new());
//!     live.close(["done"]);
//!
//!     assert_eq!(early.collect::<Vec<_>>().await, vec!["tick", "done"]);
//!     assert_eq!(late.collect::<Vec<_>>().await, vec!["done"]);
//!
//!     // Replaying: late listeners get everything since the last reset.
//!     let state = Replay::new();
//!     state.push([1, 2]);
//!     state.reset([9]);
//!     state.push([10]);
//!     state.close([]);
//!
//!     let seen: Vec<u32> = state.listen(CancellationToken::new()).collect().await;
//!     assert_eq!(seen, vec![9, 10]);
//! }
//! ```
mod chain;
mod error;
mod flows;
mod listener;

// ---- Public re-exports ----

pub use error::{RecvError, TryRecvError};
pub use flows::{Broadcast, Close, Empty, Flow, Listen, Never, Push, Replay, Reset};
pub use listener::Listener;
