//! Append-once signal chain shared by all flows.
//!
//! ## Contents
//! - [`Node`](node::Node) one cell with an optional value, a terminal flag and a one-shot `ready` gate
//! - [`Base`](base::Base) lazily initialized write frontier behind a reader/writer lock
//!
//! Producers extend the chain under the write lock; listeners capture a
//! starting node under the read lock and then walk it on their own.

mod base;
mod node;

pub(crate) use base::Base;
pub(crate) use node::Node;
