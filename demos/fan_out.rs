//! # Fan-out Example
//!
//! Shows one producer feeding several independent listeners:
//! - a listener subscribed from the start (sees every value);
//! - a late listener on a [`Replay`] flow (replays history, then goes live);
//! - a listener cancelled part-way (stops without affecting the others).
//!
//! ## Run
//! ```bash
//! cargo run --example fan_out
//! ```

use std::{
    sync::Arc,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use flowcast::{Close, Listen, Listener, Push, Replay};
use tokio_util::sync::CancellationToken;

struct Counter {
    name: &'static str,
    received: AtomicU64,
    sum: AtomicU64,
}

impl Counter {
    fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            received: AtomicU64::new(0),
            sum: AtomicU64::new(0),
        })
    }

    fn print_stats(&self) {
        println!(
            " ├─► {:<10} received={:<4} sum={}",
            self.name,
            self.received.load(Ordering::Relaxed),
            self.sum.load(Ordering::Relaxed)
        );
    }
}

fn spawn_listener(mut listener: Listener<u64>, counter: Arc<Counter>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(v) = listener.recv().await {
            counter.received.fetch_add(1, Ordering::Relaxed);
            counter.sum.fetch_add(v, Ordering::Relaxed);
        }
    })
}

async fn produce(flow: Arc<impl Push<u64> + Close<u64>>) {
    for i in 1..=100 {
        flow.push([i]);
        if i % 10 == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
    flow.close([]);
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() {
    let flow = Arc::new(Replay::new());

    let early = Counter::new("early");
    let late = Counter::new("late");
    let cancelled = Counter::new("cancelled");

    let token = CancellationToken::new();
    let mut handles = vec![
        spawn_listener(flow.listen(CancellationToken::new()), Arc::clone(&early)),
        spawn_listener(flow.listen(token.clone()), Arc::clone(&cancelled)),
    ];

    let producer = tokio::spawn(produce(Arc::clone(&flow)));

    tokio::time::sleep(Duration::from_millis(20)).await;
    token.cancel();
    handles.push(spawn_listener(flow.listen(CancellationToken::new()), Arc::clone(&late)));

    let _ = producer.await;
    for h in handles {
        let _ = h.await;
    }

    println!("Listeners:");
    early.print_stats();
    late.print_stats();
    cancelled.print_stats();
}
