//! A wait group whose tasks can rendezvous with each other.
//!
//! [`RendezvousGroup`] tracks a set of tasks like a wait group: tasks are
//! registered, launched on their own threads, and [`RendezvousGroup::wait`]
//! blocks until all of them have completed. In addition, a running task can
//! call [`Member::rendezvous`] to pause until every other outstanding task
//! has either completed or paused as well, after which all of them resume
//! together. The rendezvous can be repeated any number of times.
//!
//! This is designed for adaptive batching: a task adds its request to a
//! shared batch and then waits at the rendezvous until all sibling tasks
//! have joined the batch or finished, at which point one of them flushes
//! the batch for everybody.
//!
//! # Usage
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//!
//! use rendezvous_group::RendezvousGroup;
//!
//! #[derive(Default)]
//! struct Batch {
//!     pending: Vec<usize>,
//!     results: Vec<usize>,
//!     flushes: usize,
//! }
//!
//! let group = RendezvousGroup::new();
//! let batch = Arc::new(Mutex::new(Batch::default()));
//!
//! group.register(8);
//! for i in 0..8 {
//!     let batch = batch.clone();
//!     group.launch(move |member| {
//!         batch.lock().unwrap().pending.push(i);
//!         if member.rendezvous().is_leader() {
//!             let mut batch = batch.lock().unwrap();
//!             let pending = std::mem::take(&mut batch.pending);
//!             batch.results.extend(pending.into_iter().map(|n| n * n));
//!             batch.flushes += 1;
//!         }
//!     });
//! }
//! group.wait();
//!
//! let batch = batch.lock().unwrap();
//! assert_eq!(batch.flushes, 1);
//! assert_eq!(batch.results.len(), 8);
//! ```
//!
//! # Async
//!
//! [`RendezvousGroup::wait_async`] returns a [`WaitFuture`] that works with
//! any `async` runtime.
//!
//! ```rust
//! # use rendezvous_group::RendezvousGroup;
//! # futures_executor::block_on(async {
//! let group = RendezvousGroup::new();
//! group.register(2);
//! group.launch(|member| member.rendezvous());
//! group.launch(|member| member.rendezvous());
//! group.wait_async().await;
//! # });
//! ```
//!
//! # Registration races
//!
//! Registration may happen while tasks are running. A rendezvous round
//! released before a later [`RendezvousGroup::register`] call is not
//! reopened by it. Register every task before launching any if all of them
//! must take part in the first round.

mod builder;
mod error;
mod group;
mod member;
mod state;
mod utils;
mod wait;

pub use crate::{
    builder::Builder,
    error::LaunchError,
    group::RendezvousGroup,
    member::{Member, Rendezvous},
    state::Counters,
    wait::WaitFuture,
};
