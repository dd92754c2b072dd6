use core::{cell::Cell, marker::PhantomData};

use derive_more::Debug;
use tracing::{debug, trace};

use crate::{group::Shared, utils::*};

/// Handle lent to a task launched by a [`RendezvousGroup`].
///
/// Dropping the handle marks the task as completed. The handle is owned by
/// the launched thread and dropped when the task's function returns or
/// unwinds, so every launched task completes exactly once.
///
/// A member stands for one task, so it cannot be shared with other threads:
///
/// ```compile_fail
/// use rendezvous_group::RendezvousGroup;
///
/// let group = RendezvousGroup::new();
/// group.register(1);
/// group.launch(|member| {
///     std::thread::scope(|s| {
///         s.spawn(|| member.rendezvous());
///     });
/// });
/// ```
///
/// [`RendezvousGroup`]: crate::RendezvousGroup
#[derive(Debug)]
pub struct Member {
    #[debug(skip)]
    shared: Arc<Shared>,
    // Not `Sync`: a task pauses at most once per round.
    #[debug(skip)]
    _not_sync: PhantomData<Cell<()>>,
}

/// Outcome of a [`Member::rendezvous`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rendezvous {
    generation: u64,
    is_leader: bool,
}

impl Member {
    #[inline]
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            _not_sync: PhantomData,
        }
    }

    /// Blocks until every other outstanding task of the group has either
    /// completed or is also blocked in `rendezvous`.
    ///
    /// All tasks blocked in the same round are released together. The call
    /// may be repeated: each call joins the next round, and a round only
    /// counts tasks that arrived after the previous one was released, so
    /// repeated calls advance in lockstep with the siblings' calls.
    ///
    /// A sibling that neither completes nor reaches the rendezvous blocks
    /// the round forever.
    ///
    /// ```
    /// use std::sync::{
    ///     Arc,
    ///     atomic::{AtomicUsize, Ordering},
    /// };
    ///
    /// use rendezvous_group::RendezvousGroup;
    ///
    /// let group = RendezvousGroup::new();
    /// let arrived = Arc::new(AtomicUsize::new(0));
    /// group.register(3);
    /// for _ in 0..3 {
    ///     let arrived = arrived.clone();
    ///     group.launch(move |member| {
    ///         arrived.fetch_add(1, Ordering::SeqCst);
    ///         member.rendezvous();
    ///         assert_eq!(arrived.load(Ordering::SeqCst), 3);
    ///     });
    /// }
    /// group.wait();
    /// ```
    pub fn rendezvous(&self) -> Rendezvous {
        let mut state = self.shared.lock();
        let generation = state.generation();
        if state.pause() {
            drop(state);
            debug!(generation, "rendezvous round complete");
            self.shared.notify_all();
            return Rendezvous::new(generation, true);
        }

        loop {
            state = self.shared.park(state);
            if state.generation() != generation {
                return Rendezvous::new(generation, state.claim_leader());
            }
        }
    }
}

impl Drop for Member {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        let tripped = state.complete();
        let counters = state.counters();
        let wakers = state.take_wakers();
        drop(state);

        trace!(completed = counters.completed, "task completed");
        if tripped {
            debug!("rendezvous round completed by task exit");
        }

        self.shared.notify_all();
        for waker in wakers {
            waker.wake();
        }
    }
}

impl Rendezvous {
    #[inline]
    fn new(generation: u64, is_leader: bool) -> Self {
        Self {
            generation,
            is_leader,
        }
    }

    /// Returns `true` for exactly one task of each round.
    ///
    /// The leader is the task whose arrival released the round, or, if the
    /// round was released by a sibling completing, the first task to wake.
    #[inline]
    pub fn is_leader(&self) -> bool {
        self.is_leader
    }

    /// Index of the round, counted from zero over the group's lifetime.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
