use std::sync::PoisonError;

use tracing::trace;

use crate::{
    builder::{Builder, Config},
    error::LaunchError,
    member::Member,
    state::{Counters, GroupState},
    utils::*,
    wait::WaitFuture,
};

#[derive(Debug)]
pub(crate) struct Shared {
    state: Mutex<GroupState>,
    cond: Condvar,
    config: Config,
}

impl Shared {
    #[cfg(not(loom))]
    #[inline]
    pub const fn new(config: Config) -> Self {
        Self {
            state: Mutex::new(GroupState::new()),
            cond: Condvar::new(),
            config,
        }
    }

    #[cfg(loom)]
    pub fn new(config: Config) -> Self {
        Self {
            state: Mutex::new(GroupState::new()),
            cond: Condvar::new(),
            config,
        }
    }

    // No user code runs while the lock is held, so a poisoned lock still
    // guards consistent counters.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, GroupState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parks on the condition, releasing `guard` until woken.
    #[inline]
    pub fn park<'a>(&self, guard: MutexGuard<'a, GroupState>) -> MutexGuard<'a, GroupState> {
        self.cond.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn notify_all(&self) {
        self.cond.notify_all();
    }
}

/// A wait group whose tasks can rendezvous with each other.
///
/// Tasks are registered with [`register`](Self::register) and started with
/// [`launch`](Self::launch). A running task may call
/// [`Member::rendezvous`] to block until every other outstanding task has
/// either completed or is also blocked in `rendezvous`, at which point all
/// of them resume together. [`wait`](Self::wait) blocks until every
/// registered task has completed.
///
/// The group is a cheap handle: clones refer to the same counters.
///
/// ```
/// use rendezvous_group::RendezvousGroup;
///
/// let group = RendezvousGroup::new();
/// group.register(4);
/// for _ in 0..4 {
///     group.launch(|member| {
///         // accumulate work, then flush it together with the others
///         member.rendezvous();
///     });
/// }
/// group.wait();
/// assert!(group.is_done());
/// ```
#[must_use]
#[derive(Clone, Debug)]
pub struct RendezvousGroup(Arc<Shared>);

impl RendezvousGroup {
    /// Creates an empty group with default thread settings.
    ///
    /// Nothing can be launched until the first [`register`](Self::register)
    /// call.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Starts configuring a group's task threads; see [`Builder`].
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn with_config(config: Config) -> Self {
        Self(Arc::new(Shared::new(config)))
    }

    /// Expects `n` more tasks to run.
    ///
    /// May be called any number of times, including while earlier tasks are
    /// running or after they have finished. A rendezvous round that has
    /// already been released is not affected by a later registration.
    ///
    /// # Panics
    ///
    /// Panics if the total registration count overflows `usize`.
    pub fn register(&self, n: usize) {
        let mut state = self.0.lock();
        state.register(n);
        trace!(n, registered = state.counters().registered, "register");
        drop(state);
        self.0.notify_all();
    }

    /// Runs `f` on a new thread, tracking it as a member of the group.
    ///
    /// The task counts as completed once `f` returns or unwinds.
    ///
    /// # Panics
    ///
    /// Panics if called before any [`register`](Self::register) call, if
    /// every registered task has already been launched, or if the thread
    /// cannot be spawned. See [`try_launch`](Self::try_launch).
    pub fn launch<F, T>(&self, f: F) -> thread::JoinHandle<T>
    where
        F: FnOnce(&Member) -> T + Send + 'static,
        T: Send + 'static,
    {
        match self.try_launch(f) {
            Ok(handle) => handle,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible version of [`launch`](Self::launch).
    ///
    /// Each launch consumes one registration. Launching more tasks than were
    /// registered fails with [`LaunchError::Overlaunched`] and leaves the
    /// counters untouched.
    ///
    /// If the thread cannot be spawned, `f` is dropped without running and
    /// the task still counts as completed, so waiters are not left short.
    pub fn try_launch<F, T>(&self, f: F) -> Result<thread::JoinHandle<T>, LaunchError>
    where
        F: FnOnce(&Member) -> T + Send + 'static,
        T: Send + 'static,
    {
        let index = {
            let mut state = self.0.lock();
            if !state.is_initialized() {
                return Err(LaunchError::Unregistered);
            }
            if state.is_fully_launched() {
                return Err(LaunchError::Overlaunched {
                    registered: state.counters().registered,
                });
            }
            state.launch()
        };
        trace!(index, "launch");

        let member = Member::new(self.0.clone());
        let mut builder = thread::Builder::new();
        if let Some(prefix) = &self.0.config.thread_name {
            builder = builder.name(format!("{prefix}-{index}"));
        }
        if let Some(size) = self.0.config.stack_size {
            builder = builder.stack_size(size);
        }
        builder
            .spawn(move || f(&member))
            .map_err(LaunchError::Spawn)
    }

    /// Blocks until every registered task has completed.
    ///
    /// Must not be called from inside a launched task that has not yet
    /// completed, since that task would wait for itself.
    pub fn wait(&self) {
        let mut state = self.0.lock();
        while !state.counters().is_done() {
            state = self.0.park(state);
        }
    }

    /// Returns a future that resolves once every registered task has
    /// completed.
    ///
    /// ```
    /// use rendezvous_group::RendezvousGroup;
    ///
    /// let group = RendezvousGroup::new();
    /// group.register(1);
    /// group.launch(|_| ());
    /// futures_executor::block_on(group.wait_async());
    /// assert!(group.is_done());
    /// ```
    pub fn wait_async(&self) -> WaitFuture {
        WaitFuture::new(self.0.clone())
    }

    /// Checks if every registered task has completed.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.counters().is_done()
    }

    /// Takes a consistent snapshot of the counters.
    #[inline]
    pub fn counters(&self) -> Counters {
        self.0.lock().counters()
    }

    #[cfg(test)]
    pub(crate) fn waker_slots(&self) -> usize {
        self.0.lock().waker_slots()
    }
}

impl Default for RendezvousGroup {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
