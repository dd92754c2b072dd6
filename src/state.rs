use core::{fmt::Debug, mem, task::Waker};

/// Snapshot of the counters of a [`RendezvousGroup`].
///
/// [`RendezvousGroup`]: crate::RendezvousGroup
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Counters {
    /// Tasks ever expected to run.
    pub registered: usize,
    /// Tasks whose work function has returned or unwound.
    pub completed: usize,
    /// Tasks blocked in the current rendezvous round.
    pub paused: usize,
}

impl Counters {
    /// Every outstanding task is either completed or paused.
    #[inline]
    pub fn is_quorum(&self) -> bool {
        self.registered == self.completed + self.paused
    }

    /// No task is outstanding.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.registered == self.completed
    }
}

pub(crate) struct GroupState {
    counters: Counters,
    initialized: bool,
    launched: usize,
    generation: u64,
    leader_pending: bool,
    wakers: WakerSlots,
}

impl GroupState {
    #[inline]
    pub const fn new() -> Self {
        Self {
            counters: Counters {
                registered: 0,
                completed: 0,
                paused: 0,
            },
            initialized: false,
            launched: 0,
            generation: 0,
            leader_pending: false,
            wakers: WakerSlots::new(),
        }
    }

    #[inline]
    pub fn counters(&self) -> Counters {
        self.counters
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn register(&mut self, n: usize) {
        self.initialized = true;
        self.counters.registered = self
            .counters
            .registered
            .checked_add(n)
            .unwrap_or_else(|| panic!("registration count overflow"));
    }

    /// Every registered task has been launched.
    #[inline]
    pub fn is_fully_launched(&self) -> bool {
        self.launched >= self.counters.registered
    }

    /// Returns the launch index of the new task.
    pub fn launch(&mut self) -> usize {
        debug_assert!(!self.is_fully_launched());
        let index = self.launched;
        self.launched += 1;
        index
    }

    /// Records an arrival at the current round.
    ///
    /// Returns `true` if the arrival tripped the round.
    pub fn pause(&mut self) -> bool {
        self.counters.paused += 1;
        if self.counters.is_quorum() {
            self.trip();
            true
        } else {
            false
        }
    }

    /// Records a completion.
    ///
    /// Returns `true` if the completion tripped the current round. The round
    /// is then left without a leader, to be claimed by the first waiter.
    pub fn complete(&mut self) -> bool {
        self.counters.completed += 1;
        if self.counters.paused > 0 && self.counters.is_quorum() {
            self.trip();
            self.leader_pending = true;
            true
        } else {
            false
        }
    }

    /// Claims the leadership of a round tripped by a completion.
    #[inline]
    pub fn claim_leader(&mut self) -> bool {
        mem::take(&mut self.leader_pending)
    }

    /// Stores `waker` in the slot `key`, allocating a slot on first use.
    ///
    /// Returns the key of the slot.
    pub fn register_waker(&mut self, key: Option<usize>, waker: &Waker) -> usize {
        if let Some(key) = key
            && let Some(slot) = self.wakers.get_mut(key)
        {
            match slot {
                Some(stored) if stored.will_wake(waker) => {}
                _ => *slot = Some(waker.clone()),
            }
            return key;
        }
        self.wakers.insert(waker.clone())
    }

    /// Frees the slot `key`.
    #[inline]
    pub fn remove_waker(&mut self, key: usize) {
        self.wakers.remove(key);
    }

    /// Takes the stored wakers once the group is done.
    ///
    /// The slots stay allocated until their futures release them.
    pub fn take_wakers(&mut self) -> Vec<Waker> {
        if self.counters.is_done() {
            self.wakers.take_all()
        } else {
            Vec::new()
        }
    }

    #[cfg(test)]
    pub fn waker_slots(&self) -> usize {
        self.wakers.len()
    }

    // Everyone paused in the round is released; they stop counting as
    // paused right away so that an early re-entry starts a fresh round.
    fn trip(&mut self) {
        self.counters.paused = 0;
        self.generation = self.generation.wrapping_add(1);
    }
}

// Slots are keyed by index and reused once freed, so a future that is
// polled repeatedly and then dropped costs O(1) and leaves nothing behind.
#[derive(Debug)]
struct WakerSlots {
    entries: Vec<Slot>,
    free: Vec<usize>,
}

#[derive(Debug)]
enum Slot {
    Vacant,
    Occupied(Option<Waker>),
}

impl WakerSlots {
    const fn new() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
        }
    }

    fn insert(&mut self, waker: Waker) -> usize {
        let slot = Slot::Occupied(Some(waker));
        match self.free.pop() {
            Some(key) => {
                self.entries[key] = slot;
                key
            }
            None => {
                self.entries.push(slot);
                self.entries.len() - 1
            }
        }
    }

    fn get_mut(&mut self, key: usize) -> Option<&mut Option<Waker>> {
        match self.entries.get_mut(key) {
            Some(Slot::Occupied(waker)) => Some(waker),
            _ => None,
        }
    }

    fn remove(&mut self, key: usize) {
        if let Some(slot) = self.entries.get_mut(key)
            && matches!(slot, Slot::Occupied(_))
        {
            *slot = Slot::Vacant;
            self.free.push(key);
        }
        if self.free.len() == self.entries.len() {
            self.entries.clear();
            self.free.clear();
        }
    }

    fn take_all(&mut self) -> Vec<Waker> {
        self.entries
            .iter_mut()
            .filter_map(|slot| match slot {
                Slot::Occupied(waker) => waker.take(),
                Slot::Vacant => None,
            })
            .collect()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len() - self.free.len()
    }
}

impl Debug for GroupState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GroupState")
            .field("registered", &self.counters.registered)
            .field("completed", &self.counters.completed)
            .field("paused", &self.counters.paused)
            .field("launched", &self.launched)
            .field("generation", &self.generation)
            .finish()
    }
}
