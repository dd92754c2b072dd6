use core::{
    pin::Pin,
    task::{Context, Poll},
};

use derive_more::Debug;

use crate::{group::Shared, utils::*};

/// Future returned by [`RendezvousGroup::wait_async`].
///
/// Resolves once every registered task of the group has completed.
///
/// # Cancellation safety
///
/// This future is cancellation safe.
///
/// It is also safe to poll again after completion. A pending future holds
/// one waker slot in the group, released when it resolves or is dropped.
///
/// ```rust
/// # use rendezvous_group::RendezvousGroup;
/// # futures_executor::block_on(async {
/// let group = RendezvousGroup::new();
/// group.register(1);
/// let mut wait = core::pin::pin!(group.wait_async());
///
/// group.launch(|_| ()).join().unwrap();
///
/// wait.as_mut().await;
/// assert!(wait.is_terminated());
///
/// // It is safe to await again (re-poll)
/// wait.as_mut().await;
/// # });
/// ```
///
/// [`RendezvousGroup::wait_async`]: crate::RendezvousGroup::wait_async
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[derive(Debug)]
pub struct WaitFuture {
    #[debug(skip)]
    shared: Arc<Shared>,
    key: Option<usize>,
    done: bool,
}

impl WaitFuture {
    #[inline]
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            key: None,
            done: false,
        }
    }

    /// Checks if this future has already resolved.
    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.done
    }
}

impl Future for WaitFuture {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(());
        }

        let mut state = this.shared.lock();
        if state.counters().is_done() {
            if let Some(key) = this.key.take() {
                state.remove_waker(key);
            }
            drop(state);
            this.done = true;
            return Poll::Ready(());
        }

        // The completion that makes the group done takes the wakers under
        // the same lock, so storing the waker here cannot miss it.
        this.key = Some(state.register_waker(this.key, cx.waker()));
        Poll::Pending
    }
}

impl Drop for WaitFuture {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.shared.lock().remove_waker(key);
        }
    }
}

#[cfg(feature = "futures-core")]
impl futures_core::FusedFuture for WaitFuture {
    #[inline]
    fn is_terminated(&self) -> bool {
        self.done
    }
}
