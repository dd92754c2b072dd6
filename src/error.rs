use thiserror::Error;

/// Error returned by [`RendezvousGroup::try_launch`].
///
/// [`RendezvousGroup::try_launch`]: crate::RendezvousGroup::try_launch
#[derive(Debug, Error)]
pub enum LaunchError {
    /// No task has been registered with the group yet.
    #[error("rendezvous group launched a task before any register call")]
    Unregistered,
    /// Every registered task has already been launched.
    #[error("rendezvous group launched more tasks than the {registered} registered")]
    Overlaunched {
        /// Registration count at the time of the launch.
        registered: usize,
    },
    /// The thread for the task could not be spawned.
    ///
    /// The task is counted as completed.
    #[error("failed to spawn rendezvous group task")]
    Spawn(#[source] std::io::Error),
}
