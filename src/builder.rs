use crate::RendezvousGroup;

#[derive(Clone, Debug, Default)]
pub(crate) struct Config {
    pub thread_name: Option<String>,
    pub stack_size: Option<usize>,
}

/// Configures the threads launched by a [`RendezvousGroup`].
///
/// ```
/// use rendezvous_group::RendezvousGroup;
///
/// let group = RendezvousGroup::builder()
///     .thread_name("fetcher")
///     .stack_size(256 * 1024)
///     .build();
/// group.register(1);
/// let name = group
///     .launch(|_| std::thread::current().name().map(String::from))
///     .join()
///     .unwrap();
/// assert_eq!(name.as_deref(), Some("fetcher-0"));
/// ```
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names launched threads `{prefix}-{index}`, where `index` counts
    /// launches from zero.
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.config.thread_name = Some(prefix.into());
        self
    }

    /// Stack size in bytes of launched threads.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn build(self) -> RendezvousGroup {
        RendezvousGroup::with_config(self.config)
    }
}
