/// Capacity of a [`crate::TaskQueue`] when none is given.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// What to do with a deferred call when the task queue is full.
///
/// Blocking is not an option as calls are submitted from interrupt context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverflowPolicy {
    /// Discard the call that did not fit.
    #[default]
    DropNewest,
    /// Evict the oldest queued call to make room.
    DropOldest,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub overflow: OverflowPolicy,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            overflow: OverflowPolicy::DropNewest,
        }
    }

    pub const fn overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }
}
