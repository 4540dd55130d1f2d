use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Channel, TrySendError},
};

use crate::{Callback, OverflowPolicy, Snapshot, DEFAULT_QUEUE_CAPACITY};

/// A callback invocation deferred out of interrupt context.
///
/// The call owns its snapshot and a handle to the callback, so it stays
/// valid after the pin that produced it has been detached.
pub struct DeferredCall {
    snapshot: Snapshot,
    callback: Callback,
}

impl DeferredCall {
    pub(crate) fn new(snapshot: Snapshot, callback: Callback) -> Self {
        Self { snapshot, callback }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }

    /// Invoke the callback with the captured snapshot.
    pub fn run(self) {
        (self.callback)(self.snapshot)
    }
}

// Explicit implementation of Debug because the callback does not implement Debug.
impl core::fmt::Debug for DeferredCall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeferredCall")
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

/// FIFO of deferred calls, filled from interrupt context and drained from thread context.
pub struct TaskQueue<const N: usize = DEFAULT_QUEUE_CAPACITY> {
    channel: Channel<CriticalSectionRawMutex, DeferredCall, N>,
}

impl<const N: usize> TaskQueue<N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Enqueue a call without blocking.
    ///
    /// If the queue is full the call that is discarded, either `call` or the
    /// oldest queued call depending on `policy`, is returned as the error.
    pub(crate) fn submit(
        &self,
        call: DeferredCall,
        policy: OverflowPolicy,
    ) -> Result<(), DeferredCall> {
        let call = match self.channel.try_send(call) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Full(call)) => call,
        };

        match policy {
            OverflowPolicy::DropNewest => Err(call),
            OverflowPolicy::DropOldest => {
                let evicted = self.channel.try_receive().ok();
                match self.channel.try_send(call) {
                    Ok(()) => evicted.map_or(Ok(()), Err),
                    Err(TrySendError::Full(call)) => Err(call),
                }
            }
        }
    }

    /// Run the calls that are queued at the time of calling, in the order they were submitted.
    ///
    /// Calls submitted while draining are left for the next drain.
    /// Returns the number of calls that were run.
    pub fn run_pending(&self) -> usize {
        let pending = self.channel.len();
        let mut ran = 0;
        while ran < pending {
            match self.channel.try_receive() {
                Ok(call) => {
                    call.run();
                    ran += 1;
                }
                Err(_) => break,
            }
        }
        ran
    }

    /// Wait for the next deferred call.
    pub async fn next(&self) -> DeferredCall {
        self.channel.receive().await
    }

    /// Run deferred calls as they arrive.
    pub async fn run(&self) {
        loop {
            self.next().await.run();
        }
    }
}

impl<const N: usize> Default for TaskQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use embedded_hal::digital::PinState;

    use super::*;

    fn call(recorded: &Arc<Mutex<Vec<u64>>>, timestamp_us: u64) -> DeferredCall {
        let recorded = recorded.clone();
        DeferredCall::new(
            Snapshot {
                pin: 1,
                level: PinState::High,
                timestamp_us,
            },
            Arc::new(move |snapshot: Snapshot| {
                recorded.lock().unwrap().push(snapshot.timestamp_us)
            }),
        )
    }

    #[test]
    fn run_pending_is_fifo() {
        // Given
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let queue = TaskQueue::<4>::new();
        for timestamp_us in [10, 20, 30] {
            queue
                .submit(call(&recorded, timestamp_us), OverflowPolicy::DropNewest)
                .unwrap();
        }
        assert_eq!(3, queue.len());

        // When
        let ran = queue.run_pending();

        // Then
        assert_eq!(3, ran);
        assert!(queue.is_empty());
        assert_eq!(vec![10, 20, 30], *recorded.lock().unwrap());
    }

    #[test]
    fn drop_newest_returns_the_rejected_call() {
        // Given
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let queue = TaskQueue::<2>::new();
        queue
            .submit(call(&recorded, 10), OverflowPolicy::DropNewest)
            .unwrap();
        queue
            .submit(call(&recorded, 20), OverflowPolicy::DropNewest)
            .unwrap();

        // When
        let rejected = queue
            .submit(call(&recorded, 30), OverflowPolicy::DropNewest)
            .unwrap_err();

        // Then
        assert_eq!(30, rejected.snapshot().timestamp_us);
        assert_eq!(2, queue.run_pending());
        assert_eq!(vec![10, 20], *recorded.lock().unwrap());
    }

    #[test]
    fn drop_oldest_returns_the_evicted_call() {
        // Given
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let queue = TaskQueue::<2>::new();
        queue
            .submit(call(&recorded, 10), OverflowPolicy::DropOldest)
            .unwrap();
        queue
            .submit(call(&recorded, 20), OverflowPolicy::DropOldest)
            .unwrap();

        // When
        let evicted = queue
            .submit(call(&recorded, 30), OverflowPolicy::DropOldest)
            .unwrap_err();

        // Then
        assert_eq!(10, evicted.snapshot().timestamp_us);
        assert_eq!(2, queue.run_pending());
        assert_eq!(vec![20, 30], *recorded.lock().unwrap());
    }

    #[tokio::test]
    async fn next_waits_for_submitted_call() {
        // Given
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let queue = TaskQueue::<2>::new();

        // When
        let (deferred, _) = tokio::join!(queue.next(), async {
            tokio::task::yield_now().await;
            queue
                .submit(call(&recorded, 42), OverflowPolicy::DropNewest)
                .unwrap();
        });
        deferred.run();

        // Then
        assert_eq!(vec![42], *recorded.lock().unwrap());
    }
}
