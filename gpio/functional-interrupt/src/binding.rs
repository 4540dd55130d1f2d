use alloc::{boxed::Box, sync::Arc};
use embedded_hal::digital::PinState;

use crate::{DeferredCall, Pin, TriggerMode};

/// The pin level and time captured when an interrupt fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub pin: Pin,
    pub level: PinState,
    /// Monotonic time in microseconds
    pub timestamp_us: u64,
}

/// A callback run outside interrupt context.
pub type Callback = Arc<dyn Fn(Snapshot) + Send + Sync>;

pub(crate) enum Handler {
    /// Invoked later from the task queue with a copy of the captured state.
    Scheduled(Callback),
    /// Invoked directly in interrupt context.
    Immediate(Box<dyn FnMut() + Send>),
}

pub(crate) struct InterruptBinding {
    pin: Pin,
    mode: TriggerMode,
    last_level: PinState,
    last_timestamp_us: u64,
    handler: Handler,
}

impl InterruptBinding {
    pub(crate) fn new(pin: Pin, mode: TriggerMode, handler: Handler) -> Self {
        Self {
            pin,
            mode,
            last_level: PinState::Low,
            last_timestamp_us: 0,
            handler,
        }
    }

    pub(crate) fn mode(&self) -> TriggerMode {
        self.mode
    }

    /// Record an interrupt on the pin.
    ///
    /// Immediate handlers run right away. Scheduled handlers yield the call
    /// that must be submitted to the task queue. Must not allocate.
    pub(crate) fn fire(&mut self, level: PinState, timestamp_us: u64) -> Option<DeferredCall> {
        self.last_level = level;
        self.last_timestamp_us = timestamp_us;

        match &mut self.handler {
            Handler::Scheduled(callback) => {
                let snapshot = Snapshot {
                    pin: self.pin,
                    level: self.last_level,
                    timestamp_us: self.last_timestamp_us,
                };
                Some(DeferredCall::new(snapshot, callback.clone()))
            }
            Handler::Immediate(handler) => {
                handler();
                None
            }
        }
    }
}
