use embedded_hal::digital::PinState;

#[cfg(test)]
use mockall::automock;

use crate::{Pin, TriggerMode};

/// The GPIO interrupt peripheral of the platform.
///
/// The platform routes every interrupt of a registered pin to
/// [`crate::Dispatcher::on_interrupt`].
#[cfg_attr(test, automock(type Error = MockControllerError;))]
pub trait InterruptController {
    type Error: core::fmt::Debug;

    /// Install the shared GPIO interrupt service.
    /// Called once, before the first pin is registered.
    fn install(&mut self) -> Result<(), Self::Error>;

    /// Arm the interrupt of a pin.
    fn register(&mut self, pin: Pin, mode: TriggerMode) -> Result<(), Self::Error>;

    /// Disarm the interrupt of a pin.
    /// No interrupt for the pin may reach the dispatcher after this returns.
    fn unregister(&mut self, pin: Pin);

    fn enable(&mut self, pin: Pin);
    fn disable(&mut self, pin: Pin);
}

/// Digital input read. Called from interrupt context.
#[cfg_attr(test, automock)]
pub trait PinReader {
    fn read_level(&mut self, pin: Pin) -> PinState;
}

/// Monotonic microsecond clock. Called from interrupt context.
#[cfg_attr(test, automock)]
pub trait Clock {
    fn now_micros(&mut self) -> u64;
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockControllerError;
