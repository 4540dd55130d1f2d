//! Implementations of the platform traits on top of `embedded-hal` and `embassy-time`.

use embassy_time::Instant;
use embedded_hal::digital::{InputPin, PinState};

use crate::{
    traits::{Clock, PinReader},
    Pin,
};

/// Level reader over a fixed set of input pins, where pin `n` is `pins[n]`.
pub struct HalPins<P: InputPin, const N: usize> {
    pins: [P; N],
}

impl<P: InputPin, const N: usize> HalPins<P, N> {
    pub const fn new(pins: [P; N]) -> Self {
        Self { pins }
    }

    pub fn release(self) -> [P; N] {
        self.pins
    }
}

impl<P: InputPin, const N: usize> PinReader for HalPins<P, N> {
    fn read_level(&mut self, pin: Pin) -> PinState {
        // Pins that are unknown or cannot be read are reported low.
        match self.pins.get_mut(pin as usize).map(|p| p.is_high()) {
            Some(Ok(true)) => PinState::High,
            _ => PinState::Low,
        }
    }
}

/// Clock backed by the embassy time driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_micros(&mut self) -> u64 {
        Instant::now().as_micros()
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal_mocks::digital::{DigitalError, MockInputPin};

    use super::*;

    #[test]
    fn read_level_of_indexed_pin() {
        // Given
        let mut low = MockInputPin::new();
        low.expect_level(PinState::Low);
        let mut high = MockInputPin::new();
        high.expect_level(PinState::High);

        // When
        let mut pins = HalPins::new([low, high]);

        // Then
        assert_eq!(PinState::Low, pins.read_level(0));
        assert_eq!(PinState::High, pins.read_level(1));
    }

    #[test]
    fn unreadable_pin_is_low() {
        // Given
        let mut broken = MockInputPin::new();
        broken.expect_is_high().times(1).return_const(Err(DigitalError));

        // When
        let mut pins = HalPins::new([broken]);

        // Then
        assert_eq!(PinState::Low, pins.read_level(0));
        assert_eq!(PinState::Low, pins.read_level(1));
    }

    #[test]
    fn embassy_clock_is_monotonic() {
        let mut clock = EmbassyClock;
        let first = clock.now_micros();
        let second = clock.now_micros();
        assert!(second >= first);
    }
}
