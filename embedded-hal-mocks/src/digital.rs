use embedded_hal::digital::{self, PinState};
use mockall::mock;

#[derive(Debug, Clone, Copy)]
pub struct DigitalError;

impl digital::Error for DigitalError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

mock! {
    pub InputPin { }

    impl digital::InputPin for InputPin {
        fn is_high(&mut self) -> Result<bool, DigitalError>;
        fn is_low(&mut self) -> Result<bool, DigitalError>;
    }

    impl digital::ErrorType for InputPin {
        type Error = DigitalError;
    }
}

impl MockInputPin {
    /// Let the pin read as `level` for any number of reads.
    pub fn expect_level(&mut self, level: PinState) {
        let high = level == PinState::High;
        self.expect_is_high().return_const(Ok(high));
        self.expect_is_low().return_const(Ok(!high));
    }
}
