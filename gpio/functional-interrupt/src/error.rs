use crate::Pin;

#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptError<ControllerError> {
    /// The pin is outside the range supported by the chip.
    InvalidPin(Pin),
    Controller(ControllerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidTriggerMode;
