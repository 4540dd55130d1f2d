use bitfield::bitfield;
use num_traits::FromPrimitive;

use crate::InvalidTriggerMode;

bitfield! {
    #[derive(Clone, Copy)]
    struct ModeBits(u8);
    /// Wake the chip from light sleep when the level condition is met
    wakeup, _: 3;
    /// Interrupt type of the GPIO peripheral
    intr_type, _: 2, 0;
}

/// The condition on which a pin interrupt fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TriggerMode {
    Rising = 0x01,
    Falling = 0x02,
    Change = 0x03,
    OnLow = 0x04,
    OnHigh = 0x05,
    /// Same as [`TriggerMode::OnLow`], and also wakes the chip from light sleep.
    OnLowWakeup = 0x0C,
    /// Same as [`TriggerMode::OnHigh`], and also wakes the chip from light sleep.
    OnHighWakeup = 0x0D,
}

impl TriggerMode {
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Get the interrupt type to program into the GPIO peripheral.
    pub fn intr_type(self) -> u8 {
        ModeBits(self.bits()).intr_type()
    }

    /// Get whether the pin should also be armed as a light sleep wakeup source.
    pub fn wakes_up(self) -> bool {
        ModeBits(self.bits()).wakeup()
    }

    pub const fn is_edge(self) -> bool {
        matches!(self, Self::Rising | Self::Falling | Self::Change)
    }
}

impl TryFrom<u8> for TriggerMode {
    type Error = InvalidTriggerMode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(InvalidTriggerMode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wakeup_modes_share_interrupt_type_with_level_modes() {
        assert_eq!(TriggerMode::OnLow.intr_type(), TriggerMode::OnLowWakeup.intr_type());
        assert_eq!(TriggerMode::OnHigh.intr_type(), TriggerMode::OnHighWakeup.intr_type());
        assert!(TriggerMode::OnLowWakeup.wakes_up());
        assert!(TriggerMode::OnHighWakeup.wakes_up());
        assert!(!TriggerMode::OnHigh.wakes_up());
    }

    #[test]
    fn edge_modes() {
        assert_eq!(3, TriggerMode::Change.intr_type());
        assert!(TriggerMode::Falling.is_edge());
        assert!(!TriggerMode::OnLowWakeup.is_edge());
    }

    #[test]
    fn parse_raw_mode() {
        assert_eq!(Ok(TriggerMode::Rising), TriggerMode::try_from(0x01));
        assert_eq!(Ok(TriggerMode::OnHighWakeup), TriggerMode::try_from(0x0D));
        assert_eq!(Err(InvalidTriggerMode), TriggerMode::try_from(0x00));
        assert_eq!(Err(InvalidTriggerMode), TriggerMode::try_from(0x06));
        assert_eq!(Err(InvalidTriggerMode), TriggerMode::try_from(0x08));
    }
}
