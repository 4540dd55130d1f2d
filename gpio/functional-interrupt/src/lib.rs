#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

extern crate alloc;

#[macro_use]
extern crate num_derive;

mod binding;
mod config;
mod dispatcher;
mod error;
pub mod platform;
mod queue;
pub mod traits;
mod trigger;

/// GPIO line number
pub type Pin = u8;

#[cfg(all(feature = "esp32c3", feature = "esp32s3"))]
compile_error!("Only one of the `esp32c3` and `esp32s3` features may be enabled.");

#[cfg(feature = "esp32s3")]
pub const PIN_COUNT: usize = 49;
#[cfg(all(feature = "esp32c3", not(feature = "esp32s3")))]
pub const PIN_COUNT: usize = 22;
#[cfg(not(any(feature = "esp32c3", feature = "esp32s3")))]
pub const PIN_COUNT: usize = 40;

pub use self::{
    binding::{Callback, Snapshot},
    config::{Config, OverflowPolicy, DEFAULT_QUEUE_CAPACITY},
    dispatcher::{BindingState, Dispatcher},
    error::{InterruptError, InvalidTriggerMode},
    queue::{DeferredCall, TaskQueue},
    trigger::TriggerMode,
};

pub use embedded_hal::digital::PinState;
