use alloc::{boxed::Box, sync::Arc};
use core::{
    cell::RefCell,
    sync::atomic::{AtomicU32, Ordering},
};
use critical_section::Mutex;

use crate::{
    binding::{Handler, InterruptBinding},
    traits::{Clock, InterruptController, PinReader},
    Config, InterruptError, Pin, Snapshot, TaskQueue, TriggerMode, PIN_COUNT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindingState {
    Unbound,
    Bound(TriggerMode),
}

/// Routes GPIO interrupts to per-pin handlers.
///
/// Each pin has at most one handler. Scheduled handlers get a [`Snapshot`] of
/// the pin level and time captured in interrupt context, and are run later
/// when the [`TaskQueue`] is drained.
///
/// The platform must call [`Dispatcher::on_interrupt`] from its GPIO
/// interrupt handler for every pin registered with the controller.
pub struct Dispatcher<'q, Ctrl, Pins, Clk, const N: usize>
where
    Ctrl: InterruptController,
    Pins: PinReader,
    Clk: Clock,
{
    inner: Mutex<RefCell<Inner<Ctrl, Pins, Clk>>>,
    queue: &'q TaskQueue<N>,
    config: Config,
    dropped_calls: AtomicU32,
}

struct Inner<Ctrl, Pins, Clk> {
    controller: Ctrl,
    pins: Pins,
    clock: Clk,
    installed: bool,
    bindings: [Option<InterruptBinding>; PIN_COUNT],
}

impl<'q, Ctrl, Pins, Clk, const N: usize> Dispatcher<'q, Ctrl, Pins, Clk, N>
where
    Ctrl: InterruptController,
    Pins: PinReader,
    Clk: Clock,
{
    pub fn new(
        controller: Ctrl,
        pins: Pins,
        clock: Clk,
        queue: &'q TaskQueue<N>,
        config: Config,
    ) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                controller,
                pins,
                clock,
                installed: false,
                bindings: core::array::from_fn(|_| None),
            })),
            queue,
            config,
            dropped_calls: AtomicU32::new(0),
        }
    }

    pub fn queue(&self) -> &'q TaskQueue<N> {
        self.queue
    }

    /// Attach a callback that is run outside interrupt context every time the interrupt fires.
    ///
    /// A handler already attached to the pin is detached first.
    /// If the controller fails to arm the pin, the pin is left unbound.
    pub fn attach_scheduled_interrupt<F>(
        &self,
        pin: Pin,
        mode: TriggerMode,
        callback: F,
    ) -> Result<(), InterruptError<Ctrl::Error>>
    where
        F: Fn(Snapshot) + Send + Sync + 'static,
    {
        self.attach(pin, mode, Handler::Scheduled(Arc::new(callback)))
    }

    /// Attach a handler that is run in interrupt context every time the interrupt fires.
    ///
    /// The handler must return quickly and must not call into the dispatcher.
    pub fn attach_interrupt<F>(
        &self,
        pin: Pin,
        mode: TriggerMode,
        handler: F,
    ) -> Result<(), InterruptError<Ctrl::Error>>
    where
        F: FnMut() + Send + 'static,
    {
        self.attach(pin, mode, Handler::Immediate(Box::new(handler)))
    }

    /// Detach the handler of a pin.
    ///
    /// Detaching a pin without a handler does nothing. Calls that are already
    /// queued are still run.
    pub fn detach_interrupt(&self, pin: Pin) -> Result<(), InterruptError<Ctrl::Error>> {
        Self::slot(pin)?;

        let released = critical_section::with(|cs| self.inner.borrow_ref_mut(cs).unbind(pin));
        if released.is_some() {
            debug!("[{}] Interrupt detached", pin);
        }

        Ok(())
    }

    pub fn enable_interrupt(&self, pin: Pin) -> Result<(), InterruptError<Ctrl::Error>> {
        Self::slot(pin)?;
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).controller.enable(pin));
        Ok(())
    }

    pub fn disable_interrupt(&self, pin: Pin) -> Result<(), InterruptError<Ctrl::Error>> {
        Self::slot(pin)?;
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).controller.disable(pin));
        Ok(())
    }

    pub fn state(&self, pin: Pin) -> BindingState {
        critical_section::with(|cs| {
            let inner = self.inner.borrow_ref(cs);
            match inner.bindings.get(pin as usize) {
                Some(Some(binding)) => BindingState::Bound(binding.mode()),
                _ => BindingState::Unbound,
            }
        })
    }

    /// Get the number of deferred calls lost because the task queue was full.
    pub fn dropped_calls(&self) -> u32 {
        self.dropped_calls.load(Ordering::Relaxed)
    }

    /// Handle an interrupt of a pin.
    ///
    /// Must be called from the GPIO interrupt handler of the platform.
    /// Interrupts of pins without a handler are ignored.
    pub fn on_interrupt(&self, pin: Pin) {
        let call = critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            let Inner {
                pins,
                clock,
                bindings,
                ..
            } = &mut *inner;

            let binding = bindings.get_mut(pin as usize)?.as_mut()?;
            let level = pins.read_level(pin);
            let timestamp_us = clock.now_micros();
            binding.fire(level, timestamp_us)
        });

        if let Some(call) = call {
            // With `OverflowPolicy::DropOldest` the dropped call may hold the last
            // reference to a detached callback, which is then released here.
            if let Err(dropped) = self.queue.submit(call, self.config.overflow) {
                self.dropped_calls.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "[{}] Task queue is full, deferred call dropped",
                    dropped.snapshot().pin
                );
            }
        }
    }

    fn slot(pin: Pin) -> Result<usize, InterruptError<Ctrl::Error>> {
        let slot = pin as usize;
        if slot < PIN_COUNT {
            Ok(slot)
        } else {
            Err(InterruptError::InvalidPin(pin))
        }
    }

    fn attach(
        &self,
        pin: Pin,
        mode: TriggerMode,
        handler: Handler,
    ) -> Result<(), InterruptError<Ctrl::Error>> {
        let slot = Self::slot(pin)?;

        // The replaced binding is returned so that it is released outside the critical section.
        let (result, previous) = critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if let Err(e) = inner.install() {
                return (Err(e), None);
            }

            let previous = inner.unbind(pin);
            match inner.controller.register(pin, mode) {
                Ok(()) => {
                    inner.bindings[slot] = Some(InterruptBinding::new(pin, mode, handler));
                    (Ok(()), previous)
                }
                Err(e) => (Err(e), previous),
            }
        });

        if previous.is_some() {
            trace!("[{}] Previous interrupt handler released", pin);
        }

        match result {
            Ok(()) => {
                debug!("[{}] Interrupt attached on {:?}", pin, mode);
                Ok(())
            }
            Err(e) => {
                error!("[{}] Unable to attach interrupt", pin);
                Err(InterruptError::Controller(e))
            }
        }
    }
}

impl<Ctrl: InterruptController, Pins, Clk> Inner<Ctrl, Pins, Clk> {
    fn install(&mut self) -> Result<(), Ctrl::Error> {
        if !self.installed {
            self.controller.install()?;
            self.installed = true;
            info!("GPIO interrupt service installed");
        }
        Ok(())
    }

    fn unbind(&mut self, pin: Pin) -> Option<InterruptBinding> {
        let binding = self.bindings[pin as usize].take()?;
        self.controller.unregister(pin);
        Some(binding)
    }
}
