//! Controller shared between the main loop and interrupt handlers
//!
//! Timer and MAC engine callbacks usually run in interrupt context. Every
//! access goes through a critical section so an entry point always runs to
//! completion before the next one starts.

use core::cell::RefCell;

use critical_section::Mutex;
use rand_core::RngCore;

use crate::controller::{Controller, Event};
use crate::display::Display;
use crate::mac::MacEngine;
use crate::timer::Timer;

/// Critical-section protected controller
pub struct SharedController<C> {
    inner: Mutex<RefCell<C>>,
}

impl<C> SharedController<C> {
    /// Wrap a controller
    pub const fn new(controller: C) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(controller)),
        }
    }

    /// Run `f` with exclusive access to the controller
    pub fn with<F, Ret>(&self, f: F) -> Ret
    where
        F: FnOnce(&mut C) -> Ret,
    {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Unwrap the controller
    pub fn into_inner(self) -> C {
        self.inner.into_inner().into_inner()
    }
}

impl<M, T, D, R> SharedController<Controller<M, T, D, R>>
where
    M: MacEngine,
    T: Timer,
    D: Display,
    R: RngCore,
{
    /// Deliver an event from a callback or interrupt handler
    pub fn handle_event(&self, event: Event<'_>) {
        self.with(|controller| controller.handle_event(event));
    }

    /// One main loop pass
    pub fn process(&self) {
        self.with(|controller| controller.process());
    }
}
