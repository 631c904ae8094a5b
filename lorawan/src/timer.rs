//! One-shot timers
//!
//! Expiry disarms a timer; whoever needs another period starts it again.
//! Expiry is observed by polling [`Timer::wait`], which never blocks.

use core::convert::Infallible;
use core::time::Duration;

/// Timers owned by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerId {
    /// Next transmit attempt (or join retry)
    DutyCycle,
    /// Switches the TX indicator off
    TxIndicator,
    /// Switches the RX indicator off
    RxIndicator,
}

/// One-shot count down timer
pub trait Timer {
    /// Arm the timer, rescheduling it if it is already running
    fn start(&mut self, duration: Duration);

    /// Disarm the timer without expiring
    fn cancel(&mut self);

    /// Check for expiry
    ///
    /// Returns `Ok(())` exactly once per expiry and disarms the timer,
    /// `WouldBlock` while armed or idle.
    fn wait(&mut self) -> nb::Result<(), Infallible>;
}

/// Check a timer for expiry without blocking
pub fn expired<T: Timer>(timer: &mut T) -> bool {
    match timer.wait() {
        Ok(()) => true,
        Err(nb::Error::WouldBlock) => false,
        Err(nb::Error::Other(never)) => match never {},
    }
}
