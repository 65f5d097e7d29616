//! READY notification for bare-metal targets
//!
//! The rising-edge interrupt handler calls [`ReadySignal::signal`]. The
//! client task awaits it through [`SignalReadyWait`], racing the signal
//! against one timer so the executor sleeps until either fires.

use camlink_hal::{AsyncReadyWait, ReadyLatch};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;

/// Single-slot notification set from interrupt context
///
/// Can live in a `static`. Repeated signals before a wait collapse into one.
pub struct ReadySignal<M: RawMutex = CriticalSectionRawMutex> {
    signal: Signal<M, ()>,
}

impl<M: RawMutex> ReadySignal<M> {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Mark the READY edge
    pub fn signal(&self) {
        self.signal.signal(());
    }

    /// Consume a pending signal without waiting
    pub fn take(&self) -> bool {
        self.signal.try_take().is_some()
    }

    pub fn clear(&self) {
        self.signal.reset();
    }

    pub fn is_pending(&self) -> bool {
        self.signal.signaled()
    }
}

impl<M: RawMutex> Default for ReadySignal<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// [`AsyncReadyWait`] over a [`ReadySignal`] and an async delay
pub struct SignalReadyWait<'a, M: RawMutex, D> {
    signal: &'a ReadySignal<M>,
    delay: D,
}

impl<'a, M: RawMutex, D: DelayNs> SignalReadyWait<'a, M, D> {
    pub fn new(signal: &'a ReadySignal<M>, delay: D) -> Self {
        Self { signal, delay }
    }

    pub fn free(self) -> D {
        self.delay
    }
}

impl<M: RawMutex, D: DelayNs> ReadyLatch for SignalReadyWait<'_, M, D> {
    fn clear(&mut self) {
        self.signal.clear();
    }
}

impl<M: RawMutex, D: DelayNs> AsyncReadyWait for SignalReadyWait<'_, M, D> {
    async fn wait(&mut self, timeout_ms: u32) -> bool {
        match select(self.signal.signal.wait(), self.delay.delay_ms(timeout_ms)).await {
            Either::First(()) => true,
            Either::Second(()) => {
                trace!("READY wait timed out after {} ms", timeout_ms);
                false
            }
        }
    }
}
