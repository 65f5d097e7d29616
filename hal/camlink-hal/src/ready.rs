//! READY line notification
//!
//! The master arms a rising-edge interrupt on the READY line. The handler
//! only signals; all logic runs in the waiting task. Only "the line went
//! high" matters, not how many times, so the primitive is a single slot.
//!
//! Blocking waits suit an RTOS semaphore or a host condvar. Bare-metal
//! targets wait through [`AsyncReadyWait`] so the executor can sleep.

/// Single-slot notification signalled by the READY rising edge
pub trait ReadyLatch {
    /// Discard a notification left over from an earlier edge
    fn clear(&mut self);
}

/// Blocking wait on the READY notification
pub trait ReadyWait: ReadyLatch {
    /// Block until the next notification or until `timeout_ms` elapses
    ///
    /// Returns `true` if a notification was consumed, `false` on timeout.
    fn wait(&mut self, timeout_ms: u32) -> bool;
}

/// Async wait on the READY notification
#[allow(async_fn_in_trait)]
pub trait AsyncReadyWait: ReadyLatch {
    /// Wait for the next notification or until `timeout_ms` elapses
    ///
    /// Returns `true` if a notification was consumed, `false` on timeout.
    async fn wait(&mut self, timeout_ms: u32) -> bool;
}

impl<T: ReadyLatch + ?Sized> ReadyLatch for &mut T {
    fn clear(&mut self) {
        (**self).clear();
    }
}

impl<T: ReadyWait + ?Sized> ReadyWait for &mut T {
    fn wait(&mut self, timeout_ms: u32) -> bool {
        (**self).wait(timeout_ms)
    }
}

impl<T: AsyncReadyWait + ?Sized> AsyncReadyWait for &mut T {
    async fn wait(&mut self, timeout_ms: u32) -> bool {
        (**self).wait(timeout_ms).await
    }
}
