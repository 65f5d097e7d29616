//! In-memory SPI link and READY line
//!
//! The slave dispatcher sits behind a mutex; each master transfer locks it
//! and lets it answer within the same transaction. The READY line is a
//! shared level whose rising edge posts a binary semaphore, the way the
//! controller's GPIO interrupt does.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread;
use std::time::{Duration, Instant};

use camlink_core::Dispatcher;
use camlink_hal::spi::SpiConfig;
use camlink_hal::{InputPin, OutputPin, ReadyLatch, ReadyWait, SpiMaster};
use tracing::{debug, trace, warn};

use crate::error::BusError;
use crate::sensor::SimSensor;

pub type SimDispatcher = Dispatcher<SimSensor, ReadyLine>;

/// Shared handle to the slave side
pub type SlaveHandle = Arc<Mutex<SimDispatcher>>;

/// Lock the slave, recovering from a poisoned lock
pub fn lock_slave(slave: &SlaveHandle) -> MutexGuard<'_, SimDispatcher> {
    slave.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Binary semaphore posted by the READY rising edge
#[derive(Clone, Default)]
pub struct ReadySemaphore {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ReadySemaphore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post the semaphore; posts while already set collapse
    pub fn signal(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_one();
    }

    pub fn is_pending(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReadyLatch for ReadySemaphore {
    fn clear(&mut self) {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }
}

impl ReadyWait for ReadySemaphore {
    fn wait(&mut self, timeout_ms: u32) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut pending, _) = cvar
            .wait_timeout_while(guard, Duration::from_millis(timeout_ms as u64), |p| !*p)
            .unwrap_or_else(PoisonError::into_inner);
        let taken = *pending;
        *pending = false;
        taken
    }
}

struct LineState {
    level: AtomicBool,
    rising_edges: AtomicU32,
    deliver_edges: AtomicBool,
}

/// READY line: slave drives it, master reads it
#[derive(Clone)]
pub struct ReadyLine {
    state: Arc<LineState>,
    semaphore: ReadySemaphore,
}

impl ReadyLine {
    pub fn new(semaphore: ReadySemaphore) -> Self {
        Self {
            state: Arc::new(LineState {
                level: AtomicBool::new(false),
                rising_edges: AtomicU32::new(0),
                deliver_edges: AtomicBool::new(true),
            }),
            semaphore,
        }
    }

    /// Stop posting the semaphore on rising edges, as if the interrupt
    /// were not armed
    pub fn suppress_edges(&self, suppress: bool) {
        self.state.deliver_edges.store(!suppress, Ordering::SeqCst);
    }

    pub fn rising_edges(&self) -> u32 {
        self.state.rising_edges.load(Ordering::SeqCst)
    }
}

impl OutputPin for ReadyLine {
    fn set_high(&mut self) {
        let was_high = self.state.level.swap(true, Ordering::SeqCst);
        if !was_high {
            self.state.rising_edges.fetch_add(1, Ordering::SeqCst);
            if self.state.deliver_edges.load(Ordering::SeqCst) {
                self.semaphore.signal();
            }
            trace!("READY rising edge");
        }
    }

    fn set_low(&mut self) {
        self.state.level.store(false, Ordering::SeqCst);
    }

    fn is_set_high(&self) -> bool {
        self.state.level.load(Ordering::SeqCst)
    }
}

impl InputPin for ReadyLine {
    fn is_high(&self) -> bool {
        self.state.level.load(Ordering::SeqCst)
    }
}

/// Handle for failing master transfers on demand
#[derive(Clone, Default)]
pub struct FaultInjector {
    pass: Arc<AtomicU32>,
    fail: Arc<AtomicU32>,
}

impl FaultInjector {
    /// Fail the next `count` transfers
    pub fn fail_next(&self, count: u32) {
        self.fail_after(0, count);
    }

    /// Let `pass` transfers through, then fail `count`
    pub fn fail_after(&self, pass: u32, count: u32) {
        self.pass.store(pass, Ordering::SeqCst);
        self.fail.store(count, Ordering::SeqCst);
    }

    fn take(&self) -> bool {
        if self.fail.load(Ordering::SeqCst) == 0 {
            return false;
        }
        if countdown(&self.pass) {
            return false;
        }
        countdown(&self.fail)
    }
}

fn countdown(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

/// Master side of the in-memory bus
pub struct LoopbackBus {
    slave: SlaveHandle,
    faults: FaultInjector,
    timeout: Duration,
    transfers: u32,
}

impl LoopbackBus {
    /// Attach to a slave; `spi.timeout_ms` bounds each transaction
    pub fn new(slave: SlaveHandle, spi: SpiConfig) -> Self {
        debug!(
            frequency = spi.frequency,
            mode = spi.mode.number(),
            timeout_ms = spi.timeout_ms,
            "Loopback bus configured"
        );
        Self {
            slave,
            faults: FaultInjector::default(),
            timeout: Duration::from_millis(spi.timeout_ms as u64),
            transfers: 0,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn fault_injector(&self) -> FaultInjector {
        self.faults.clone()
    }

    pub fn transfers(&self) -> u32 {
        self.transfers
    }
}

impl LoopbackBus {
    /// Wait for the slave within the transaction timeout
    fn acquire_slave(&self) -> Result<MutexGuard<'_, SimDispatcher>, BusError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match self.slave.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(_)) => return Err(BusError::Poisoned),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        warn!("Slave busy past the transaction timeout");
                        return Err(BusError::Timeout);
                    }
                    thread::sleep(Duration::from_millis(1));
                }
            }
        }
    }
}

impl SpiMaster for LoopbackBus {
    type Error = BusError;

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), BusError> {
        self.transfers = self.transfers.wrapping_add(1);
        if self.faults.take() {
            return Err(BusError::Injected);
        }

        read.fill(0);
        let mut slave = self.acquire_slave()?;
        match slave.process(write, read) {
            Some(len) => trace!(len, "Slave answered"),
            None => trace!("Slave discarded packet"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semaphore_single_slot() {
        let mut sem = ReadySemaphore::new();
        sem.signal();
        sem.signal();
        assert!(sem.wait(0));
        assert!(!sem.wait(1));
    }

    #[test]
    fn test_semaphore_cross_thread() {
        let mut sem = ReadySemaphore::new();
        let poster = sem.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            poster.signal();
        });
        assert!(sem.wait(2000));
        handle.join().unwrap();
    }

    #[test]
    fn test_clear_drops_stale_post() {
        let mut sem = ReadySemaphore::new();
        sem.signal();
        sem.clear();
        assert!(!sem.wait(1));
    }

    #[test]
    fn test_line_posts_on_rising_edge_only() {
        let sem = ReadySemaphore::new();
        let mut line = ReadyLine::new(sem.clone());
        line.set_high();
        line.set_high();
        assert_eq!(line.rising_edges(), 1);
        assert!(sem.is_pending());
        assert!(line.is_high());

        line.set_low();
        assert!(!line.is_high());
    }

    #[test]
    fn test_suppressed_edges() {
        let sem = ReadySemaphore::new();
        let mut line = ReadyLine::new(sem.clone());
        line.suppress_edges(true);
        line.set_high();
        assert_eq!(line.rising_edges(), 1);
        assert!(!sem.is_pending());
    }

    #[test]
    fn test_fault_injector_counts_down() {
        let faults = FaultInjector::default();
        faults.fail_next(2);
        assert!(faults.take());
        assert!(faults.take());
        assert!(!faults.take());
    }

    #[test]
    fn test_fault_injector_passes_first() {
        let faults = FaultInjector::default();
        faults.fail_after(2, 1);
        assert!(!faults.take());
        assert!(!faults.take());
        assert!(faults.take());
        assert!(!faults.take());
    }

    fn slave_handle() -> SlaveHandle {
        use camlink_core::CaptureManager;

        use crate::sensor::{SensorConfig, SimSensor};

        let line = ReadyLine::new(ReadySemaphore::new());
        let camera = CaptureManager::new(SimSensor::new(SensorConfig::default()));
        Arc::new(Mutex::new(Dispatcher::new(camera, line)))
    }

    #[test]
    fn test_bus_takes_timeout_from_config() {
        let spi = SpiConfig {
            timeout_ms: 250,
            ..Default::default()
        };
        let bus = LoopbackBus::new(slave_handle(), spi);
        assert_eq!(bus.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_busy_slave_times_out() {
        let slave = slave_handle();
        let spi = SpiConfig {
            timeout_ms: 20,
            ..Default::default()
        };
        let mut bus = LoopbackBus::new(slave.clone(), spi);

        let guard = lock_slave(&slave);
        let mut read = [0u8; 8];
        assert_eq!(
            bus.transfer(&mut read, &[0xFE, 0, 0, 0, 0, 0, 0, 0]),
            Err(BusError::Timeout)
        );
        drop(guard);

        assert_eq!(bus.transfer(&mut read, &[0xFE, 0, 0, 0, 0, 0, 0, 0]), Ok(()));
        assert_eq!(read[0], 0x00);
        assert_eq!(bus.transfers(), 2);
    }
}
